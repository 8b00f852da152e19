//! Command line front end.
//!
//! Downloads borders and outdoor seatings per country, or runs the border
//! partitioning and containment filter on local GeoJSON files.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::{json, Map};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use alfresco::config::Config;
use alfresco::models::{Feature, FeatureCollection, GeoJsonGeometry};
use alfresco::seatings::{load_border, retain_inside, SeatingService};
use alfresco::{ContainmentFilter, Partitioner};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "alfresco")]
#[command(about = "Find outdoor seatings inside country borders")]
struct Args {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List countries with their admin centres
    Countries,

    /// Collect outdoor seatings for a country
    Seatings {
        /// Country name or OSM relation ID
        country: String,
    },

    /// Keep the features of a GeoJSON file that lie inside a border
    Filter {
        /// GeoJSON file with the border feature
        #[arg(long)]
        border: PathBuf,

        /// GeoJSON feature collection to filter
        #[arg(long)]
        features: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override the configured split size in degrees
        #[arg(long)]
        split_size: Option<f64>,
    },

    /// Write the border pieces as a feature collection
    Partition {
        /// GeoJSON file with the border feature
        #[arg(long)]
        border: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override the configured split size in degrees
        #[arg(long)]
        split_size: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let mut config = Config::load(args.config.as_deref())?;

    match args.command {
        Command::Countries => {
            let service = SeatingService::new(config)?;
            for country in service.get_countries().await? {
                println!(
                    "{}\t{}\t{} ({}, {})",
                    country.id,
                    country.name,
                    country.admin_center.name,
                    country.admin_center.lat,
                    country.admin_center.lon
                );
            }
        }
        Command::Seatings { country } => {
            let service = SeatingService::new(config)?;
            match service.get_outdoor_seatings_for_country(&country).await? {
                Some(seatings) => println!("{}\t{}", country, seatings.len()),
                None => anyhow::bail!("No country or border found for '{}'", country),
            }
        }
        Command::Filter {
            border,
            features,
            output,
            split_size,
        } => {
            if let Some(size) = split_size {
                config.partition.split_size = size;
            }
            let shape = load_border(&border)?;
            let filter = ContainmentFilter::with_partitioner(shape, config.partitioner()?)?;

            let candidates = FeatureCollection::load_from_file(&features)?;
            let kept = retain_inside(&filter, candidates);
            write_output(&kept, output.as_deref())?;
        }
        Command::Partition {
            border,
            output,
            split_size,
        } => {
            if let Some(size) = split_size {
                config.partition.split_size = size;
            }
            let partitioner: Partitioner = config.partitioner()?;
            let shape = load_border(&border)?;
            shape.validate()?;
            let pieces = partitioner.partition(shape);
            info!("Border split into {} pieces", pieces.len());

            let features = pieces
                .into_iter()
                .enumerate()
                .map(|(i, piece)| {
                    let mut properties = Map::new();
                    properties.insert("piece".to_string(), json!(i));
                    Feature::new(GeoJsonGeometry::from(piece), properties)
                })
                .collect();
            write_output(&FeatureCollection::new(features), output.as_deref())?;
        }
    }

    Ok(())
}

fn write_output(collection: &FeatureCollection, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            collection.save_to_file(path)?;
            info!("Wrote {} features to {}", collection.len(), path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(collection)?),
    }
    Ok(())
}
