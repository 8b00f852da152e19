use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::SeatingService;
use crate::border::Shape;
use crate::models::{Feature, FeatureCollection};
use crate::overpass::{to_feature_collection, ConvertOptions, OverpassResponse};

/// Overpass query for a relation with member geometry
pub fn border_query(id: i64) -> String {
    format!("[out:json];\nrel({});\nout geom;", id)
}

/// The boundary feature of a converted relation response.
///
/// Later features win when several carry `type=boundary`.
pub fn select_boundary(collection: FeatureCollection) -> Option<Feature> {
    collection
        .features
        .into_iter()
        .filter(|f| f.tag("type") == Some("boundary"))
        .last()
}

/// Read a border from a GeoJSON file.
///
/// A collection yields its boundary feature, or its first feature when none
/// is tagged as a boundary. Anything else must be a single feature.
pub fn load_border(path: &Path) -> Result<Shape> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read border file {}", path.display()))?;

    let feature = match serde_json::from_str::<FeatureCollection>(&content) {
        Ok(collection) => {
            let fallback = collection.features.first().cloned();
            select_boundary(collection).or(fallback)
        }
        Err(_) => Some(
            serde_json::from_str::<Feature>(&content)
                .with_context(|| format!("{} is not a GeoJSON feature", path.display()))?,
        ),
    };

    let geometry = feature
        .and_then(|f| f.to_geo())
        .with_context(|| format!("No border geometry in {}", path.display()))?;
    Ok(Shape::try_from(geometry)?)
}

impl SeatingService {
    /// Border feature of relation `id`, fetched once and kept on disk
    pub async fn get_border(&self, id: i64) -> Result<Option<Feature>> {
        let file = self
            .config
            .geometry_dir()
            .join(format!("border_{}.geojson", id));
        if file.exists() {
            let stored = FeatureCollection::load_from_file(&file)?;
            return Ok(stored.features.into_iter().next());
        }

        let response: OverpassResponse = self.overpass.call_json(&border_query(id)).await?;
        let collection = to_feature_collection(&response, ConvertOptions::default());

        let Some(border) = select_boundary(collection) else {
            warn!("Relation {} has no boundary feature", id);
            return Ok(None);
        };

        FeatureCollection::new(vec![border.clone()]).save_to_file(&file)?;
        info!("Saved border of relation {} to {}", id, file.display());
        Ok(Some(border))
    }
}
