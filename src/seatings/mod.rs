//! Outdoor seating extraction per country.
//!
//! Fetches a country's border and the outdoor-seating amenities inside its
//! bounding box from Overpass, then keeps the ones inside the border.
//! Results are stored under the data directory and reused on later runs.

mod borders;
mod countries;

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::info;

use crate::border::{ContainmentFilter, Shape};
use crate::config::Config;
use crate::models::{Feature, FeatureCollection};
use crate::overpass::{
    to_feature_collection, CachedOverpass, ConvertOptions, OverpassClient, OverpassResponse,
    ResponseCache,
};

pub use borders::{load_border, select_boundary};

/// Amenity values counted as places to eat or drink
pub const AMENITIES: &[&str] = &[
    "restaurant",
    "pub",
    "bar",
    "cafe",
    "fast_food",
    "bbq",
    "biergarten",
    "food_court",
];

pub struct SeatingService {
    config: Config,
    overpass: CachedOverpass,
}

impl SeatingService {
    /// Create the service and its data directories
    pub fn new(config: Config) -> Result<Self> {
        let client = OverpassClient::new(config.overpass_url()?, config.overpass_timeout())?;
        let cache = ResponseCache::new(config.cache_dir())?;
        std::fs::create_dir_all(config.geometry_dir())
            .with_context(|| format!("Failed to create {}", config.geometry_dir().display()))?;

        Ok(Self {
            config,
            overpass: CachedOverpass::new(client, cache),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn seatings_file(&self, id: i64) -> PathBuf {
        self.config
            .geometry_dir()
            .join(format!("seatings_{}.geojson", id))
    }

    /// Outdoor seatings inside the border of relation `id`.
    ///
    /// Returns `None` when the relation has no boundary feature.
    pub async fn get_outdoor_seating_nodes(&self, id: i64) -> Result<Option<FeatureCollection>> {
        let file = self.seatings_file(id);
        if file.exists() {
            return FeatureCollection::load_from_file(&file).map(Some);
        }

        let Some(border) = self.get_border(id).await? else {
            return Ok(None);
        };
        let shape = border
            .to_geo()
            .context("Border feature has no usable geometry")
            .and_then(|g| Shape::try_from(g).map_err(anyhow::Error::from))?;
        let bounds = shape
            .bounding_rect()
            .context("Border geometry is empty")?;

        let query = seatings_query(
            bounds.min().y,
            bounds.min().x,
            bounds.max().y,
            bounds.max().x,
        );
        let response: OverpassResponse = self.overpass.call_json(&query).await?;
        let candidates = to_feature_collection(
            &response,
            ConvertOptions {
                filter_used_refs: false,
            },
        );
        info!("Found {} candidate seatings in bbox", candidates.len());

        let filter = ContainmentFilter::with_partitioner(shape, self.config.partitioner()?)?;
        let mut seatings = retain_inside(&filter, candidates);
        for feature in &mut seatings.features {
            let name = feature.tag("name").unwrap_or("noname").to_string();
            feature.properties.insert("name".to_string(), Value::String(name));
        }

        seatings.save_to_file(&file)?;
        info!("Saved {} seatings to {}", seatings.len(), file.display());
        Ok(Some(seatings))
    }

    /// Outdoor seatings for a country given by name or relation ID
    pub async fn get_outdoor_seatings_for_country(
        &self,
        name_or_id: &str,
    ) -> Result<Option<FeatureCollection>> {
        let Some(country) = self.find_country(name_or_id).await? else {
            return Ok(None);
        };
        info!("Collecting outdoor seatings for {} ({})", country.name, country.id);
        self.get_outdoor_seating_nodes(country.id).await
    }
}

/// Keep the features inside the filter's border, in their original order
pub fn retain_inside(filter: &ContainmentFilter, collection: FeatureCollection) -> FeatureCollection {
    let with_geometry: Vec<(Option<geo::Geometry<f64>>, Feature)> = collection
        .features
        .into_iter()
        .map(|feature| (feature.to_geo(), feature))
        .collect();

    let kept = filter.filter_by(with_geometry, |(geometry, _)| geometry.as_ref());
    FeatureCollection::new(kept.into_iter().map(|(_, feature)| feature).collect())
}

/// Overpass query for outdoor seating amenities in a bbox
pub fn seatings_query(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> String {
    let amenities = AMENITIES
        .iter()
        .map(|a| format!("^{}$", a))
        .collect::<Vec<_>>()
        .join("|");
    format!(
        "[out:json];\nnode[outdoor_seating=yes][amenity~\"{}\"]({}, {}, {}, {});\nout geom;",
        amenities, min_lat, min_lon, max_lat, max_lon
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn offline_config(dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.storage.data_dir = dir.to_path_buf();
        config.overpass.url = "http://127.0.0.1:9/api/interpreter".to_string();
        config.overpass.timeout_secs = 1;
        config
    }

    pub(crate) fn seed(config: &Config, query: &str, body: serde_json::Value) {
        ResponseCache::new(config.cache_dir())
            .unwrap()
            .put(query, &body.to_string())
            .unwrap();
    }

    #[test]
    fn test_seatings_query() {
        let query = seatings_query(45.8, 5.9, 47.8, 10.5);
        assert!(query.contains("[amenity~\"^restaurant$|^pub$|^bar$|^cafe$|^fast_food$|^bbq$|^biergarten$|^food_court$\"]"));
        assert!(query.contains("(45.8, 5.9, 47.8, 10.5)"));
        assert!(query.ends_with("out geom;"));
    }

    #[tokio::test]
    async fn test_pipeline_from_cached_responses() {
        let dir = tempfile::tempdir().unwrap();
        let config = offline_config(dir.path());

        // Triangle below the diagonal: nodes 1 and 3 are inside, node 2 is not
        seed(
            &config,
            &borders::border_query(42),
            json!({ "elements": [{
                "type": "relation", "id": 42,
                "tags": { "type": "boundary", "admin_level": "2", "name": "Triangle" },
                "members": [{ "type": "way", "ref": 1, "role": "outer", "geometry": [
                    { "lat": 0.0, "lon": 0.0 }, { "lat": 0.0, "lon": 1.0 },
                    { "lat": 1.0, "lon": 1.0 }, { "lat": 0.0, "lon": 0.0 }
                ]}]
            }]}),
        );
        seed(
            &config,
            &seatings_query(0.0, 0.0, 1.0, 1.0),
            json!({ "elements": [
                { "type": "node", "id": 1, "lat": 0.2, "lon": 0.8,
                  "tags": { "amenity": "cafe", "outdoor_seating": "yes", "name": "Inside" } },
                { "type": "node", "id": 2, "lat": 0.8, "lon": 0.2,
                  "tags": { "amenity": "bar", "outdoor_seating": "yes" } },
                { "type": "node", "id": 3, "lat": 0.1, "lon": 0.9,
                  "tags": { "amenity": "pub", "outdoor_seating": "yes" } }
            ]}),
        );

        let service = SeatingService::new(config.clone()).unwrap();
        let seatings = service.get_outdoor_seating_nodes(42).await.unwrap().unwrap();

        let names: Vec<&str> = seatings
            .features
            .iter()
            .map(|f| f.properties["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Inside", "noname"]);
        assert!(dir.path().join("geometry/seatings_42.geojson").exists());
        assert!(dir.path().join("geometry/border_42.geojson").exists());

        // Second call is served from the saved file
        let again = service.get_outdoor_seating_nodes(42).await.unwrap().unwrap();
        assert_eq!(again, seatings);
    }

    #[test]
    fn test_retain_inside_drops_features_without_geometry() {
        let filter = ContainmentFilter::new(
            Shape::from(geo::Polygon::new(
                geo::LineString::from(vec![(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0), (0.0, 0.0)]),
                vec![],
            )),
            1.0,
        )
        .unwrap();
        let collection: FeatureCollection = serde_json::from_value(json!({
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "geometry": null, "properties": {} },
                { "type": "Feature", "geometry": { "type": "Polygon", "coordinates":
                    [[[0.1, 0.1], [0.2, 0.1], [0.2, 0.2], [0.1, 0.1]]] }, "properties": { "n": 1 } },
                { "type": "Feature", "geometry": { "type": "Point", "coordinates": [3.0, 3.0] },
                  "properties": { "n": 2 } }
            ]
        }))
        .unwrap();

        let kept = retain_inside(&filter, collection);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept.features[0].properties["n"], 1);
    }
}
