use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use super::SeatingService;
use crate::models::{name_from_tags, AdminCenter, Country};
use crate::overpass::{Element, OverpassResponse};

pub const COUNTRIES_QUERY: &str = "[out:json];\nrel[admin_level=2];\nout;";

pub fn node_query(id: i64) -> String {
    format!("[out:json];\nnode({});\nout;", id)
}

impl SeatingService {
    /// All countries with a resolvable admin centre
    pub async fn get_countries(&self) -> Result<Vec<Country>> {
        let file = self.config.countries_file();
        if file.exists() {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            return serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", file.display()));
        }

        let response: OverpassResponse = self.overpass.call_json(COUNTRIES_QUERY).await?;
        let relations: Vec<&Element> = response
            .elements
            .iter()
            .filter(|el| matches!(el, Element::Relation { .. }))
            .collect();
        info!("Resolving admin centres of {} countries...", relations.len());

        let pb = ProgressBar::new(relations.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")?
                .progress_chars("#>-"),
        );

        let mut countries = Vec::new();
        for element in relations {
            pb.inc(1);
            let Element::Relation { id, members, tags } = element else {
                continue;
            };
            let name = name_from_tags(tags);
            let centre_ref = members
                .iter()
                .filter(|m| m.role == "admin_centre")
                .map(|m| m.reference)
                .last();

            let Some(admin_center) = self.get_city_center(centre_ref).await? else {
                warn!("Admin center not found for {} ({})", name, id);
                continue;
            };

            countries.push(Country {
                id: *id,
                name,
                admin_center,
            });
        }
        pb.finish_and_clear();

        std::fs::write(&file, serde_json::to_string_pretty(&countries)?)
            .with_context(|| format!("Failed to write {}", file.display()))?;
        info!("Saved {} countries to {}", countries.len(), file.display());
        Ok(countries)
    }

    /// Location and name of the node `id`, if it exists
    pub async fn get_city_center(&self, id: Option<i64>) -> Result<Option<AdminCenter>> {
        let Some(id) = id else {
            return Ok(None);
        };

        let response: OverpassResponse = self.overpass.call_json(&node_query(id)).await?;
        let centre = response.elements.into_iter().find_map(|el| match el {
            Element::Node { lat, lon, tags, .. } => Some(AdminCenter {
                lat,
                lon,
                name: name_from_tags(&tags),
            }),
            _ => None,
        });
        Ok(centre)
    }

    /// Look up a country by name or relation ID. The last match wins.
    pub async fn find_country(&self, name_or_id: &str) -> Result<Option<Country>> {
        let countries = self.get_countries().await?;
        Ok(countries
            .into_iter()
            .filter(|c| c.matches(name_or_id))
            .last())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seatings::tests::{offline_config, seed};
    use serde_json::json;

    #[tokio::test]
    async fn test_countries_from_cached_responses() {
        let dir = tempfile::tempdir().unwrap();
        let config = offline_config(dir.path());

        seed(
            &config,
            COUNTRIES_QUERY,
            json!({ "elements": [
                { "type": "relation", "id": 51701,
                  "tags": { "admin_level": "2", "name": "Schweiz", "name:en": "Switzerland" },
                  "members": [
                      { "type": "way", "ref": 5, "role": "outer" },
                      { "type": "node", "ref": 1644975, "role": "admin_centre" }
                  ] },
                { "type": "relation", "id": 2, "tags": { "name": "Nowhere" }, "members": [] }
            ]}),
        );
        seed(
            &config,
            &node_query(1644975),
            json!({ "elements": [
                { "type": "node", "id": 1644975, "lat": 46.95, "lon": 7.45, "tags": { "name": "Bern" } }
            ]}),
        );

        let service = SeatingService::new(config).unwrap();
        let countries = service.get_countries().await.unwrap();

        assert_eq!(countries.len(), 1);
        assert_eq!(countries[0].name, "Switzerland");
        assert_eq!(countries[0].admin_center.name, "Bern");
        assert!(dir.path().join("countries.json").exists());

        let found = service.find_country("51701").await.unwrap().unwrap();
        assert_eq!(found.name, "Switzerland");
        assert!(service.find_country("Atlantis").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_country_prefers_last_match() {
        let dir = tempfile::tempdir().unwrap();
        let config = offline_config(dir.path());
        let centre = json!({ "lat": 0.0, "lon": 0.0, "name": "Capital" });
        std::fs::write(
            config.countries_file(),
            json!([
                { "id": 1, "name": "Congo", "admin_center": centre },
                { "id": 2, "name": "Congo", "admin_center": centre }
            ])
            .to_string(),
        )
        .unwrap();

        let service = SeatingService::new(config).unwrap();
        let found = service.find_country("Congo").await.unwrap().unwrap();
        assert_eq!(found.id, 2);
    }

    #[tokio::test]
    async fn test_no_centre_id() {
        let dir = tempfile::tempdir().unwrap();
        let service = SeatingService::new(offline_config(dir.path())).unwrap();
        assert!(service.get_city_center(None).await.unwrap().is_none());
    }
}
