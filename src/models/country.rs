//! Countries and their administrative centres.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Capital or other administrative centre of a country
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminCenter {
    pub lat: f64,
    pub lon: f64,
    pub name: String,
}

/// A country (OSM relation with admin_level=2)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    /// OSM relation ID
    pub id: i64,
    pub name: String,
    pub admin_center: AdminCenter,
}

impl Country {
    /// Match by display name or by relation ID written as a number
    pub fn matches(&self, name_or_id: &str) -> bool {
        self.name == name_or_id
            || name_or_id
                .trim()
                .parse::<i64>()
                .map(|id| id == self.id)
                .unwrap_or(false)
    }
}

/// Preferred display name of an OSM object.
///
/// International name first, then English, then the local name.
pub fn name_from_tags(tags: &BTreeMap<String, String>) -> String {
    ["int_name", "name:en", "name"]
        .iter()
        .find_map(|key| tags.get(*key))
        .cloned()
        .unwrap_or_else(|| "noname".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_name_precedence() {
        assert_eq!(
            name_from_tags(&tags(&[("name", "Schweiz"), ("name:en", "Switzerland")])),
            "Switzerland"
        );
        assert_eq!(
            name_from_tags(&tags(&[("name:en", "Switzerland"), ("int_name", "Helvetia")])),
            "Helvetia"
        );
        assert_eq!(name_from_tags(&tags(&[("name", "Schweiz")])), "Schweiz");
        assert_eq!(name_from_tags(&tags(&[])), "noname");
    }

    #[test]
    fn test_matches_name_or_id() {
        let country = Country {
            id: 51701,
            name: "Switzerland".to_string(),
            admin_center: AdminCenter {
                lat: 46.9,
                lon: 7.4,
                name: "Bern".to_string(),
            },
        };
        assert!(country.matches("Switzerland"));
        assert!(country.matches("51701"));
        assert!(!country.matches("switzerland"));
        assert!(!country.matches("51702"));
    }
}
