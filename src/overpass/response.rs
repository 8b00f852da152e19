//! Overpass API JSON response (`[out:json]`).

use std::collections::BTreeMap;

use geo_types::Coord;
use serde::Deserialize;

pub type Tags = BTreeMap<String, String>;

#[derive(Debug, Clone, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<Element>,
}

/// A vertex as emitted by `out geom`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl From<LatLon> for Coord<f64> {
    fn from(v: LatLon) -> Self {
        Coord { x: v.lon, y: v.lat }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Node {
        id: i64,
        lat: f64,
        lon: f64,
        #[serde(default)]
        tags: Tags,
    },
    Way {
        id: i64,
        #[serde(default)]
        nodes: Vec<i64>,
        /// Present with `out geom`; vertices outside a bbox filter are null
        #[serde(default)]
        geometry: Option<Vec<Option<LatLon>>>,
        #[serde(default)]
        tags: Tags,
    },
    Relation {
        id: i64,
        #[serde(default)]
        members: Vec<Member>,
        #[serde(default)]
        tags: Tags,
    },
    /// `area`, `count` and other element types the pipeline ignores
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "ref")]
    pub reference: i64,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub geometry: Option<Vec<Option<LatLon>>>,
}

impl Element {
    pub fn id(&self) -> Option<i64> {
        match self {
            Element::Node { id, .. } | Element::Way { id, .. } | Element::Relation { id, .. } => {
                Some(*id)
            }
            Element::Other => None,
        }
    }

    pub fn tags(&self) -> Option<&Tags> {
        match self {
            Element::Node { tags, .. } | Element::Way { tags, .. } | Element::Relation { tags, .. } => {
                Some(tags)
            }
            Element::Other => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Element::Node { .. } => "node",
            Element::Way { .. } => "way",
            Element::Relation { .. } => "relation",
            Element::Other => "other",
        }
    }
}

/// Coordinates of an `out geom` vertex list, skipping null vertices
pub fn coords(geometry: &[Option<LatLon>]) -> Vec<Coord<f64>> {
    geometry.iter().flatten().map(|v| Coord::from(*v)).collect()
}
