//! Conversion of Overpass elements into GeoJSON features.

use geo::{Contains, Coord, Geometry, LineString, MultiPolygon, Point, Polygon};
use hashbrown::{HashMap, HashSet};
use serde_json::{json, Map, Value};
use tracing::debug;

use super::response::{coords, Element, LatLon, Member, OverpassResponse, Tags};
use super::rings::stitch_rings;
use crate::models::{Feature, FeatureCollection, GeoJsonGeometry};

#[derive(Debug, Clone, Copy)]
pub struct ConvertOptions {
    /// Skip nodes and ways that only serve as parts of other elements
    pub filter_used_refs: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            filter_used_refs: true,
        }
    }
}

/// Convert a response into a feature collection, in element order.
///
/// Elements whose geometry cannot be built are skipped.
pub fn to_feature_collection(
    response: &OverpassResponse,
    options: ConvertOptions,
) -> FeatureCollection {
    let way_geometry: HashMap<i64, &[Option<LatLon>]> = response
        .elements
        .iter()
        .filter_map(|el| match el {
            Element::Way {
                id,
                geometry: Some(g),
                ..
            } => Some((*id, g.as_slice())),
            _ => None,
        })
        .collect();

    let used = if options.filter_used_refs {
        used_refs(&response.elements)
    } else {
        HashSet::new()
    };

    let mut features = Vec::new();
    let mut skipped = 0usize;

    for element in &response.elements {
        let key = (element.kind(), element.id().unwrap_or_default());
        if used.contains(&key) {
            continue;
        }

        let geometry = match element {
            Element::Node { lat, lon, .. } => Some(Geometry::Point(Point::new(*lon, *lat))),
            Element::Way { geometry, tags, .. } => geometry
                .as_deref()
                .and_then(|g| way_to_geometry(coords(g), tags)),
            Element::Relation { members, .. } => relation_to_geometry(members, &way_geometry),
            Element::Other => continue,
        };

        let Some(geometry) = geometry else {
            skipped += 1;
            continue;
        };

        features.push(Feature::new(
            GeoJsonGeometry::from(&geometry),
            properties(element),
        ));
    }

    if skipped > 0 {
        debug!("Skipped {} elements without usable geometry", skipped);
    }

    FeatureCollection::new(features)
}

fn properties(element: &Element) -> Map<String, Value> {
    let mut props = Map::new();
    props.insert("type".to_string(), json!(element.kind()));
    if let Some(id) = element.id() {
        props.insert("id".to_string(), json!(id));
    }
    if let Some(tags) = element.tags() {
        props.insert("tags".to_string(), json!(tags));
    }
    props
}

/// Nodes referenced by ways and ways or nodes referenced by relations
fn used_refs(elements: &[Element]) -> HashSet<(&'static str, i64)> {
    let mut used = HashSet::new();
    for element in elements {
        match element {
            Element::Way { nodes, .. } => {
                used.extend(nodes.iter().map(|n| ("node", *n)));
            }
            Element::Relation { members, .. } => {
                for member in members {
                    match member.kind.as_str() {
                        "node" => used.insert(("node", member.reference)),
                        "way" => used.insert(("way", member.reference)),
                        _ => false,
                    };
                }
            }
            _ => {}
        }
    }
    used
}

/// Closed ways become polygons unless tagged `area=no`
fn way_to_geometry(ring: Vec<Coord<f64>>, tags: &Tags) -> Option<Geometry<f64>> {
    let closed = ring.len() >= 4 && ring.first() == ring.last();
    let not_area = tags.get("area").map(|v| v == "no").unwrap_or(false);

    if closed && !not_area {
        Some(Geometry::Polygon(Polygon::new(LineString::new(ring), vec![])))
    } else if ring.len() >= 2 {
        Some(Geometry::LineString(LineString::new(ring)))
    } else {
        None
    }
}

fn member_coords(
    member: &Member,
    way_geometry: &HashMap<i64, &[Option<LatLon>]>,
) -> Option<Vec<Coord<f64>>> {
    if member.kind != "way" {
        return None;
    }
    match &member.geometry {
        Some(g) => Some(coords(g)),
        None => way_geometry.get(&member.reference).map(|g| coords(g)),
    }
}

/// Build an areal geometry from outer and inner member ways
fn relation_to_geometry(
    members: &[Member],
    way_geometry: &HashMap<i64, &[Option<LatLon>]>,
) -> Option<Geometry<f64>> {
    let mut outer = Vec::new();
    let mut inner = Vec::new();

    for member in members {
        let Some(segment) = member_coords(member, way_geometry) else {
            continue;
        };
        match member.role.as_str() {
            "outer" | "" => outer.push(segment),
            "inner" => inner.push(segment),
            _ => {}
        }
    }

    let mut polygons: Vec<Polygon<f64>> = stitch_rings(outer)
        .into_iter()
        .map(|ring| Polygon::new(ring, vec![]))
        .collect();

    for hole in stitch_rings(inner) {
        let Some(probe) = hole.0.first().copied() else {
            continue;
        };
        if let Some(owner) = polygons
            .iter_mut()
            .find(|p| p.contains(&Point::from(probe)))
        {
            owner.interiors_push(hole);
        }
    }

    match polygons.len() {
        0 => None,
        1 => polygons.pop().map(Geometry::Polygon),
        _ => Some(Geometry::MultiPolygon(MultiPolygon::new(polygons))),
    }
}
