//! GeoJSON documents and their conversion to `geo` geometries.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use geo_types::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// A GeoJSON position: longitude, latitude and optional extra ordinates
pub type Position = Vec<f64>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeoJsonError {
    #[error("position needs at least two ordinates, got {0}")]
    ShortPosition(usize),
}

/// GeoJSON geometry object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJsonGeometry {
    Point { coordinates: Position },
    MultiPoint { coordinates: Vec<Position> },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    GeometryCollection { geometries: Vec<GeoJsonGeometry> },
}

/// GeoJSON feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    pub geometry: Option<GeoJsonGeometry>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub properties: Map<String, Value>,
}

/// GeoJSON feature collection
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Feature {
    pub fn new(geometry: GeoJsonGeometry, properties: Map<String, Value>) -> Self {
        Self {
            id: None,
            geometry: Some(geometry),
            properties,
        }
    }

    /// Geometry as a `geo` value, `None` for null or malformed geometry
    pub fn to_geo(&self) -> Option<Geometry<f64>> {
        self.geometry
            .as_ref()
            .and_then(|g| Geometry::<f64>::try_from(g).ok())
    }

    /// The OSM tags carried under `properties.tags`
    pub fn tags(&self) -> Option<&Map<String, Value>> {
        self.properties.get("tags").and_then(Value::as_object)
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags()?.get(key).and_then(Value::as_str)
    }
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read GeoJSON file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse GeoJSON file {}", path.display()))
    }

    /// Write as indented JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write GeoJSON file {}", path.display()))
    }
}

fn coord(position: &[f64]) -> std::result::Result<Coord<f64>, GeoJsonError> {
    match position {
        [x, y, ..] => Ok(Coord { x: *x, y: *y }),
        _ => Err(GeoJsonError::ShortPosition(position.len())),
    }
}

fn line_string(positions: &[Position]) -> std::result::Result<LineString<f64>, GeoJsonError> {
    positions
        .iter()
        .map(|p| coord(p))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map(LineString::new)
}

fn polygon(rings: &[Vec<Position>]) -> std::result::Result<Polygon<f64>, GeoJsonError> {
    let mut rings = rings.iter().map(|r| line_string(r));
    let exterior = rings.next().transpose()?.unwrap_or_else(|| LineString::new(vec![]));
    let interiors = rings.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(Polygon::new(exterior, interiors))
}

impl TryFrom<&GeoJsonGeometry> for Geometry<f64> {
    type Error = GeoJsonError;

    fn try_from(geometry: &GeoJsonGeometry) -> std::result::Result<Self, Self::Error> {
        Ok(match geometry {
            GeoJsonGeometry::Point { coordinates } => Geometry::Point(Point(coord(coordinates)?)),
            GeoJsonGeometry::MultiPoint { coordinates } => Geometry::MultiPoint(MultiPoint::new(
                coordinates
                    .iter()
                    .map(|p| coord(p).map(Point))
                    .collect::<std::result::Result<_, _>>()?,
            )),
            GeoJsonGeometry::LineString { coordinates } => {
                Geometry::LineString(line_string(coordinates)?)
            }
            GeoJsonGeometry::MultiLineString { coordinates } => {
                Geometry::MultiLineString(MultiLineString::new(
                    coordinates
                        .iter()
                        .map(|l| line_string(l))
                        .collect::<std::result::Result<_, _>>()?,
                ))
            }
            GeoJsonGeometry::Polygon { coordinates } => Geometry::Polygon(polygon(coordinates)?),
            GeoJsonGeometry::MultiPolygon { coordinates } => {
                Geometry::MultiPolygon(MultiPolygon::new(
                    coordinates
                        .iter()
                        .map(|p| polygon(p))
                        .collect::<std::result::Result<_, _>>()?,
                ))
            }
            GeoJsonGeometry::GeometryCollection { geometries } => {
                Geometry::GeometryCollection(GeometryCollection::new_from(
                    geometries
                        .iter()
                        .map(Geometry::<f64>::try_from)
                        .collect::<std::result::Result<_, _>>()?,
                ))
            }
        })
    }
}

fn position(c: Coord<f64>) -> Position {
    vec![c.x, c.y]
}

fn positions(line: &LineString<f64>) -> Vec<Position> {
    line.coords().map(|c| position(*c)).collect()
}

fn rings(polygon: &Polygon<f64>) -> Vec<Vec<Position>> {
    if polygon.exterior().0.is_empty() {
        return Vec::new();
    }
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(positions)
        .collect()
}

impl From<&Geometry<f64>> for GeoJsonGeometry {
    fn from(geometry: &Geometry<f64>) -> Self {
        match geometry {
            Geometry::Point(p) => GeoJsonGeometry::Point {
                coordinates: position(p.0),
            },
            Geometry::Line(l) => GeoJsonGeometry::LineString {
                coordinates: vec![position(l.start), position(l.end)],
            },
            Geometry::LineString(l) => GeoJsonGeometry::LineString {
                coordinates: positions(l),
            },
            Geometry::Polygon(p) => GeoJsonGeometry::Polygon {
                coordinates: rings(p),
            },
            Geometry::MultiPoint(mp) => GeoJsonGeometry::MultiPoint {
                coordinates: mp.iter().map(|p| position(p.0)).collect(),
            },
            Geometry::MultiLineString(ml) => GeoJsonGeometry::MultiLineString {
                coordinates: ml.iter().map(positions).collect(),
            },
            Geometry::MultiPolygon(mp) => GeoJsonGeometry::MultiPolygon {
                coordinates: mp.iter().map(rings).collect(),
            },
            Geometry::GeometryCollection(gc) => GeoJsonGeometry::GeometryCollection {
                geometries: gc.iter().map(GeoJsonGeometry::from).collect(),
            },
            Geometry::Rect(r) => GeoJsonGeometry::Polygon {
                coordinates: rings(&r.to_polygon()),
            },
            Geometry::Triangle(t) => GeoJsonGeometry::Polygon {
                coordinates: rings(&t.to_polygon()),
            },
        }
    }
}

impl From<Polygon<f64>> for GeoJsonGeometry {
    fn from(polygon: Polygon<f64>) -> Self {
        GeoJsonGeometry::from(&Geometry::Polygon(polygon))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_feature_collection() {
        let doc = json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [8.5, 47.4] },
                    "properties": { "tags": { "amenity": "cafe", "name": "Kafi" } }
                },
                {
                    "type": "Feature",
                    "geometry": null,
                    "properties": null
                }
            ]
        });

        let fc: FeatureCollection = serde_json::from_value(doc).unwrap();
        assert_eq!(fc.len(), 2);
        assert_eq!(fc.features[0].tag("name"), Some("Kafi"));
        assert_eq!(
            fc.features[0].to_geo(),
            Some(Geometry::Point(Point::new(8.5, 47.4)))
        );
        assert!(fc.features[1].to_geo().is_none());
        assert!(fc.features[1].properties.is_empty());
    }

    #[test]
    fn test_polygon_with_hole_to_geo() {
        let geometry: GeoJsonGeometry = serde_json::from_value(json!({
            "type": "Polygon",
            "coordinates": [
                [[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0], [0.0, 0.0]],
                [[1.0, 1.0], [2.0, 1.0], [2.0, 2.0], [1.0, 1.0]]
            ]
        }))
        .unwrap();

        match Geometry::<f64>::try_from(&geometry).unwrap() {
            Geometry::Polygon(p) => {
                assert_eq!(p.exterior().0.len(), 5);
                assert_eq!(p.interiors().len(), 1);
            }
            other => panic!("expected polygon, got {:?}", other),
        }
    }

    #[test]
    fn test_altitude_is_ignored() {
        let geometry = GeoJsonGeometry::Point {
            coordinates: vec![1.0, 2.0, 300.0],
        };
        assert_eq!(
            Geometry::<f64>::try_from(&geometry).unwrap(),
            Geometry::Point(Point::new(1.0, 2.0))
        );
    }

    #[test]
    fn test_short_position_rejected() {
        let geometry = GeoJsonGeometry::LineString {
            coordinates: vec![vec![1.0, 2.0], vec![3.0]],
        };
        assert_eq!(
            Geometry::<f64>::try_from(&geometry),
            Err(GeoJsonError::ShortPosition(1))
        );
    }

    #[test]
    fn test_serialize_uses_type_tags() {
        let feature = Feature::new(
            GeoJsonGeometry::Point {
                coordinates: vec![1.0, 2.0],
            },
            Map::new(),
        );
        let value = serde_json::to_value(FeatureCollection::new(vec![feature])).unwrap();

        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"][0]["type"], "Feature");
        assert_eq!(value["features"][0]["geometry"]["type"], "Point");
        assert!(value["features"][0].get("id").is_none());
    }

    #[test]
    fn test_multipolygon_from_geo() {
        let mp = MultiPolygon::new(vec![Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]),
            vec![],
        )]);
        match GeoJsonGeometry::from(&Geometry::MultiPolygon(mp)) {
            GeoJsonGeometry::MultiPolygon { coordinates } => {
                assert_eq!(coordinates.len(), 1);
                assert_eq!(coordinates[0][0].len(), 4);
                assert_eq!(coordinates[0][0][0], coordinates[0][0][3]);
            }
            other => panic!("expected multipolygon, got {:?}", other),
        }
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.geojson");
        let fc = FeatureCollection::new(vec![Feature::new(
            GeoJsonGeometry::Point {
                coordinates: vec![1.0, 2.0],
            },
            Map::new(),
        )]);

        fc.save_to_file(&path).unwrap();
        assert_eq!(FeatureCollection::load_from_file(&path).unwrap(), fc);
    }
}
