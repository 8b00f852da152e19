//! Areal shapes and the outcomes of clipping them against a window.

use geo::{BooleanOps, BoundingRect, Geometry, LineString, MultiPolygon, Polygon, Rect};

use super::error::{BorderError, Result};

/// A border, or a part of one, that can be partitioned.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
}

impl Shape {
    /// Bounding box, `None` for a shape without coordinates
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        match self {
            Shape::Polygon(p) => p.bounding_rect(),
            Shape::MultiPolygon(mp) => mp.bounding_rect(),
        }
    }

    /// Bounding box width and height. An empty shape measures (0, 0).
    pub fn extent(&self) -> (f64, f64) {
        self.bounding_rect()
            .map(|rect| (rect.width(), rect.height()))
            .unwrap_or((0.0, 0.0))
    }

    /// Intersect this shape with an axis-aligned window
    pub fn clip(&self, window: &Rect<f64>) -> Clip {
        let window = window.to_polygon();
        let parts = match self {
            Shape::Polygon(p) => p.intersection(&window),
            Shape::MultiPolygon(mp) => mp.intersection(&MultiPolygon::new(vec![window])),
        };
        Clip::from(parts)
    }

    /// Split into simple polygons, multipolygon parts in order
    pub fn into_polygons(self) -> Vec<Polygon<f64>> {
        match self {
            Shape::Polygon(p) => vec![p],
            Shape::MultiPolygon(mp) => mp.0,
        }
    }

    fn polygons(&self) -> &[Polygon<f64>] {
        match self {
            Shape::Polygon(p) => std::slice::from_ref(p),
            Shape::MultiPolygon(mp) => &mp.0,
        }
    }

    /// Reject rings that are not closed or carry non-finite coordinates.
    ///
    /// A polygon with an empty exterior and no holes is accepted: degenerate
    /// borders are partitioned as a single empty piece.
    pub fn validate(&self) -> Result<()> {
        for (i, polygon) in self.polygons().iter().enumerate() {
            if polygon.exterior().0.is_empty() && polygon.interiors().is_empty() {
                continue;
            }
            validate_ring(polygon.exterior(), i, "exterior")?;
            for hole in polygon.interiors() {
                validate_ring(hole, i, "interior")?;
            }
        }
        Ok(())
    }
}

fn validate_ring(ring: &LineString<f64>, polygon: usize, role: &str) -> Result<()> {
    if ring.0.len() < 4 || !ring.is_closed() {
        return Err(BorderError::InvalidGeometry(format!(
            "polygon {} has an unclosed {} ring of {} coordinates",
            polygon,
            role,
            ring.0.len()
        )));
    }
    if ring.0.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return Err(BorderError::InvalidGeometry(format!(
            "polygon {} has non-finite coordinates in its {} ring",
            polygon, role
        )));
    }
    Ok(())
}

impl From<Polygon<f64>> for Shape {
    fn from(polygon: Polygon<f64>) -> Self {
        Shape::Polygon(polygon)
    }
}

impl From<MultiPolygon<f64>> for Shape {
    fn from(multi: MultiPolygon<f64>) -> Self {
        Shape::MultiPolygon(multi)
    }
}

impl TryFrom<Geometry<f64>> for Shape {
    type Error = BorderError;

    fn try_from(geometry: Geometry<f64>) -> Result<Self> {
        match geometry {
            Geometry::Polygon(p) => Ok(Shape::Polygon(p)),
            Geometry::MultiPolygon(mp) => Ok(Shape::MultiPolygon(mp)),
            Geometry::Rect(r) => Ok(Shape::Polygon(r.to_polygon())),
            Geometry::Triangle(t) => Ok(Shape::Polygon(t.to_polygon())),
            Geometry::GeometryCollection(gc) => {
                let mut polygons = Vec::new();
                for member in gc {
                    polygons.extend(Shape::try_from(member)?.into_polygons());
                }
                Ok(Shape::MultiPolygon(MultiPolygon::new(polygons)))
            }
            other => Err(BorderError::NotAreal(geometry_kind(&other))),
        }
    }
}

/// Human readable name of a geometry variant
pub fn geometry_kind(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

/// Outcome of clipping a shape against a window.
#[derive(Debug, Clone, PartialEq)]
pub enum Clip {
    Empty,
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
    /// Heterogeneous members, decomposed one by one. Polygon clipping
    /// always yields a multipolygon; this arm covers collection inputs.
    Collection(Vec<Geometry<f64>>),
}

impl Clip {
    /// Areal parts worth partitioning further. Points, lines and empty
    /// results are clipping noise and are dropped.
    pub fn into_shapes(self) -> Vec<Shape> {
        match self {
            Clip::Empty => Vec::new(),
            Clip::Polygon(p) => vec![Shape::Polygon(p)],
            Clip::MultiPolygon(mp) => vec![Shape::MultiPolygon(mp)],
            Clip::Collection(members) => members
                .into_iter()
                .flat_map(|member| Clip::from(member).into_shapes())
                .collect(),
        }
    }
}

impl From<MultiPolygon<f64>> for Clip {
    fn from(mut parts: MultiPolygon<f64>) -> Self {
        match parts.0.len() {
            0 => Clip::Empty,
            1 => Clip::Polygon(parts.0.remove(0)),
            _ => Clip::MultiPolygon(parts),
        }
    }
}

impl From<Geometry<f64>> for Clip {
    fn from(geometry: Geometry<f64>) -> Self {
        match geometry {
            Geometry::Polygon(p) => Clip::Polygon(p),
            Geometry::MultiPolygon(mp) => Clip::from(mp),
            Geometry::GeometryCollection(gc) => Clip::Collection(gc.0),
            _ => Clip::Empty,
        }
    }
}
