//! Closed polygons with precomputed area and centroid.

use serde::{Deserialize, Serialize};

use crate::{Bounds, GeometryError, Point};

/// A closed polygon. The last vertex implicitly connects back to the first.
///
/// Area, centroid and bounding box are computed once at construction; the
/// vertex list cannot change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct Polygon {
    vertices: Vec<Point>,
    area: f32,
    centroid: Point,
    bounds: Bounds,
}

impl Polygon {
    /// Build a polygon from an ordered vertex list (either winding).
    pub fn new(vertices: Vec<Point>) -> Result<Self, GeometryError> {
        if vertices.len() < 3 {
            return Err(GeometryError::TooFewVertices {
                count: vertices.len(),
            });
        }
        if let Some(bad) = vertices
            .iter()
            .flat_map(|p| [p.x, p.y])
            .find(|v| !v.is_finite())
        {
            return Err(GeometryError::NonFinite { value: bad });
        }

        let signed = signed_area(&vertices);
        if signed == 0.0 {
            return Err(GeometryError::ZeroArea);
        }

        let centroid = centroid(&vertices, signed);
        let bounds = bounding_box(&vertices);

        Ok(Self {
            vertices,
            area: signed.abs() as f32,
            centroid,
            bounds,
        })
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Enclosed area, always non-negative.
    pub fn area(&self) -> f32 {
        self.area
    }

    pub fn centroid(&self) -> Point {
        self.centroid
    }

    pub fn bounding_box(&self) -> Bounds {
        self.bounds
    }

    /// Even-odd ray casting (W. R. Franklin's PNPOLY).
    pub fn contains(&self, point: &Point) -> bool {
        // Cheap reject before walking the edges
        let b = &self.bounds;
        if point.x < b.x || point.x > b.right() || point.y < b.y || point.y > b.bottom() {
            return false;
        }

        let mut inside = false;
        let n = self.vertices.len();

        let mut j = n - 1;
        for i in 0..n {
            let vi = &self.vertices[i];
            let vj = &self.vertices[j];

            if ((vi.y > point.y) != (vj.y > point.y))
                && (point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x)
            {
                inside = !inside;
            }
            j = i;
        }

        inside
    }
}

impl TryFrom<Vec<Point>> for Polygon {
    type Error = GeometryError;

    fn try_from(vertices: Vec<Point>) -> Result<Self, Self::Error> {
        Polygon::new(vertices)
    }
}

impl From<Polygon> for Vec<Point> {
    fn from(polygon: Polygon) -> Self {
        polygon.vertices
    }
}

/// Shoelace sum, halved. Positive for one winding, negative for the other.
fn signed_area(vertices: &[Point]) -> f64 {
    let n = vertices.len();
    let mut sum = 0.0f64;
    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        sum += f64::from(a.x) * f64::from(b.y) - f64::from(a.y) * f64::from(b.x);
    }
    sum * 0.5
}

/// Centroid of a simple polygon. Dividing by the signed area makes the
/// result independent of winding direction.
fn centroid(vertices: &[Point], signed_area: f64) -> Point {
    let n = vertices.len();
    let mut cx = 0.0f64;
    let mut cy = 0.0f64;
    for i in 0..n {
        let (x0, y0) = (f64::from(vertices[i].x), f64::from(vertices[i].y));
        let next = vertices[(i + 1) % n];
        let (x1, y1) = (f64::from(next.x), f64::from(next.y));
        let cross = x0 * y1 - x1 * y0;
        cx += (x0 + x1) * cross;
        cy += (y0 + y1) * cross;
    }
    let denom = 6.0 * signed_area;
    Point::new((cx / denom) as f32, (cy / denom) as f32)
}

fn bounding_box(vertices: &[Point]) -> Bounds {
    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;

    for p in vertices {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    Bounds::new(min_x, min_y, max_x - min_x, max_y - min_y)
}
