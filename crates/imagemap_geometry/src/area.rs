//! Tappable map regions.
//!
//! An [`Area`] pairs the shared metadata every hotspot carries (id, name,
//! free-form attributes, optional decoration) with a kind-specific
//! [`AreaShape`]. All coordinates are in natural-image pixels.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{Bounds, GeometryError, Point, Polygon};

/// Identifier of an area. Valid ids are nonzero.
pub type AreaId = u32;

/// A small image drawn at an area's anchor, referenced by image-cache key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoration {
    pub key: String,
}

impl Decoration {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// The geometric part of an area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaShape {
    /// Axis-aligned rectangle given by its edges.
    Rect {
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
    },
    /// Circle given by centre and radius.
    Circle { center: Point, radius: f32 },
    /// Closed polygon.
    Polygon(Polygon),
}

impl AreaShape {
    /// Hit test in natural-image coordinates.
    ///
    /// Rect and Circle use strict comparisons, so their boundary is outside.
    pub fn contains(&self, point: &Point) -> bool {
        match self {
            AreaShape::Rect {
                left,
                top,
                right,
                bottom,
            } => point.x > *left && point.x < *right && point.y > *top && point.y < *bottom,
            AreaShape::Circle { center, radius } => center.distance_to(point) < *radius,
            AreaShape::Polygon(poly) => poly.contains(point),
        }
    }

    /// The point bubbles and decorations hang from: top-left for rects,
    /// the centre for circles, the centroid for polygons.
    pub fn anchor(&self) -> Point {
        match self {
            AreaShape::Rect { left, top, .. } => Point::new(*left, *top),
            AreaShape::Circle { center, .. } => *center,
            AreaShape::Polygon(poly) => poly.centroid(),
        }
    }

    pub fn bounding_box(&self) -> Bounds {
        match self {
            AreaShape::Rect {
                left,
                top,
                right,
                bottom,
            } => Bounds::new(*left, *top, right - left, bottom - top),
            AreaShape::Circle { center, radius } => Bounds::new(
                center.x - radius,
                center.y - radius,
                radius * 2.0,
                radius * 2.0,
            ),
            AreaShape::Polygon(poly) => poly.bounding_box(),
        }
    }

    /// Short name of the shape kind, matching the markup keyword.
    pub fn kind_name(&self) -> &'static str {
        match self {
            AreaShape::Rect { .. } => "rect",
            AreaShape::Circle { .. } => "circle",
            AreaShape::Polygon(_) => "poly",
        }
    }
}

/// A tappable region of the image.
///
/// Geometry and identity are fixed at construction; only attributes and the
/// decoration can change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    id: AreaId,
    name: Option<String>,
    #[serde(default)]
    attributes: HashMap<String, String>,
    shape: AreaShape,
    #[serde(default)]
    decoration: Option<Decoration>,
}

impl Area {
    /// Create a new area from an already validated shape.
    pub fn new(id: AreaId, shape: AreaShape) -> Self {
        Self {
            id,
            name: None,
            attributes: HashMap::new(),
            shape,
            decoration: None,
        }
    }

    /// Rectangle from its four edges.
    pub fn rect(id: AreaId, left: f32, top: f32, right: f32, bottom: f32) -> Result<Self, GeometryError> {
        for value in [left, top, right, bottom] {
            check_finite(value)?;
        }
        Ok(Self::new(
            id,
            AreaShape::Rect {
                left,
                top,
                right,
                bottom,
            },
        ))
    }

    /// Circle from centre and radius.
    pub fn circle(id: AreaId, x: f32, y: f32, radius: f32) -> Result<Self, GeometryError> {
        check_finite(x)?;
        check_finite(y)?;
        check_finite(radius)?;
        if radius <= 0.0 {
            return Err(GeometryError::InvalidRadius { radius });
        }
        Ok(Self::new(
            id,
            AreaShape::Circle {
                center: Point::new(x, y),
                radius,
            },
        ))
    }

    /// Polygon from an ordered vertex list.
    pub fn polygon(id: AreaId, vertices: Vec<Point>) -> Result<Self, GeometryError> {
        Ok(Self::new(id, AreaShape::Polygon(Polygon::new(vertices)?)))
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add an attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> AreaId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn shape(&self) -> &AreaShape {
        &self.shape
    }

    pub fn anchor(&self) -> Point {
        self.shape.anchor()
    }

    /// Hit test in natural-image coordinates.
    pub fn is_in_area(&self, x: f32, y: f32) -> bool {
        self.shape.contains(&Point::new(x, y))
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn decoration(&self) -> Option<&Decoration> {
        self.decoration.as_ref()
    }

    pub fn set_decoration(&mut self, decoration: Option<Decoration>) {
        self.decoration = decoration;
    }
}

fn check_finite(value: f32) -> Result<(), GeometryError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(GeometryError::NonFinite { value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_open_boundary() {
        let area = Area::rect(5, 10.0, 10.0, 50.0, 50.0).unwrap();
        assert!(area.is_in_area(30.0, 30.0));
        assert!(!area.is_in_area(5.0, 5.0));
        assert!(!area.is_in_area(50.0, 30.0));
        assert!(!area.is_in_area(30.0, 10.0));
        assert_eq!(area.anchor(), Point::new(10.0, 10.0));
    }

    #[test]
    fn test_circle_strict_radius() {
        let area = Area::circle(7, 100.0, 100.0, 10.0).unwrap();
        assert!(area.is_in_area(100.0, 100.0));
        assert!(area.is_in_area(107.0, 107.0));
        assert!(!area.is_in_area(110.0, 100.0));
        assert!(!area.is_in_area(108.0, 108.0));
        assert_eq!(area.anchor(), Point::new(100.0, 100.0));
    }

    #[test]
    fn test_circle_rejects_bad_radius() {
        assert_eq!(
            Area::circle(1, 0.0, 0.0, 0.0).unwrap_err(),
            GeometryError::InvalidRadius { radius: 0.0 }
        );
        assert!(Area::circle(1, 0.0, 0.0, -3.0).is_err());
    }

    #[test]
    fn test_polygon_anchor_is_centroid() {
        let area = Area::polygon(
            9,
            vec![
                Point::new(0.0, 0.0),
                Point::new(4.0, 0.0),
                Point::new(4.0, 4.0),
                Point::new(0.0, 4.0),
            ],
        )
        .unwrap();
        assert_eq!(area.anchor(), Point::new(2.0, 2.0));
        assert!(area.is_in_area(1.0, 1.0));
        assert_eq!(area.shape().kind_name(), "poly");
    }

    #[test]
    fn test_is_in_area_is_deterministic() {
        let area = Area::circle(3, 0.0, 0.0, 5.0).unwrap();
        let first: Vec<bool> = (0..20).map(|i| area.is_in_area(i as f32 * 0.5, 1.0)).collect();
        let second: Vec<bool> = (0..20).map(|i| area.is_in_area(i as f32 * 0.5, 1.0)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_attributes_and_decoration() {
        let mut area = Area::rect(2, 0.0, 0.0, 1.0, 1.0)
            .unwrap()
            .with_name("Ohio")
            .with_attribute("capital", "Columbus");
        assert_eq!(area.name(), Some("Ohio"));
        assert_eq!(area.attribute("capital"), Some("Columbus"));
        assert_eq!(area.attribute("missing"), None);

        area.set_attribute("capital", "Cbus");
        assert_eq!(area.attribute("capital"), Some("Cbus"));

        assert!(area.decoration().is_none());
        area.set_decoration(Some(Decoration::new("pin")));
        assert_eq!(area.decoration().map(|d| d.key.as_str()), Some("pin"));
    }

    #[test]
    fn test_bounding_box() {
        let circle = Area::circle(1, 10.0, 10.0, 2.0).unwrap();
        assert_eq!(circle.shape().bounding_box(), Bounds::new(8.0, 8.0, 4.0, 4.0));
    }
}
