//! imagemap_geometry - tappable map regions and the geometry behind them
//!
//! This crate holds the pure, dependency-light part of the image map: points,
//! boxes, polygons and the [`Area`] type whose shapes answer "is this point
//! inside me?" in natural-image coordinates.

mod area;
mod error;
mod point;
mod polygon;

pub use area::{Area, AreaId, AreaShape, Decoration};
pub use error::GeometryError;
pub use point::{Bounds, Point};
pub use polygon::Polygon;
