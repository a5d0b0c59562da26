//! imagemap - a pannable, zoomable image with tappable hotspots
//!
//! The crate is the platform-independent core of an image map widget: it
//! turns raw multi-pointer touch input into scrolling, pinch zoom, flings
//! and taps, keeps the scaled image inside its size and scroll bounds,
//! resolves taps to areas (rectangles, circles, polygons) or popup bubbles,
//! and describes each frame to a host-supplied painter.
//!
//! Start with [`ImageMap`].

pub mod bubble;
pub mod config;
pub mod constants;
pub mod demo;
pub mod error;
pub mod fling;
pub mod gesture;
pub mod image_cache;
pub mod image_map;
pub mod registry;
pub mod render;
pub mod viewport;

pub use bubble::{Bubble, BubbleAnchor, BubbleOverlay, TextBounds, TextMeasure, TextMetrics};
pub use config::{LogLevel, ViewerConfig};
pub use error::{AreaError, ConfigError};
pub use fling::FlingAnimator;
pub use gesture::{GestureAction, GestureRecognizer, PointerId, TouchEvent};
pub use hit_test::{Hit, HitTester};
pub use image_cache::ImageCache;
pub use image_map::{ClickEvent, HandlerId, ImageMap, MapEvent};
pub use registry::{AreaDefinition, AreaRegistry};
pub use render::{Fill, Painter};
pub use viewport::ViewportModel;

pub use imagemap_geometry::{Area, AreaId, AreaShape, Bounds, Decoration, GeometryError, Point, Polygon};
