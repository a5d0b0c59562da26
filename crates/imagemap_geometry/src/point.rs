use serde::{Deserialize, Serialize};

/// A 2D point. Whether it is in natural-image, content or screen space depends
/// on who hands it out.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point.
    pub fn distance_to(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Scale each axis independently.
    pub fn scaled(&self, sx: f32, sy: f32) -> Point {
        Point::new(self.x * sx, self.y * sy)
    }

    /// Translate by an offset.
    pub fn offset(&self, dx: f32, dy: f32) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

/// An axis-aligned box given by its top-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Open-interval containment: points on an edge are outside.
    pub fn contains(&self, point: &Point) -> bool {
        point.x > self.x && point.x < self.right() && point.y > self.y && point.y < self.bottom()
    }

    /// The same box moved by an offset.
    pub fn translated(&self, dx: f32, dy: f32) -> Bounds {
        Bounds::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}
