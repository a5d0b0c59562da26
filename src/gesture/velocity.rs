//! Release velocity estimation.

use std::collections::VecDeque;
use std::time::Duration;

use imagemap_geometry::Point;
use web_time::Instant;

/// Keeps the recent positions of one pointer and turns them into a
/// velocity in pixels per second.
///
/// Only samples within `horizon` of the newest one are used, so a pointer
/// that stopped before lifting reports (near) zero velocity.
#[derive(Debug, Clone)]
pub struct VelocityTracker {
    samples: VecDeque<(Instant, Point)>,
    horizon: Duration,
}

impl VelocityTracker {
    pub fn new(horizon: Duration) -> Self {
        Self {
            samples: VecDeque::new(),
            horizon,
        }
    }

    pub fn reset(&mut self) {
        self.samples.clear();
    }

    pub fn add(&mut self, position: Point, now: Instant) {
        self.samples.push_back((now, position));
        while let Some((time, _)) = self.samples.front() {
            if now.saturating_duration_since(*time) > self.horizon {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    /// Velocity between the oldest and newest retained samples, each
    /// component clamped to `±max`.
    pub fn velocity(&self, max: f32) -> (f32, f32) {
        let (Some((t0, p0)), Some((t1, p1))) = (self.samples.front(), self.samples.back()) else {
            return (0.0, 0.0);
        };
        let dt = t1.saturating_duration_since(*t0).as_secs_f32();
        if dt <= 0.0 {
            return (0.0, 0.0);
        }
        let max = max.abs();
        let vx = ((p1.x - p0.x) / dt).clamp(-max, max);
        let vy = ((p1.y - p0.y) / dt).clamp(-max, max);
        (vx, vy)
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}
