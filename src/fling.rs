//! Momentum scrolling after a fast release.
//!
//! Uses the closed-form exponential decay, so the distance covered depends
//! only on elapsed time and never on how often `tick` is called.

use web_time::Instant;

use crate::config::FlingConfig;

/// Per-axis decaying fling.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Axis {
    velocity: f64,
    emitted: i64,
}

impl Axis {
    fn new(velocity: f32) -> Self {
        Self {
            velocity: velocity as f64,
            emitted: 0,
        }
    }

    /// Whole-pixel offset at `t` seconds minus what was already emitted.
    fn step(&mut self, decay: f64, tau: f64) -> i32 {
        let offset = (self.velocity * tau * (1.0 - decay)).trunc() as i64;
        let delta = offset - self.emitted;
        self.emitted = offset;
        delta.clamp(i32::MIN as i64, i32::MAX as i64) as i32
    }

    fn speed(&self, decay: f64) -> f64 {
        (self.velocity * decay).abs()
    }
}

/// Turns a release velocity into a stream of scroll deltas.
#[derive(Debug, Clone)]
pub struct FlingAnimator {
    config: FlingConfig,
    started: Option<Instant>,
    x: Axis,
    y: Axis,
}

impl FlingAnimator {
    pub fn new(config: FlingConfig) -> Self {
        Self {
            config,
            started: None,
            x: Axis::new(0.0),
            y: Axis::new(0.0),
        }
    }

    /// Start (or restart) a fling with velocity in px/s.
    pub fn start(&mut self, vx: f32, vy: f32, now: Instant) {
        self.x = Axis::new(vx);
        self.y = Axis::new(vy);
        self.started = Some(now);
        log::debug!("Fling started at ({:.0}, {:.0}) px/s", vx, vy);
    }

    pub fn stop(&mut self) {
        if self.started.take().is_some() {
            log::trace!("Fling stopped");
        }
    }

    pub fn is_active(&self) -> bool {
        self.started.is_some()
    }

    fn time_constant_secs(&self) -> f64 {
        let ms = self.config.time_constant_ms as f64;
        if ms.is_finite() && ms > 0.0 { ms / 1000.0 } else { 0.325 }
    }

    /// Advance to `now`. Returns the whole-pixel scroll delta since the
    /// previous tick, or `None` when no fling is running. The fling stops
    /// itself once both axes have slowed below the settle velocity.
    pub fn tick(&mut self, now: Instant) -> Option<(i32, i32)> {
        let started = self.started?;
        let tau = self.time_constant_secs();
        let t = now.saturating_duration_since(started).as_secs_f64();
        let decay = (-t / tau).exp();

        let dx = self.x.step(decay, tau);
        let dy = self.y.step(decay, tau);

        let settle = self.config.settle_velocity as f64;
        if self.x.speed(decay) < settle && self.y.speed(decay) < settle {
            log::trace!("Fling settled after {:.3}s", t);
            self.started = None;
        }
        Some((dx, dy))
    }

    /// Current speed per axis in px/s.
    pub fn velocity(&self, now: Instant) -> (f32, f32) {
        let Some(started) = self.started else {
            return (0.0, 0.0);
        };
        let t = now.saturating_duration_since(started).as_secs_f64();
        let decay = (-t / self.time_constant_secs()).exp();
        ((self.x.velocity * decay) as f32, (self.y.velocity * decay) as f32)
    }
}

impl Default for FlingAnimator {
    fn default() -> Self {
        Self::new(FlingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_idle_tick_is_none() {
        let mut fling = FlingAnimator::default();
        assert!(!fling.is_active());
        assert_eq!(fling.tick(Instant::now()), None);
    }

    #[test]
    fn test_deltas_follow_velocity_sign() {
        let t0 = Instant::now();
        let mut fling = FlingAnimator::default();
        fling.start(2000.0, -1000.0, t0);
        let (dx, dy) = fling.tick(t0 + ms(16)).unwrap();
        assert!(dx > 0);
        assert!(dy < 0);
        assert!(fling.is_active());
    }

    #[test]
    fn test_total_distance_is_frame_rate_independent() {
        let t0 = Instant::now();
        let mut coarse = FlingAnimator::default();
        let mut fine = FlingAnimator::default();
        coarse.start(3000.0, 0.0, t0);
        fine.start(3000.0, 0.0, t0);

        let mut coarse_total = 0;
        for i in 1..=10u64 {
            coarse_total += coarse.tick(t0 + ms(i * 50)).map_or(0, |d| d.0);
        }
        let mut fine_total = 0;
        for i in 1..=100u64 {
            fine_total += fine.tick(t0 + ms(i * 5)).map_or(0, |d| d.0);
        }
        assert_eq!(coarse_total, fine_total);
    }

    #[test]
    fn test_total_distance_approaches_v_tau() {
        let t0 = Instant::now();
        let mut fling = FlingAnimator::default();
        fling.start(1000.0, 0.0, t0);
        let mut total = 0;
        let mut frame = 1u64;
        while fling.is_active() && frame < 1000 {
            total += fling.tick(t0 + ms(frame * 16)).map_or(0, |d| d.0);
            frame += 1;
        }
        assert!(!fling.is_active());
        // v0 * tau = 325 px; stops once speed < 20 px/s, i.e. within 7 px
        assert!((318..=325).contains(&total), "total {}", total);
    }

    #[test]
    fn test_slow_start_settles_on_first_tick() {
        let t0 = Instant::now();
        let mut fling = FlingAnimator::default();
        fling.start(10.0, 5.0, t0);
        assert_eq!(fling.tick(t0 + ms(16)), Some((0, 0)));
        assert!(!fling.is_active());
    }

    #[test]
    fn test_stop() {
        let t0 = Instant::now();
        let mut fling = FlingAnimator::default();
        fling.start(1000.0, 1000.0, t0);
        fling.stop();
        assert!(!fling.is_active());
        assert_eq!(fling.tick(t0 + ms(16)), None);
        assert_eq!(fling.velocity(t0), (0.0, 0.0));
    }
}
