//! Gesture state machine.
//!
//! Two slots, `main` and `pinch`, hold the pointers that drive gestures.
//! A lone main pointer drags (and taps or flings on release); once a second
//! pointer binds to `pinch` the pair zooms. Further contacts are tracked but
//! stay idle until a slot frees up.

use std::time::Duration;

use imagemap_geometry::Point;
use web_time::Instant;

use super::pointer::{PointerId, PointerRegistry};
use super::velocity::VelocityTracker;
use crate::config::GestureConfig;

/// What the recognizer wants done in response to input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureAction {
    /// Scroll the image by whole pixels.
    Scroll { dx: i32, dy: i32 },
    /// Grow (positive) or shrink the image width by this many pixels.
    Resize(i32),
    /// Start a fling with this velocity in px/s.
    Fling { vx: f32, vy: f32 },
    /// A tap at this screen position.
    Tap { x: f32, y: f32 },
}

/// Platform touch events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TouchEvent {
    /// First finger down. Any pointer still tracked at this point was lost
    /// without notice and is dropped.
    Down { id: PointerId, x: f32, y: f32 },
    /// Additional finger down.
    PointerDown { id: PointerId, x: f32, y: f32 },
    Move { id: PointerId, x: f32, y: f32 },
    Up { id: PointerId, x: f32, y: f32 },
    Cancel { id: PointerId },
    /// The whole stream was cancelled.
    CancelAll,
}

/// Sub-state of the main pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainState {
    /// Has not moved past the slop; releasing taps.
    TapCandidate,
    /// Scrolling; releasing flings, or taps if too slow.
    Dragging,
}

/// Turns pointer events into gesture actions.
#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    config: GestureConfig,
    pointers: PointerRegistry,
    main: Option<PointerId>,
    pinch: Option<PointerId>,
    main_state: MainState,
    zoom_baseline: Option<f32>,
    last_distance_change: i32,
    zoom_pending: bool,
    velocity: VelocityTracker,
}

impl GestureRecognizer {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            pointers: PointerRegistry::new(),
            main: None,
            pinch: None,
            main_state: MainState::TapCandidate,
            zoom_baseline: None,
            last_distance_change: 0,
            zoom_pending: false,
            velocity: VelocityTracker::new(Duration::from_millis(config.velocity_horizon_ms)),
        }
    }

    /// Dispatch a platform event. `Move` does not end the batch; call
    /// [`end_batch`](Self::end_batch) once the platform's batch is done.
    pub fn handle(&mut self, event: TouchEvent, now: Instant) -> Option<GestureAction> {
        match event {
            TouchEvent::Down { id, x, y } => {
                self.cancel_all();
                self.on_pointer_down(id, x, y, now);
                None
            }
            TouchEvent::PointerDown { id, x, y } => {
                self.on_pointer_down(id, x, y, now);
                None
            }
            TouchEvent::Move { id, x, y } => self.on_pointer_move(id, x, y, now),
            TouchEvent::Up { id, x, y } => self.on_pointer_up(id, x, y, now),
            TouchEvent::Cancel { id } => {
                self.on_pointer_cancel(id);
                None
            }
            TouchEvent::CancelAll => {
                self.cancel_all();
                None
            }
        }
    }

    /// Register a new contact and bind it to a free slot.
    pub fn on_pointer_down(&mut self, id: PointerId, x: f32, y: f32, now: Instant) {
        let position = Point::new(x, y);
        if !self.pointers.add(id, position) {
            log::trace!("Pointer {} already down, updating position", id);
            return;
        }

        if self.main.is_none() {
            self.main = Some(id);
            self.main_state = MainState::TapCandidate;
            self.velocity.reset();
            self.velocity.add(position, now);
            log::debug!("Pointer {} bound to main", id);
        } else if self.pinch.is_none() {
            self.pinch = Some(id);
            self.start_zoom();
            log::debug!("Pointer {} bound to pinch", id);
        } else {
            log::trace!("Pointer {} tracked but unbound", id);
        }
    }

    pub fn on_pointer_move(&mut self, id: PointerId, x: f32, y: f32, now: Instant) -> Option<GestureAction> {
        if !self.pointers.contains(id) {
            log::trace!("Move for untracked pointer {}", id);
            return None;
        }
        let position = Point::new(x, y);

        if self.main == Some(id) && self.pinch.is_none() {
            self.velocity.add(position, now);
            return self.process_scroll(id, position);
        }

        if let Some(pointer) = self.pointers.get_mut(id) {
            pointer.position = position;
        }
        if self.main == Some(id) || self.pinch == Some(id) {
            self.zoom_pending = self.main.is_some() && self.pinch.is_some();
        }
        None
    }

    fn process_scroll(&mut self, id: PointerId, position: Point) -> Option<GestureAction> {
        let old = self.pointers.position(id)?;
        let delta_x = old.x - position.x;
        let delta_y = old.y - position.y;

        match self.main_state {
            MainState::TapCandidate => {
                let slop = self.config.touch_slop;
                if delta_x.abs() > slop || delta_y.abs() > slop {
                    self.main_state = MainState::Dragging;
                    log::debug!("Pointer {} started dragging", id);
                }
                None
            }
            MainState::Dragging => {
                if let Some(pointer) = self.pointers.get_mut(id) {
                    pointer.position = position;
                }
                let dx = -(delta_x as i32);
                let dy = -(delta_y as i32);
                log::trace!("Scroll by ({}, {})", dx, dy);
                Some(GestureAction::Scroll { dx, dy })
            }
        }
    }

    /// Apply a batch of moves and end it.
    pub fn on_pointer_moves(&mut self, moves: &[(PointerId, f32, f32)], now: Instant) -> Vec<GestureAction> {
        let mut actions: Vec<GestureAction> = moves
            .iter()
            .filter_map(|(id, x, y)| self.on_pointer_move(*id, *x, *y, now))
            .collect();
        actions.extend(self.end_batch());
        actions
    }

    /// Close a move batch. Emits at most one resize step for the pinch.
    pub fn end_batch(&mut self) -> Option<GestureAction> {
        if !self.zoom_pending {
            return None;
        }
        self.zoom_pending = false;
        self.process_zoom()
    }

    fn process_zoom(&mut self) -> Option<GestureAction> {
        let main = self.pointers.position(self.main?)?;
        let pinch = self.pointers.position(self.pinch?)?;
        let distance = main.distance_to(&pinch);
        if !distance.is_finite() || distance == 0.0 {
            log::trace!("Skipping degenerate pinch distance {}", distance);
            return None;
        }

        let Some(baseline) = self.zoom_baseline else {
            self.zoom_baseline = Some(distance);
            self.last_distance_change = 0;
            return None;
        };

        let distance_change = (distance - baseline) as i32;
        let delta = distance_change - self.last_distance_change;
        if delta.abs() as f32 > self.config.touch_slop {
            self.last_distance_change = distance_change;
            log::trace!("Pinch resize by {}", delta);
            return Some(GestureAction::Resize(delta));
        }
        None
    }

    pub fn on_pointer_up(&mut self, id: PointerId, x: f32, y: f32, now: Instant) -> Option<GestureAction> {
        if !self.pointers.contains(id) {
            log::trace!("Up for untracked pointer {}", id);
            return None;
        }

        if self.main == Some(id) && self.pinch.is_none() {
            self.velocity.add(Point::new(x, y), now);
            let stored = self.pointers.remove(id).map(|p| p.position);
            self.main = None;
            let action = stored.map(|position| self.release_action(position));
            self.regroup();
            return action;
        }

        self.release_slot(id);
        None
    }

    /// A lone main pointer that never left the slop always taps. A dragged
    /// one flings when a velocity component survives the threshold, and
    /// otherwise taps at its last stored position.
    fn release_action(&self, position: Point) -> GestureAction {
        let tap = GestureAction::Tap {
            x: position.x,
            y: position.y,
        };
        match self.main_state {
            MainState::TapCandidate => tap,
            MainState::Dragging => {
                let (vx, vy) = self.velocity.velocity(self.config.max_fling_velocity);
                let min = self.config.min_fling_velocity;
                let vx = if vx.abs() > min { vx } else { 0.0 };
                let vy = if vy.abs() > min { vy } else { 0.0 };
                if vx != 0.0 || vy != 0.0 {
                    log::debug!("Release velocity ({:.0}, {:.0}) px/s", vx, vy);
                    GestureAction::Fling { vx, vy }
                } else {
                    tap
                }
            }
        }
    }

    /// Lose a pointer without tapping or flinging.
    pub fn on_pointer_cancel(&mut self, id: PointerId) {
        if !self.pointers.contains(id) {
            log::trace!("Cancel for untracked pointer {}", id);
            return;
        }
        self.release_slot(id);
    }

    /// Lose every tracked pointer.
    pub fn cancel_all(&mut self) {
        if !self.pointers.is_empty() {
            log::debug!("Dropping {} tracked pointer(s)", self.pointers.len());
        }
        self.pointers.clear();
        self.main = None;
        self.pinch = None;
        self.main_state = MainState::TapCandidate;
        self.zoom_baseline = None;
        self.last_distance_change = 0;
        self.zoom_pending = false;
        self.velocity.reset();
    }

    fn release_slot(&mut self, id: PointerId) {
        self.pointers.remove(id);
        if self.main == Some(id) {
            self.main = None;
            self.end_zoom();
        } else if self.pinch == Some(id) {
            self.pinch = None;
            self.end_zoom();
        }
        self.regroup();
    }

    fn regroup(&mut self) {
        if self.main.is_none() {
            if let Some(id) = self.pointers.first_unbound(&[self.main, self.pinch]) {
                self.main = Some(id);
            } else {
                self.main = self.pinch.take();
            }
            if let Some(id) = self.main {
                self.main_state = MainState::TapCandidate;
                self.velocity.reset();
                log::debug!("Pointer {} promoted to main", id);
            }
        }

        if self.pointers.len() >= 2 && self.pinch.is_none() {
            if let Some(id) = self.pointers.first_unbound(&[self.main, self.pinch]) {
                self.pinch = Some(id);
                self.start_zoom();
                log::debug!("Pointer {} promoted to pinch", id);
            }
        }
    }

    fn start_zoom(&mut self) {
        self.zoom_baseline = None;
        self.last_distance_change = 0;
    }

    fn end_zoom(&mut self) {
        self.zoom_baseline = None;
        self.zoom_pending = false;
    }

    pub fn main(&self) -> Option<PointerId> {
        self.main
    }

    pub fn pinch(&self) -> Option<PointerId> {
        self.pinch
    }

    pub fn main_state(&self) -> MainState {
        self.main_state
    }

    pub fn is_dragging(&self) -> bool {
        self.main_state == MainState::Dragging && self.main.is_some()
    }

    pub fn pointers(&self) -> &PointerRegistry {
        &self.pointers
    }
}
