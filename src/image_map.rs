//! The image map widget core.
//!
//! [`ImageMap`] owns every component (viewport, gesture recognizer, fling,
//! areas, bubbles) and wires them together. Hosts feed it pointer events and
//! frame ticks, and react to the returned [`MapEvent`]s.

use std::sync::Arc;

use image::RgbaImage;
use imagemap_geometry::{Area, AreaId, Decoration};
use web_time::Instant;

use crate::bubble::{Bubble, BubbleAnchor, BubbleOverlay, TextMeasure, TextMetrics};
use crate::config::ViewerConfig;
use crate::error::AreaError;
use crate::fling::FlingAnimator;
use crate::gesture::{GestureAction, GestureRecognizer, PointerId, TouchEvent};
use crate::hit_test::{Hit, HitTester};
use crate::image_cache::ImageCache;
use crate::registry::{AreaDefinition, AreaRegistry};
use crate::render::{self, Painter};
use crate::viewport::ViewportModel;

/// Something the host should react to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapEvent {
    /// Visible state changed.
    Repaint,
    /// An area was tapped.
    AreaClicked(AreaId),
    /// A bubble was tapped.
    BubbleClicked(Option<AreaId>),
    /// A fling began; keep calling [`ImageMap::tick`] until it ends.
    FlingStarted { vx: f32, vy: f32 },
}

/// Value passed to click handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickEvent {
    Area(AreaId),
    Bubble(Option<AreaId>),
}

/// Handle returned by [`ImageMap::add_click_handler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

type ClickHandler = Box<dyn FnMut(ClickEvent)>;

fn push_repaint(events: &mut Vec<MapEvent>) {
    if !events.contains(&MapEvent::Repaint) {
        events.push(MapEvent::Repaint);
    }
}

/// A pannable, zoomable image with tappable areas and popup bubbles.
pub struct ImageMap {
    config: ViewerConfig,
    viewport: ViewportModel,
    gestures: GestureRecognizer,
    fling: FlingAnimator,
    areas: AreaRegistry,
    bubbles: BubbleOverlay,
    hit_tester: HitTester,
    measure: Box<dyn TextMeasure>,
    image: Option<Arc<RgbaImage>>,
    handlers: Vec<(HandlerId, ClickHandler)>,
    next_handler: u64,
}

impl ImageMap {
    /// Create a map that measures bubble text with [`TextMetrics`].
    pub fn new(config: ViewerConfig) -> Self {
        Self::with_text_measure(config, TextMetrics::default())
    }

    pub fn with_text_measure(config: ViewerConfig, measure: impl TextMeasure + 'static) -> Self {
        Self {
            viewport: ViewportModel::new(config.viewport),
            gestures: GestureRecognizer::new(config.gesture),
            fling: FlingAnimator::new(config.fling),
            areas: AreaRegistry::new(),
            bubbles: BubbleOverlay::new(config.bubble.text_size),
            hit_tester: HitTester::new(config.display.density),
            measure: Box::new(measure),
            image: None,
            handlers: Vec::new(),
            next_handler: 0,
            config,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    // --- areas ---

    pub fn add_area(&mut self, area: Area) -> Result<AreaId, AreaError> {
        self.areas.add(area)
    }

    /// Add a raw definition. A rejected definition is logged and dropped;
    /// the rest of the map keeps working.
    pub fn add_area_definition(&mut self, definition: AreaDefinition) -> Option<AreaId> {
        let raw_id = definition.id.clone();
        match self.areas.add_definition(definition) {
            Ok(id) => Some(id),
            Err(e) => {
                log::warn!("Dropping area '{}': {}", raw_id, e);
                None
            }
        }
    }

    /// Add many definitions, returning how many were accepted.
    pub fn add_area_definitions(&mut self, definitions: impl IntoIterator<Item = AreaDefinition>) -> usize {
        let added = definitions
            .into_iter()
            .filter_map(|def| self.add_area_definition(def))
            .count();
        log::info!("Loaded {} area(s)", added);
        added
    }

    pub fn areas(&self) -> &AreaRegistry {
        &self.areas
    }

    pub fn area_attribute(&self, id: AreaId, key: &str) -> Option<&str> {
        self.areas.attribute(id, key)
    }

    pub fn set_area_attribute(&mut self, id: AreaId, key: impl Into<String>, value: impl Into<String>) -> bool {
        self.areas.set_attribute(id, key, value)
    }

    /// Returns true if the area exists; the host should repaint.
    pub fn set_area_decoration(&mut self, id: AreaId, decoration: Option<Decoration>) -> bool {
        self.areas.set_decoration(id, decoration)
    }

    // --- image and sizing ---

    pub fn set_image_natural_size(&mut self, width: i32, height: i32) -> Vec<MapEvent> {
        let mut events = Vec::new();
        if self.viewport.set_natural_size(width, height) {
            self.bubbles.relayout(&self.viewport, self.measure.as_ref());
            push_repaint(&mut events);
        }
        events
    }

    pub fn set_viewport_size(&mut self, width: i32, height: i32) -> Vec<MapEvent> {
        let mut events = Vec::new();
        if self.viewport.set_view_size(width, height) {
            self.bubbles.relayout(&self.viewport, self.measure.as_ref());
            push_repaint(&mut events);
        }
        events
    }

    /// Resolve the image through `cache` (decoding on a miss) and size the
    /// viewport from it.
    pub fn set_image<F, E>(&mut self, cache: &mut ImageCache, key: &str, decode: F) -> Result<Vec<MapEvent>, E>
    where
        F: FnOnce() -> Result<RgbaImage, E>,
    {
        let image = cache.get_or_insert_with(key, decode)?;
        let (width, height) = image.dimensions();
        log::info!("🖼️ Showing image '{}' ({}x{})", key, width, height);
        self.image = Some(image);
        let mut events = self.set_image_natural_size(width as i32, height as i32);
        push_repaint(&mut events);
        Ok(events)
    }

    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_deref()
    }

    pub fn viewport(&self) -> &ViewportModel {
        &self.viewport
    }

    // --- input ---

    /// Dispatch a platform touch event. Moves are batched: call
    /// [`end_batch`](Self::end_batch) after the last move of a batch.
    pub fn handle(&mut self, event: TouchEvent, now: Instant) -> Vec<MapEvent> {
        if matches!(event, TouchEvent::Down { .. } | TouchEvent::PointerDown { .. }) {
            self.fling.stop();
        }
        let action = self.gestures.handle(event, now);
        self.apply(action, now)
    }

    pub fn on_pointer_down(&mut self, id: PointerId, x: f32, y: f32, now: Instant) -> Vec<MapEvent> {
        self.handle(TouchEvent::PointerDown { id, x, y }, now)
    }

    /// A single move, treated as a batch of its own.
    pub fn on_pointer_move(&mut self, id: PointerId, x: f32, y: f32, now: Instant) -> Vec<MapEvent> {
        self.on_pointer_moves(&[(id, x, y)], now)
    }

    /// Apply a batch of moves and end it.
    pub fn on_pointer_moves(&mut self, moves: &[(PointerId, f32, f32)], now: Instant) -> Vec<MapEvent> {
        let actions = self.gestures.on_pointer_moves(moves, now);
        let mut events = Vec::new();
        for action in actions {
            self.apply_action(action, now, &mut events);
        }
        events
    }

    pub fn on_pointer_up(&mut self, id: PointerId, x: f32, y: f32, now: Instant) -> Vec<MapEvent> {
        self.handle(TouchEvent::Up { id, x, y }, now)
    }

    pub fn on_pointer_cancel(&mut self, id: PointerId, now: Instant) -> Vec<MapEvent> {
        self.handle(TouchEvent::Cancel { id }, now)
    }

    pub fn cancel_all(&mut self, now: Instant) -> Vec<MapEvent> {
        self.handle(TouchEvent::CancelAll, now)
    }

    pub fn end_batch(&mut self, now: Instant) -> Vec<MapEvent> {
        let action = self.gestures.end_batch();
        self.apply(action, now)
    }

    /// Advance a running fling.
    pub fn tick(&mut self, now: Instant) -> Vec<MapEvent> {
        let mut events = Vec::new();
        if let Some((dx, dy)) = self.fling.tick(now) {
            if self.viewport.move_by(dx, dy) {
                push_repaint(&mut events);
            } else if dx != 0 || dy != 0 {
                log::debug!("Fling hit the scroll bounds");
                self.fling.stop();
            }
        }
        events
    }

    pub fn is_flinging(&self) -> bool {
        self.fling.is_active()
    }

    fn apply(&mut self, action: Option<GestureAction>, now: Instant) -> Vec<MapEvent> {
        let mut events = Vec::new();
        if let Some(action) = action {
            self.apply_action(action, now, &mut events);
        }
        events
    }

    fn apply_action(&mut self, action: GestureAction, now: Instant, events: &mut Vec<MapEvent>) {
        match action {
            GestureAction::Scroll { dx, dy } => {
                if self.viewport.move_by(dx, dy) {
                    push_repaint(events);
                }
            }
            GestureAction::Resize(delta) => {
                if self.viewport.resize_by(delta) {
                    self.bubbles.relayout(&self.viewport, self.measure.as_ref());
                    push_repaint(events);
                }
            }
            GestureAction::Fling { vx, vy } => {
                self.fling.start(vx, vy, now);
                events.push(MapEvent::FlingStarted { vx, vy });
            }
            GestureAction::Tap { x, y } => self.on_tap(x, y, events),
        }
    }

    fn on_tap(&mut self, x: f32, y: f32, events: &mut Vec<MapEvent>) {
        match self.resolve(x, y) {
            Hit::Bubble(area) => {
                log::debug!("Bubble tapped (area {:?})", area);
                events.push(MapEvent::BubbleClicked(area));
                self.notify(ClickEvent::Bubble(area));
            }
            Hit::Area(id) => {
                log::debug!("Area {} tapped", id);
                events.push(MapEvent::AreaClicked(id));
                self.notify(ClickEvent::Area(id));
            }
            Hit::Miss => {
                if self.bubbles.clear() {
                    push_repaint(events);
                }
            }
        }
    }

    /// What a screen position would hit.
    pub fn resolve(&self, x: f32, y: f32) -> Hit {
        self.hit_tester.resolve(x, y, &self.viewport, &self.bubbles, &self.areas)
    }

    // --- bubbles ---

    /// Show a bubble, replacing any other. Returns false if nothing could be
    /// shown (unknown area).
    pub fn show_bubble(&mut self, text: impl Into<String>, anchor: BubbleAnchor) -> bool {
        self.bubbles
            .show(text, anchor, &self.areas, &self.viewport, self.measure.as_ref())
            .is_some()
    }

    /// Show the area's name in a bubble. Areas without a name show nothing.
    pub fn show_area_bubble(&mut self, id: AreaId) -> bool {
        match self.areas.get(id).and_then(Area::name).map(str::to_owned) {
            Some(name) => self.show_bubble(name, BubbleAnchor::Area(id)),
            None => {
                self.bubbles.clear();
                false
            }
        }
    }

    pub fn clear_bubbles(&mut self) -> bool {
        self.bubbles.clear()
    }

    pub fn bubbles(&self) -> impl Iterator<Item = &Bubble> {
        self.bubbles.iter()
    }

    pub fn bubble_overlay(&self) -> &BubbleOverlay {
        &self.bubbles
    }

    /// Scroll so the area's anchor is in the middle of the view.
    pub fn center_on(&mut self, id: AreaId) -> bool {
        match self.areas.get(id) {
            Some(area) => self.viewport.center_on(area.anchor()),
            None => false,
        }
    }

    /// Centre on an area and show its name.
    pub fn center_and_show(&mut self, id: AreaId) -> bool {
        let moved = self.center_on(id);
        self.show_area_bubble(id) || moved
    }

    /// Centre on an area and show custom text.
    pub fn center_and_show_text(&mut self, id: AreaId, text: impl Into<String>) -> bool {
        let moved = self.center_on(id);
        self.show_bubble(text, BubbleAnchor::Area(id)) || moved
    }

    // --- click handlers ---

    pub fn add_click_handler(&mut self, handler: impl FnMut(ClickEvent) + 'static) -> HandlerId {
        let id = HandlerId(self.next_handler);
        self.next_handler += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    pub fn remove_click_handler(&mut self, id: HandlerId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(handler_id, _)| *handler_id != id);
        self.handlers.len() != before
    }

    fn notify(&mut self, event: ClickEvent) {
        for (_, handler) in &mut self.handlers {
            handler(event);
        }
    }

    // --- drawing ---

    pub fn paint(&self, painter: &mut dyn Painter) {
        render::paint(self, painter);
    }
}

impl std::fmt::Debug for ImageMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageMap")
            .field("viewport", &self.viewport)
            .field("areas", &self.areas.len())
            .field("bubbles", &self.bubbles.iter().count())
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    /// 600x1000 image in a 300x500 view (scale 0.5, zoomable to 0.75).
    fn map() -> ImageMap {
        let mut map = ImageMap::new(ViewerConfig::default());
        map.set_image_natural_size(600, 1000);
        map.set_viewport_size(300, 500);
        map.add_area_definition(AreaDefinition::new("rect", "1", "20,20,100,100").with_name("Box"));
        map.add_area_definition(AreaDefinition::new("circle", "2", "400,600,50").with_attribute("title", "Round"));
        map
    }

    fn tap(map: &mut ImageMap, x: f32, y: f32, now: Instant) -> Vec<MapEvent> {
        map.handle(TouchEvent::Down { id: 1, x, y }, now);
        map.handle(TouchEvent::Up { id: 1, x, y }, now + ms(50))
    }

    #[test]
    fn test_bad_definitions_are_dropped() {
        let mut map = map();
        let added = map.add_area_definitions(vec![
            AreaDefinition::new("rect", "1", "0,0,1,1"),
            AreaDefinition::new("hexagon", "3", "0,0,1,1"),
            AreaDefinition::new("rect", "4", "0,0,1,1"),
        ]);
        assert_eq!(added, 1);
        assert_eq!(map.areas().len(), 3);
        assert_eq!(map.area_attribute(2, "title"), Some("Round"));
    }

    #[test]
    fn test_tap_area_notifies_handlers() {
        let mut map = map();
        let clicks = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&clicks);
        map.add_click_handler(move |event| sink.borrow_mut().push(event));

        // Natural (60, 60) is content/screen (30, 30)
        let events = tap(&mut map, 30.0, 30.0, Instant::now());
        assert_eq!(events, vec![MapEvent::AreaClicked(1)]);
        assert_eq!(*clicks.borrow(), vec![ClickEvent::Area(1)]);
    }

    #[test]
    fn test_removed_handler_is_not_called() {
        let mut map = map();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let id = map.add_click_handler(move |_| *sink.borrow_mut() += 1);
        assert!(map.remove_click_handler(id));
        assert!(!map.remove_click_handler(id));
        tap(&mut map, 30.0, 30.0, Instant::now());
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn test_bubble_tap_and_miss_clears() {
        let mut map = map();
        assert!(map.show_area_bubble(2));
        let bubble = map.bubbles().next().cloned().unwrap();
        assert_eq!(bubble.text(), "Round");

        let b = bubble.bounds();
        let events = tap(&mut map, b.x + 10.0, b.y + 10.0, Instant::now());
        assert_eq!(events, vec![MapEvent::BubbleClicked(Some(2))]);

        // Far from any area or bubble
        let events = tap(&mut map, 290.0, 10.0, Instant::now());
        assert_eq!(events, vec![MapEvent::Repaint]);
        assert_eq!(map.bubbles().count(), 0);
    }

    #[test]
    fn test_show_bubble_unknown_area() {
        let mut map = map();
        map.show_bubble("hi", BubbleAnchor::Point(10.0, 10.0));
        assert!(!map.show_bubble("nope", BubbleAnchor::Area(77)));
        assert_eq!(map.bubbles().count(), 0);
        assert!(!map.show_area_bubble(77));
    }

    #[test]
    fn test_drag_scrolls() {
        let mut map = map();
        // Zoom in first so there is room to scroll
        map.viewport.scale_to(450, 750);
        let t0 = Instant::now();
        map.handle(TouchEvent::Down { id: 1, x: 100.0, y: 100.0 }, t0);

        assert!(map.on_pointer_move(1, 80.0, 80.0, t0 + ms(500)).is_empty());
        let events = map.on_pointer_move(1, 60.0, 70.0, t0 + ms(1000));
        assert_eq!(events, vec![MapEvent::Repaint]);
        assert_eq!(map.viewport().scroll(), (-40, -30));

        // Slow release after a pause: tap at the stored position
        let events = map.on_pointer_up(1, 60.0, 70.0, t0 + ms(2000));
        assert!(!events.iter().any(|e| matches!(e, MapEvent::FlingStarted { .. })));
    }

    #[test]
    fn test_pinch_zooms() {
        let mut map = map();
        let t0 = Instant::now();
        map.handle(TouchEvent::Down { id: 1, x: 100.0, y: 200.0 }, t0);
        map.handle(TouchEvent::PointerDown { id: 2, x: 200.0, y: 200.0 }, t0);
        map.on_pointer_moves(&[(1, 100.0, 200.0), (2, 200.0, 200.0)], t0);
        let events = map.on_pointer_moves(&[(1, 80.0, 200.0), (2, 220.0, 200.0)], t0 + ms(16));
        assert_eq!(events, vec![MapEvent::Repaint]);
        // 300 + 40 wide, height grows by 40 / 0.6
        assert_eq!(map.viewport().current_size(), (340, 566));

        // Lifting the pinch finger does nothing
        assert!(map.on_pointer_up(2, 220.0, 200.0, t0 + ms(30)).is_empty());
        assert_eq!(map.gestures.main(), Some(1));
    }

    #[test]
    fn test_main_finger_taps_after_pinch() {
        let mut map = map();
        let t0 = Instant::now();
        // Main finger on the rect at natural (60, 60)
        map.handle(TouchEvent::Down { id: 1, x: 30.0, y: 30.0 }, t0);
        map.handle(TouchEvent::PointerDown { id: 2, x: 200.0, y: 200.0 }, t0);
        assert!(map.on_pointer_up(2, 200.0, 200.0, t0 + ms(30)).is_empty());
        let events = map.on_pointer_up(1, 30.0, 30.0, t0 + ms(40));
        assert_eq!(events, vec![MapEvent::AreaClicked(1)]);
    }

    #[test]
    fn test_fling_and_tick() {
        let mut map = map();
        map.viewport.scale_to(450, 750);
        map.viewport.move_to(-150, -250);

        let t0 = Instant::now();
        map.handle(TouchEvent::Down { id: 1, x: 100.0, y: 100.0 }, t0);
        map.on_pointer_move(1, 120.0, 100.0, t0 + ms(10));
        map.on_pointer_move(1, 140.0, 100.0, t0 + ms(20));
        let events = map.on_pointer_up(1, 160.0, 100.0, t0 + ms(30));
        assert!(matches!(events[..], [MapEvent::FlingStarted { .. }]));
        assert!(map.is_flinging());

        let before = map.viewport().scroll().0;
        assert_eq!(map.tick(t0 + ms(50)), vec![MapEvent::Repaint]);
        assert!(map.viewport().scroll().0 > before);

        // New contact stops the fling
        map.handle(TouchEvent::Down { id: 2, x: 10.0, y: 10.0 }, t0 + ms(60));
        assert!(!map.is_flinging());
        assert!(map.tick(t0 + ms(70)).is_empty());
    }

    #[test]
    fn test_fling_stops_at_bounds() {
        let mut map = map();
        map.viewport.scale_to(450, 750);
        // Pinned at the right edge, flinging further right
        map.viewport.move_to(-150, 0);
        let t0 = Instant::now();
        map.fling.start(-5000.0, 0.0, t0);
        let events = map.tick(t0 + ms(50));
        assert!(events.is_empty());
        assert!(!map.is_flinging());
    }

    #[test]
    fn test_center_and_show() {
        let mut map = map();
        map.viewport.scale_to(450, 750);
        // Circle centre (400, 600) * 0.75 = (300, 450); view centre (150, 250)
        assert!(map.center_and_show(2));
        assert_eq!(map.viewport().scroll(), (-150, -200));
        assert_eq!(map.bubbles().next().and_then(Bubble::area), Some(2));

        assert!(map.center_and_show_text(1, "Custom"));
        assert_eq!(map.bubbles().next().map(Bubble::text), Some("Custom"));
        assert!(!map.center_on(99));
    }

    #[test]
    fn test_set_image_through_cache() {
        let mut cache = ImageCache::new(1 << 20);
        let mut map = ImageMap::new(ViewerConfig::default());
        map.set_viewport_size(100, 100);
        let events: Result<_, String> = map.set_image(&mut cache, "map", || Ok(RgbaImage::new(200, 100)));
        assert_eq!(events.unwrap(), vec![MapEvent::Repaint]);
        assert_eq!(map.viewport().natural_size(), (200, 100));
        assert_eq!(map.image().map(|i| i.width()), Some(200));
        assert!(cache.contains("map"));
    }

    #[test]
    fn test_cancel_all_drops_gesture() {
        let mut map = map();
        let t0 = Instant::now();
        map.on_pointer_down(1, 30.0, 30.0, t0);
        map.cancel_all(t0);
        assert!(map.on_pointer_up(1, 30.0, 30.0, t0).is_empty());
        map.on_pointer_down(3, 30.0, 30.0, t0);
        assert!(map.on_pointer_cancel(3, t0).is_empty());
        assert!(map.end_batch(t0).is_empty());
    }
}
