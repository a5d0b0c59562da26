//! Popup annotation bubbles.
//!
//! A bubble is a rounded text box with a pointer towards its anchor. Its box
//! lives in content coordinates (the scaled image's own pixels), so it moves
//! with the image when scrolling. At most one bubble is shown at a time.

use imagemap_geometry::{AreaId, Bounds, Point};

use crate::constants::bubble::{GAP_ABOVE, GAP_BELOW, PADDING};
use crate::registry::AreaRegistry;
use crate::viewport::ViewportModel;

/// Ink bounds of a line of text relative to its baseline origin. `top` is
/// negative (above the baseline), `bottom` positive for descenders.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextBounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl TextBounds {
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

/// Text measuring capability supplied by the host toolkit.
pub trait TextMeasure {
    /// Bounds of `text` at `size` px with the horizontal scale applied.
    fn text_bounds(&self, text: &str, size: f32, scale_x: f32) -> TextBounds;
}

/// Estimated text metrics for hosts without a real font engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    /// Average character width as a ratio of font size
    pub char_width_ratio: f32,
    /// Line height as a ratio of font size
    pub line_height_ratio: f32,
}

impl TextMetrics {
    /// Ratios for a typical monospace font.
    pub const MONO: TextMetrics = TextMetrics {
        char_width_ratio: 0.6,
        line_height_ratio: 1.2,
    };

    pub fn custom(char_width_ratio: f32, line_height_ratio: f32) -> Self {
        Self {
            char_width_ratio,
            line_height_ratio,
        }
    }

    pub fn line_width(&self, text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * size * self.char_width_ratio
    }

    pub fn line_height(&self, size: f32) -> f32 {
        size * self.line_height_ratio
    }

    /// Width of the widest line and total height.
    pub fn measure(&self, text: &str, size: f32) -> (f32, f32) {
        let lines: Vec<&str> = text.lines().collect();
        let line_count = lines.len().max(1);
        let width = lines
            .iter()
            .map(|line| self.line_width(line, size))
            .fold(0.0f32, f32::max);
        (width, line_count as f32 * self.line_height(size))
    }
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self::MONO
    }
}

impl TextMeasure for TextMetrics {
    fn text_bounds(&self, text: &str, size: f32, scale_x: f32) -> TextBounds {
        let (width, height) = self.measure(text, size);
        TextBounds {
            left: 0,
            top: (-size).round() as i32,
            right: (width * scale_x).round() as i32,
            bottom: (height - size).round() as i32,
        }
    }
}

/// Where a bubble points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BubbleAnchor {
    /// The anchor of a registered area.
    Area(AreaId),
    /// A point in natural-image coordinates.
    Point(f32, f32),
}

/// A laid-out bubble.
#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    area: Option<AreaId>,
    text: String,
    natural_anchor: Point,
    anchor: Point,
    bounds: Bounds,
    baseline: i32,
    text_size: f32,
    text_scale_x: f32,
}

impl Bubble {
    fn layout(
        text: String,
        area: Option<AreaId>,
        natural_anchor: Point,
        text_size: f32,
        viewport: &ViewportModel,
        measure: &dyn TextMeasure,
    ) -> Self {
        let anchor = viewport.natural_to_content(natural_anchor);
        let (view_width, _) = viewport.view_size();
        let (current_width, _) = viewport.current_size();

        let mut text_scale_x = 1.0;
        let mut text_bounds = measure.text_bounds(&text, text_size, text_scale_x);
        let mut width = text_bounds.width() + PADDING;
        let mut height = text_bounds.height() + PADDING;

        if width > view_width && view_width > 0 {
            text_scale_x = view_width as f32 / width as f32;
            text_bounds = measure.text_bounds(&text, text_size, text_scale_x);
            width = text_bounds.width() + PADDING;
            height = text_bounds.height() + PADDING;
        }

        let baseline = height - text_bounds.bottom;
        let mut left = anchor.x - (width / 2) as f32;
        let mut top = anchor.y - height as f32 - GAP_ABOVE;

        if left < 0.0 {
            left = 0.0;
        }
        if left + width as f32 > current_width as f32 {
            left = (current_width - width) as f32;
        }
        if top < 0.0 {
            top = anchor.y + GAP_BELOW;
        }

        Self {
            area,
            text,
            natural_anchor,
            anchor,
            bounds: Bounds::new(left, top, width as f32, height as f32),
            baseline,
            text_size,
            text_scale_x,
        }
    }

    /// The area this bubble belongs to, if any.
    pub fn area(&self) -> Option<AreaId> {
        self.area
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Anchor in content coordinates.
    pub fn anchor(&self) -> Point {
        self.anchor
    }

    /// Box in content coordinates.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Distance from the box top to the text baseline.
    pub fn baseline(&self) -> i32 {
        self.baseline
    }

    pub fn text_size(&self) -> f32 {
        self.text_size
    }

    /// Horizontal text squeeze applied so the box fits the view.
    pub fn text_scale_x(&self) -> f32 {
        self.text_scale_x
    }

    /// Whether the box was flipped below its anchor.
    pub fn is_below_anchor(&self) -> bool {
        self.bounds.y > self.anchor.y
    }

    /// Open-interval test in content coordinates.
    pub fn is_in_area(&self, x: f32, y: f32) -> bool {
        self.bounds.contains(&Point::new(x, y))
    }
}

/// The bubble layer drawn above the image.
#[derive(Debug, Clone)]
pub struct BubbleOverlay {
    bubbles: Vec<Bubble>,
    text_size: f32,
}

impl BubbleOverlay {
    pub fn new(text_size: f32) -> Self {
        Self {
            bubbles: Vec::new(),
            text_size,
        }
    }

    /// Replace whatever is shown with a new bubble. Returns `None` (and
    /// shows nothing) when the anchor names an unknown area.
    pub fn show(
        &mut self,
        text: impl Into<String>,
        anchor: BubbleAnchor,
        areas: &AreaRegistry,
        viewport: &ViewportModel,
        measure: &dyn TextMeasure,
    ) -> Option<&Bubble> {
        self.clear();
        let (area, natural_anchor) = match anchor {
            BubbleAnchor::Area(id) => match areas.get(id) {
                Some(area) => (Some(id), area.anchor()),
                None => {
                    log::debug!("No area {} to show a bubble for", id);
                    return None;
                }
            },
            BubbleAnchor::Point(x, y) => (None, Point::new(x, y)),
        };

        let bubble = Bubble::layout(text.into(), area, natural_anchor, self.text_size, viewport, measure);
        log::debug!("Showing bubble '{}' at {:?}", bubble.text, bubble.bounds);
        self.bubbles.push(bubble);
        self.bubbles.last()
    }

    /// Lay every bubble out again after the image was resized.
    pub fn relayout(&mut self, viewport: &ViewportModel, measure: &dyn TextMeasure) {
        for bubble in &mut self.bubbles {
            let text = std::mem::take(&mut bubble.text);
            *bubble = Bubble::layout(text, bubble.area, bubble.natural_anchor, self.text_size, viewport, measure);
        }
    }

    /// Returns true if anything was removed.
    pub fn clear(&mut self) -> bool {
        let had_any = !self.bubbles.is_empty();
        self.bubbles.clear();
        had_any
    }

    /// First bubble whose box contains a content-space point.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<&Bubble> {
        self.bubbles.iter().find(|b| b.is_in_area(x, y))
    }

    pub fn active(&self) -> Option<&Bubble> {
        self.bubbles.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bubble> {
        self.bubbles.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }
}

impl Default for BubbleOverlay {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_BUBBLE_TEXT_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imagemap_geometry::Area;

    fn viewport() -> ViewportModel {
        // 600x1000 image in a 300x500 view: scale 0.5
        let mut vp = ViewportModel::default();
        vp.set_natural_size(600, 1000);
        vp.set_view_size(300, 500);
        vp
    }

    fn show_at(overlay: &mut BubbleOverlay, text: &str, x: f32, y: f32) -> Bubble {
        overlay
            .show(text, BubbleAnchor::Point(x, y), &AreaRegistry::new(), &viewport(), &TextMetrics::default())
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_text_metrics_bounds() {
        let b = TextMetrics::default().text_bounds("Ohio", 30.0, 1.0);
        assert_eq!(b, TextBounds { left: 0, top: -30, right: 72, bottom: 6 });
        assert_eq!(b.height(), 36);
        let squeezed = TextMetrics::default().text_bounds("Ohio", 30.0, 0.5);
        assert_eq!(squeezed.width(), 36);
    }

    #[test]
    fn test_bubble_above_anchor() {
        let mut overlay = BubbleOverlay::default();
        let bubble = show_at(&mut overlay, "Ohio", 200.0, 400.0);
        assert_eq!(bubble.anchor(), Point::new(100.0, 200.0));
        assert_eq!(bubble.bounds(), Bounds::new(54.0, 114.0, 92.0, 56.0));
        assert_eq!(bubble.baseline(), 50);
        assert_eq!(bubble.text_scale_x(), 1.0);
        assert!(!bubble.is_below_anchor());
        assert_eq!(bubble.area(), None);
    }

    #[test]
    fn test_bubble_flips_below_near_top() {
        let mut overlay = BubbleOverlay::default();
        let bubble = show_at(&mut overlay, "Ohio", 200.0, 40.0);
        assert_eq!(bubble.bounds().y, 40.0);
        assert!(bubble.is_below_anchor());
    }

    #[test]
    fn test_bubble_clamped_horizontally() {
        let mut overlay = BubbleOverlay::default();
        assert_eq!(show_at(&mut overlay, "Ohio", 10.0, 400.0).bounds().x, 0.0);
        assert_eq!(show_at(&mut overlay, "Ohio", 590.0, 400.0).bounds().x, 208.0);
    }

    #[test]
    fn test_long_text_is_squeezed() {
        let mut overlay = BubbleOverlay::default();
        let bubble = show_at(&mut overlay, "Twenty characters!!!", 300.0, 600.0);
        assert!((bubble.text_scale_x() - 300.0 / 380.0).abs() < 0.0001);
        assert!(bubble.bounds().width < 380.0);
    }

    #[test]
    fn test_single_active_bubble() {
        let mut overlay = BubbleOverlay::default();
        show_at(&mut overlay, "One", 200.0, 400.0);
        show_at(&mut overlay, "Two", 200.0, 400.0);
        assert_eq!(overlay.iter().count(), 1);
        assert_eq!(overlay.active().map(Bubble::text), Some("Two"));
        assert!(overlay.clear());
        assert!(!overlay.clear());
        assert!(overlay.active().is_none());
    }

    #[test]
    fn test_area_anchor_and_unknown_area() {
        let mut areas = AreaRegistry::new();
        areas.add(Area::circle(4, 200.0, 400.0, 20.0).unwrap()).unwrap();
        let vp = viewport();
        let metrics = TextMetrics::default();
        let mut overlay = BubbleOverlay::default();

        let bubble = overlay.show("Circle", BubbleAnchor::Area(4), &areas, &vp, &metrics).unwrap();
        assert_eq!(bubble.area(), Some(4));
        assert_eq!(bubble.anchor(), Point::new(100.0, 200.0));

        assert!(overlay.show("Nope", BubbleAnchor::Area(99), &areas, &vp, &metrics).is_none());
        assert!(overlay.is_empty());
    }

    #[test]
    fn test_hit_test_open_box() {
        let mut overlay = BubbleOverlay::default();
        show_at(&mut overlay, "Ohio", 200.0, 400.0);
        assert!(overlay.hit_test(100.0, 140.0).is_some());
        assert!(overlay.hit_test(54.0, 140.0).is_none());
        assert!(overlay.hit_test(100.0, 170.0).is_none());
    }

    #[test]
    fn test_relayout_follows_zoom() {
        let mut vp = viewport();
        let metrics = TextMetrics::default();
        let mut overlay = BubbleOverlay::default();
        overlay.show("Ohio", BubbleAnchor::Point(200.0, 400.0), &AreaRegistry::new(), &vp, &metrics);

        vp.scale_to(450, 750);
        overlay.relayout(&vp, &metrics);
        let bubble = overlay.active().unwrap();
        assert_eq!(bubble.anchor(), Point::new(150.0, 300.0));
        assert_eq!(bubble.text(), "Ohio");
    }
}
