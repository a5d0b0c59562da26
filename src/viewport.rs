//! Viewport sizing and scrolling.
//!
//! The viewport tracks three sizes: the image's natural size, its current
//! (scaled) size, and the view it is shown in. The current size is kept
//! between a min and max pair and the scroll offset is kept inside the
//! bounds that stop the image edge from being dragged into view.
//!
//! Scroll offsets are the position of the image's top-left corner relative
//! to the view, so they are always `<= 0`.

use imagemap_geometry::Point;

use crate::config::ViewportConfig;
use crate::constants::FILL_SCREEN_MAX_FACTOR;

/// Sizing and scroll state of the displayed image.
///
/// All mutators return `true` when something visible changed and the caller
/// should repaint; none of them draw.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportModel {
    natural_width: i32,
    natural_height: i32,
    aspect: f32,

    view_width: i32,
    view_height: i32,

    current_width: i32,
    current_height: i32,
    min_width: i32,
    min_height: i32,
    max_width: i32,
    max_height: i32,

    scroll_x: i32,
    scroll_y: i32,
    right_bound: i32,
    bottom_bound: i32,

    scale_x: f32,
    scale_y: f32,

    fit_to_screen: bool,
    max_size_factor: f32,
}

impl ViewportModel {
    /// Create an empty viewport. Nothing is sized until both the natural
    /// size and the view size are known.
    pub fn new(config: ViewportConfig) -> Self {
        Self {
            natural_width: 0,
            natural_height: 0,
            aspect: 1.0,
            view_width: 0,
            view_height: 0,
            current_width: 0,
            current_height: 0,
            min_width: 0,
            min_height: 0,
            max_width: 0,
            max_height: 0,
            scroll_x: 0,
            scroll_y: 0,
            right_bound: 0,
            bottom_bound: 0,
            scale_x: 1.0,
            scale_y: 1.0,
            fit_to_screen: config.fit_to_screen,
            max_size_factor: config.max_size_factor,
        }
    }

    /// Whether both the image and the view have a size.
    pub fn is_ready(&self) -> bool {
        self.natural_width > 0 && self.natural_height > 0 && self.view_width > 0 && self.view_height > 0
    }

    /// Record the unscaled image size. Re-derives the initial bounds when
    /// the view size is already known.
    pub fn set_natural_size(&mut self, width: i32, height: i32) -> bool {
        if width <= 0 || height <= 0 {
            log::debug!("Ignoring degenerate natural size {}x{}", width, height);
            return false;
        }
        self.natural_width = width;
        self.natural_height = height;
        self.aspect = width as f32 / height as f32;
        self.reset_bounds()
    }

    /// Record the view size and re-derive the initial bounds.
    pub fn set_view_size(&mut self, width: i32, height: i32) -> bool {
        if width <= 0 || height <= 0 {
            log::debug!("Ignoring degenerate view size {}x{}", width, height);
            return false;
        }
        self.view_width = width;
        self.view_height = height;
        self.reset_bounds()
    }

    fn reset_bounds(&mut self) -> bool {
        if !self.is_ready() {
            return false;
        }
        self.compute_initial_bounds(
            self.view_width,
            self.view_height,
            self.fit_to_screen,
            self.max_size_factor,
        )
    }

    /// Derive min/max sizes for a view and put the image at its initial
    /// size with the scroll offset reset.
    ///
    /// With `fit_to_screen` the image is stretched to exactly the view and
    /// may zoom up to `max_size_factor` times that. Otherwise the aspect is
    /// kept, the dominant view dimension is covered, and the image may grow
    /// to 1.5 times that minimum.
    pub fn compute_initial_bounds(
        &mut self,
        view_width: i32,
        view_height: i32,
        fit_to_screen: bool,
        max_size_factor: f32,
    ) -> bool {
        if view_width <= 0 || view_height <= 0 {
            return false;
        }
        self.view_width = view_width;
        self.view_height = view_height;
        self.fit_to_screen = fit_to_screen;
        self.max_size_factor = max_size_factor;

        if self.natural_width <= 0 || self.natural_height <= 0 {
            return false;
        }

        self.scroll_x = 0;
        self.scroll_y = 0;

        if fit_to_screen {
            self.min_width = view_width;
            self.min_height = view_height;
            self.set_max_from_min(max_size_factor);
            self.apply_size(self.min_width, self.min_height);
        } else {
            if view_width > view_height {
                self.min_width = view_width;
                self.min_height = ((self.min_width as f32 / self.aspect) as i32).max(1);
            } else {
                self.min_height = view_height;
                self.min_width = ((self.aspect * view_height as f32) as i32).max(1);
            }
            self.set_max_from_min(FILL_SCREEN_MAX_FACTOR);

            let mut width = self.natural_width;
            let mut height = self.natural_height;
            let mut resample = false;
            if width < self.min_width {
                width = self.min_width;
                height = ((self.min_width as f32 / self.natural_width as f32) * self.natural_height as f32) as i32;
                resample = true;
            }
            if height < self.min_height {
                height = self.min_height;
                width = ((self.min_height as f32 / self.natural_height as f32) * self.natural_width as f32) as i32;
                resample = true;
            }

            if resample {
                let (width, height) = self.snap(width, height);
                self.apply_size(width, height);
            } else {
                // Large images start at natural size, which may exceed the
                // derived maximum; widen the maximum so it stays reachable.
                if width > self.max_width || height > self.max_height {
                    self.max_width = self.max_width.max(width);
                    self.max_height = self.max_height.max(height);
                }
                self.apply_size(width, height);
            }
        }

        log::debug!(
            "Initial bounds: view {}x{}, min {}x{}, max {}x{}, current {}x{}",
            view_width,
            view_height,
            self.min_width,
            self.min_height,
            self.max_width,
            self.max_height,
            self.current_width,
            self.current_height
        );
        true
    }

    fn set_max_from_min(&mut self, factor: f32) {
        let factor = if factor.is_finite() && factor > 0.0 {
            factor
        } else {
            log::warn!("Invalid max size factor {}, using 1.0", factor);
            1.0
        };
        // A factor below 1 would put max under min
        self.max_width = ((self.min_width as f32 * factor) as i32).max(self.min_width);
        self.max_height = ((self.min_height as f32 * factor) as i32).max(self.min_height);
    }

    /// Snap a requested size to the max pair or the min pair. Both axes snap
    /// together since callers pass aspect-correct pairs.
    fn snap(&self, mut width: i32, mut height: i32) -> (i32, i32) {
        if width > self.max_width || height > self.max_height {
            width = self.max_width;
            height = self.max_height;
        }
        if width < self.min_width || height < self.min_height {
            width = self.min_width;
            height = self.min_height;
        }
        (width, height)
    }

    fn apply_size(&mut self, width: i32, height: i32) {
        self.current_width = width;
        self.current_height = height;
        self.scale_x = width as f32 / self.natural_width as f32;
        self.scale_y = height as f32 / self.natural_height as f32;
        self.right_bound = if width > self.view_width {
            -(width - self.view_width)
        } else {
            0
        };
        self.bottom_bound = if height > self.view_height {
            -(height - self.view_height)
        } else {
            0
        };
        self.clamp_scroll();
    }

    /// Resize the image, snapping into the min/max range.
    pub fn scale_to(&mut self, width: i32, height: i32) -> bool {
        if !self.is_ready() {
            return false;
        }
        let (width, height) = self.snap(width, height);
        if width == self.current_width && height == self.current_height {
            return false;
        }
        self.apply_size(width, height);
        log::trace!("Scaled to {}x{}", width, height);
        true
    }

    /// Grow (or shrink, for negative values) the width by `delta_width`
    /// pixels and the height proportionally.
    pub fn resize_by(&mut self, delta_width: i32) -> bool {
        let delta_height = (delta_width as f32 / self.aspect) as i32;
        self.scale_to(
            self.current_width.saturating_add(delta_width),
            self.current_height.saturating_add(delta_height),
        )
    }

    /// Scroll to an absolute offset, clamped into bounds.
    pub fn move_to(&mut self, x: i32, y: i32) -> bool {
        let before = (self.scroll_x, self.scroll_y);
        self.scroll_x = x;
        self.scroll_y = y;
        self.clamp_scroll();
        before != (self.scroll_x, self.scroll_y)
    }

    /// Scroll by a delta, clamped into bounds.
    pub fn move_by(&mut self, dx: i32, dy: i32) -> bool {
        self.move_to(self.scroll_x.saturating_add(dx), self.scroll_y.saturating_add(dy))
    }

    fn clamp_scroll(&mut self) {
        self.scroll_x = self.scroll_x.min(0).max(self.right_bound);
        self.scroll_y = self.scroll_y.min(0).max(self.bottom_bound);
    }

    /// Scroll so a natural-image point sits in the middle of the view.
    pub fn center_on(&mut self, point: Point) -> bool {
        let x = point.x * self.scale_x;
        let y = point.y * self.scale_y;
        let left = (self.view_width / 2) as f32 - x;
        let top = (self.view_height / 2) as f32 - y;
        self.move_to(left as i32, top as i32)
    }

    /// Screen to content coordinates (undo the scroll offset).
    pub fn to_content(&self, screen: Point) -> Point {
        screen.offset(-(self.scroll_x as f32), -(self.scroll_y as f32))
    }

    /// Content to screen coordinates.
    pub fn to_screen(&self, content: Point) -> Point {
        content.offset(self.scroll_x as f32, self.scroll_y as f32)
    }

    /// Natural-image to content coordinates.
    pub fn natural_to_content(&self, natural: Point) -> Point {
        natural.scaled(self.scale_x, self.scale_y)
    }

    /// Content to natural-image coordinates.
    ///
    /// An axis whose scale is at most 1 is additionally divided by the
    /// display density; upscaled axes are not.
    pub fn to_natural(&self, content: Point, density: f32) -> Point {
        let density = if density.is_finite() && density > 0.0 { density } else { 1.0 };
        let mut x = content.x / self.scale_x;
        let mut y = content.y / self.scale_y;
        if self.scale_x <= 1.0 {
            x /= density;
        }
        if self.scale_y <= 1.0 {
            y /= density;
        }
        Point::new(x, y)
    }

    pub fn natural_size(&self) -> (i32, i32) {
        (self.natural_width, self.natural_height)
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn view_size(&self) -> (i32, i32) {
        (self.view_width, self.view_height)
    }

    pub fn current_size(&self) -> (i32, i32) {
        (self.current_width, self.current_height)
    }

    pub fn min_size(&self) -> (i32, i32) {
        (self.min_width, self.min_height)
    }

    pub fn max_size(&self) -> (i32, i32) {
        (self.max_width, self.max_height)
    }

    pub fn scroll(&self) -> (i32, i32) {
        (self.scroll_x, self.scroll_y)
    }

    /// Lowest allowed scroll offsets (right and bottom edges).
    pub fn scroll_bounds(&self) -> (i32, i32) {
        (self.right_bound, self.bottom_bound)
    }

    pub fn scale(&self) -> (f32, f32) {
        (self.scale_x, self.scale_y)
    }
}

impl Default for ViewportModel {
    fn default() -> Self {
        Self::new(ViewportConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn fit_viewport(natural: (i32, i32), view: (i32, i32)) -> ViewportModel {
        let mut vp = ViewportModel::default();
        vp.set_natural_size(natural.0, natural.1);
        vp.set_view_size(view.0, view.1);
        vp
    }

    fn fill_viewport(natural: (i32, i32), view: (i32, i32)) -> ViewportModel {
        let mut vp = ViewportModel::new(ViewportConfig {
            fit_to_screen: false,
            max_size_factor: 1.5,
        });
        vp.set_natural_size(natural.0, natural.1);
        vp.set_view_size(view.0, view.1);
        vp
    }

    fn assert_invariants(vp: &ViewportModel) {
        let (cw, ch) = vp.current_size();
        let (minw, minh) = vp.min_size();
        let (maxw, maxh) = vp.max_size();
        let (sx, sy) = vp.scroll();
        let (rb, bb) = vp.scroll_bounds();
        let (vw, vh) = vp.view_size();
        assert!(minw <= cw && cw <= maxw, "width {} outside [{}, {}]", cw, minw, maxw);
        assert!(minh <= ch && ch <= maxh, "height {} outside [{}, {}]", ch, minh, maxh);
        assert!(rb <= sx && sx <= 0, "scroll x {} outside [{}, 0]", sx, rb);
        assert!(bb <= sy && sy <= 0, "scroll y {} outside [{}, 0]", sy, bb);
        assert_eq!(rb, (vw - cw).min(0));
        assert_eq!(bb, (vh - ch).min(0));
        let (nw, nh) = vp.natural_size();
        assert!(approx_eq(vp.scale().0, cw as f32 / nw as f32));
        assert!(approx_eq(vp.scale().1, ch as f32 / nh as f32));
    }

    #[test]
    fn test_not_ready_until_both_sizes_known() {
        let mut vp = ViewportModel::default();
        assert!(!vp.is_ready());
        assert!(!vp.set_view_size(300, 500));
        assert!(!vp.scale_to(10, 10));
        assert!(vp.set_natural_size(600, 1000));
        assert!(vp.is_ready());
    }

    #[test]
    fn test_fit_to_screen_bounds() {
        let mut vp = ViewportModel::default();
        vp.set_natural_size(600, 1000);
        assert!(vp.compute_initial_bounds(300, 500, true, 1.5));
        assert_eq!(vp.min_size(), (300, 500));
        assert_eq!(vp.max_size(), (450, 750));
        assert_eq!(vp.current_size(), (300, 500));
        assert_eq!(vp.scroll(), (0, 0));
        assert!(approx_eq(vp.scale().0, 0.5));
        assert_invariants(&vp);
    }

    #[test]
    fn test_fit_to_screen_may_break_aspect() {
        let vp = fit_viewport((1000, 1000), (300, 500));
        assert_eq!(vp.current_size(), (300, 500));
        assert!(approx_eq(vp.scale().0, 0.3));
        assert!(approx_eq(vp.scale().1, 0.5));
    }

    #[test]
    fn test_fill_screen_resamples_small_image() {
        let vp = fill_viewport((400, 300), (800, 480));
        assert_eq!(vp.min_size(), (800, 600));
        assert_eq!(vp.max_size(), (1200, 900));
        assert_eq!(vp.current_size(), (800, 600));
        assert_eq!(vp.scroll_bounds(), (0, -120));
        assert_invariants(&vp);
    }

    #[test]
    fn test_fill_screen_keeps_large_image_natural() {
        let vp = fill_viewport((2000, 1500), (800, 480));
        assert_eq!(vp.min_size(), (800, 600));
        assert_eq!(vp.current_size(), (2000, 1500));
        assert_eq!(vp.max_size(), (2000, 1500));
        assert!(approx_eq(vp.scale().0, 1.0));
        assert_eq!(vp.scroll_bounds(), (-1200, -1020));
        assert_invariants(&vp);
    }

    #[test]
    fn test_fill_screen_portrait_narrow_image() {
        let vp = fill_viewport((100, 400), (300, 500));
        assert_eq!(vp.min_size(), (125, 500));
        assert_eq!(vp.current_size(), (125, 500));
        // Narrower than the view: no horizontal scrolling
        assert_eq!(vp.scroll_bounds(), (0, 0));
        assert_invariants(&vp);
    }

    #[test]
    fn test_inverted_factor_is_clamped() {
        let mut vp = ViewportModel::default();
        vp.set_natural_size(600, 1000);
        vp.compute_initial_bounds(300, 500, true, 0.5);
        assert_eq!(vp.max_size(), (300, 500));
        vp.compute_initial_bounds(300, 500, true, f32::NAN);
        assert_eq!(vp.max_size(), (300, 500));
        assert!(!vp.resize_by(50));
        assert_invariants(&vp);
    }

    #[test]
    fn test_scale_to_snaps_pairs() {
        let mut vp = fit_viewport((600, 1000), (300, 500));

        assert!(vp.scale_to(400, 700));
        assert_eq!(vp.current_size(), (400, 700));
        assert_eq!(vp.scroll_bounds(), (-100, -200));

        assert!(vp.scale_to(500, 800));
        assert_eq!(vp.current_size(), (450, 750));

        // One axis over is enough to snap both
        assert!(!vp.scale_to(460, 700));
        assert_eq!(vp.current_size(), (450, 750));

        assert!(vp.scale_to(200, 600));
        assert_eq!(vp.current_size(), (300, 500));
        assert_invariants(&vp);
    }

    #[test]
    fn test_scale_to_unchanged_is_noop() {
        let mut vp = fit_viewport((600, 1000), (300, 500));
        assert!(!vp.scale_to(300, 500));
    }

    #[test]
    fn test_resize_by_keeps_aspect() {
        let mut vp = fit_viewport((600, 1000), (300, 500));
        // 30 / 0.6 is just under 50 in f32; the height delta truncates
        assert!(vp.resize_by(30));
        assert_eq!(vp.current_size(), (330, 549));
        assert!(vp.resize_by(-30));
        assert_eq!(vp.current_size(), (300, 500));
    }

    #[test]
    fn test_resize_by_truncates_height_delta() {
        // Aspect 2.0 is exact: 25 / 2 = 12.5 truncates to 12, -25 / 2 to -12
        let mut vp = fit_viewport((400, 200), (200, 100));
        assert!(vp.resize_by(25));
        assert_eq!(vp.current_size(), (225, 112));
        assert!(vp.resize_by(-25));
        assert_eq!(vp.current_size(), (200, 100));
    }

    #[test]
    fn test_move_clamps() {
        let mut vp = fit_viewport((600, 1000), (300, 500));
        vp.scale_to(450, 750);

        assert!(vp.move_by(-100, -100));
        assert_eq!(vp.scroll(), (-100, -100));

        assert!(vp.move_by(-500, -500));
        assert_eq!(vp.scroll(), (-150, -250));

        assert!(vp.move_to(40, 40));
        assert_eq!(vp.scroll(), (0, 0));

        assert!(!vp.move_by(10, 10));
    }

    #[test]
    fn test_shrinking_reclamps_scroll() {
        let mut vp = fit_viewport((600, 1000), (300, 500));
        vp.scale_to(450, 750);
        vp.move_to(-150, -250);
        vp.scale_to(300, 500);
        assert_eq!(vp.scroll(), (0, 0));
        assert_invariants(&vp);
    }

    #[test]
    fn test_center_on() {
        let mut vp = fit_viewport((600, 1000), (300, 500));
        vp.scale_to(450, 750);
        // scale 0.75: (200, 400) -> (150, 300); centre (150, 250)
        assert!(vp.center_on(Point::new(200.0, 400.0)));
        assert_eq!(vp.scroll(), (0, -50));
        // Far corner clamps to the bounds
        vp.center_on(Point::new(600.0, 1000.0));
        assert_eq!(vp.scroll(), (-150, -250));
    }

    #[test]
    fn test_coordinate_transforms() {
        let mut vp = fit_viewport((600, 1000), (300, 500));
        vp.scale_to(450, 750);
        vp.move_to(-20, -30);
        let content = vp.to_content(Point::new(10.0, 10.0));
        assert_eq!(content, Point::new(30.0, 40.0));
        assert_eq!(vp.to_screen(content), Point::new(10.0, 10.0));
        assert_eq!(vp.natural_to_content(Point::new(100.0, 100.0)), Point::new(75.0, 75.0));
    }

    #[test]
    fn test_to_natural_density_only_when_not_upscaled() {
        // scale 0.5 on both axes: density applies
        let vp = fit_viewport((600, 1000), (300, 500));
        let p = vp.to_natural(Point::new(100.0, 100.0), 2.0);
        assert!(approx_eq(p.x, 100.0));
        assert!(approx_eq(p.y, 100.0));

        // scale 2.0 on both axes: density ignored
        let vp = fit_viewport((150, 250), (300, 500));
        let p = vp.to_natural(Point::new(100.0, 100.0), 2.0);
        assert!(approx_eq(p.x, 50.0));
        assert!(approx_eq(p.y, 50.0));
    }

    #[test]
    fn test_invariants_hold_over_operation_sequence() {
        let mut vp = fill_viewport((640, 480), (320, 480));
        assert_invariants(&vp);

        let deltas = [37, -12, 150, -400, 9, 9, 9, 800, -3, -64];
        for (i, delta) in deltas.iter().enumerate() {
            vp.resize_by(*delta);
            assert_invariants(&vp);
            vp.move_by(delta * 3, -delta * 2);
            assert_invariants(&vp);
            if i % 3 == 0 {
                vp.move_to(-10_000, 10_000);
                assert_invariants(&vp);
            }
            vp.scale_to(delta * 10, delta * 7);
            assert_invariants(&vp);
        }

        vp.set_view_size(1000, 200);
        assert_invariants(&vp);
        vp.set_natural_size(50, 50);
        assert_invariants(&vp);
    }
}
