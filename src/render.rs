//! Per-frame drawing.
//!
//! The core never rasterises anything itself. [`paint`] walks the current
//! state and issues calls into a host-supplied [`Painter`], in back to
//! front order: image, decorations, bubbles.

use image::RgbaImage;
use imagemap_geometry::{Bounds, Decoration, Point};

use crate::bubble::Bubble;
use crate::constants::DECORATION_OFFSET;
use crate::constants::bubble::{
    CORNER_RADIUS, POINTER_HALF_WIDTH, POINTER_LENGTH, POINTER_SHADOW_SHIFT, SHADOW_OFFSET, TEXT_BASELINE_LIFT,
};
use crate::image_map::ImageMap;

/// Which paint a bubble shape is filled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    Shadow,
    Bubble,
}

/// Drawing capability supplied by the host. All positions are in screen
/// coordinates.
pub trait Painter {
    /// Draw the map image scaled into `dest`.
    fn draw_image(&mut self, image: &RgbaImage, dest: Bounds);

    /// Draw an area decoration with its top-left at `position`.
    fn draw_decoration(&mut self, decoration: &Decoration, position: Point);

    fn fill_round_rect(&mut self, rect: Bounds, radius: f32, fill: Fill);

    fn fill_triangle(&mut self, points: [Point; 3], fill: Fill);

    /// Draw a line of text horizontally centred on `position.x` with its
    /// baseline at `position.y`.
    fn draw_text(&mut self, text: &str, position: Point, size: f32, scale_x: f32);
}

/// Paint one frame of `map`.
pub fn paint(map: &ImageMap, painter: &mut dyn Painter) {
    let viewport = map.viewport();
    if !viewport.is_ready() {
        return;
    }
    let (scroll_x, scroll_y) = viewport.scroll();
    let (width, height) = viewport.current_size();

    if let Some(image) = map.image() {
        painter.draw_image(
            image,
            Bounds::new(scroll_x as f32, scroll_y as f32, width as f32, height as f32),
        );
    }

    for area in map.areas().iter() {
        if let Some(decoration) = area.decoration() {
            let anchor = viewport.to_screen(viewport.natural_to_content(area.anchor()));
            painter.draw_decoration(decoration, anchor.offset(-DECORATION_OFFSET, -DECORATION_OFFSET));
        }
    }

    for bubble in map.bubbles() {
        paint_bubble(bubble, Point::new(scroll_x as f32, scroll_y as f32), painter);
    }
}

fn pointer(anchor: Point, below: bool) -> [Point; 3] {
    let length = if below { POINTER_LENGTH } else { -POINTER_LENGTH };
    [
        anchor,
        anchor.offset(-POINTER_HALF_WIDTH, length),
        anchor.offset(POINTER_HALF_WIDTH, length),
    ]
}

fn paint_bubble(bubble: &Bubble, scroll: Point, painter: &mut dyn Painter) {
    let bounds = bubble.bounds().translated(scroll.x, scroll.y);
    let anchor = bubble.anchor().offset(scroll.x, scroll.y);
    let below = bubble.is_below_anchor();

    painter.fill_round_rect(bounds.translated(SHADOW_OFFSET, SHADOW_OFFSET), CORNER_RADIUS, Fill::Shadow);
    let mut shadow = pointer(anchor.offset(POINTER_SHADOW_SHIFT, POINTER_SHADOW_SHIFT), below);
    shadow[2] = shadow[2].offset(SHADOW_OFFSET, 0.0);
    painter.fill_triangle(shadow, Fill::Shadow);

    painter.fill_round_rect(bounds, CORNER_RADIUS, Fill::Bubble);
    painter.fill_triangle(pointer(anchor, below), Fill::Bubble);

    let text_at = Point::new(
        bounds.x + bounds.width / 2.0,
        bounds.y + bubble.baseline() as f32 - TEXT_BASELINE_LIFT,
    );
    painter.draw_text(bubble.text(), text_at, bubble.text_size(), bubble.text_scale_x());
}
