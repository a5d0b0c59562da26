//! A small clickable US map and a scripted touch session for it.
//!
//! The map image is synthesised in memory (each state filled with its own
//! colour) so the demo runs without any asset files.

use std::convert::Infallible;
use std::time::Duration;

use image::{Rgba, RgbaImage};
use imagemap_geometry::Point;
use web_time::Instant;

use crate::config::ViewerConfig;
use crate::gesture::{PointerId, TouchEvent};
use crate::image_cache::ImageCache;
use crate::image_map::{ImageMap, MapEvent};
use crate::registry::{AreaDefinition, AreaRegistry};

/// Natural size of the demo map.
pub const MAP_WIDTH: u32 = 960;
pub const MAP_HEIGHT: u32 = 600;

/// View the demo session is scripted against.
pub const VIEW_WIDTH: i32 = 480;
pub const VIEW_HEIGHT: i32 = 300;

const WATER: Rgba<u8> = Rgba([168, 204, 232, 255]);
const OUTLINE: Rgba<u8> = Rgba([60, 60, 60, 255]);

/// Hotspot definitions for a handful of states, in map pixels.
pub fn us_state_definitions() -> Vec<AreaDefinition> {
    vec![
        AreaDefinition::new("rect", "1", "310,230,430,320")
            .with_name("Colorado")
            .with_attribute("capital", "Denver"),
        AreaDefinition::new("rect", "2", "290,130,410,225")
            .with_name("Wyoming")
            .with_attribute("capital", "Cheyenne"),
        AreaDefinition::new("rect", "3", "440,260,580,330")
            .with_name("Kansas")
            .with_attribute("capital", "Topeka"),
        AreaDefinition::new(
            "poly",
            "4",
            "380,340,520,340,520,400,600,430,560,540,480,580,420,500,360,470,380,420",
        )
        .with_name("Texas")
        .with_attribute("capital", "Austin"),
        AreaDefinition::new("poly", "6", "220,200,290,200,290,230,310,230,310,330,220,330")
            .with_attribute("title", "Utah")
            .with_attribute("capital", "Salt Lake City"),
        AreaDefinition::new("circle", "5", "860,250,10")
            .with_attribute("alt", "Washington, D.C.")
            .with_attribute("capital", "Washington"),
        // Not a shape the map understands; dropped at load
        AreaDefinition::new("hexagon", "7", "0,0,10,10"),
    ]
}

fn state_colour(index: usize) -> Rgba<u8> {
    const PALETTE: [[u8; 3]; 6] = [
        [232, 196, 120],
        [196, 226, 150],
        [240, 170, 150],
        [210, 180, 220],
        [250, 220, 160],
        [200, 60, 60],
    ];
    let [r, g, b] = PALETTE[index % PALETTE.len()];
    Rgba([r, g, b, 255])
}

/// Paint every area in its own colour over water, with a one pixel outline
/// where an area meets something else.
pub fn render_map_image(areas: &AreaRegistry) -> RgbaImage {
    let owner = |x: u32, y: u32| -> Option<usize> {
        let p = Point::new(x as f32 + 0.5, y as f32 + 0.5);
        areas.iter().position(|area| area.is_in_area(p.x, p.y))
    };

    RgbaImage::from_fn(MAP_WIDTH, MAP_HEIGHT, |x, y| match owner(x, y) {
        Some(index) => {
            let edge = x == 0 || y == 0 || owner(x - 1, y) != Some(index) || owner(x, y - 1) != Some(index);
            if edge { OUTLINE } else { state_colour(index) }
        }
        None => WATER,
    })
}

/// Build the demo map: areas, synthesised image (through `cache`) and view.
pub fn build_map(config: ViewerConfig, cache: &mut ImageCache) -> ImageMap {
    let mut map = ImageMap::new(config);
    map.add_area_definitions(us_state_definitions());

    let image = render_map_image(map.areas());
    let loaded: Result<_, Infallible> = map.set_image(cache, "usa", move || Ok(image));
    let Ok(events) = loaded;
    log::debug!("Image set: {:?}", events);
    map.set_viewport_size(VIEW_WIDTH, VIEW_HEIGHT);
    map
}

/// One scripted input.
#[derive(Debug, Clone, PartialEq)]
pub enum DemoInput {
    Touch(TouchEvent),
    /// A batch of moves, ended after the last one.
    Moves(Vec<(PointerId, f32, f32)>),
    /// A frame tick.
    Tick,
}

/// An input at a time offset from the start of the session.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoStep {
    pub at_ms: u64,
    pub input: DemoInput,
}

fn step(at_ms: u64, input: DemoInput) -> DemoStep {
    DemoStep { at_ms, input }
}

fn touch(at_ms: u64, event: TouchEvent) -> DemoStep {
    step(at_ms, DemoInput::Touch(event))
}

/// Tap Colorado, tap its bubble, pinch to zoom (lifting the fingers taps Utah),
/// fling east and tap the sea.
pub fn scripted_session() -> Vec<DemoStep> {
    let mut steps = vec![
        touch(0, TouchEvent::Down { id: 1, x: 185.0, y: 137.0 }),
        touch(60, TouchEvent::Up { id: 1, x: 185.0, y: 137.0 }),
        touch(500, TouchEvent::Down { id: 1, x: 150.0, y: 50.0 }),
        touch(550, TouchEvent::Up { id: 1, x: 150.0, y: 50.0 }),
        // Pinch out in two steps
        touch(1000, TouchEvent::Down { id: 1, x: 200.0, y: 150.0 }),
        touch(1000, TouchEvent::PointerDown { id: 2, x: 280.0, y: 150.0 }),
        step(1016, DemoInput::Moves(vec![(1, 200.0, 150.0), (2, 280.0, 150.0)])),
        step(1032, DemoInput::Moves(vec![(1, 170.0, 150.0), (2, 310.0, 150.0)])),
        step(1048, DemoInput::Moves(vec![(1, 140.0, 150.0), (2, 340.0, 150.0)])),
        // Lifting the pinch finger does nothing; the main finger never
        // dragged on its own, so lifting it taps (over Utah)
        touch(1100, TouchEvent::Up { id: 2, x: 340.0, y: 150.0 }),
        touch(1110, TouchEvent::Up { id: 1, x: 140.0, y: 150.0 }),
        // Quick swipe to the left
        touch(1500, TouchEvent::Down { id: 1, x: 300.0, y: 200.0 }),
        step(1510, DemoInput::Moves(vec![(1, 280.0, 200.0)])),
        step(1520, DemoInput::Moves(vec![(1, 260.0, 200.0)])),
        step(1530, DemoInput::Moves(vec![(1, 240.0, 200.0)])),
        touch(1540, TouchEvent::Up { id: 1, x: 230.0, y: 200.0 }),
    ];
    steps.extend((1..=12).map(|frame| step(1540 + frame * 16, DemoInput::Tick)));
    steps.push(touch(2500, TouchEvent::Down { id: 1, x: 470.0, y: 290.0 }));
    steps.push(touch(2550, TouchEvent::Up { id: 1, x: 470.0, y: 290.0 }));
    steps
}

/// Replay `steps` against `map`. Tapped areas get their name shown in a
/// bubble, as a host would do from a click handler.
pub fn run_session(map: &mut ImageMap, steps: &[DemoStep], start: Instant) -> Vec<(u64, MapEvent)> {
    let mut transcript = Vec::new();
    for DemoStep { at_ms, input } in steps {
        let now = start + Duration::from_millis(*at_ms);
        let events = match input {
            DemoInput::Touch(event) => map.handle(*event, now),
            DemoInput::Moves(moves) => map.on_pointer_moves(moves, now),
            DemoInput::Tick => map.tick(now),
        };
        for event in events {
            log::debug!("{:>5} ms: {:?}", at_ms, event);
            transcript.push((*at_ms, event));
            if let MapEvent::AreaClicked(id) = event {
                if map.show_area_bubble(id) {
                    transcript.push((*at_ms, MapEvent::Repaint));
                }
            }
        }
    }
    transcript
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definitions_load_except_unsupported() {
        let mut cache = ImageCache::default();
        let map = build_map(ViewerConfig::default(), &mut cache);
        assert_eq!(map.areas().len(), 6);
        assert_eq!(map.areas().get(6).and_then(|a| a.name()), Some("Utah"));
        assert_eq!(map.areas().get(5).and_then(|a| a.name()), Some("Washington, D.C."));
        assert_eq!(map.area_attribute(4, "capital"), Some("Austin"));
        assert!(cache.contains("usa"));
    }

    #[test]
    fn test_rendered_image_colours_areas() {
        let mut areas = AreaRegistry::new();
        for def in us_state_definitions().into_iter().take(3) {
            areas.add_definition(def).unwrap();
        }
        let image = render_map_image(&areas);
        assert_eq!(image.dimensions(), (MAP_WIDTH, MAP_HEIGHT));
        assert_eq!(*image.get_pixel(5, 5), WATER);
        assert_eq!(*image.get_pixel(370, 275), state_colour(0));
        assert_eq!(*image.get_pixel(310, 275), OUTLINE);
    }

    #[test]
    fn test_scripted_session() {
        let mut cache = ImageCache::default();
        let mut map = build_map(ViewerConfig::default(), &mut cache);
        let transcript = run_session(&mut map, &scripted_session(), Instant::now());
        let events: Vec<MapEvent> = transcript.iter().map(|(_, e)| *e).collect();

        assert_eq!(events[0], MapEvent::AreaClicked(1));
        assert!(events.contains(&MapEvent::BubbleClicked(Some(1))));
        assert_eq!(transcript.iter().find(|(t, _)| *t == 1110).map(|(_, e)| *e), Some(MapEvent::AreaClicked(6)));
        assert!(events.iter().any(|e| matches!(e, MapEvent::FlingStarted { vx, .. } if *vx < 0.0)));

        // Two pinch steps of 60 px, then the fling pins the right edge
        assert_eq!(map.viewport().current_size(), (600, 374));
        assert_eq!(map.viewport().scroll(), (-120, 0));
        assert!(!map.is_flinging());

        // The final tap on the sea clears the bubble
        assert_eq!(transcript.last().map(|(t, e)| (*t, *e)), Some((2550, MapEvent::Repaint)));
        assert_eq!(map.bubbles().count(), 0);
    }
}
