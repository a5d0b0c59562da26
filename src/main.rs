/// Replays a scripted touch session against the demo US map and prints
/// what the map reported.
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use imagemap::demo;
    use imagemap::{ImageCache, MapEvent, ViewerConfig};

    let config = match std::env::args().nth(1) {
        Some(path) => match ViewerConfig::load(std::path::Path::new(&path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load configuration {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => ViewerConfig::load_from_default_path().unwrap_or_default(),
    };

    env_logger::Builder::new()
        .filter_level(config.log_level.to_level_filter())
        .parse_default_env()
        .init();
    log::info!("🗺️ imagemap demo (log level {})", config.log_level.name());

    let mut cache = ImageCache::new(config.cache.budget_bytes);
    let mut map = demo::build_map(config, &mut cache);
    let transcript = demo::run_session(&mut map, &demo::scripted_session(), web_time::Instant::now());

    for (at_ms, event) in &transcript {
        match event {
            MapEvent::AreaClicked(id) => {
                let name = map.areas().get(*id).and_then(|a| a.name()).unwrap_or("?");
                let capital = map.area_attribute(*id, "capital").unwrap_or("?");
                println!("{:>5} ms  tapped {} (capital: {})", at_ms, name, capital);
            }
            MapEvent::BubbleClicked(id) => println!("{:>5} ms  tapped bubble of area {:?}", at_ms, id),
            MapEvent::FlingStarted { vx, vy } => {
                println!("{:>5} ms  fling at ({:.0}, {:.0}) px/s", at_ms, vx, vy)
            }
            MapEvent::Repaint => {}
        }
    }

    let viewport = map.viewport();
    let repaints = transcript.iter().filter(|(_, e)| *e == MapEvent::Repaint).count();
    println!(
        "final size {:?}, scroll {:?}, {} repaint(s), {} cached byte(s)",
        viewport.current_size(),
        viewport.scroll(),
        repaints,
        cache.used_bytes()
    );
}

// The core has no entry point of its own on the web; hosts drive ImageMap.
#[cfg(target_arch = "wasm32")]
fn main() {}
