use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use tracing_subscriber::EnvFilter;

use schoolyard::config::WorldConfig;
use schoolyard::experience::Experience;

/// Headless runner: drives the experience at 60 Hz and logs state
/// transitions. Rendering frontends embed the library instead.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match WorldConfig::from_file(Path::new("world.toml")) {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(error = %error, "failed to load world.toml");
            std::process::exit(1);
        }
    };
    tracing::info!(name = %config.name, props = config.props.len(), "world loaded");

    let mut experience = Experience::new(config, (1280, 720));

    let frame_budget = Duration::from_secs_f32(1.0 / 60.0);
    let mut last = Instant::now();
    loop {
        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f32();
        last = now;

        experience.tick(dt);

        if !experience.started && experience.loading_complete() {
            experience.start();
            tracing::info!("experience started");
        }

        if experience.frame % 300 == 0 {
            tracing::info!(
                frame = experience.frame,
                progress = experience.loading_progress(),
                state = ?experience.animation.state,
                position = ?experience.character_position(),
                "heartbeat"
            );
        }

        let elapsed = last.elapsed();
        if elapsed < frame_budget {
            thread::sleep(frame_budget - elapsed);
        }
    }
}
