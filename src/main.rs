//! Headless fireworks run.
//!
//! Usage: `fireworks [config.json]`
//!
//! Simulates ten seconds at 60 Hz against an in-memory scene and logs what
//! happened. Set `RUST_LOG=debug` to see every launch and burst.

use std::error::Error;

use fireworks::prelude::*;
use fireworks::RecordingScene;

const WIDTH: f32 = 1280.0;
const HEIGHT: f32 = 720.0;
const FRAMES: u32 = 600;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => FireworksConfig::from_file(&path)?,
        None => FireworksConfig::new(),
    };

    let camera = ViewCamera::new(config.projection, WIDTH, HEIGHT, config.frustum_size);
    let mut fireworks = EffectScheduler::new(
        RecordingScene::new(),
        camera,
        TextureHandle::soft_disc(32),
        config,
        WIDTH,
        HEIGHT,
    )?;

    let launcher = fireworks.launcher();
    let producer = std::thread::spawn(move || {
        for _ in 0..3 {
            launcher.fire(1);
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
    });

    let mut clock = ManualClock::new();
    let mut peak = 0;
    for frame in 0..FRAMES {
        fireworks.tick_with(&clock);
        peak = peak.max(fireworks.live_count());

        if frame == FRAMES / 2 {
            fireworks.launch_at(Vec2::new(0.0, 0.5));
            fireworks.on_resize(WIDTH / 2.0, HEIGHT / 2.0, fireworks.config().frustum_size * 2.0);
        }
        clock.advance(1.0 / 60.0);
    }
    if producer.join().is_err() {
        log::warn!("launch producer panicked");
    }

    log::info!(
        "{:.1}s simulated: {} launched, {} finished, {} live (peak {}), {} drawables attached",
        clock.now(),
        fireworks.spawned_total(),
        fireworks.finished_total(),
        fireworks.live_count(),
        peak,
        fireworks.scene().attached_count()
    );

    fireworks.dispose_all();
    log::info!(
        "After teardown: {} drawables created, {} released",
        fireworks.scene().created_count(),
        fireworks.scene().released_count()
    );
    Ok(())
}
