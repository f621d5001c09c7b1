//! Headless arbor runner.
//!
//! This binary:
//! 1. Mounts a small demo scene on a recording surface
//! 2. Drives it with a manual clock for `ARBOR_FRAMES` frames
//! 3. Feeds synthetic pointer input along the way and logs what was drawn
//!
//! Configuration comes from `ARBOR_*` environment variables (see
//! `RuntimeConfig::from_env`); logging from `RUST_LOG`.

mod scene;

use arbor_app::{RecordingSurface, Runtime, RuntimeConfig};
use arbor_event::RawInput;
use arbor_tick::ManualClock;
use glam::UVec2;
use tracing::{info, warn};

fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("arbor_runner=info".parse()?)
                .add_directive("arbor_app=info".parse()?),
        )
        .init();

    let frames: u64 = std::env::var("ARBOR_FRAMES")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(120);

    let frame_ms: f64 = std::env::var("ARBOR_FRAME_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(1000.0 / 60.0);

    let config = RuntimeConfig::from_env();
    info!(frames, frame_ms, ?config, "Starting arbor runner");

    let clock = ManualClock::new();
    let surface = RecordingSurface::new(UVec2::new(640, 360));
    let mut runtime = Runtime::new(clock.clone(), surface.clone(), config);
    runtime.mount(Some("demo"), scene::demo)?;

    for frame in 0..frames {
        // click on the spinner every second
        if frame % 60 == 30 {
            runtime.push_input(RawInput::PointerMove { x: 320.0, y: 180.0 })?;
            runtime.push_input(RawInput::PointerDown {
                x: 320.0,
                y: 180.0,
                button: 0,
            })?;
            runtime.push_input(RawInput::PointerUp {
                x: 320.0,
                y: 180.0,
                button: 0,
            })?;
        }

        if runtime.advance(&clock, frame_ms)?.is_none() {
            warn!(frame, "clock fired no frame");
            continue;
        }

        let report = runtime.last_report()?;
        if report.draw.failed > 0 || report.update.is_some_and(|u| u.failed > 0) {
            warn!(frame, ?report, "frame had failing callbacks");
        }
    }

    let report = runtime.last_report()?;
    info!(
        ticks = report.tick,
        draw_calls = surface.commands().len(),
        texts = ?surface.texts(),
        "Finished"
    );

    runtime.unmount()?;
    Ok(())
}
