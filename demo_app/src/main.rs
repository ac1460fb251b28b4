//! Toolkit demo application
//!
//! Drives a simulated fixed-rate frame loop through the gradual loop, work
//! routine, object pool and face cluster demos. Set `RUST_LOG=debug` for
//! per-frame detail.

mod cluster_demo;
mod gradual_demo;
mod pool_demo;
mod work_demo;

use std::path::Path;
use std::time::Duration;

use uniprep::config::{Config, ToolkitConfig};
use uniprep::foundation::{logging, math::Vec3, time::FrameClock};
use uniprep::scheduler::FrameScheduler;
use uniprep::work::WorkRunner;

use gradual_demo::GradualDemo;
use pool_demo::PoolDemo;

/// Simulated frame duration (60 Hz)
const FRAME: Duration = Duration::from_micros(16_667);

/// Frames to simulate once the loops have finished
const MIN_FRAMES: u64 = 900;

/// Frame on which a second delayed message is requested
const SECOND_MESSAGE_FRAME: u64 = 120;

/// Optional configuration file next to the working directory
const CONFIG_PATH: &str = "uniprep.toml";

fn load_config() -> ToolkitConfig {
    if !Path::new(CONFIG_PATH).exists() {
        return ToolkitConfig::default();
    }
    match ToolkitConfig::load_from_file(CONFIG_PATH) {
        Ok(config) => {
            log::info!("Loaded configuration from {}", CONFIG_PATH);
            config
        }
        Err(err) => {
            log::warn!("Ignoring {}: {}", CONFIG_PATH, err);
            ToolkitConfig::default()
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_with_level(log::LevelFilter::Info);
    log::info!("Starting UniPrep demo");

    let config = load_config();
    let mut scheduler = FrameScheduler::with_config(config.scheduler.clone());
    let mut runner = WorkRunner::with_config(&config.work);

    cluster_demo::run(&config.cluster)?;

    let gradual = GradualDemo::start(&mut scheduler, false)?;
    work_demo::start_delayed_message(&mut runner)?;
    let mut crates = PoolDemo::new(3, Vec3::new(8.0, 4.0, 8.0), Vec3::new(0.0, 5.0, 0.0));

    let mut clock = FrameClock::new();
    let mut frame = 0;
    while frame < MIN_FRAMES || gradual.is_running(&scheduler) || runner.active_count() > 0 {
        frame += 1;
        gradual.set_frame(frame);

        if frame == SECOND_MESSAGE_FRAME {
            work_demo::start_delayed_message(&mut runner)?;
        }

        scheduler.tick(FRAME);
        runner.tick(FRAME);
        crates.update(FRAME);
        clock.advance();

        if frame % 60 == 0 {
            log::debug!(
                "Frame {}: {} loops, {} work units, {} crates airborne",
                frame,
                scheduler.active_count(),
                runner.active_count(),
                crates.airborne()
            );
        }
    }

    let stats = crates.stats();
    log::info!(
        "Pool instantiated {} crates for {} emissions ({} recycled)",
        crates.instantiated(),
        stats.acquired,
        stats.released
    );
    log::info!(
        "Demo finished after {} frames ({:.2}s simulated, {:.2}s wall clock)",
        frame,
        FRAME.as_secs_f32() * clock.frame_count() as f32,
        clock.total().as_secs_f32()
    );
    Ok(())
}
