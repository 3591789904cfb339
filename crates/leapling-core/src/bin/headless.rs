//! Headless runner.
//!
//! Loads a level, steps it at 60 frames per second of simulated time and logs
//! the resulting counters. Useful for soak runs and for checking that a level
//! file parses and plays.
//!
//! ```text
//! leapling-headless [LEVEL.json] [FRAMES]
//! ```
//!
//! Without a level file a small built-in level is played. Set `RUST_LOG` to
//! control log output (for example `RUST_LOG=leapling_core=debug`).

use std::error::Error;
use std::fs;

use tracing::{info, trace};
use tracing_subscriber::EnvFilter;

use leapling_core::config::SimConfig;
use leapling_core::input::keys;
use leapling_core::object::LevelData;
use leapling_core::telemetry::{
    EventReporter, GameEvent, ReportSink, ReporterConfig, TelemetryError,
};
use leapling_core::Simulation;

const FRAME: f32 = 1.0 / 60.0;
const DEFAULT_FRAMES: u64 = 600;

const DEMO_LEVEL: &str = r#"{
    "name": "demo",
    "records": [
        { "id": 1, "kind": "player", "position": [0.0, 0.0] },
        { "id": 2, "kind": "coin", "position": [96.0, 8.0] },
        { "id": 3, "kind": "coin", "position": [160.0, 8.0] },
        { "id": 4, "kind": "button", "position": [240.0, 0.0] },
        { "id": 5, "kind": "patroller", "position": [480.0, 0.0], "params": { "facing": -1.0 } },
        { "id": 6, "kind": "spring", "position": [640.0, 0.0] }
    ],
    "solids": [
        { "min": [-512.0, -32.0], "max": [1024.0, 0.0] },
        { "min": [-544.0, 0.0], "max": [-512.0, 256.0] },
        { "min": [1024.0, 0.0], "max": [1056.0, 256.0] }
    ]
}"#;

/// Writes each telemetry batch to the log.
struct LogSink;

impl ReportSink for LogSink {
    fn transmit(&mut self, batch: &[GameEvent]) -> Result<(), TelemetryError> {
        for event in batch {
            let line = serde_json::to_string(event)
                .map_err(|err| TelemetryError::Transport(err.to_string()))?;
            info!(target: "leapling_core::telemetry", "{line}");
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("leapling_headless=info".parse()?),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let level = match args.next() {
        Some(path) => LevelData::from_json(&fs::read_to_string(&path)?)?,
        None => LevelData::from_json(DEMO_LEVEL)?,
    };
    let frames = match args.next() {
        Some(count) => count.parse()?,
        None => DEFAULT_FRAMES,
    };

    let reporter = EventReporter::spawn(ReporterConfig::default(), LogSink)?;
    let mut sim = Simulation::new(SimConfig::default(), 0x1ea9);
    sim.systems_mut().recorder.attach(reporter.handle());
    sim.load_level(&level)?;
    info!(level = %level.name, frames, "headless run starting");

    for frame in 0..frames {
        // Run right for two seconds, hopping once a second.
        let now = sim.systems().time.real_time();
        let input = &mut sim.systems_mut().input;
        match frame {
            0 => input.press_button(keys::RIGHT, now),
            120 => input.release_button(keys::RIGHT),
            _ if frame % 60 == 30 => input.press_button(keys::JUMP, now),
            _ if frame % 60 == 32 => input.release_button(keys::JUMP),
            _ => {}
        }
        sim.step(FRAME)?;
        let drawn = sim.systems_mut().render.drain().count();
        trace!(frame, drawn, "frame drawn");
    }

    let counters = sim.systems().recorder.counters();
    sim.systems_mut().recorder.detach();
    let stats = reporter.shutdown();
    info!(
        frames = sim.frame(),
        game_time = sim.systems().time.game_time(),
        active = sim.objects().len(),
        deaths = counters.deaths,
        hits = counters.hits_landed,
        pickups = counters.pickups,
        "headless run finished"
    );
    info!(
        sent = stats.sent,
        failed = stats.failed,
        dropped = stats.dropped,
        "telemetry delivered"
    );
    Ok(())
}
