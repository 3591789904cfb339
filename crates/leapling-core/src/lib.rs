//! # Leapling Core
//!
//! Frame-stepped simulation core for a 2D action platformer.
//!
//! This crate runs the game world without any platform layer: no window, no
//! audio device, no GPU. Rendering and sound are reached through traits, so a
//! headless runner (see `leapling-headless`) and a real front end drive the
//! same code.
//!
//! ## Architecture
//!
//! - **Objects**: pooled [`GameObject`](object::GameObject)s holding shared
//!   state and a phase-sorted list of components
//! - **Components**: small behaviours bound to one [`Phase`](phase::Phase)
//!   (input, patrol AI, movement, physics, collision, lifetime, animation,
//!   drawing)
//! - **Systems**: one [`Systems`](systems::Systems) value owned by the
//!   simulation: clocks, input, channels, collision registry, render queue,
//!   telemetry
//!
//! Storage never grows after construction; capacities come from
//! [`SimConfig`](config::SimConfig) and overflow is reported as
//! [`SimError::ResourceExhaustion`].
//!
//! ## Usage
//!
//! ```
//! use leapling_core::config::SimConfig;
//! use leapling_core::object::LevelData;
//! use leapling_core::Simulation;
//!
//! let level = LevelData::from_json(r#"{
//!     "name": "1-1",
//!     "records": [ { "id": 1, "kind": "player", "position": [0.0, 0.0] } ],
//!     "solids": [ { "min": [-200.0, -16.0], "max": [200.0, 0.0] } ]
//! }"#).unwrap();
//!
//! let mut sim = Simulation::new(SimConfig::default(), 1);
//! sim.load_level(&level).unwrap();
//! for _ in 0..60 {
//!     sim.step(1.0 / 60.0).unwrap();
//! }
//! assert_eq!(sim.objects().len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

// Re-export stash for pools and fixed-capacity lists
pub use stash;

pub mod channel;
pub mod collision;
pub mod components;
pub mod config;
pub mod error;
pub mod input;
pub mod math;
pub mod object;
pub mod phase;
pub mod preferences;
pub mod render;
pub mod simulation;
pub mod sound;
pub mod systems;
pub mod telemetry;
pub mod time;

pub use error::{SimError, SimResult};
pub use simulation::Simulation;

#[cfg(test)]
mod tests;
