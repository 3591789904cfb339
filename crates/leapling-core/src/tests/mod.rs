//! Crate-level determinism and integration tests.
//!
//! - `determinism.rs`: same seed and inputs give identical worlds
//! - `integration.rs`: full frames through the simulation root
//! - `helpers.rs`: scenario builders, a recording sound system and a
//!   phase trace for script hooks

mod helpers;

pub use helpers::*;
