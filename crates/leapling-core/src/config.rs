//! Simulation configuration.
//!
//! Every capacity the core reserves up front lives here. The defaults suit a
//! single platformer level; content that needs more raises them instead of
//! relying on anything growing at runtime.
//!
//! # Example
//!
//! ```
//! use leapling_core::config::SimConfig;
//! use stash::OverflowPolicy;
//!
//! let config = SimConfig::from_json(r#"{ "object_capacity": 32, "overflow_policy": "ignore" }"#).unwrap();
//! assert_eq!(config.object_capacity, 32);
//! assert_eq!(config.overflow_policy, OverflowPolicy::Ignore);
//! // Unspecified fields keep their defaults
//! assert_eq!(config.collision_capacity, SimConfig::default().collision_capacity);
//! ```

use serde::{Deserialize, Serialize};
use stash::OverflowPolicy;

use crate::error::{SimError, SimResult};

/// Capacities and tuning shared by every subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Game objects pre-built in the object pool.
    pub object_capacity: usize,
    /// Components one object can hold.
    pub components_per_object: usize,
    /// Pending add/remove lists and the mid-frame spawn queue.
    pub pending_capacity: usize,
    /// Collision records registered per frame.
    pub collision_capacity: usize,
    /// Draw commands scheduled per frame.
    pub render_capacity: usize,
    /// What per-frame registries do when full.
    pub overflow_policy: OverflowPolicy,
    /// Default downward acceleration for physics components (units/s², y up).
    pub gravity: f32,
    /// Seconds a touched surface still counts as "touching".
    pub surface_decay: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            object_capacity: 256,
            components_per_object: 16,
            pending_capacity: 64,
            collision_capacity: 256,
            render_capacity: 512,
            overflow_policy: OverflowPolicy::Error,
            gravity: -400.0,
            surface_decay: 0.3,
        }
    }
}

impl SimConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] if the JSON is malformed.
    pub fn from_json(json: &str) -> SimResult<Self> {
        serde_json::from_str(json).map_err(SimError::Config)
    }

    /// Serializes the configuration to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] if serialization fails.
    pub fn to_json(&self) -> SimResult<String> {
        serde_json::to_string_pretty(self).map_err(SimError::Config)
    }
}
