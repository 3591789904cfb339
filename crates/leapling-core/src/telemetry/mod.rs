//! Gameplay telemetry.
//!
//! The simulation records [`GameEvent`]s through an [`EventRecorder`], which
//! keeps running [`Counters`] and, when a reporter is attached, forwards each
//! event to a background [`EventReporter`]. The frame loop never blocks on
//! telemetry: a full queue drops the event and counts the drop, and transport
//! failures stay on the worker thread.

mod recorder;
mod reporter;

pub use recorder::{Counters, EventRecorder};
pub use reporter::{EventReporter, ReportHandle, ReportSink, ReporterConfig, ReporterStats, TelemetryError};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::collision::HitType;
use crate::object::{ObjectKind, Pickup};

/// Something worth counting happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    /// A level was loaded.
    LevelStarted {
        /// Level name.
        name: String,
        /// Objects spawned from the level data.
        objects: usize,
    },
    /// An object died.
    ObjectDied {
        /// What died.
        kind: ObjectKind,
        /// Where.
        position: Vec2,
    },
    /// A hit was accepted and applied.
    HitLanded {
        /// Attacker kind.
        attacker: ObjectKind,
        /// Victim kind.
        victim: ObjectKind,
        /// Hit type.
        hit_type: HitType,
    },
    /// A detected hit was rejected by the attacker.
    HitRejected {
        /// Hit type.
        hit_type: HitType,
    },
    /// An item was collected.
    PickupCollected {
        /// The item.
        pickup: Pickup,
    },
}
