//! Event counters shared between the simulation and its observers.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::reporter::ReportHandle;
use super::GameEvent;
use crate::object::ObjectKind;

/// Running totals of recorded events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    /// Levels started.
    pub levels_started: u32,
    /// Objects that died, players included.
    pub deaths: u32,
    /// Player deaths.
    pub player_deaths: u32,
    /// Hits accepted.
    pub hits_landed: u32,
    /// Hits rejected.
    pub hits_rejected: u32,
    /// Items collected.
    pub pickups: u32,
}

impl Counters {
    fn apply(&mut self, event: &GameEvent) {
        match event {
            GameEvent::LevelStarted { .. } => self.levels_started += 1,
            GameEvent::ObjectDied { kind, .. } => {
                self.deaths += 1;
                if *kind == ObjectKind::Player {
                    self.player_deaths += 1;
                }
            }
            GameEvent::HitLanded { .. } => self.hits_landed += 1,
            GameEvent::HitRejected { .. } => self.hits_rejected += 1,
            GameEvent::PickupCollected { .. } => self.pickups += 1,
        }
    }
}

/// Cloneable recorder; clones share counters and reporter.
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    counters: Arc<Mutex<Counters>>,
    reporter: Option<ReportHandle>,
}

impl EventRecorder {
    /// Creates a recorder with zeroed counters and no reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forwards future events to a background reporter.
    pub fn attach(&mut self, reporter: ReportHandle) {
        self.reporter = Some(reporter);
    }

    /// Stops forwarding events.
    pub fn detach(&mut self) {
        self.reporter = None;
    }

    /// Counts `event` and forwards it if a reporter is attached.
    pub fn record(&self, event: GameEvent) {
        self.counters.lock().apply(&event);
        if let Some(reporter) = &self.reporter {
            reporter.report(event);
        }
    }

    /// Snapshot of the counters.
    #[must_use]
    pub fn counters(&self) -> Counters {
        *self.counters.lock()
    }

    /// Zeroes the counters.
    pub fn reset(&self) {
        *self.counters.lock() = Counters::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Pickup;
    use glam::Vec2;

    #[test]
    fn clones_share_counters() {
        let recorder = EventRecorder::new();
        let observer = recorder.clone();

        recorder.record(GameEvent::PickupCollected {
            pickup: Pickup::Coin,
        });
        recorder.record(GameEvent::ObjectDied {
            kind: ObjectKind::Player,
            position: Vec2::ZERO,
        });
        recorder.record(GameEvent::ObjectDied {
            kind: ObjectKind::Patroller,
            position: Vec2::ZERO,
        });

        let counters = observer.counters();
        assert_eq!(counters.pickups, 1);
        assert_eq!(counters.deaths, 2);
        assert_eq!(counters.player_deaths, 1);

        observer.reset();
        assert_eq!(recorder.counters(), Counters::default());
    }
}
