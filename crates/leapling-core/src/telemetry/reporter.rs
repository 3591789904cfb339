//! Background event reporter.
//!
//! Events go through a bounded channel to a worker thread that batches them
//! and hands each batch to a [`ReportSink`]. Producers only ever `try_send`:
//! when the queue is full the event is dropped and counted, so the frame loop
//! is never stalled by a slow transport.
//!
//! Shutdown closes the channel by dropping the only sender. The worker drains
//! whatever is still queued, transmits it, and exits; [`EventReporter::shutdown`]
//! (or drop) joins it.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use parking_lot::Mutex;
//! use leapling_core::telemetry::{
//!     EventReporter, GameEvent, ReportSink, ReporterConfig, TelemetryError,
//! };
//!
//! struct Collect(Arc<Mutex<Vec<GameEvent>>>);
//! impl ReportSink for Collect {
//!     fn transmit(&mut self, batch: &[GameEvent]) -> Result<(), TelemetryError> {
//!         self.0.lock().extend_from_slice(batch);
//!         Ok(())
//!     }
//! }
//!
//! let received = Arc::new(Mutex::new(Vec::new()));
//! let reporter = EventReporter::spawn(ReporterConfig::default(), Collect(received.clone())).unwrap();
//! reporter.handle().report(GameEvent::LevelStarted { name: "1-1".into(), objects: 3 });
//! let stats = reporter.shutdown();
//!
//! assert_eq!(stats.sent, 1);
//! assert_eq!(received.lock().len(), 1);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::GameEvent;

/// Telemetry failures. None of them reach the simulation.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The sink could not deliver a batch.
    #[error("telemetry transport failed: {0}")]
    Transport(String),

    /// The worker thread could not be started.
    #[error("failed to start telemetry worker: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Destination for event batches. Runs on the worker thread.
pub trait ReportSink: Send + 'static {
    /// Delivers one batch.
    ///
    /// # Errors
    ///
    /// A failed batch is logged and discarded; it is not retried.
    fn transmit(&mut self, batch: &[GameEvent]) -> Result<(), TelemetryError>;
}

/// Queue and batch sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReporterConfig {
    /// Events buffered between producers and the worker.
    pub queue_capacity: usize,
    /// Most events handed to the sink at once.
    pub batch_size: usize,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 256,
            batch_size: 32,
        }
    }
}

/// Delivery totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReporterStats {
    /// Events delivered to the sink.
    pub sent: u64,
    /// Events in batches the sink rejected.
    pub failed: u64,
    /// Events dropped because the queue was full or closed.
    pub dropped: u64,
}

#[derive(Debug, Default)]
struct SharedStats {
    sent: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

impl SharedStats {
    fn snapshot(&self) -> ReporterStats {
        ReporterStats {
            sent: self.sent.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// Cloneable producer side of a reporter.
///
/// Clones share one sender slot owned by the reporter, so shutting the
/// reporter down closes the channel even while handles are still alive.
#[derive(Debug, Clone)]
pub struct ReportHandle {
    sender: Arc<Mutex<Option<Sender<GameEvent>>>>,
    stats: Arc<SharedStats>,
}

impl ReportHandle {
    /// Queues `event` without blocking. Returns `false` if it was dropped.
    pub fn report(&self, event: GameEvent) -> bool {
        let guard = self.sender.lock();
        let Some(sender) = guard.as_ref() else {
            self.stats.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        };
        match sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_) | TrySendError::Disconnected(_)) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    fn close(&self) {
        self.sender.lock().take();
    }
}

/// Owns the worker thread.
#[derive(Debug)]
pub struct EventReporter {
    handle: ReportHandle,
    worker: Option<JoinHandle<()>>,
}

impl EventReporter {
    /// Starts the worker thread delivering to `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::Spawn`] if the thread cannot be started.
    pub fn spawn<S: ReportSink>(config: ReporterConfig, sink: S) -> Result<Self, TelemetryError> {
        let (sender, receiver) = bounded(config.queue_capacity.max(1));
        let stats = Arc::new(SharedStats::default());
        let worker_stats = Arc::clone(&stats);
        let batch_size = config.batch_size.max(1);

        let worker = thread::Builder::new()
            .name("leapling-telemetry".into())
            .spawn(move || run_worker(&receiver, sink, batch_size, &worker_stats))?;

        tracing::debug!(
            queue_capacity = config.queue_capacity,
            batch_size,
            "telemetry reporter started"
        );
        Ok(Self {
            handle: ReportHandle {
                sender: Arc::new(Mutex::new(Some(sender))),
                stats,
            },
            worker: Some(worker),
        })
    }

    /// A producer handle for recorders.
    #[must_use]
    pub fn handle(&self) -> ReportHandle {
        self.handle.clone()
    }

    /// Current delivery totals.
    #[must_use]
    pub fn stats(&self) -> ReporterStats {
        self.handle.stats.snapshot()
    }

    /// Closes the queue, waits for the worker to drain it, and returns the
    /// final totals.
    #[must_use]
    pub fn shutdown(mut self) -> ReporterStats {
        self.stop();
        self.stats()
    }

    fn stop(&mut self) {
        self.handle.close();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("telemetry worker panicked");
            }
        }
    }
}

impl Drop for EventReporter {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker<S: ReportSink>(
    receiver: &Receiver<GameEvent>,
    mut sink: S,
    batch_size: usize,
    stats: &SharedStats,
) {
    let mut batch = Vec::with_capacity(batch_size);
    // `recv` fails only once the channel is closed and empty.
    while let Ok(first) = receiver.recv() {
        batch.push(first);
        while batch.len() < batch_size {
            match receiver.try_recv() {
                Ok(event) => batch.push(event),
                Err(_) => break,
            }
        }

        let count = batch.len() as u64;
        match sink.transmit(&batch) {
            Ok(()) => {
                stats.sent.fetch_add(count, Ordering::Relaxed);
            }
            Err(err) => {
                stats.failed.fetch_add(count, Ordering::Relaxed);
                tracing::warn!(%err, count, "telemetry batch dropped");
            }
        }
        batch.clear();
    }
    tracing::debug!("telemetry worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Pickup;

    #[derive(Clone, Default)]
    struct Collect {
        batches: Arc<Mutex<Vec<usize>>>,
        events: Arc<Mutex<Vec<GameEvent>>>,
    }

    impl ReportSink for Collect {
        fn transmit(&mut self, batch: &[GameEvent]) -> Result<(), TelemetryError> {
            self.batches.lock().push(batch.len());
            self.events.lock().extend_from_slice(batch);
            Ok(())
        }
    }

    struct Failing;

    impl ReportSink for Failing {
        fn transmit(&mut self, _batch: &[GameEvent]) -> Result<(), TelemetryError> {
            Err(TelemetryError::Transport("offline".into()))
        }
    }

    /// Blocks inside `transmit` until released, so the queue can fill up.
    struct Gate(crossbeam_channel::Receiver<()>);

    impl ReportSink for Gate {
        fn transmit(&mut self, _batch: &[GameEvent]) -> Result<(), TelemetryError> {
            let _ = self.0.recv();
            Ok(())
        }
    }

    fn coin() -> GameEvent {
        GameEvent::PickupCollected {
            pickup: Pickup::Coin,
        }
    }

    #[test]
    fn shutdown_drains_queued_events() {
        let sink = Collect::default();
        let reporter = EventReporter::spawn(ReporterConfig::default(), sink.clone()).unwrap();
        let handle = reporter.handle();
        for _ in 0..10 {
            assert!(handle.report(coin()));
        }
        let stats = reporter.shutdown();

        assert_eq!(stats.sent, 10);
        assert_eq!(sink.events.lock().len(), 10);
        assert!(sink.batches.lock().iter().all(|&len| len <= 32));
    }

    #[test]
    fn reports_after_shutdown_are_dropped() {
        let reporter = EventReporter::spawn(ReporterConfig::default(), Collect::default()).unwrap();
        let handle = reporter.handle();
        let _ = reporter.shutdown();

        assert!(!handle.report(coin()));
    }

    #[test]
    fn transport_failures_are_counted_not_raised() {
        let reporter = EventReporter::spawn(ReporterConfig::default(), Failing).unwrap();
        reporter.handle().report(coin());
        let stats = reporter.shutdown();
        assert_eq!(stats.sent, 0);
        assert_eq!(stats.failed, 1);
    }

    #[test]
    fn full_queue_drops_instead_of_blocking() {
        let (release, gate) = crossbeam_channel::unbounded();
        let config = ReporterConfig {
            queue_capacity: 1,
            batch_size: 1,
        };
        let reporter = EventReporter::spawn(config, Gate(gate)).unwrap();
        let handle = reporter.handle();

        // The worker holds at most one event in `transmit` and the queue one
        // more; the rest must be dropped.
        let accepted = (0..10).filter(|_| handle.report(coin())).count();
        assert!(accepted <= 2);
        assert!(reporter.stats().dropped >= 8);

        for _ in 0..10 {
            release.send(()).unwrap();
        }
        let stats = reporter.shutdown();
        assert_eq!(stats.sent as usize, accepted);
    }
}
