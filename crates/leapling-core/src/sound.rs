//! Sound playback interface.
//!
//! The core never mixes audio. Components and the hit arbiter ask an optional
//! [`SoundSystem`] to start streams; with no sound system installed, requests
//! are skipped.

use serde::{Deserialize, Serialize};

/// A loaded sound asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SoundHandle(pub u16);

/// A playing stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamId(pub u32);

/// Priority for gameplay feedback such as hits and pickups.
pub const PRIORITY_NORMAL: u8 = 1;
/// Priority for sounds that must not be cut (player death).
pub const PRIORITY_HIGH: u8 = 2;

/// Starts and stops sound streams.
pub trait SoundSystem: Send {
    /// Starts `sound`. Returns `None` if no stream was available.
    fn play(&mut self, sound: SoundHandle, looped: bool, priority: u8) -> Option<StreamId>;

    /// Stops a stream started by [`play`](Self::play).
    fn stop(&mut self, _stream: StreamId) {}
}
