//! Named value channels.
//!
//! A channel is a named slot carrying one [`ChannelValue`]. Objects and the
//! HUD communicate through channels without holding references to each other:
//! the inventory writes `"coins"`, a door reads `"switch"`.
//!
//! There are exactly [`MAX_CHANNELS`] slots. Names are registered during level
//! setup; registering the same name twice returns the existing slot. Lookups
//! by name binary-search an index of slot numbers kept sorted by name, with
//! unnamed slots sorted last.
//!
//! # Example
//!
//! ```
//! use leapling_core::channel::{ChannelSystem, ChannelValue};
//!
//! let mut channels = ChannelSystem::new();
//! let coins = channels.register("coins").unwrap();
//! assert_eq!(channels.register("coins"), Some(coins));
//!
//! channels.set(coins, ChannelValue::Float(3.0));
//! assert_eq!(channels.find("coins").map(|id| channels.get(id)), Some(ChannelValue::Float(3.0)));
//! ```

use std::cmp::Ordering;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use stash::{FixedVec, InsertionSort};

/// Number of channel slots.
pub const MAX_CHANNELS: usize = 8;

/// Value carried by a channel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum ChannelValue {
    /// Nothing written yet.
    #[default]
    None,
    /// A scalar.
    Float(f32),
    /// A flag.
    Bool(bool),
    /// A vector.
    Vector(Vec2),
}

impl ChannelValue {
    /// Returns the scalar, if this is a float.
    #[must_use]
    pub fn as_float(self) -> Option<f32> {
        match self {
            Self::Float(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the flag, if this is a bool.
    #[must_use]
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the vector, if this is a vector.
    #[must_use]
    pub fn as_vector(self) -> Option<Vec2> {
        match self {
            Self::Vector(value) => Some(value),
            _ => None,
        }
    }
}

/// Slot number of a registered channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(u8);

impl ChannelId {
    /// Slot index.
    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

#[derive(Debug, Clone, Default)]
struct Channel {
    name: Option<String>,
    value: ChannelValue,
}

/// The fixed table of channels.
#[derive(Debug, Clone)]
pub struct ChannelSystem {
    slots: [Channel; MAX_CHANNELS],
    /// Slot indices ordered by name, unnamed slots last.
    by_name: FixedVec<u8>,
    registered: usize,
}

impl Default for ChannelSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Orders a slot against a name. Unnamed slots compare greater than any name.
fn slot_against_name(slots: &[Channel], slot: u8, name: &str) -> Ordering {
    match &slots[usize::from(slot)].name {
        Some(slot_name) => slot_name.as_str().cmp(name),
        None => Ordering::Greater,
    }
}

impl ChannelSystem {
    /// Creates a table of [`MAX_CHANNELS`] unnamed slots.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new() -> Self {
        let mut by_name = FixedVec::new(MAX_CHANNELS);
        for slot in 0..MAX_CHANNELS as u8 {
            // Sized for exactly MAX_CHANNELS entries.
            let _ = by_name.push(slot);
        }
        Self {
            slots: Default::default(),
            by_name,
            registered: 0,
        }
    }

    /// Registers `name`, or returns its slot if already registered.
    ///
    /// Returns `None` once every slot is taken.
    #[allow(clippy::cast_possible_truncation)]
    pub fn register(&mut self, name: &str) -> Option<ChannelId> {
        if let Some(id) = self.find(name) {
            return Some(id);
        }
        if self.registered >= MAX_CHANNELS {
            tracing::warn!(name, "channel table full, registration refused");
            return None;
        }

        let slot = self.registered;
        self.slots[slot].name = Some(name.to_owned());
        self.registered += 1;

        let slots = &self.slots;
        self.by_name.sort(
            &InsertionSort,
            &|a: &u8, b: &u8| match (&slots[usize::from(*a)].name, &slots[usize::from(*b)].name) {
                (Some(a), Some(b)) => a.cmp(b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => a.cmp(b),
            },
            true,
        );
        tracing::debug!(name, slot, "channel registered");
        Some(ChannelId(slot as u8))
    }

    /// Looks up a registered name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<ChannelId> {
        let slots = &self.slots;
        self.by_name
            .find(name, &|slot: &u8, key: &str| slot_against_name(slots, *slot, key), true)
            .map(|index| ChannelId(self.by_name[index]))
    }

    /// Writes a channel's value.
    pub fn set(&mut self, id: ChannelId, value: ChannelValue) {
        self.slots[id.index()].value = value;
    }

    /// Reads a channel's value.
    #[must_use]
    pub fn get(&self, id: ChannelId) -> ChannelValue {
        self.slots[id.index()].value
    }

    /// Returns a channel's registered name.
    #[must_use]
    pub fn name(&self, id: ChannelId) -> Option<&str> {
        self.slots[id.index()].name.as_deref()
    }

    /// Number of registered channels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registered
    }

    /// Returns `true` if no channel is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registered == 0
    }

    /// Clears every value, keeping the registered names.
    pub fn reset_values(&mut self) {
        for slot in &mut self.slots {
            slot.value = ChannelValue::None;
        }
    }
}
