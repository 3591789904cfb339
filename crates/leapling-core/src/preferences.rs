//! Persistent player preferences.
//!
//! A flat key/value store serialized as JSON. Level progress is checkpointed
//! after each completed level; a failed checkpoint is logged and otherwise
//! ignored so that a full disk never interrupts play.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Key of the highest unlocked level.
pub const LEVEL_PROGRESS: &str = "level_progress";
/// Key of the difficulty setting.
pub const DIFFICULTY: &str = "difficulty";
/// Key of the movement-axis sensitivity.
pub const INPUT_SENSITIVITY: &str = "input_sensitivity";

/// Preference load/save failures.
#[derive(Error, Debug)]
pub enum PreferencesError {
    /// The JSON could not be read or written.
    #[error("preferences format error: {0}")]
    Format(#[from] serde_json::Error),
}

/// One stored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrefValue {
    /// A flag.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A real number.
    Float(f64),
    /// Text.
    Text(String),
}

/// Game difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// More life, fewer enemies.
    Easy,
    /// Default.
    #[default]
    Normal,
    /// Less life.
    Hard,
}

impl Difficulty {
    fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Normal => "normal",
            Self::Hard => "hard",
        }
    }

    fn parse(text: &str) -> Option<Self> {
        match text {
            "easy" => Some(Self::Easy),
            "normal" => Some(Self::Normal),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }
}

/// Key/value preference store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Preferences {
    values: BTreeMap<String, PrefValue>,
}

impl Preferences {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a store from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`PreferencesError::Format`] if the input is unreadable or not
    /// a JSON object.
    pub fn load<R: Read>(reader: R) -> Result<Self, PreferencesError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Writes the store as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`PreferencesError::Format`] if writing fails.
    pub fn save<W: Write>(&self, writer: W) -> Result<(), PreferencesError> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Saves, logging instead of failing. Returns `true` on success.
    pub fn checkpoint<W: Write>(&self, writer: W) -> bool {
        match self.save(writer) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(%err, "preferences checkpoint failed");
                false
            }
        }
    }

    /// Raw value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PrefValue> {
        self.values.get(key)
    }

    /// Stores `value` under `key`.
    pub fn set(&mut self, key: &str, value: PrefValue) {
        self.values.insert(key.to_owned(), value);
    }

    /// Integer under `key`, or `default`.
    #[must_use]
    pub fn int(&self, key: &str, default: i64) -> i64 {
        match self.get(key) {
            Some(PrefValue::Int(value)) => *value,
            _ => default,
        }
    }

    /// Number under `key` (integers widen), or `default`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn float(&self, key: &str, default: f64) -> f64 {
        match self.get(key) {
            Some(PrefValue::Float(value)) => *value,
            Some(PrefValue::Int(value)) => *value as f64,
            _ => default,
        }
    }

    /// Flag under `key`, or `default`.
    #[must_use]
    pub fn bool(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(PrefValue::Bool(value)) => *value,
            _ => default,
        }
    }

    /// Highest unlocked level, 0 if none.
    #[must_use]
    pub fn level_progress(&self) -> u32 {
        u32::try_from(self.int(LEVEL_PROGRESS, 0)).unwrap_or(0)
    }

    /// Records `level` as unlocked. Progress never goes backwards.
    pub fn unlock_level(&mut self, level: u32) {
        if level > self.level_progress() {
            self.set(LEVEL_PROGRESS, PrefValue::Int(i64::from(level)));
        }
    }

    /// Stored difficulty, or the default.
    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        match self.get(DIFFICULTY) {
            Some(PrefValue::Text(text)) => Difficulty::parse(text).unwrap_or_default(),
            _ => Difficulty::default(),
        }
    }

    /// Stores the difficulty.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.set(DIFFICULTY, PrefValue::Text(difficulty.as_str().to_owned()));
    }
}
