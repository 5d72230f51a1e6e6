//! # Emotion Labels
//!
//! The closed set of moods the player understands. The lowercase label is
//! used everywhere a mood is written down: song directory names, log rows,
//! classifier output and the override selector.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

/// One of the four supported moods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Neutral,
}

impl Emotion {
    /// Every supported emotion, in display order.
    pub const ALL: [Emotion; 4] = [Emotion::Happy, Emotion::Sad, Emotion::Angry, Emotion::Neutral];

    /// Lowercase label (`"happy"`), used for directories and log rows.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Neutral => "neutral",
        }
    }

    /// Capitalized label (`"Happy"`), used for the frame overlay.
    #[must_use]
    pub const fn display_label(self) -> &'static str {
        match self {
            Emotion::Happy => "Happy",
            Emotion::Sad => "Sad",
            Emotion::Angry => "Angry",
            Emotion::Neutral => "Neutral",
        }
    }

    /// Maps any classifier label onto the supported set.
    ///
    /// Labels the player has no music for (`fear`, `surprise`, `disgust`, ...)
    /// become [`Emotion::Neutral`].
    #[must_use]
    pub fn from_label_or_neutral(label: &str) -> Self {
        label.parse().unwrap_or(Emotion::Neutral)
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a string is not one of the supported labels.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown emotion '{0}', expected one of: happy, sad, angry, neutral")]
pub struct UnknownEmotion(pub String);

impl FromStr for Emotion {
    type Err = UnknownEmotion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "happy" => Ok(Emotion::Happy),
            "sad" => Ok(Emotion::Sad),
            "angry" => Ok(Emotion::Angry),
            "neutral" => Ok(Emotion::Neutral),
            _ => Err(UnknownEmotion(s.to_string())),
        }
    }
}

/// Parses an override value where `none` (or an empty string) disables it.
pub fn parse_override(value: &str) -> Result<Option<Emotion>, UnknownEmotion> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "none" => Ok(None),
        other => other.parse().map(Some),
    }
}

/// The user-selected override, shared between the UI and the frame pipeline.
#[derive(Debug, Default)]
pub struct OverrideSelector {
    selected: Mutex<Option<Emotion>>,
}

impl OverrideSelector {
    pub fn new(initial: Option<Emotion>) -> Self {
        Self {
            selected: Mutex::new(initial),
        }
    }

    /// Currently forced emotion, if any.
    pub fn get(&self) -> Option<Emotion> {
        match self.selected.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn set(&self, emotion: Option<Emotion>) {
        match self.selected.lock() {
            Ok(mut guard) => *guard = emotion,
            Err(poisoned) => *poisoned.into_inner() = emotion,
        }
    }
}
