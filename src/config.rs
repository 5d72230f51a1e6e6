//! # Configuration Module
//!
//! Settings for where songs live, where the emotion log goes and how frames
//! are classified. Values come from three layers, later ones winning:
//!
//! 1. built-in defaults (`songs/`, `emotion_log.csv`, `.mp3`, no classifier),
//! 2. `config.json` in the platform config directory,
//! 3. command-line flags.
//!
//! ## Config File Location
//!
//! - Linux: `~/.config/emotion-dj/config.json`
//! - macOS: `~/Library/Application Support/emotion-dj/config.json`
//! - Windows: `%APPDATA%\emotion-dj\config.json`
//!
//! ```json
//! {
//!   "songs_dir": "/home/me/Music/moods",
//!   "classifier_command": ["python3", "/home/me/bin/classify_face.py"]
//! }
//! ```

use crate::catalog::DEFAULT_EXTENSIONS;
use anyhow::{Context, Result};
use path_absolutize::Absolutize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the config file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Returns the platform config directory for emotion-dj.
///
/// The directory is not created; a missing config file simply means
/// defaults are used.
///
/// # Errors
///
/// Returns an error if the platform has no standard config directory.
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| {
        anyhow::anyhow!("Could not determine system config directory. Please pass settings on the command line instead.")
    })?;
    Ok(config_dir.join("emotion-dj"))
}

/// Returns the path of the config file.
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(CONFIG_FILE_NAME))
}

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Root containing one sub-directory per emotion
    pub songs_dir: PathBuf,
    /// CSV file emotions are appended to
    pub log_file: PathBuf,
    /// Audio file extensions to index, without the dot
    pub extensions: Vec<String>,
    /// External classifier program and arguments; empty disables classification
    pub classifier_command: Vec<String>,
    /// Delay between replayed still frames, in milliseconds
    pub frame_interval_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            songs_dir: PathBuf::from("songs"),
            log_file: PathBuf::from("emotion_log.csv"),
            extensions: DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect(),
            classifier_command: Vec::new(),
            frame_interval_ms: 200,
        }
    }
}

impl AppConfig {
    /// Loads the user config file, or defaults when there is none.
    pub fn load() -> Result<Self> {
        match get_config_path() {
            Ok(path) => Self::load_from(&path),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Loads `path`, or defaults when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is not valid JSON for this
    /// structure.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("Invalid config file {}. Please check the JSON syntax.", path.display()))
    }

    /// Makes `songs_dir` and `log_file` absolute against the working directory.
    pub fn absolutized(mut self) -> Result<Self> {
        self.songs_dir = absolutize(&self.songs_dir)?;
        self.log_file = absolutize(&self.log_file)?;
        Ok(self)
    }
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    Ok(path
        .absolutize()
        .with_context(|| format!("Failed to resolve path {}", path.display()))?
        .into_owned())
}
