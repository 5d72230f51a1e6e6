//! # Emotion Classifiers
//!
//! The face/emotion model lives outside this crate. A classifier only has to
//! name the dominant emotion of a frame, or say why it could not:
//! failures are ordinary values here, and the frame pipeline decides what to
//! do with them.
//!
//! [`CommandClassifier`] drives any external program. The frame is written to
//! a temporary PNG whose path becomes the last argument, and the answer is
//! read from stdout. Accepted answers:
//!
//! ```text
//! happy
//! {"dominant_emotion": "happy"}
//! [{"dominant_emotion": "happy", "emotion": {...}}]
//! ```

use crate::frame::Frame;
use log::debug;
use serde_json::Value;
use std::process::Command;
use thiserror::Error;

/// Why a frame could not be classified.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("no classifier configured")]
    Unavailable,

    #[error("failed to hand the frame to the classifier: {0}")]
    Frame(String),

    #[error("failed to run classifier '{program}'")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("classifier exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("unrecognized classifier output: {0}")]
    Output(String),
}

/// Names the dominant emotion in a frame.
///
/// The returned label is whatever the model produced (`"fear"` included);
/// mapping it onto the supported set is the caller's job.
pub trait EmotionClassifier {
    fn dominant_emotion(&mut self, frame: &Frame) -> Result<String, ClassifyError>;
}

impl<C: EmotionClassifier + ?Sized> EmotionClassifier for Box<C> {
    fn dominant_emotion(&mut self, frame: &Frame) -> Result<String, ClassifyError> {
        (**self).dominant_emotion(frame)
    }
}

/// Classifier used when none is configured: every frame fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableClassifier;

impl EmotionClassifier for UnavailableClassifier {
    fn dominant_emotion(&mut self, _frame: &Frame) -> Result<String, ClassifyError> {
        Err(ClassifyError::Unavailable)
    }
}

/// Runs an external program per frame.
#[derive(Debug, Clone)]
pub struct CommandClassifier {
    program: String,
    args: Vec<String>,
}

impl CommandClassifier {
    /// `command` is the program followed by its fixed arguments.
    ///
    /// Returns `None` for an empty command.
    pub fn new<I, S>(command: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parts = command.into_iter().map(Into::into);
        let program = parts.next().filter(|p: &String| !p.trim().is_empty())?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl EmotionClassifier for CommandClassifier {
    fn dominant_emotion(&mut self, frame: &Frame) -> Result<String, ClassifyError> {
        let temp = tempfile::Builder::new()
            .prefix("emotion-dj-frame-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| ClassifyError::Frame(e.to_string()))?;

        frame
            .image()
            .save_with_format(temp.path(), image::ImageFormat::Png)
            .map_err(|e| ClassifyError::Frame(e.to_string()))?;

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(temp.path())
            .output()
            .map_err(|source| ClassifyError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ClassifyError::Failed {
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let label = parse_classifier_output(&stdout)?;
        debug!("Classifier '{}' answered {label}", self.program);
        Ok(label)
    }
}

/// Extracts the dominant emotion from classifier stdout.
pub fn parse_classifier_output(stdout: &str) -> Result<String, ClassifyError> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Err(ClassifyError::Output("empty output".to_string()));
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => dominant_from_json(&value).ok_or_else(|| ClassifyError::Output(trimmed.to_string())),
        Err(_) if is_bare_label(trimmed) => Ok(trimmed.to_ascii_lowercase()),
        Err(_) => Err(ClassifyError::Output(trimmed.to_string())),
    }
}

fn dominant_from_json(value: &Value) -> Option<String> {
    match value {
        Value::String(label) if is_bare_label(label) => Some(label.to_ascii_lowercase()),
        Value::Object(map) => map.get("dominant_emotion").and_then(Value::as_str).map(str::to_ascii_lowercase),
        Value::Array(items) => items.first().and_then(dominant_from_json),
        _ => None,
    }
}

fn is_bare_label(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_alphabetic() || c == '_')
}
