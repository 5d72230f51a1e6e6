//! # Frame Pipeline
//!
//! Turns one video frame into one decision:
//!
//! ```text
//! frame → classifier ──err──→ "neutral"
//!              │
//!              ok → label
//!                    │
//!      override set? ─yes→ override
//!                    │
//!      supported label? ─no→ neutral
//!                    │
//!          controller.request + log.append
//!                    │
//!          frame + capitalized label overlay
//! ```
//!
//! Classifier trouble never stops the music: a frame that cannot be read is
//! treated as `neutral`. Only a failing log write is reported to the caller.

use crate::classifier::EmotionClassifier;
use crate::emotion::{Emotion, OverrideSelector};
use crate::emotion_log::EmotionLog;
use crate::frame::Frame;
use crate::player::{AudioBackend, PlaybackController};
use anyhow::Result;
use log::debug;
use std::sync::Arc;

/// Result of processing one frame.
#[derive(Debug, Clone)]
pub struct ProcessedFrame {
    /// Frame with the label drawn on it.
    pub frame: Frame,
    /// Emotion sent to playback and the log.
    pub emotion: Emotion,
}

/// Frame classifier adapter: classify, decide, dispatch, annotate.
pub struct EmotionPipeline<C, B> {
    classifier: C,
    controller: Arc<PlaybackController<B>>,
    log: EmotionLog,
    override_selector: Arc<OverrideSelector>,
}

impl<C: EmotionClassifier, B: AudioBackend> EmotionPipeline<C, B> {
    pub fn new(
        classifier: C,
        controller: Arc<PlaybackController<B>>,
        log: EmotionLog,
        override_selector: Arc<OverrideSelector>,
    ) -> Self {
        Self {
            classifier,
            controller,
            log,
            override_selector,
        }
    }

    /// Emotion to act on for `frame`, without any side effects.
    pub fn classify(&mut self, frame: &Frame) -> Emotion {
        let label = match self.classifier.dominant_emotion(frame) {
            Ok(label) => label,
            Err(e) => {
                debug!("Classifier failed, assuming neutral: {e}");
                Emotion::Neutral.label().to_string()
            }
        };

        if let Some(forced) = self.override_selector.get() {
            return forced;
        }

        Emotion::from_label_or_neutral(&label)
    }

    /// Classifies `frame`, updates playback and the log, and returns the
    /// annotated frame.
    ///
    /// # Errors
    ///
    /// Only when the emotion log cannot be written.
    pub fn process(&mut self, frame: &Frame) -> Result<ProcessedFrame> {
        let emotion = self.classify(frame);

        self.controller.request(emotion);
        self.log.append(emotion)?;

        Ok(ProcessedFrame {
            frame: frame.annotated(emotion.display_label()),
            emotion,
        })
    }

    pub fn controller(&self) -> &Arc<PlaybackController<B>> {
        &self.controller
    }

    pub fn override_selector(&self) -> &Arc<OverrideSelector> {
        &self.override_selector
    }
}
