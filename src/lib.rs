//! Music player that follows the mood on your face.
//!
//! Frames from a webcam (or a directory of stills) are classified by an
//! external emotion model; whenever the dominant emotion changes, a random
//! track from that emotion's folder starts looping. Every decision is
//! appended to a CSV log, and a window shows the annotated feed with a
//! selector to force an emotion.
//!
//! Core modules:
//! - [`emotion`] - The four supported emotions and the override cell
//! - [`catalog`] - Songs directory scanning and validation
//! - [`player`] - Playback controller and audio backend trait
//! - [`emotion_log`] - Append-only CSV emotion log
//! - [`pipeline`] - Per-frame classify, dispatch, log, annotate
//!
//! ### Supporting Modules
//!
//! - [`classifier`] - External classifier adapter
//! - [`frame`] - RGB frames and label overlay
//! - [`source`] - Camera and image-directory frame sources
//! - [`runner`] - Frame loop, headless or on a worker thread
//! - [`config`] - Configuration file handling
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`completion`] - Shell completion generation
//!
//! ## Quick Start Example
//!
//! ```no_run
//! use emotion_dj::catalog::TrackCatalog;
//! use emotion_dj::classifier::UnavailableClassifier;
//! use emotion_dj::emotion::OverrideSelector;
//! use emotion_dj::emotion_log::EmotionLog;
//! use emotion_dj::frame::Frame;
//! use emotion_dj::pipeline::EmotionPipeline;
//! use emotion_dj::player::{PlaybackController, SilentBackend};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let catalog = Arc::new(TrackCatalog::scan(Path::new("songs"), &["mp3"])?);
//! let controller = Arc::new(PlaybackController::new(catalog, SilentBackend::default()));
//! let mut pipeline = EmotionPipeline::new(
//!     UnavailableClassifier,
//!     controller,
//!     EmotionLog::new("emotion_log.csv"),
//!     Arc::new(OverrideSelector::default()),
//! );
//!
//! let frame = Frame::blank(640, 480, image::Rgb([0, 0, 0]));
//! let processed = pipeline.process(&frame)?;
//! println!("Playing music for {}", processed.emotion);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Handling
//!
//! Application code returns `anyhow::Result`. Two seams use typed errors:
//! [`catalog::CatalogError`] stops startup, [`classifier::ClassifyError`] is
//! absorbed per frame by falling back to `neutral`.
//!
//! ## Features
//!
//! - `audio` (default): sound output through rodio
//! - `gui` (default): eframe window
//! - `camera`: live webcam capture through nokhwa

pub mod catalog;
pub mod classifier;
pub mod cli;
pub mod completion;
pub mod config;
pub mod emotion;
pub mod emotion_log;
pub mod frame;
pub mod pipeline;
#[cfg(feature = "audio")]
pub mod playback;
pub mod player;
pub mod runner;
pub mod source;
#[cfg(feature = "gui")]
pub mod ui;
