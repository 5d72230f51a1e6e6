//! # Playback Controller
//!
//! Decides when the music changes. The controller remembers which emotion is
//! currently playing and only touches the audio backend when a different
//! emotion is requested:
//!
//! ```text
//! request(e):  e == current  →  nothing
//!              e != current  →  stop, pick random track of e, loop it, current = e
//! ```
//!
//! All of this happens under a single mutex so frames processed on different
//! threads can never interleave a stop/select/play sequence.

use crate::catalog::TrackCatalog;
use crate::emotion::Emotion;
use anyhow::Result;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Something that can play one track on repeat.
pub trait AudioBackend {
    /// Halts whatever is playing. Stopping silence is a no-op.
    fn stop(&mut self);

    /// Loads `track` and plays it looped until the next `stop`.
    fn play_looped(&mut self, track: &Path) -> Result<()>;
}

impl<B: AudioBackend + ?Sized> AudioBackend for Box<B> {
    fn stop(&mut self) {
        (**self).stop();
    }

    fn play_looped(&mut self, track: &Path) -> Result<()> {
        (**self).play_looped(track)
    }
}

/// Backend without sound output; reports track changes through the log.
#[derive(Debug, Default)]
pub struct SilentBackend {
    now_playing: Option<PathBuf>,
}

impl SilentBackend {
    pub fn now_playing(&self) -> Option<&Path> {
        self.now_playing.as_deref()
    }
}

impl AudioBackend for SilentBackend {
    fn stop(&mut self) {
        if let Some(track) = self.now_playing.take() {
            debug!("(muted) stopped {}", track.display());
        }
    }

    fn play_looped(&mut self, track: &Path) -> Result<()> {
        info!("(muted) now looping {}", track.display());
        self.now_playing = Some(track.to_path_buf());
        Ok(())
    }
}

struct PlaybackState<B> {
    current: Option<Emotion>,
    backend: B,
    rng: StdRng,
}

/// Switches looping music whenever a new emotion is requested.
pub struct PlaybackController<B> {
    catalog: Arc<TrackCatalog>,
    state: Mutex<PlaybackState<B>>,
}

impl<B: AudioBackend> PlaybackController<B> {
    pub fn new(catalog: Arc<TrackCatalog>, backend: B) -> Self {
        Self::with_rng(catalog, backend, StdRng::from_entropy())
    }

    /// Same as [`PlaybackController::new`] with a caller-provided RNG, so
    /// track selection can be reproduced.
    pub fn with_rng(catalog: Arc<TrackCatalog>, backend: B, rng: StdRng) -> Self {
        Self {
            catalog,
            state: Mutex::new(PlaybackState {
                current: None,
                backend,
                rng,
            }),
        }
    }

    /// Plays music for `emotion` unless it is already playing.
    ///
    /// Backend failures are logged, not returned. The old music is already
    /// stopped when the new track fails to start, so nothing counts as
    /// playing afterwards and the next request of any emotion starts music.
    pub fn request(&self, emotion: Emotion) {
        let mut state = self.lock();
        if state.current == Some(emotion) {
            return;
        }

        state.backend.stop();

        let PlaybackState { backend, rng, current } = &mut *state;
        let Some(track) = self.catalog.pick(emotion, rng) else {
            warn!("No tracks available for {emotion}");
            *current = None;
            return;
        };

        match backend.play_looped(track) {
            Ok(()) => {
                info!("Mood changed to {emotion}: playing {}", track.display());
                *current = Some(emotion);
            }
            Err(e) => {
                warn!("Failed to play {} for {emotion}: {e:#}", track.display());
                *current = None;
            }
        }
    }

    /// Halts playback.
    ///
    /// The current emotion is kept, so a following `request` for the same
    /// emotion does not restart the music.
    pub fn stop(&self) {
        self.lock().backend.stop();
        debug!("Playback stopped");
    }

    /// Emotion whose music was last started.
    pub fn current(&self) -> Option<Emotion> {
        self.lock().current
    }

    /// Runs `f` with the backend while holding the playback lock.
    pub fn with_backend<T>(&self, f: impl FnOnce(&B) -> T) -> T {
        f(&self.lock().backend)
    }

    fn lock(&self) -> MutexGuard<'_, PlaybackState<B>> {
        // A panic inside the backend must not take the whole pipeline down.
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
