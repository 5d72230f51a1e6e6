//! # Track Catalog
//!
//! Maps every [`Emotion`] to the music files that can be played for it. The
//! catalog is built once at startup from a songs directory laid out as
//!
//! ```text
//! songs/
//!   happy/    *.mp3
//!   sad/      *.mp3
//!   angry/    *.mp3
//!   neutral/  *.mp3
//! ```
//!
//! A missing or empty emotion directory is fatal: the player never starts
//! with a mood it has no music for.

use crate::emotion::Emotion;
use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default audio extensions indexed by the scanner.
pub const DEFAULT_EXTENSIONS: &[&str] = &["mp3"];

/// Startup errors raised while building the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no '{emotion}' directory found at {}", path.display())]
    MissingDirectory { emotion: Emotion, path: PathBuf },

    #[error("no {extensions} files found in '{emotion}' folder {}", path.display())]
    NoTracks {
        emotion: Emotion,
        path: PathBuf,
        extensions: String,
    },

    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Emotion → playable tracks. Every emotion has at least one track.
#[derive(Debug, Clone)]
pub struct TrackCatalog {
    root: PathBuf,
    tracks: HashMap<Emotion, Vec<PathBuf>>,
}

impl TrackCatalog {
    /// Scans `root/<emotion>/` for files with one of `extensions`.
    ///
    /// Extensions are compared case-insensitively and without the leading
    /// dot. Only files directly inside the emotion directory are indexed.
    ///
    /// # Errors
    ///
    /// Fails on the first emotion whose directory is missing, unreadable or
    /// holds no matching file.
    pub fn scan<S: AsRef<str> + Sync>(root: &Path, extensions: &[S]) -> Result<Self, CatalogError> {
        info!("Scanning songs directory {}", root.display());

        let scanned: Vec<(Emotion, Vec<PathBuf>)> = Emotion::ALL
            .as_slice()
            .par_iter()
            .map(|&emotion| scan_emotion_dir(root, emotion, extensions).map(|tracks| (emotion, tracks)))
            .collect::<Result<_, _>>()?;

        let tracks: HashMap<Emotion, Vec<PathBuf>> = scanned.into_iter().collect();
        for emotion in Emotion::ALL {
            let count = tracks.get(&emotion).map_or(0, Vec::len);
            info!("{emotion}: {count} tracks");
        }

        Ok(Self {
            root: root.to_path_buf(),
            tracks,
        })
    }

    /// Builds a catalog from an explicit mapping.
    ///
    /// Used by tests and embedders that do not keep songs on disk in the
    /// standard layout. The same non-empty invariant applies.
    pub fn from_map(root: impl Into<PathBuf>, tracks: HashMap<Emotion, Vec<PathBuf>>) -> Result<Self, CatalogError> {
        let root = root.into();
        for emotion in Emotion::ALL {
            match tracks.get(&emotion) {
                Some(list) if !list.is_empty() => {}
                _ => {
                    return Err(CatalogError::NoTracks {
                        emotion,
                        path: root.join(emotion.label()),
                        extensions: "audio".to_string(),
                    })
                }
            }
        }
        Ok(Self { root, tracks })
    }

    /// Songs directory this catalog was built from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All tracks for `emotion`, sorted by path.
    pub fn tracks(&self, emotion: Emotion) -> &[PathBuf] {
        self.tracks.get(&emotion).map_or(&[], Vec::as_slice)
    }

    /// Picks one track for `emotion` uniformly at random.
    ///
    /// Returns `None` only for a catalog built without the non-empty check,
    /// which the constructors rule out.
    pub fn pick<R: Rng + ?Sized>(&self, emotion: Emotion, rng: &mut R) -> Option<&Path> {
        self.tracks(emotion).choose(rng).map(PathBuf::as_path)
    }

    pub fn total_tracks(&self) -> usize {
        self.tracks.values().map(Vec::len).sum()
    }
}

fn scan_emotion_dir<S: AsRef<str>>(root: &Path, emotion: Emotion, extensions: &[S]) -> Result<Vec<PathBuf>, CatalogError> {
    let dir = root.join(emotion.label());
    if !dir.is_dir() {
        return Err(CatalogError::MissingDirectory { emotion, path: dir });
    }

    let entries = fs::read_dir(&dir).map_err(|source| CatalogError::Io {
        path: dir.clone(),
        source,
    })?;

    let mut tracks = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| CatalogError::Io {
            path: dir.clone(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && has_extension(&path, extensions) {
            tracks.push(path);
        }
    }

    if tracks.is_empty() {
        let extensions = extensions.iter().map(|e| format!(".{}", e.as_ref())).collect::<Vec<_>>().join("/");
        return Err(CatalogError::NoTracks {
            emotion,
            path: dir,
            extensions,
        });
    }

    tracks.sort();
    debug!("Indexed {} tracks in {}", tracks.len(), dir.display());
    Ok(tracks)
}

fn has_extension<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|wanted| wanted.as_ref().trim_start_matches('.').eq_ignore_ascii_case(ext)))
}
