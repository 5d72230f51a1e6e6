//! # Emotion DJ
//!
//! Watches a webcam, guesses the dominant emotion of the face in front of
//! it, and loops music from the matching folder of the songs directory.
//!
//! ## Usage
//!
//! ```bash
//! # Validate the songs directory
//! emotion-dj catalog --songs ~/Music/moods
//!
//! # Open the player window on camera 0
//! emotion-dj run --camera 0 --classifier python3 classify_face.py
//!
//! # Replay captured frames without a window
//! emotion-dj run --frames ./captures --headless --mute
//!
//! # What have I been feeling?
//! emotion-dj history
//! ```

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use emotion_dj::catalog::TrackCatalog;
use emotion_dj::classifier::{CommandClassifier, UnavailableClassifier};
use emotion_dj::cli::{self, RunArgs, SongsArgs};
use emotion_dj::completion;
use emotion_dj::config::AppConfig;
use emotion_dj::emotion::{Emotion, OverrideSelector};
use emotion_dj::emotion_log::{summarize, EmotionLog};
use emotion_dj::pipeline::EmotionPipeline;
use emotion_dj::player::{PlaybackController, SilentBackend};
use emotion_dj::runner::{self, DynBackend, DynClassifier, DynPipeline};
use emotion_dj::source::SourceSpec;
use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Main entry point for emotion-dj.
///
/// Initializes logging, loads the configuration, and routes commands.
///
/// # Logging
///
/// Controlled via `RUST_LOG`:
/// - `RUST_LOG=info emotion-dj run` - Track changes and lifecycle
/// - `RUST_LOG=emotion_dj::pipeline=debug emotion-dj run` - Per-frame decisions
fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();

    match args.command {
        cli::Command::Completion { shell } => {
            let mut cmd = cli::Args::command();
            completion::generate_completions(completion::shell_to_completion_shell(shell), &mut cmd);
            return Ok(());
        }
        command => {
            let config = load_config(args.config)?;
            dispatch(command, config)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => {
            debug!("Using config file {}", path.display());
            AppConfig::load_from(&path)?
        }
        None => AppConfig::load()?,
    };
    Ok(config)
}

fn dispatch(command: cli::Command, mut config: AppConfig) -> Result<()> {
    match command {
        cli::Command::Run(run) => {
            apply_songs_args(&mut config, &run.songs);
            if let Some(log) = &run.log {
                config.log_file = log.clone();
            }
            if let Some(classifier) = &run.classifier {
                config.classifier_command = classifier.clone();
            }
            run_player(config.absolutized()?, run)
        }
        cli::Command::Catalog { songs } => {
            apply_songs_args(&mut config, &songs);
            list_catalog(&config.absolutized()?)
        }
        cli::Command::Play { emotion, songs, seconds } => {
            apply_songs_args(&mut config, &songs);
            play_emotion(&config.absolutized()?, emotion, seconds)
        }
        cli::Command::History { log } => {
            if let Some(log) = log {
                config.log_file = log;
            }
            print_history(&config.absolutized()?)
        }
        cli::Command::Completion { .. } => Ok(()),
    }
}

fn apply_songs_args(config: &mut AppConfig, songs: &SongsArgs) {
    if let Some(dir) = &songs.songs {
        config.songs_dir = dir.clone();
    }
    if !songs.extensions.is_empty() {
        config.extensions = songs.extensions.clone();
    }
}

fn load_catalog(config: &AppConfig) -> Result<Arc<TrackCatalog>> {
    let catalog = TrackCatalog::scan(&config.songs_dir, &config.extensions)
        .context("The songs directory needs happy/, sad/, angry/ and neutral/ folders with at least one track each")?;
    Ok(Arc::new(catalog))
}

#[cfg(feature = "audio")]
fn open_backend(mute: bool) -> Result<DynBackend> {
    if mute {
        return Ok(Box::new(SilentBackend::default()));
    }
    let backend = emotion_dj::playback::RodioBackend::open_default().context("No audio output available. Pass --mute to run without sound.")?;
    Ok(Box::new(backend))
}

#[cfg(not(feature = "audio"))]
fn open_backend(mute: bool) -> Result<DynBackend> {
    if !mute {
        warn!("Built without the 'audio' feature; running muted");
    }
    Ok(Box::new(SilentBackend::default()))
}

fn open_classifier(command: &[String]) -> DynClassifier {
    match CommandClassifier::new(command.iter().cloned()) {
        Some(classifier) => {
            info!("Classifying frames with '{}'", classifier.program());
            Box::new(classifier)
        }
        None => {
            warn!("No classifier configured; every frame counts as neutral");
            Box::new(UnavailableClassifier)
        }
    }
}

fn source_spec(config: &AppConfig, run: &RunArgs) -> SourceSpec {
    match (&run.frames, run.camera) {
        (Some(dir), _) => SourceSpec::Images {
            dir: dir.clone(),
            interval: Duration::from_millis(config.frame_interval_ms),
            looping: false,
        },
        (None, index) => SourceSpec::Camera { index: index.unwrap_or(0) },
    }
}

fn run_player(config: AppConfig, run: RunArgs) -> Result<()> {
    // Catalog problems must surface before any window opens.
    let catalog = load_catalog(&config)?;
    info!("Loaded {} tracks from {}", catalog.total_tracks(), catalog.root().display());

    let controller = Arc::new(PlaybackController::new(catalog, open_backend(run.mute)?));
    let override_selector = Arc::new(OverrideSelector::new(run.override_emotion.and_then(|o| o.0)));
    let log = EmotionLog::new(config.log_file.clone());
    info!("Logging emotions to {}", log.path().display());

    let pipeline: DynPipeline = EmotionPipeline::new(
        open_classifier(&config.classifier_command),
        Arc::clone(&controller),
        log,
        override_selector,
    );
    let spec = source_spec(&config, &run);

    let result = if run.headless {
        run_headless(&spec, pipeline, run.max_frames)
    } else {
        run_windowed(spec, pipeline, run.max_frames)
    };

    controller.stop();
    result
}

fn run_headless(spec: &SourceSpec, mut pipeline: DynPipeline, max_frames: Option<u64>) -> Result<()> {
    let mut source = spec.open()?;
    let stop = AtomicBool::new(false);

    let count = runner::run_frames(&mut pipeline, &mut source, max_frames, &stop, |processed| {
        println!("{}", processed.emotion);
    })
    .map_err(|e| {
        error!("Frame loop stopped: {e:#}");
        e
    })?;

    info!("Processed {count} frames");
    Ok(())
}

#[cfg(feature = "gui")]
fn run_windowed(spec: SourceSpec, pipeline: DynPipeline, max_frames: Option<u64>) -> Result<()> {
    emotion_dj::ui::run_window(spec, pipeline, max_frames)
}

#[cfg(not(feature = "gui"))]
fn run_windowed(spec: SourceSpec, pipeline: DynPipeline, max_frames: Option<u64>) -> Result<()> {
    warn!("Built without the 'gui' feature; running headless");
    run_headless(&spec, pipeline, max_frames)
}

fn list_catalog(config: &AppConfig) -> Result<()> {
    let catalog = load_catalog(config)?;
    println!("Songs directory: {}", catalog.root().display());
    for emotion in Emotion::ALL {
        let tracks = catalog.tracks(emotion);
        println!("\n{} ({} tracks)", emotion.display_label(), tracks.len());
        for track in tracks {
            let name = track.strip_prefix(catalog.root()).unwrap_or(track);
            println!("  {}", name.display());
        }
    }
    println!("\nTotal: {} tracks", catalog.total_tracks());
    Ok(())
}

fn play_emotion(config: &AppConfig, emotion: Emotion, seconds: u64) -> Result<()> {
    let controller = PlaybackController::new(load_catalog(config)?, open_backend(false)?);
    controller.request(emotion);
    if controller.current() != Some(emotion) {
        anyhow::bail!("Could not start music for {emotion}");
    }

    println!("Playing {emotion} music for {seconds}s…");
    thread::sleep(Duration::from_secs(seconds));
    controller.stop();
    Ok(())
}

fn print_history(config: &AppConfig) -> Result<()> {
    let log = EmotionLog::new(config.log_file.clone());
    let summary = summarize(&log.entries()?);

    if summary.total() == 0 {
        println!("No emotions logged yet in {}", log.path().display());
        return Ok(());
    }

    println!("Emotion log: {}", log.path().display());
    if let (Some(first), Some(last)) = (summary.first, summary.last) {
        println!("From {first} to {last}");
    }
    for emotion in Emotion::ALL {
        let count = summary.counts.get(&emotion).copied().unwrap_or(0);
        let share = count as f64 * 100.0 / summary.total() as f64;
        println!("  {:<8} {count:>6}  ({share:5.1}%)", emotion.display_label());
    }
    if let Some(dominant) = summary.dominant() {
        println!("Mostly {dominant}");
    }
    Ok(())
}
