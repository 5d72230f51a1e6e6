//! # Integration Tests for emotion-dj
//!
//! End-to-end behavior from a user's point of view: a songs tree on disk,
//! frames going through the pipeline, the log that comes out, and the
//! binary's subcommands.

use anyhow::Result;
use emotion_dj::catalog::{CatalogError, TrackCatalog};
use emotion_dj::classifier::{ClassifyError, EmotionClassifier, UnavailableClassifier};
use emotion_dj::emotion::{Emotion, OverrideSelector};
use emotion_dj::emotion_log::{summarize, EmotionLog, HEADER};
use emotion_dj::frame::Frame;
use emotion_dj::pipeline::EmotionPipeline;
use emotion_dj::player::{AudioBackend, PlaybackController};
use image::Rgb;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Test helper to create a songs tree with `per_emotion` tracks per folder
fn create_songs_dir(per_emotion: usize) -> Result<TempDir> {
    let temp_dir = TempDir::new()?;
    for emotion in Emotion::ALL {
        let dir = temp_dir.path().join(emotion.label());
        fs::create_dir_all(&dir)?;
        for i in 0..per_emotion {
            fs::write(dir.join(format!("{emotion}-{i}.mp3")), b"not really audio")?;
        }
    }
    Ok(temp_dir)
}

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Stop,
    Play(PathBuf),
}

/// Backend that records calls into a shared list.
#[derive(Clone, Default)]
struct SharedRecorder(Arc<Mutex<Vec<Call>>>);

impl SharedRecorder {
    fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    fn plays(&self) -> Vec<PathBuf> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Play(path) => Some(path),
                Call::Stop => None,
            })
            .collect()
    }
}

impl AudioBackend for SharedRecorder {
    fn stop(&mut self) {
        self.0.lock().unwrap().push(Call::Stop);
    }

    fn play_looped(&mut self, track: &Path) -> Result<()> {
        self.0.lock().unwrap().push(Call::Play(track.to_path_buf()));
        Ok(())
    }
}

struct FixedLabel(&'static str);

impl EmotionClassifier for FixedLabel {
    fn dominant_emotion(&mut self, _frame: &Frame) -> Result<String, ClassifyError> {
        Ok(self.0.to_string())
    }
}

fn frame() -> Frame {
    Frame::blank(320, 240, Rgb([30, 30, 30]))
}

#[cfg(test)]
mod catalog_tests {
    use super::*;

    #[test]
    fn test_valid_tree_is_indexed() {
        let songs = create_songs_dir(3).expect("Failed to create songs");
        let catalog = TrackCatalog::scan(songs.path(), &["mp3"]).expect("Catalog should build");

        assert_eq!(catalog.total_tracks(), 12);
        for emotion in Emotion::ALL {
            assert!(catalog.tracks(emotion).iter().all(|t| t.starts_with(songs.path().join(emotion.label()))));
        }
    }

    #[test]
    fn test_empty_emotion_folder_fails() {
        let songs = create_songs_dir(1).expect("Failed to create songs");
        fs::remove_file(songs.path().join("angry").join("angry-0.mp3")).expect("Failed to remove track");

        match TrackCatalog::scan(songs.path(), &["mp3"]) {
            Err(CatalogError::NoTracks { emotion, .. }) => assert_eq!(emotion, Emotion::Angry),
            other => panic!("Expected NoTracks, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_emotion_folder_fails() {
        let songs = create_songs_dir(1).expect("Failed to create songs");
        fs::remove_dir_all(songs.path().join("neutral")).expect("Failed to remove folder");

        assert!(matches!(
            TrackCatalog::scan(songs.path(), &["mp3"]),
            Err(CatalogError::MissingDirectory { emotion: Emotion::Neutral, .. })
        ));
    }
}

#[cfg(test)]
mod pipeline_tests {
    use super::*;

    fn build<C: EmotionClassifier>(
        classifier: C,
        songs: &TempDir,
        log_dir: &TempDir,
    ) -> (EmotionPipeline<C, SharedRecorder>, SharedRecorder, EmotionLog) {
        let catalog = Arc::new(TrackCatalog::scan(songs.path(), &["mp3"]).expect("Catalog should build"));
        let recorder = SharedRecorder::default();
        let log = EmotionLog::new(log_dir.path().join("emotion_log.csv"));
        let pipeline = EmotionPipeline::new(
            classifier,
            Arc::new(PlaybackController::new(catalog, recorder.clone())),
            log.clone(),
            Arc::new(OverrideSelector::default()),
        );
        (pipeline, recorder, log)
    }

    #[test]
    fn test_failing_classifier_plays_and_logs_neutral() {
        let songs = create_songs_dir(2).expect("Failed to create songs");
        let log_dir = TempDir::new().expect("Failed to create temp directory");
        let (mut pipeline, recorder, log) = build(UnavailableClassifier, &songs, &log_dir);

        for _ in 0..4 {
            let processed = pipeline.process(&frame()).expect("Frame should process");
            assert_eq!(processed.emotion, Emotion::Neutral);
        }

        let plays = recorder.plays();
        assert_eq!(plays.len(), 1, "same emotion must not restart the music");
        assert!(plays[0].starts_with(songs.path().join("neutral")));

        let entries = log.entries().expect("Log should parse");
        assert_eq!(entries.len(), 4);
        assert!(entries.iter().all(|e| e.emotion == Emotion::Neutral));
    }

    #[test]
    fn test_override_beats_classifier() {
        let songs = create_songs_dir(1).expect("Failed to create songs");
        let log_dir = TempDir::new().expect("Failed to create temp directory");
        let (mut pipeline, recorder, log) = build(FixedLabel("happy"), &songs, &log_dir);
        pipeline.override_selector().set(Some(Emotion::Sad));

        assert_eq!(pipeline.process(&frame()).expect("Frame should process").emotion, Emotion::Sad);
        assert_eq!(recorder.plays(), vec![songs.path().join("sad").join("sad-0.mp3")]);
        assert_eq!(log.entries().expect("Log should parse")[0].emotion, Emotion::Sad);

        pipeline.override_selector().set(None);
        assert_eq!(pipeline.process(&frame()).expect("Frame should process").emotion, Emotion::Happy);
    }

    #[test]
    fn test_emotion_change_stops_then_plays() {
        let songs = create_songs_dir(1).expect("Failed to create songs");
        let log_dir = TempDir::new().expect("Failed to create temp directory");
        let (mut pipeline, recorder, _log) = build(FixedLabel("angry"), &songs, &log_dir);

        pipeline.process(&frame()).expect("Frame should process");
        pipeline.override_selector().set(Some(Emotion::Happy));
        pipeline.process(&frame()).expect("Frame should process");

        let calls = recorder.calls();
        let tail = &calls[calls.len() - 2..];
        assert_eq!(
            tail,
            &[Call::Stop, Call::Play(songs.path().join("happy").join("happy-0.mp3"))]
        );
    }

    #[test]
    fn test_unsupported_label_counts_as_neutral() {
        let songs = create_songs_dir(1).expect("Failed to create songs");
        let log_dir = TempDir::new().expect("Failed to create temp directory");
        let (mut pipeline, _recorder, _log) = build(FixedLabel("fear"), &songs, &log_dir);

        assert_eq!(pipeline.process(&frame()).expect("Frame should process").emotion, Emotion::Neutral);
    }

    #[test]
    fn test_log_header_written_once_across_pipelines() {
        let songs = create_songs_dir(1).expect("Failed to create songs");
        let log_dir = TempDir::new().expect("Failed to create temp directory");

        for label in ["happy", "sad"] {
            let (mut pipeline, _recorder, _log) = build(FixedLabel(label), &songs, &log_dir);
            pipeline.process(&frame()).expect("Frame should process");
        }

        let content = fs::read_to_string(log_dir.path().join("emotion_log.csv")).expect("Log should exist");
        assert_eq!(content.lines().filter(|l| *l == HEADER).count(), 1);
        assert_eq!(content.lines().count(), 3);

        let summary = summarize(&EmotionLog::new(log_dir.path().join("emotion_log.csv")).entries().unwrap());
        assert_eq!(summary.counts.get(&Emotion::Happy), Some(&1));
        assert_eq!(summary.counts.get(&Emotion::Sad), Some(&1));
    }
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    fn emotion_dj(config_dir: &TempDir) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_emotion-dj"));
        cmd.arg("--config").arg(config_dir.path().join("config.json"));
        cmd
    }

    #[test]
    fn test_cli_help_displays_correctly() {
        let config_dir = TempDir::new().expect("Failed to create temp directory");
        let output = emotion_dj(&config_dir).arg("--help").output().expect("Failed to run help command");

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(output.status.success());
        for subcommand in ["run", "catalog", "play", "history", "completion"] {
            assert!(stdout.contains(subcommand), "help is missing {subcommand}");
        }
    }

    #[test]
    fn test_catalog_command_lists_tracks() {
        let config_dir = TempDir::new().expect("Failed to create temp directory");
        let songs = create_songs_dir(2).expect("Failed to create songs");
        let output = emotion_dj(&config_dir)
            .args(["catalog", "--songs"])
            .arg(songs.path())
            .output()
            .expect("Failed to run catalog command");

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
        assert!(stdout.contains("Happy (2 tracks)"));
        assert!(stdout.contains("Total: 8 tracks"));
    }

    #[test]
    fn test_catalog_command_fails_on_missing_folder() {
        let config_dir = TempDir::new().expect("Failed to create temp directory");
        let songs = create_songs_dir(1).expect("Failed to create songs");
        fs::remove_dir_all(songs.path().join("sad")).expect("Failed to remove folder");

        let output = emotion_dj(&config_dir)
            .args(["catalog", "--songs"])
            .arg(songs.path())
            .output()
            .expect("Failed to run catalog command");

        assert!(!output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("no 'sad' directory"), "stderr was: {stderr}");
    }

    #[test]
    fn test_run_refuses_songs_tree_missing_an_emotion() {
        let config_dir = TempDir::new().expect("Failed to create temp directory");
        let songs = create_songs_dir(1).expect("Failed to create songs");
        fs::remove_dir_all(songs.path().join("sad")).expect("Failed to remove folder");
        let frames = TempDir::new().expect("Failed to create temp directory");
        image::RgbImage::from_pixel(64, 48, Rgb([0, 0, 0]))
            .save(frames.path().join("frame.png"))
            .expect("Failed to write frame");
        let log_path = config_dir.path().join("emotion_log.csv");

        let output = emotion_dj(&config_dir)
            .args(["run", "--headless", "--mute", "--songs"])
            .arg(songs.path())
            .arg("--frames")
            .arg(frames.path())
            .arg("--log")
            .arg(&log_path)
            .output()
            .expect("Failed to run player");

        assert!(!output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("no 'sad' directory"), "stderr was: {stderr}");
        assert!(output.stdout.is_empty(), "no frame may be processed");
        assert!(!log_path.exists(), "log must not be created before the catalog is valid");
    }

    #[test]
    fn test_run_refuses_empty_emotion_folder() {
        let config_dir = TempDir::new().expect("Failed to create temp directory");
        let songs = create_songs_dir(1).expect("Failed to create songs");
        fs::remove_file(songs.path().join("happy").join("happy-0.mp3")).expect("Failed to remove track");
        let frames = TempDir::new().expect("Failed to create temp directory");
        image::RgbImage::from_pixel(64, 48, Rgb([0, 0, 0]))
            .save(frames.path().join("frame.png"))
            .expect("Failed to write frame");
        let log_path = config_dir.path().join("emotion_log.csv");

        let output = emotion_dj(&config_dir)
            .args(["run", "--headless", "--mute", "--songs"])
            .arg(songs.path())
            .arg("--frames")
            .arg(frames.path())
            .arg("--log")
            .arg(&log_path)
            .output()
            .expect("Failed to run player");

        assert!(!output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("'happy' folder"), "stderr was: {stderr}");
        assert!(!log_path.exists());
    }

    #[test]
    fn test_headless_run_logs_every_frame() {
        let config_dir = TempDir::new().expect("Failed to create temp directory");
        let songs = create_songs_dir(1).expect("Failed to create songs");
        let frames = TempDir::new().expect("Failed to create temp directory");
        for i in 0..3 {
            image::RgbImage::from_pixel(64, 48, Rgb([0, 0, 0]))
                .save(frames.path().join(format!("frame-{i}.png")))
                .expect("Failed to write frame");
        }
        let log_path = config_dir.path().join("emotion_log.csv");

        let output = emotion_dj(&config_dir)
            .args(["run", "--headless", "--mute", "--songs"])
            .arg(songs.path())
            .arg("--frames")
            .arg(frames.path())
            .arg("--log")
            .arg(&log_path)
            .output()
            .expect("Failed to run player");

        assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert_eq!(stdout.lines().collect::<Vec<_>>(), vec!["neutral"; 3]);

        let entries = EmotionLog::new(&log_path).entries().expect("Log should parse");
        assert_eq!(entries.len(), 3);
    }

    #[test]
    fn test_headless_run_with_override() {
        let config_dir = TempDir::new().expect("Failed to create temp directory");
        let songs = create_songs_dir(1).expect("Failed to create songs");
        let frames = TempDir::new().expect("Failed to create temp directory");
        image::RgbImage::from_pixel(64, 48, Rgb([0, 0, 0]))
            .save(frames.path().join("only.png"))
            .expect("Failed to write frame");

        let output = emotion_dj(&config_dir)
            .args(["run", "--headless", "--mute", "--override", "angry", "--songs"])
            .arg(songs.path())
            .arg("--frames")
            .arg(frames.path())
            .arg("--log")
            .arg(config_dir.path().join("log.csv"))
            .output()
            .expect("Failed to run player");

        assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "angry");
    }

    #[test]
    fn test_history_on_missing_log() {
        let config_dir = TempDir::new().expect("Failed to create temp directory");
        let output = emotion_dj(&config_dir)
            .args(["history", "--log"])
            .arg(config_dir.path().join("nothing.csv"))
            .output()
            .expect("Failed to run history command");

        assert!(output.status.success());
        assert!(String::from_utf8_lossy(&output.stdout).contains("No emotions logged yet"));
    }

    #[test]
    fn test_completion_generation() {
        let config_dir = TempDir::new().expect("Failed to create temp directory");
        let output = emotion_dj(&config_dir)
            .args(["completion", "bash"])
            .output()
            .expect("Failed to run completion command");

        assert!(output.status.success());
        assert!(String::from_utf8_lossy(&output.stdout).contains("emotion-dj"));
    }
}
