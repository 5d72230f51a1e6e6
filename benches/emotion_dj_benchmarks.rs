//! # emotion-dj Performance Benchmarks
//!
//! Hot paths of the player:
//!
//! - **Catalog**: scanning a songs tree at startup
//! - **Frames**: drawing the emotion label on every video frame
//! - **Pipeline**: one full classify/dispatch/log/annotate step
//!
//! ```bash
//! cargo bench
//! cargo bench catalog
//! ```

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use emotion_dj::catalog::TrackCatalog;
use emotion_dj::classifier::UnavailableClassifier;
use emotion_dj::emotion::{Emotion, OverrideSelector};
use emotion_dj::emotion_log::EmotionLog;
use emotion_dj::frame::Frame;
use emotion_dj::pipeline::EmotionPipeline;
use emotion_dj::player::{PlaybackController, SilentBackend};
use image::Rgb;
use std::fs;
use std::hint::black_box;
use std::sync::Arc;
use tempfile::TempDir;

/// Songs tree with `per_emotion` files per folder, half of them not audio.
fn create_songs_tree(per_emotion: usize) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    for emotion in Emotion::ALL {
        let dir = temp_dir.path().join(emotion.label());
        fs::create_dir_all(&dir).expect("Failed to create emotion folder");
        for i in 0..per_emotion {
            let ext = if i % 2 == 0 { "mp3" } else { "txt" };
            fs::write(dir.join(format!("track-{i:04}.{ext}")), b"").expect("Failed to write track");
        }
    }
    temp_dir
}

fn bench_catalog(c: &mut Criterion) {
    let mut group = c.benchmark_group("catalog");

    for size in [10, 200, 2000] {
        let songs = create_songs_tree(size);
        group.bench_with_input(BenchmarkId::new("scan", size), &songs, |b, songs| {
            b.iter(|| TrackCatalog::scan(black_box(songs.path()), &["mp3"]).expect("Catalog should build"))
        });
    }

    let songs = create_songs_tree(200);
    let catalog = TrackCatalog::scan(songs.path(), &["mp3"]).expect("Catalog should build");
    let mut rng = rand::thread_rng();
    group.bench_function("pick", |b| b.iter(|| catalog.pick(black_box(Emotion::Sad), &mut rng).map(|p| p.to_path_buf())));

    group.finish();
}

fn bench_frames(c: &mut Criterion) {
    let mut group = c.benchmark_group("frames");

    for (width, height) in [(320, 240), (640, 480), (1280, 720)] {
        let frame = Frame::blank(width, height, Rgb([40, 40, 40]));
        group.bench_with_input(BenchmarkId::new("annotate", format!("{width}x{height}")), &frame, |b, frame| {
            b.iter(|| frame.annotated(black_box("Neutral")))
        });
    }

    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let songs = create_songs_tree(20);
    let log_dir = TempDir::new().expect("Failed to create temp directory");
    let catalog = Arc::new(TrackCatalog::scan(songs.path(), &["mp3"]).expect("Catalog should build"));
    let mut pipeline = EmotionPipeline::new(
        UnavailableClassifier,
        Arc::new(PlaybackController::new(catalog, SilentBackend::default())),
        EmotionLog::new(log_dir.path().join("emotion_log.csv")),
        Arc::new(OverrideSelector::default()),
    );

    c.bench_function("pipeline_process_640x480", |b| {
        b.iter_batched(
            || Frame::blank(640, 480, Rgb([0, 0, 0])),
            |frame| pipeline.process(&frame).expect("Frame should process"),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_catalog, bench_frames, bench_pipeline);
criterion_main!(benches);
