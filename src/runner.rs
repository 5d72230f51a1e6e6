//! # Frame Loop
//!
//! Drives an [`EmotionPipeline`] from a [`FrameSource`]. The same loop runs on
//! the main thread in headless mode and on a worker thread behind the
//! window.

use crate::classifier::EmotionClassifier;
use crate::pipeline::{EmotionPipeline, ProcessedFrame};
use crate::player::AudioBackend;
use crate::source::{FrameSource, SourceSpec};
use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{SyncSender, TrySendError};
use std::sync::Arc;
use std::thread;

/// Audio backend chosen at runtime.
pub type DynBackend = Box<dyn AudioBackend + Send>;

/// Classifier chosen at runtime.
pub type DynClassifier = Box<dyn EmotionClassifier + Send>;

/// Pipeline as assembled by the binary.
pub type DynPipeline = EmotionPipeline<DynClassifier, DynBackend>;

/// Pulls frames until the source ends, `max_frames` is reached, or `stop`
/// is raised. `on_frame` sees every processed frame.
///
/// Returns the number of frames processed.
///
/// # Errors
///
/// Source failures and emotion log write failures end the loop.
pub fn run_frames<S, C, B, F>(
    pipeline: &mut EmotionPipeline<C, B>,
    source: &mut S,
    max_frames: Option<u64>,
    stop: &AtomicBool,
    mut on_frame: F,
) -> Result<u64>
where
    S: FrameSource + ?Sized,
    C: EmotionClassifier,
    B: AudioBackend,
    F: FnMut(ProcessedFrame),
{
    let mut processed = 0u64;

    while !stop.load(Ordering::Relaxed) {
        if max_frames.is_some_and(|max| processed >= max) {
            debug!("Reached frame limit of {processed}");
            break;
        }

        let Some(frame) = source.next_frame()? else {
            info!("Frame source exhausted after {processed} frames");
            break;
        };

        on_frame(pipeline.process(&frame)?);
        processed += 1;
    }

    Ok(processed)
}

/// Background thread running the frame loop.
pub struct Worker {
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<Result<u64>>>,
}

impl Worker {
    /// Opens `spec` on a new thread and processes frames there.
    ///
    /// Each processed frame is offered to `frames`; if the receiver is still
    /// busy with the previous one the new frame is dropped. `notify` runs after
    /// every delivered frame.
    pub fn spawn<N>(
        spec: SourceSpec,
        mut pipeline: DynPipeline,
        max_frames: Option<u64>,
        frames: SyncSender<ProcessedFrame>,
        notify: N,
    ) -> Result<Self>
    where
        N: Fn() + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let worker_stop = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("emotion-dj-frames".to_string())
            .spawn(move || {
                let mut source = spec.open()?;
                run_frames(&mut pipeline, &mut source, max_frames, &worker_stop, |processed| {
                    match frames.try_send(processed) {
                        Ok(()) => notify(),
                        Err(TrySendError::Full(_)) => debug!("Display busy, dropping frame"),
                        Err(TrySendError::Disconnected(_)) => worker_stop.store(true, Ordering::Relaxed),
                    }
                })
            })
            .context("Failed to spawn frame worker")?;

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Whether the thread has ended on its own.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Asks the loop to end and waits for it.
    ///
    /// # Errors
    ///
    /// Returns the error that ended the loop, if any.
    pub fn stop(&mut self) -> Result<u64> {
        self.stop.store(true, Ordering::Relaxed);
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| anyhow!("Frame worker panicked"))?,
            None => Ok(0),
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("Frame worker ended with an error: {e:#}");
        }
    }
}
