//! # Rodio Audio Backend
//!
//! Real sound output for the [`PlaybackController`](crate::player::PlaybackController).
//! `rodio::OutputStream` cannot leave the thread that created it, so a
//! dedicated audio thread owns the stream and the current `Sink`; the
//! backend handle only holds a command channel and can be shared freely.

use crate::player::AudioBackend;
use anyhow::{anyhow, Context, Result};
use log::{debug, error, info};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

enum AudioCommand {
    Play {
        track: PathBuf,
        reply: mpsc::Sender<Result<()>>,
    },
    Stop,
    Shutdown,
}

/// Handle to the audio thread.
pub struct RodioBackend {
    tx: mpsc::Sender<AudioCommand>,
    audio_handle: Option<thread::JoinHandle<()>>,
}

impl RodioBackend {
    /// Opens the default output device on a new audio thread.
    ///
    /// # Errors
    ///
    /// Fails when no output device can be opened.
    pub fn open_default() -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel();

        let audio_handle = thread::Builder::new()
            .name("emotion-dj-audio".to_string())
            .spawn(move || {
                let (_stream, handle) = match OutputStream::try_default() {
                    Ok(pair) => {
                        let _ = ready_tx.send(Ok(()));
                        pair
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(anyhow!("Failed to open default audio output: {e}")));
                        return;
                    }
                };
                run_audio_loop(&handle, &rx);
                debug!("Audio thread finished");
            })
            .context("Failed to spawn audio thread")?;

        ready_rx
            .recv()
            .context("Audio thread exited before opening the output device")??;
        info!("Audio output ready");

        Ok(Self {
            tx,
            audio_handle: Some(audio_handle),
        })
    }
}

fn run_audio_loop(handle: &OutputStreamHandle, rx: &mpsc::Receiver<AudioCommand>) {
    let mut sink: Option<Sink> = None;

    while let Ok(command) = rx.recv() {
        match command {
            AudioCommand::Play { track, reply } => {
                // Dropping the previous sink silences it.
                sink = None;
                let result = start_looped(handle, &track).map(|new_sink| {
                    sink = Some(new_sink);
                });
                if let Err(e) = &result {
                    error!("Could not play {}: {e:#}", track.display());
                }
                let _ = reply.send(result);
            }
            AudioCommand::Stop => {
                if let Some(current) = sink.take() {
                    current.stop();
                }
            }
            AudioCommand::Shutdown => break,
        }
    }
}

fn start_looped(handle: &OutputStreamHandle, track: &Path) -> Result<Sink> {
    let file = File::open(track).with_context(|| format!("Failed to open {}", track.display()))?;
    let source = Decoder::new(BufReader::new(file)).with_context(|| format!("Failed to decode {}", track.display()))?;

    let sink = Sink::try_new(handle).context("Failed to create audio sink")?;
    sink.append(source.repeat_infinite());
    sink.play();
    Ok(sink)
}

impl AudioBackend for RodioBackend {
    fn stop(&mut self) {
        if self.tx.send(AudioCommand::Stop).is_err() {
            error!("Audio thread is gone; cannot stop playback");
        }
    }

    fn play_looped(&mut self, track: &Path) -> Result<()> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.tx
            .send(AudioCommand::Play {
                track: track.to_path_buf(),
                reply: reply_tx,
            })
            .map_err(|_| anyhow!("Audio thread is not running"))?;
        reply_rx.recv().context("Audio thread dropped the play request")?
    }
}

impl Drop for RodioBackend {
    fn drop(&mut self) {
        let _ = self.tx.send(AudioCommand::Shutdown);
        if let Some(handle) = self.audio_handle.take() {
            let _ = handle.join();
        }
    }
}
