//! # Player Window
//!
//! eframe window showing the annotated video feed, the emotion currently
//! driving the music, and an override selector. Frames are processed on a
//! [`Worker`] thread; the window only displays what it is sent.

use crate::emotion::{Emotion, OverrideSelector};
use crate::frame::Frame;
use crate::pipeline::ProcessedFrame;
use crate::player::PlaybackController;
use crate::runner::{DynBackend, DynPipeline, Worker};
use crate::source::SourceSpec;
use anyhow::{anyhow, Result};
use eframe::egui::{self, ColorImage, TextureHandle, TextureOptions};
use log::{error, info};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

pub const WINDOW_TITLE: &str = "Emotion-Aware Music Player";

/// Processed frames waiting for display.
const FRAME_QUEUE: usize = 2;

struct EmotionWindow {
    frames: mpsc::Receiver<ProcessedFrame>,
    worker: Option<Worker>,
    controller: Arc<PlaybackController<DynBackend>>,
    override_selector: Arc<OverrideSelector>,
    override_choice: Option<Emotion>,
    texture: Option<TextureHandle>,
    detected: Option<Emotion>,
    status: Option<String>,
}

/// Opens the window and blocks until it is closed.
///
/// Closing the window stops the frame worker and the music.
pub fn run_window(spec: SourceSpec, pipeline: DynPipeline, max_frames: Option<u64>) -> Result<()> {
    info!("Opening player window");
    let controller = Arc::clone(pipeline.controller());
    let override_selector = Arc::clone(pipeline.override_selector());
    let app_controller = Arc::clone(&controller);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size([720.0, 640.0]),
        ..Default::default()
    };

    let result = eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(move |cc| {
            let (tx, rx) = mpsc::sync_channel(FRAME_QUEUE);
            let ctx = cc.egui_ctx.clone();
            let (worker, status) = match Worker::spawn(spec, pipeline, max_frames, tx, move || ctx.request_repaint()) {
                Ok(worker) => (Some(worker), None),
                Err(e) => {
                    error!("{e:#}");
                    (None, Some(format!("{e:#}")))
                }
            };

            Box::new(EmotionWindow {
                frames: rx,
                worker,
                controller: app_controller,
                override_choice: override_selector.get(),
                override_selector,
                texture: None,
                detected: None,
                status,
            })
        }),
    );

    controller.stop();
    info!("Closed player window");
    result.map_err(|e| anyhow!("Failed to open the player window: {e}"))
}

impl EmotionWindow {
    fn receive_frames(&mut self, ctx: &egui::Context) {
        let Some(latest) = self.frames.try_iter().last() else {
            return;
        };

        self.detected = Some(latest.emotion);
        let image = color_image(&latest.frame);
        match &mut self.texture {
            Some(texture) => texture.set(image, TextureOptions::LINEAR),
            None => self.texture = Some(ctx.load_texture("video-feed", image, TextureOptions::LINEAR)),
        }
    }

    fn check_worker(&mut self) {
        let finished = self.worker.as_ref().is_some_and(Worker::is_finished);
        if !finished {
            return;
        }
        if let Some(mut worker) = self.worker.take() {
            self.status = Some(match worker.stop() {
                Ok(count) => format!("Video feed ended after {count} frames"),
                Err(e) => {
                    error!("Frame worker failed: {e:#}");
                    format!("Video feed stopped: {e:#}")
                }
            });
        }
    }

    fn override_selector_ui(&mut self, ui: &mut egui::Ui) {
        let before = self.override_choice;
        egui::ComboBox::from_label("Override Emotion")
            .selected_text(self.override_choice.map_or("None", Emotion::label))
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut self.override_choice, None, "None");
                for emotion in Emotion::ALL {
                    ui.selectable_value(&mut self.override_choice, Some(emotion), emotion.label());
                }
            });

        if self.override_choice != before {
            info!(
                "Override set to {}",
                self.override_choice.map_or("none", Emotion::label)
            );
            self.override_selector.set(self.override_choice);
        }
    }
}

impl eframe::App for EmotionWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.receive_frames(ctx);
        self.check_worker();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(WINDOW_TITLE);

            match &self.texture {
                Some(texture) => {
                    ui.add(egui::Image::new(texture).shrink_to_fit());
                }
                None => {
                    ui.label("Waiting for the video feed…");
                }
            }

            ui.separator();
            ui.horizontal(|ui| {
                ui.label("Detected:");
                ui.strong(self.detected.map_or("-", Emotion::display_label));
                ui.separator();
                ui.label("Playing:");
                ui.strong(self.controller.current().map_or("-", Emotion::display_label));
            });

            self.override_selector_ui(ui);

            if let Some(status) = &self.status {
                ui.colored_label(egui::Color32::YELLOW, status);
            }
        });

        if self.worker.is_some() {
            ctx.request_repaint_after(Duration::from_millis(250));
        }
    }
}

impl Drop for EmotionWindow {
    fn drop(&mut self) {
        // Worker first, so no frame can restart the music after stop.
        drop(self.worker.take());
        self.controller.stop();
    }
}

fn color_image(frame: &Frame) -> ColorImage {
    ColorImage::from_rgb([frame.width() as usize, frame.height() as usize], frame.image().as_raw())
}
