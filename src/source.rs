//! # Frame Sources
//!
//! Where video frames come from. The pipeline does not care whether frames
//! are captured live or replayed from disk.

use crate::frame::Frame;
use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// Produces frames until exhausted.
pub trait FrameSource {
    /// Next frame, or `None` once the source has nothing more to give.
    fn next_frame(&mut self) -> Result<Option<Frame>>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        (**self).next_frame()
    }
}

/// Description of a source that can be sent to the worker thread and opened
/// there. Camera handles generally cannot change threads once open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    /// Still images from a directory, replayed at a fixed interval.
    Images {
        dir: PathBuf,
        interval: Duration,
        looping: bool,
    },
    /// Webcam by index.
    Camera { index: u32 },
}

impl SourceSpec {
    pub fn open(&self) -> Result<Box<dyn FrameSource>> {
        match self {
            SourceSpec::Images { dir, interval, looping } => {
                Ok(Box::new(ImageDirSource::open(dir, *interval, *looping)?))
            }
            SourceSpec::Camera { index } => open_camera(*index),
        }
    }
}

#[cfg(feature = "camera")]
fn open_camera(index: u32) -> Result<Box<dyn FrameSource>> {
    Ok(Box::new(camera::CameraSource::open(index)?))
}

#[cfg(not(feature = "camera"))]
fn open_camera(index: u32) -> Result<Box<dyn FrameSource>> {
    bail!("Camera {index} requested, but emotion-dj was built without the 'camera' feature. Use --frames DIR instead.")
}

/// Image extensions the directory source will load.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Replays the images of a directory in file-name order.
#[derive(Debug)]
pub struct ImageDirSource {
    paths: Vec<PathBuf>,
    position: usize,
    interval: Duration,
    looping: bool,
}

impl ImageDirSource {
    /// # Errors
    ///
    /// Fails if `dir` cannot be read or holds no PNG/JPEG image.
    pub fn open(dir: &Path, interval: Duration, looping: bool) -> Result<Self> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).with_context(|| format!("Failed to read frames directory {}", dir.display()))? {
            let path = entry?.path();
            let is_image = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| IMAGE_EXTENSIONS.iter().any(|wanted| wanted.eq_ignore_ascii_case(e)));
            if path.is_file() && is_image {
                paths.push(path);
            }
        }

        if paths.is_empty() {
            bail!("No PNG or JPEG frames found in {}", dir.display());
        }
        paths.sort();
        info!("Replaying {} frames from {}", paths.len(), dir.display());

        Ok(Self {
            paths,
            position: 0,
            interval,
            looping,
        })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl FrameSource for ImageDirSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let mut unreadable = 0;

        while unreadable < self.paths.len() {
            if self.position >= self.paths.len() {
                if !self.looping {
                    return Ok(None);
                }
                self.position = 0;
            }

            if self.position > 0 && !self.interval.is_zero() {
                thread::sleep(self.interval);
            }

            let path = &self.paths[self.position];
            self.position += 1;
            debug!("Loading frame {}", path.display());

            match image::open(path) {
                Ok(image) => return Ok(Some(Frame::new(image.to_rgb8()))),
                Err(e) => {
                    warn!("Skipping unreadable frame {}: {e}", path.display());
                    unreadable += 1;
                }
            }
        }

        bail!("None of the {} frames could be decoded", self.paths.len())
    }
}

#[cfg(feature = "camera")]
mod camera {
    use super::FrameSource;
    use crate::frame::Frame;
    use anyhow::{anyhow, Context, Result};
    use log::info;
    use nokhwa::pixel_format::RgbFormat;
    use nokhwa::utils::{CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution};
    use nokhwa::Camera;

    /// Live webcam capture, 640x480 RGB.
    pub struct CameraSource {
        camera: Camera,
    }

    impl CameraSource {
        pub fn open(index: u32) -> Result<Self> {
            let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
                Resolution::new(640, 480),
                FrameFormat::MJPEG,
                30,
            )));

            let mut camera = Camera::new(CameraIndex::Index(index), requested)
                .map_err(|e| anyhow!("{e}"))
                .with_context(|| format!("Could not open camera {index}. Is it connected and not used by another app?"))?;
            camera.open_stream().map_err(|e| anyhow!("Failed to start camera stream: {e}"))?;

            let resolution = camera.resolution();
            info!("Camera {index} streaming at {}x{}", resolution.width(), resolution.height());
            Ok(Self { camera })
        }
    }

    impl FrameSource for CameraSource {
        fn next_frame(&mut self) -> Result<Option<Frame>> {
            let buffer = self.camera.frame().map_err(|e| anyhow!("Failed to capture frame: {e}"))?;
            let decoded = buffer
                .decode_image::<RgbFormat>()
                .map_err(|e| anyhow!("Failed to decode frame: {e}"))?;
            let (width, height) = (decoded.width(), decoded.height());
            Frame::from_rgb(width, height, decoded.into_raw())
                .map(Some)
                .ok_or_else(|| anyhow!("Camera returned a truncated {width}x{height} frame"))
        }
    }

    impl Drop for CameraSource {
        fn drop(&mut self) {
            let _ = self.camera.stop_stream();
        }
    }
}
