//! Video frames and the emotion label overlay.

use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

/// Top-left corner of the overlay text, in pixels.
pub const LABEL_ORIGIN: (i32, i32) = (20, 24);
/// Each glyph pixel is drawn as a square this many pixels wide.
pub const LABEL_STROKE: u32 = 2;
/// Overlay colour (green).
pub const LABEL_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

const GLYPH_SIZE: u32 = 8;

/// One RGB8 video frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }

    /// Builds a frame from packed RGB bytes (`width * height * 3`).
    pub fn from_rgb(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        RgbImage::from_raw(width, height, data).map(Self::new)
    }

    /// Uniformly coloured frame, handy as a placeholder before the first
    /// capture arrives.
    pub fn blank(width: u32, height: u32, color: Rgb<u8>) -> Self {
        Self::new(RgbImage::from_pixel(width, height, color))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Copy of this frame with `text` drawn in the top-left corner.
    #[must_use]
    pub fn annotated(&self, text: &str) -> Frame {
        let mut image = self.image.clone();
        draw_label(&mut image, text, LABEL_ORIGIN, LABEL_COLOR, LABEL_STROKE);
        Frame::new(image)
    }
}

/// Draws `text` with the 8x8 bitmap font, every glyph pixel scaled to a
/// `stroke` x `stroke` square. Pixels outside the image are clipped.
pub fn draw_label(image: &mut RgbImage, text: &str, origin: (i32, i32), color: Rgb<u8>, stroke: u32) {
    let advance = (GLYPH_SIZE * stroke) as i32;
    let mut x = origin.0;

    for ch in text.chars() {
        if let Some(glyph) = BASIC_FONTS.get(ch) {
            for (row, bits) in glyph.iter().enumerate() {
                for col in 0..GLYPH_SIZE {
                    if bits & (1u8 << col) == 0 {
                        continue;
                    }
                    let px = x + (col * stroke) as i32;
                    let py = origin.1 + (row as u32 * stroke) as i32;
                    draw_filled_rect_mut(image, Rect::at(px, py).of_size(stroke, stroke), color);
                }
            }
        }
        x += advance;
    }
}
