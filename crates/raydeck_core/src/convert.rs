//! Linear float buffer to 8-bit display buffer conversion.
//!
//! The engine dumps `width * height * 3` floats, row-major, RGB per pixel.
//! Display buffers use the 24-bit bitmap layout: one byte per channel with the
//! channel triplet reversed (B, G, R).

use rayon::prelude::*;
use thiserror::Error;

/// Errors from display conversion.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    #[error("Float buffer has {actual} values, expected {expected} for {width}x{height}")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// 8-bit BGR pixels ready for presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayBuffer {
    pub width: u32,
    pub height: u32,
    /// `width * height * 3` bytes, row-major, B G R per pixel
    pub pixels: Vec<u8>,
}

impl DisplayBuffer {
    /// BGR bytes at (x, y).
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = 3 * (y as usize * self.width as usize + x as usize);
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]]
    }

    /// Swap back to RGB for image encoders.
    pub fn to_rgb_image(&self) -> image::RgbImage {
        let mut rgb = self.pixels.clone();
        for px in rgb.chunks_exact_mut(3) {
            px.swap(0, 2);
        }
        // Length is width * height * 3 by construction.
        image::RgbImage::from_raw(self.width, self.height, rgb)
            .unwrap_or_else(|| image::RgbImage::new(self.width, self.height))
    }
}

/// Convert one channel value to a byte.
///
/// `(c * 255.0) as u8` truncates toward zero and saturates: 1.0 -> 255,
/// 0.5 -> 127, anything above 1.0 -> 255, negatives and NaN -> 0.
#[inline]
pub fn channel_to_byte(c: f32) -> u8 {
    (c * 255.0) as u8
}

/// Convert a linear RGB float buffer into a [`DisplayBuffer`].
pub fn convert(floats: &[f32], width: u32, height: u32) -> Result<DisplayBuffer, ConvertError> {
    let expected = width as usize * height as usize * 3;
    if floats.len() != expected {
        return Err(ConvertError::SizeMismatch {
            width,
            height,
            expected,
            actual: floats.len(),
        });
    }

    let mut pixels = vec![0u8; expected];
    pixels
        .par_chunks_exact_mut(3)
        .zip(floats.par_chunks_exact(3))
        .for_each(|(dst, src)| {
            dst[2] = channel_to_byte(src[0]);
            dst[1] = channel_to_byte(src[1]);
            dst[0] = channel_to_byte(src[2]);
        });

    Ok(DisplayBuffer {
        width,
        height,
        pixels,
    })
}
