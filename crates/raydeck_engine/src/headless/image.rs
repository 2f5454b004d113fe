//! Float RGB images owned by the headless engine.

use std::path::Path;

use rayon::prelude::*;
use raydeck_math::Vec3;

use crate::settings::ImageFileType;

/// Linear RGB image, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct HdrImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Vec3>,
}

impl HdrImage {
    /// Create a new image filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Vec3::ZERO; width as usize * height as usize],
        }
    }

    pub fn extent(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Resize and clear to black.
    pub fn reallocate(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height);
    }

    pub fn get(&self, x: u32, y: u32) -> Vec3 {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Set every pixel from `shade(x, y)`, one row per task.
    pub fn fill<F>(&mut self, shade: F)
    where
        F: Fn(u32, u32) -> Vec3 + Sync,
    {
        let width = self.width as usize;
        if width == 0 {
            return;
        }
        self.pixels
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, pixel) in row.iter_mut().enumerate() {
                    *pixel = shade(x as u32, y as u32);
                }
            });
    }

    /// Clamp every channel into the displayable range.
    pub fn clamp_to_display(&mut self) {
        self.pixels
            .par_iter_mut()
            .for_each(|rgb| *rgb = rgb.clamp(Vec3::ZERO, Vec3::ONE));
    }

    /// Dump as `width * height * 3` floats.
    pub fn to_floats(&self) -> Vec<f32> {
        bytemuck::cast_slice(&self.pixels).to_vec()
    }

    /// Encode as 8-bit RGB. Values are clamped to [0, 1].
    pub fn write(&self, path: &Path, file_type: ImageFileType) -> image::ImageResult<()> {
        let mut rgb = image::RgbImage::new(self.width, self.height);
        for (dst, src) in rgb.pixels_mut().zip(&self.pixels) {
            let c = src.clamp(Vec3::ZERO, Vec3::ONE) * 255.0;
            *dst = image::Rgb([c.x as u8, c.y as u8, c.z as u8]);
        }
        rgb.save_with_format(path, file_type.image_format())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_floats_layout() {
        let mut image = HdrImage::new(2, 1);
        image.pixels[0] = Vec3::new(0.1, 0.2, 0.3);
        image.pixels[1] = Vec3::new(0.4, 0.5, 0.6);
        assert_eq!(image.to_floats(), vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
    }

    #[test]
    fn test_fill_is_row_major() {
        let mut image = HdrImage::new(3, 2);
        image.fill(|x, y| Vec3::new(x as f32, y as f32, 0.0));
        assert_eq!(image.get(2, 0), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(image.get(1, 1), Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(image.pixels[4], Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_clamp_to_display() {
        let mut image = HdrImage::new(2, 1);
        image.pixels = vec![Vec3::new(-1.0, 0.5, 3.0), Vec3::splat(0.25)];
        image.clamp_to_display();
        assert_eq!(image.pixels[0], Vec3::new(0.0, 0.5, 1.0));
        assert_eq!(image.pixels[1], Vec3::splat(0.25));
    }

    #[test]
    fn test_write_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let mut image = HdrImage::new(4, 2);
        image.pixels[0] = Vec3::new(1.0, 0.0, 0.0);
        image.write(&path, ImageFileType::Png).unwrap();

        let decoded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (4, 2));
        assert_eq!(decoded.get_pixel(0, 0).0, [255, 0, 0]);
    }
}
