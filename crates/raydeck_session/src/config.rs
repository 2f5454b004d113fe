//! Session configuration and per-request parameters.

use std::path::{Path, PathBuf};

use raydeck_core::CONTENT_SEARCH_DEPTH;
use raydeck_engine::RenderSettings;

use crate::error::{SessionError, SessionResult};

/// Whether the denoise pass runs when the engine supports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DenoisePolicy {
    /// Denoise whenever `is_denoiser_supported()` is true
    #[default]
    Auto,
    /// Never denoise
    Off,
}

/// Fixed parameters shared by every render request of a service.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Parent directories searched above `search_root` for content
    pub content_search_depth: usize,
    /// Vertical field of view of the primary camera
    pub fov_y_degrees: f32,
    /// Primary camera aperture (0 = pinhole)
    pub lens_aperture: f32,
    pub lens_focal_distance: f32,
    /// Shutter open and close times
    pub motion_window: (f32, f32),
    pub denoise: DenoisePolicy,
    /// Start directory for content lookup (defaults to the working directory)
    pub search_root: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            content_search_depth: CONTENT_SEARCH_DEPTH,
            fov_y_degrees: 60.0,
            lens_aperture: 0.0,
            lens_focal_distance: 1.0,
            motion_window: (0.0, 0.0),
            denoise: DenoisePolicy::Auto,
            search_root: None,
        }
    }
}

impl SessionConfig {
    /// Directory content lookup starts from.
    pub fn search_start(&self) -> PathBuf {
        match &self.search_root {
            Some(root) => root.clone(),
            None => std::env::current_dir().unwrap_or_else(|_| Path::new(".").to_path_buf()),
        }
    }
}

/// User-chosen quality for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualitySettings {
    pub samples_per_pixel: i32,
    pub max_path_length: i32,
}

impl Default for QualitySettings {
    fn default() -> Self {
        Self {
            samples_per_pixel: 10,
            max_path_length: 5,
        }
    }
}

impl QualitySettings {
    pub fn new(samples_per_pixel: i32, max_path_length: i32) -> Self {
        Self {
            samples_per_pixel,
            max_path_length,
        }
    }

    /// Both values raised to at least 1.
    pub fn clamped(self) -> Self {
        Self {
            samples_per_pixel: self.samples_per_pixel.max(1),
            max_path_length: self.max_path_length.max(1),
        }
    }
}

/// Output size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn validate(self) -> SessionResult<Self> {
        if self.width == 0 || self.height == 0 {
            return Err(SessionError::InvalidViewport {
                width: self.width,
                height: self.height,
            });
        }
        Ok(self)
    }

    /// Width over height.
    pub fn aspect(self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Primary render settings for this viewport.
    pub fn render_settings(self, quality: QualitySettings) -> RenderSettings {
        let quality = quality.clamped();
        RenderSettings::new(
            self.width,
            self.height,
            quality.samples_per_pixel,
            quality.max_path_length,
        )
    }
}
