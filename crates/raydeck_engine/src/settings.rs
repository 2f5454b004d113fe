//! Render settings passed to the engine on every `render` call.

use bytemuck::{Pod, Zeroable};

/// Ray epsilon used to avoid self-intersection.
pub const RAY_T_MIN: f32 = 0.0001;

/// What a render pass writes into the output image.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderMode {
    /// Path tracing.
    Default = 0,
    Albedo = 1,
    /// Geometric normal in world space.
    SurfaceNormal = 2,
    /// Shading normal in world space.
    MicrosurfaceNormal = 3,
    /// Surface parameterization.
    Texcoord = 4,
    Emission = 5,
    /// Can be very noisy for diffuse materials.
    Reflectance = 6,
}

impl RenderMode {
    pub const ALL: [RenderMode; 7] = [
        RenderMode::Default,
        RenderMode::Albedo,
        RenderMode::SurfaceNormal,
        RenderMode::MicrosurfaceNormal,
        RenderMode::Texcoord,
        RenderMode::Emission,
        RenderMode::Reflectance,
    ];

    /// Parse a raw wire value.
    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            RenderMode::Default => "Default",
            RenderMode::Albedo => "Albedo",
            RenderMode::SurfaceNormal => "SurfaceNormal",
            RenderMode::MicrosurfaceNormal => "MicrosurfaceNormal",
            RenderMode::Texcoord => "Texcoord",
            RenderMode::Emission => "Emission",
            RenderMode::Reflectance => "Reflectance",
        }
    }
}

/// Display name for a raw render mode value, `None` if out of range.
pub fn render_mode_name(raw: u32) -> Option<&'static str> {
    RenderMode::from_raw(raw).map(RenderMode::name)
}

/// Render settings in the engine's wire layout.
///
/// Field order and widths match the native `RendererSettings` struct.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct RenderSettings {
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub samples_per_pixel: i32,
    pub max_path_length: i32,
    pub ray_t_min: f32,
    pub render_mode: u32,
}

impl RenderSettings {
    /// Settings for a path traced pass. Quality values are clamped to at least 1.
    pub fn new(
        viewport_width: u32,
        viewport_height: u32,
        samples_per_pixel: i32,
        max_path_length: i32,
    ) -> Self {
        Self {
            viewport_width,
            viewport_height,
            samples_per_pixel: samples_per_pixel.max(1),
            max_path_length: max_path_length.max(1),
            ray_t_min: RAY_T_MIN,
            render_mode: RenderMode::Default as u32,
        }
    }

    /// Same settings with another render mode.
    pub fn with_mode(mut self, mode: RenderMode) -> Self {
        self.render_mode = mode as u32;
        self
    }

    pub fn mode(&self) -> Option<RenderMode> {
        RenderMode::from_raw(self.render_mode)
    }

    /// Number of pixels covered by the viewport.
    pub fn pixel_count(&self) -> usize {
        self.viewport_width as usize * self.viewport_height as usize
    }
}

/// Output formats accepted by `write_image_to_disk`.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFileType {
    Bitmap = 0,
    Jpg = 1,
    Png = 2,
}

impl ImageFileType {
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(ImageFileType::Bitmap),
            1 => Some(ImageFileType::Jpg),
            2 => Some(ImageFileType::Png),
            _ => None,
        }
    }

    pub(crate) fn image_format(self) -> image::ImageFormat {
        match self {
            ImageFileType::Bitmap => image::ImageFormat::Bmp,
            ImageFileType::Jpg => image::ImageFormat::Jpeg,
            ImageFileType::Png => image::ImageFormat::Png,
        }
    }
}
