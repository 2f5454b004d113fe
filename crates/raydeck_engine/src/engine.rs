//! Capability interface over a stateful renderer.
//!
//! The renderer owns every resource; callers only hold typed handles. Any
//! call may fail on its own, so creation calls return `Option` (the engine's
//! zero sentinel) and long-running calls return [`EngineResult`].

use std::path::Path;

use raydeck_math::Vec3;
use thiserror::Error;

use crate::handle::{CameraHandle, ImageHandle, ModelHandle, SceneHandle};
use crate::settings::{ImageFileType, RenderSettings};

/// Errors reported by render engine calls.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Render engine is not initialized")]
    Unavailable,

    #[error("Unknown {kind} handle: {raw:#x}")]
    InvalidHandle { kind: &'static str, raw: u64 },

    #[error("Scene {0:#x} must be finalized before rendering")]
    SceneNotFinalized(u64),

    #[error("Image size mismatch: expected {expected:?}, got {actual:?}")]
    ImageSizeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("Invalid render mode: {0}")]
    InvalidRenderMode(u32),

    #[error("Render failed: {0}")]
    RenderFailed(String),

    #[error("Denoise failed: {0}")]
    DenoiseFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type for engine calls.
pub type EngineResult<T> = Result<T, EngineError>;

/// The operations a renderer offers to a render session.
///
/// `initialize` must succeed before anything else is called, and the owning
/// process calls it at most once.
pub trait RenderEngine: Send {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    // ------------------------------------------------------------------
    // Library initialization & termination

    fn initialize(&mut self) -> bool;
    fn terminate(&mut self);

    // ------------------------------------------------------------------
    // Models

    /// Load a Wavefront OBJ model from an absolute path.
    fn load_model(&mut self, path: &Path) -> Option<ModelHandle>;

    /// Bake translation, rotation (yaw, pitch, roll in degrees) and scale
    /// into the model's geometry. Must precede `finalize_model`.
    fn transform_model(
        &mut self,
        model: ModelHandle,
        translation: Vec3,
        yaw_pitch_roll: Vec3,
        scale: Vec3,
    );

    fn finalize_model(&mut self, model: ModelHandle);

    /// Returns false if the handle is unknown.
    fn unload_model(&mut self, model: ModelHandle) -> bool;

    // ------------------------------------------------------------------
    // Scenes

    fn create_scene(&mut self) -> Option<SceneHandle>;
    fn add_model_to_scene(&mut self, scene: SceneHandle, model: ModelHandle);
    fn set_sun_illuminance(&mut self, scene: SceneHandle, rgb: Vec3);
    fn set_sun_direction(&mut self, scene: SceneHandle, direction: Vec3);

    /// A scene must be finalized before rendering.
    fn finalize_scene(&mut self, scene: SceneHandle);
    fn destroy_scene(&mut self, scene: SceneHandle) -> bool;

    // ------------------------------------------------------------------
    // Cameras

    fn create_camera(&mut self) -> Option<CameraHandle>;
    fn camera_set_position(&mut self, camera: CameraHandle, position: Vec3);
    fn camera_set_look_at(&mut self, camera: CameraHandle, target: Vec3);
    fn camera_set_perspective(&mut self, camera: CameraHandle, fov_y_degrees: f32, aspect_wh: f32);
    fn camera_set_lens(&mut self, camera: CameraHandle, aperture: f32, focal_distance: f32);
    fn camera_set_motion(&mut self, camera: CameraHandle, begin_time: f32, end_time: f32);

    /// Copy every camera parameter from `src` into `dst`.
    fn copy_camera(&mut self, src: CameraHandle, dst: CameraHandle);
    fn destroy_camera(&mut self, camera: CameraHandle) -> bool;

    // ------------------------------------------------------------------
    // Images

    fn create_image(&mut self, width: u32, height: u32) -> Option<ImageHandle>;
    fn destroy_image(&mut self, image: ImageHandle) -> bool;

    // ------------------------------------------------------------------
    // Rendering

    /// Render `scene` through `camera` into `out_image`. Blocks until done.
    fn render(
        &mut self,
        settings: &RenderSettings,
        scene: SceneHandle,
        camera: CameraHandle,
        out_image: ImageHandle,
    ) -> EngineResult<()>;

    fn is_denoiser_supported(&self) -> bool;

    /// Denoise `main` into `out_image`, optionally guided by albedo and
    /// world normal images of the same extent. Returns the denoised image.
    fn denoise(
        &mut self,
        main: ImageHandle,
        main_is_hdr: bool,
        albedo: Option<ImageHandle>,
        normal: Option<ImageHandle>,
        out_image: ImageHandle,
    ) -> EngineResult<ImageHandle>;

    /// In-place tone mapping and gamma correction.
    fn post_process(&mut self, image: ImageHandle);

    /// `width * height * 3` floats, row-major, RGB per pixel.
    fn dump_image_data(&mut self, image: ImageHandle) -> EngineResult<Vec<f32>>;

    // ------------------------------------------------------------------
    // Utils

    /// Returns false for an unknown image or a failed write.
    fn write_image_to_disk(
        &mut self,
        image: ImageHandle,
        path: &Path,
        file_type: ImageFileType,
    ) -> bool;
}
