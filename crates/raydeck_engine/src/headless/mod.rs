//! In-process render engine.
//!
//! Implements the [`RenderEngine`] interface without the native renderer so
//! hosts and tests can run the full session flow. Models are parsed and
//! counted, scenes and cameras keep their parameters, and every render pass
//! fills its image with a fixed pattern for the requested mode. Nothing is
//! traced or shaded; output depends only on the pass mode, the image extent
//! and the scene's sun illuminance.
//!
//! Resources live in per-kind tables keyed by ids from one counter, so ids are
//! never reused and never zero.

mod image;
mod model;

use std::collections::HashMap;
use std::path::Path;

use raydeck_math::Vec3;

use crate::engine::{EngineError, EngineResult, RenderEngine};
use crate::handle::{CameraHandle, ImageHandle, ModelHandle, SceneHandle};
use crate::settings::{ImageFileType, RenderMode, RenderSettings};

pub use self::image::HdrImage;
pub use self::model::ModelData;

/// Flat albedo and reflectance reported for any geometry.
pub const SURFACE_ALBEDO: Vec3 = Vec3::splat(0.5);

/// Normal pass value for geometry facing the camera, encoded as `0.5 + 0.5 n`.
pub const FACING_NORMAL: Vec3 = Vec3::new(0.5, 0.5, 1.0);

/// Scene state between `create_scene` and `destroy_scene`.
#[derive(Debug, Default)]
struct SceneData {
    models: Vec<ModelHandle>,
    sun_illuminance: Vec3,
    sun_direction: Vec3,
    /// Triangle total taken by `finalize_scene`
    triangle_count: Option<usize>,
}

/// Camera parameters as last set through the engine interface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraParams {
    pub position: Vec3,
    pub look_at: Vec3,
    pub fov_y_degrees: f32,
    pub aspect_wh: f32,
    pub aperture: f32,
    pub focal_distance: f32,
    pub begin_time: f32,
    pub end_time: f32,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            look_at: Vec3::NEG_Z,
            fov_y_degrees: 60.0,
            aspect_wh: 1.0,
            aperture: 0.0,
            focal_distance: 1.0,
            begin_time: 0.0,
            end_time: 0.0,
        }
    }
}

/// Configuration for [`HeadlessEngine`].
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Whether `is_denoiser_supported` reports true
    pub denoiser: bool,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self { denoiser: true }
    }
}

/// Pure Rust implementation of the render engine interface.
pub struct HeadlessEngine {
    config: HeadlessConfig,
    initialized: bool,
    next_id: u64,
    models: HashMap<ModelHandle, ModelData>,
    scenes: HashMap<SceneHandle, SceneData>,
    cameras: HashMap<CameraHandle, CameraParams>,
    images: HashMap<ImageHandle, HdrImage>,
}

/// Value of pixel `(x, y)` in a `width` x `height` pass of `mode`.
///
/// Empty scenes render black in every mode. The beauty pass is the sun
/// illuminance scaled by a vertical ramp, brightest at the top row.
fn pass_value(
    mode: RenderMode,
    sun_illuminance: Vec3,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
) -> Vec3 {
    let u = (x as f32 + 0.5) / width as f32;
    let v = (y as f32 + 0.5) / height as f32;
    match mode {
        RenderMode::Default => sun_illuminance * (0.25 + 0.5 * (1.0 - v)),
        RenderMode::Albedo | RenderMode::Reflectance => SURFACE_ALBEDO,
        RenderMode::SurfaceNormal | RenderMode::MicrosurfaceNormal => FACING_NORMAL,
        RenderMode::Texcoord => Vec3::new(u, v, 0.0),
        RenderMode::Emission => Vec3::ZERO,
    }
}

impl HeadlessEngine {
    pub fn new() -> Self {
        Self::with_config(HeadlessConfig::default())
    }

    pub fn with_config(config: HeadlessConfig) -> Self {
        Self {
            config,
            initialized: false,
            next_id: 1,
            models: HashMap::new(),
            scenes: HashMap::new(),
            cameras: HashMap::new(),
            images: HashMap::new(),
        }
    }

    /// Number of live resources across all kinds.
    pub fn live_resource_count(&self) -> usize {
        self.models.len() + self.scenes.len() + self.cameras.len() + self.images.len()
    }

    pub fn model(&self, model: ModelHandle) -> Option<&ModelData> {
        self.models.get(&model)
    }

    /// Read access to an image, mainly for inspection in tests and tools.
    pub fn image(&self, image: ImageHandle) -> Option<&HdrImage> {
        self.images.get(&image)
    }

    /// Sun illuminance and direction of a scene, as set.
    pub fn scene_sun(&self, scene: SceneHandle) -> Option<(Vec3, Vec3)> {
        self.scenes
            .get(&scene)
            .map(|data| (data.sun_illuminance, data.sun_direction))
    }

    pub fn camera(&self, camera: CameraHandle) -> Option<&CameraParams> {
        self.cameras.get(&camera)
    }

    fn allocate(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn camera_mut(&mut self, camera: CameraHandle) -> Option<&mut CameraParams> {
        let params = self.cameras.get_mut(&camera);
        if params.is_none() {
            log::warn!("Unknown camera {:?}", camera);
        }
        params
    }

    fn scene_mut(&mut self, scene: SceneHandle) -> Option<&mut SceneData> {
        let data = self.scenes.get_mut(&scene);
        if data.is_none() {
            log::warn!("Unknown scene {:?}", scene);
        }
        data
    }

    fn image_ref(&self, image: ImageHandle) -> EngineResult<&HdrImage> {
        self.images.get(&image).ok_or(EngineError::InvalidHandle {
            kind: "image",
            raw: image.raw(),
        })
    }

    fn ensure_initialized(&self) -> EngineResult<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(EngineError::Unavailable)
        }
    }
}

impl Default for HeadlessEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderEngine for HeadlessEngine {
    fn name(&self) -> &str {
        "headless"
    }

    fn initialize(&mut self) -> bool {
        log::info!("Initialize headless render engine");
        self.initialized = true;
        true
    }

    fn terminate(&mut self) {
        log::info!(
            "Terminate headless render engine ({} live resource(s) released)",
            self.live_resource_count()
        );
        self.models.clear();
        self.scenes.clear();
        self.cameras.clear();
        self.images.clear();
        self.initialized = false;
    }

    fn load_model(&mut self, path: &Path) -> Option<ModelHandle> {
        if !self.initialized {
            return None;
        }
        match ModelData::load_obj(path) {
            Ok(model) => {
                let handle = ModelHandle::from_raw(self.allocate())?;
                self.models.insert(handle, model);
                Some(handle)
            }
            Err(e) => {
                log::error!("Failed to load {}: {}", path.display(), e);
                None
            }
        }
    }

    fn transform_model(
        &mut self,
        model: ModelHandle,
        translation: Vec3,
        yaw_pitch_roll: Vec3,
        scale: Vec3,
    ) {
        match self.models.get_mut(&model) {
            Some(data) if data.finalized => {
                log::warn!("{:?} is finalized; transform ignored", model);
            }
            Some(data) => data.transform(translation, yaw_pitch_roll, scale),
            None => log::warn!("Unknown model {:?}", model),
        }
    }

    fn finalize_model(&mut self, model: ModelHandle) {
        match self.models.get_mut(&model) {
            Some(data) => data.finalized = true,
            None => log::warn!("Unknown model {:?}", model),
        }
    }

    fn unload_model(&mut self, model: ModelHandle) -> bool {
        self.models.remove(&model).is_some()
    }

    fn create_scene(&mut self) -> Option<SceneHandle> {
        if !self.initialized {
            return None;
        }
        let handle = SceneHandle::from_raw(self.allocate())?;
        self.scenes.insert(handle, SceneData::default());
        Some(handle)
    }

    fn add_model_to_scene(&mut self, scene: SceneHandle, model: ModelHandle) {
        if !self.models.contains_key(&model) {
            log::warn!("Unknown model {:?}", model);
            return;
        }
        if let Some(data) = self.scene_mut(scene) {
            data.models.push(model);
        }
    }

    fn set_sun_illuminance(&mut self, scene: SceneHandle, rgb: Vec3) {
        if let Some(data) = self.scene_mut(scene) {
            data.sun_illuminance = rgb;
        }
    }

    fn set_sun_direction(&mut self, scene: SceneHandle, direction: Vec3) {
        if let Some(data) = self.scene_mut(scene) {
            data.sun_direction = direction;
        }
    }

    fn finalize_scene(&mut self, scene: SceneHandle) {
        let Some(data) = self.scenes.get_mut(&scene) else {
            log::warn!("Unknown scene {:?}", scene);
            return;
        };
        // Counted now so models may be unloaded independently.
        let triangle_count = data
            .models
            .iter()
            .filter_map(|m| self.models.get(m))
            .map(|m| m.triangle_count)
            .sum();
        log::debug!("Finalized {:?} with {} triangle(s)", scene, triangle_count);
        data.triangle_count = Some(triangle_count);
    }

    fn destroy_scene(&mut self, scene: SceneHandle) -> bool {
        self.scenes.remove(&scene).is_some()
    }

    fn create_camera(&mut self) -> Option<CameraHandle> {
        if !self.initialized {
            return None;
        }
        let handle = CameraHandle::from_raw(self.allocate())?;
        self.cameras.insert(handle, CameraParams::default());
        Some(handle)
    }

    fn camera_set_position(&mut self, camera: CameraHandle, position: Vec3) {
        if let Some(params) = self.camera_mut(camera) {
            params.position = position;
        }
    }

    fn camera_set_look_at(&mut self, camera: CameraHandle, target: Vec3) {
        if let Some(params) = self.camera_mut(camera) {
            params.look_at = target;
        }
    }

    fn camera_set_perspective(&mut self, camera: CameraHandle, fov_y_degrees: f32, aspect_wh: f32) {
        if let Some(params) = self.camera_mut(camera) {
            params.fov_y_degrees = fov_y_degrees;
            params.aspect_wh = aspect_wh;
        }
    }

    fn camera_set_lens(&mut self, camera: CameraHandle, aperture: f32, focal_distance: f32) {
        if let Some(params) = self.camera_mut(camera) {
            params.aperture = aperture;
            params.focal_distance = focal_distance;
        }
    }

    fn camera_set_motion(&mut self, camera: CameraHandle, begin_time: f32, end_time: f32) {
        if let Some(params) = self.camera_mut(camera) {
            params.begin_time = begin_time;
            params.end_time = end_time;
        }
    }

    fn copy_camera(&mut self, src: CameraHandle, dst: CameraHandle) {
        let Some(params) = self.cameras.get(&src).copied() else {
            log::warn!("Unknown camera {:?}", src);
            return;
        };
        if let Some(target) = self.camera_mut(dst) {
            *target = params;
        }
    }

    fn destroy_camera(&mut self, camera: CameraHandle) -> bool {
        self.cameras.remove(&camera).is_some()
    }

    fn create_image(&mut self, width: u32, height: u32) -> Option<ImageHandle> {
        if !self.initialized {
            return None;
        }
        let handle = ImageHandle::from_raw(self.allocate())?;
        self.images.insert(handle, HdrImage::new(width, height));
        Some(handle)
    }

    fn destroy_image(&mut self, image: ImageHandle) -> bool {
        self.images.remove(&image).is_some()
    }

    fn render(
        &mut self,
        settings: &RenderSettings,
        scene: SceneHandle,
        camera: CameraHandle,
        out_image: ImageHandle,
    ) -> EngineResult<()> {
        self.ensure_initialized()?;

        let mode = settings
            .mode()
            .ok_or(EngineError::InvalidRenderMode(settings.render_mode))?;
        let data = self.scenes.get(&scene).ok_or(EngineError::InvalidHandle {
            kind: "scene",
            raw: scene.raw(),
        })?;
        let triangle_count = data
            .triangle_count
            .ok_or(EngineError::SceneNotFinalized(scene.raw()))?;
        let sun_illuminance = data.sun_illuminance;
        if !self.cameras.contains_key(&camera) {
            return Err(EngineError::InvalidHandle {
                kind: "camera",
                raw: camera.raw(),
            });
        }

        let image = self
            .images
            .get_mut(&out_image)
            .ok_or(EngineError::InvalidHandle {
                kind: "image",
                raw: out_image.raw(),
            })?;
        if image.extent() != (settings.viewport_width, settings.viewport_height) {
            image.reallocate(settings.viewport_width, settings.viewport_height);
        }

        let (width, height) = image.extent();
        if triangle_count == 0 {
            image.fill(|_, _| Vec3::ZERO);
        } else {
            image.fill(|x, y| pass_value(mode, sun_illuminance, x, y, width, height));
        }
        log::debug!("{} pass {}x{}", mode.name(), width, height);
        Ok(())
    }

    fn is_denoiser_supported(&self) -> bool {
        self.config.denoiser
    }

    fn denoise(
        &mut self,
        main: ImageHandle,
        _main_is_hdr: bool,
        albedo: Option<ImageHandle>,
        normal: Option<ImageHandle>,
        out_image: ImageHandle,
    ) -> EngineResult<ImageHandle> {
        self.ensure_initialized()?;
        if !self.config.denoiser {
            return Err(EngineError::DenoiseFailed("denoiser not supported".into()));
        }

        let main_image = self.image_ref(main)?;
        let extent = main_image.extent();
        let guide = |handle: Option<ImageHandle>| -> EngineResult<Option<&HdrImage>> {
            let Some(handle) = handle else {
                return Ok(None);
            };
            let image = self.image_ref(handle)?;
            if image.extent() != extent {
                return Err(EngineError::ImageSizeMismatch {
                    expected: extent,
                    actual: image.extent(),
                });
            }
            Ok(Some(image))
        };
        guide(albedo)?;
        guide(normal)?;

        if !self.images.contains_key(&out_image) {
            return Err(EngineError::InvalidHandle {
                kind: "image",
                raw: out_image.raw(),
            });
        }
        // The filtered result is the main image as is.
        let denoised = main_image.clone();

        if let Some(out) = self.images.get_mut(&out_image) {
            *out = denoised;
        }
        Ok(out_image)
    }

    fn post_process(&mut self, image: ImageHandle) {
        match self.images.get_mut(&image) {
            Some(img) => img.clamp_to_display(),
            None => log::warn!("Unknown image {:?}", image),
        }
    }

    fn dump_image_data(&mut self, image: ImageHandle) -> EngineResult<Vec<f32>> {
        Ok(self.image_ref(image)?.to_floats())
    }

    fn write_image_to_disk(
        &mut self,
        image: ImageHandle,
        path: &Path,
        file_type: ImageFileType,
    ) -> bool {
        let Some(img) = self.images.get(&image) else {
            return false;
        };
        match img.write(path, file_type) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to write {}: {}", path.display(), e);
                false
            }
        }
    }
}
