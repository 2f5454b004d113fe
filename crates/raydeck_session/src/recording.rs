//! Test double that records every engine call.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use raydeck_engine::{
    CameraHandle, EngineError, EngineResult, ImageFileType, ImageHandle, ModelHandle,
    RenderEngine, RenderMode, RenderSettings, SceneHandle,
};
use raydeck_math::Vec3;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Initialize,
    Terminate,
    LoadModel(PathBuf, Option<ModelHandle>),
    TransformModel(ModelHandle),
    FinalizeModel(ModelHandle),
    UnloadModel(ModelHandle),
    CreateScene(SceneHandle),
    AddModelToScene(SceneHandle, ModelHandle),
    SetSunIlluminance(SceneHandle, Vec3),
    SetSunDirection(SceneHandle, Vec3),
    FinalizeScene(SceneHandle),
    DestroyScene(SceneHandle),
    CreateCamera(CameraHandle),
    CameraSetPosition(CameraHandle, Vec3),
    CameraSetLookAt(CameraHandle, Vec3),
    CameraSetPerspective(CameraHandle, f32, f32),
    CameraSetLens(CameraHandle, f32, f32),
    CameraSetMotion(CameraHandle, f32, f32),
    CopyCamera(CameraHandle, CameraHandle),
    DestroyCamera(CameraHandle),
    CreateImage(ImageHandle, u32, u32),
    DestroyImage(ImageHandle),
    Render(RenderSettings, SceneHandle, CameraHandle, ImageHandle),
    IsDenoiserSupported,
    Denoise {
        main: ImageHandle,
        albedo: Option<ImageHandle>,
        normal: Option<ImageHandle>,
        out: ImageHandle,
    },
    PostProcess(ImageHandle),
    DumpImageData(ImageHandle),
    WriteImageToDisk(ImageHandle),
}

impl Call {
    fn is_release(&self) -> bool {
        matches!(
            self,
            Call::UnloadModel(_) | Call::DestroyScene(_) | Call::DestroyCamera(_) | Call::DestroyImage(_)
        )
    }
}

/// Shared view of the call log, usable after the engine moved into a service.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.0.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    pub fn renders(&self) -> Vec<(RenderSettings, CameraHandle, ImageHandle)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Render(settings, _, camera, image) => Some((settings, camera, image)),
                _ => None,
            })
            .collect()
    }

    pub fn created_handle_count(&self) -> usize {
        self.count(|c| {
            matches!(
                c,
                Call::LoadModel(_, Some(_))
                    | Call::CreateScene(_)
                    | Call::CreateCamera(_)
                    | Call::CreateImage(..)
            )
        })
    }

    /// Raw ids created and not yet released.
    pub fn live_handles(&self) -> Vec<u64> {
        let mut live = Vec::new();
        for call in self.calls() {
            match call {
                Call::LoadModel(_, Some(h)) => live.push(h.raw()),
                Call::CreateScene(h) => live.push(h.raw()),
                Call::CreateCamera(h) => live.push(h.raw()),
                Call::CreateImage(h, ..) => live.push(h.raw()),
                Call::UnloadModel(h) => live.retain(|id| *id != h.raw()),
                Call::DestroyScene(h) => live.retain(|id| *id != h.raw()),
                Call::DestroyCamera(h) => live.retain(|id| *id != h.raw()),
                Call::DestroyImage(h) => live.retain(|id| *id != h.raw()),
                _ => {}
            }
        }
        live
    }
}

type RenderHook = Box<dyn FnMut(&RenderSettings) + Send>;

/// Which input handle a misbehaving `denoise` hands back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenoiseTarget {
    Main,
    Albedo,
    Normal,
}

/// Engine double with scriptable failures.
///
/// Images hold a single fill value so tests can tell which image reached the
/// display buffer: a default render writes 0.8, albedo 0.3, any other aux
/// mode 0.6, denoise 0.4, and post-processing halves the value.
pub struct RecordingEngine {
    log: CallLog,
    next_id: u64,
    images: HashMap<ImageHandle, (u32, u32, f32)>,
    pub init_ok: bool,
    pub denoiser: bool,
    pub fail_load: bool,
    pub fail_create: Option<&'static str>,
    pub fail_render_mode: Option<RenderMode>,
    pub fail_denoise: bool,
    pub denoise_returns: Option<DenoiseTarget>,
    pub refuse_release: bool,
    render_hook: Option<RenderHook>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self {
            log: CallLog::default(),
            next_id: 1,
            images: HashMap::new(),
            init_ok: true,
            denoiser: true,
            fail_load: false,
            fail_create: None,
            fail_render_mode: None,
            fail_denoise: false,
            refuse_release: false,
            denoise_returns: None,
            render_hook: None,
        }
    }

    pub fn without_denoiser() -> Self {
        Self {
            denoiser: false,
            ..Self::new()
        }
    }

    /// Run `hook` at the start of every render call.
    pub fn on_render(mut self, hook: impl FnMut(&RenderSettings) + Send + 'static) -> Self {
        self.render_hook = Some(Box::new(hook));
        self
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.calls()
    }

    pub fn release_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_release).collect()
    }

    /// A model handle that did not come from `load_model`.
    pub fn create_model_handle(&mut self) -> ModelHandle {
        ModelHandle::from_raw(self.allocate()).unwrap()
    }

    fn allocate(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn creation_fails(&self, kind: &str) -> bool {
        self.fail_create == Some(kind)
    }
}

impl RenderEngine for RecordingEngine {
    fn name(&self) -> &str {
        "recording"
    }

    fn initialize(&mut self) -> bool {
        self.log.push(Call::Initialize);
        self.init_ok
    }

    fn terminate(&mut self) {
        self.log.push(Call::Terminate);
    }

    fn load_model(&mut self, path: &Path) -> Option<ModelHandle> {
        let handle = if self.fail_load {
            None
        } else {
            ModelHandle::from_raw(self.allocate())
        };
        self.log.push(Call::LoadModel(path.to_path_buf(), handle));
        handle
    }

    fn transform_model(&mut self, model: ModelHandle, _: Vec3, _: Vec3, _: Vec3) {
        self.log.push(Call::TransformModel(model));
    }

    fn finalize_model(&mut self, model: ModelHandle) {
        self.log.push(Call::FinalizeModel(model));
    }

    fn unload_model(&mut self, model: ModelHandle) -> bool {
        self.log.push(Call::UnloadModel(model));
        !self.refuse_release
    }

    fn create_scene(&mut self) -> Option<SceneHandle> {
        if self.creation_fails("scene") {
            return None;
        }
        let scene = SceneHandle::from_raw(self.allocate())?;
        self.log.push(Call::CreateScene(scene));
        Some(scene)
    }

    fn add_model_to_scene(&mut self, scene: SceneHandle, model: ModelHandle) {
        self.log.push(Call::AddModelToScene(scene, model));
    }

    fn set_sun_illuminance(&mut self, scene: SceneHandle, rgb: Vec3) {
        self.log.push(Call::SetSunIlluminance(scene, rgb));
    }

    fn set_sun_direction(&mut self, scene: SceneHandle, direction: Vec3) {
        self.log.push(Call::SetSunDirection(scene, direction));
    }

    fn finalize_scene(&mut self, scene: SceneHandle) {
        self.log.push(Call::FinalizeScene(scene));
    }

    fn destroy_scene(&mut self, scene: SceneHandle) -> bool {
        self.log.push(Call::DestroyScene(scene));
        !self.refuse_release
    }

    fn create_camera(&mut self) -> Option<CameraHandle> {
        if self.creation_fails("camera") {
            return None;
        }
        let camera = CameraHandle::from_raw(self.allocate())?;
        self.log.push(Call::CreateCamera(camera));
        Some(camera)
    }

    fn camera_set_position(&mut self, camera: CameraHandle, position: Vec3) {
        self.log.push(Call::CameraSetPosition(camera, position));
    }

    fn camera_set_look_at(&mut self, camera: CameraHandle, target: Vec3) {
        self.log.push(Call::CameraSetLookAt(camera, target));
    }

    fn camera_set_perspective(&mut self, camera: CameraHandle, fov_y_degrees: f32, aspect_wh: f32) {
        self.log
            .push(Call::CameraSetPerspective(camera, fov_y_degrees, aspect_wh));
    }

    fn camera_set_lens(&mut self, camera: CameraHandle, aperture: f32, focal_distance: f32) {
        self.log
            .push(Call::CameraSetLens(camera, aperture, focal_distance));
    }

    fn camera_set_motion(&mut self, camera: CameraHandle, begin_time: f32, end_time: f32) {
        self.log
            .push(Call::CameraSetMotion(camera, begin_time, end_time));
    }

    fn copy_camera(&mut self, src: CameraHandle, dst: CameraHandle) {
        self.log.push(Call::CopyCamera(src, dst));
    }

    fn destroy_camera(&mut self, camera: CameraHandle) -> bool {
        self.log.push(Call::DestroyCamera(camera));
        !self.refuse_release
    }

    fn create_image(&mut self, width: u32, height: u32) -> Option<ImageHandle> {
        if self.creation_fails("image") {
            return None;
        }
        let image = ImageHandle::from_raw(self.allocate())?;
        self.images.insert(image, (width, height, 0.0));
        self.log.push(Call::CreateImage(image, width, height));
        Some(image)
    }

    fn destroy_image(&mut self, image: ImageHandle) -> bool {
        self.images.remove(&image);
        self.log.push(Call::DestroyImage(image));
        !self.refuse_release
    }

    fn render(
        &mut self,
        settings: &RenderSettings,
        scene: SceneHandle,
        camera: CameraHandle,
        out_image: ImageHandle,
    ) -> EngineResult<()> {
        self.log
            .push(Call::Render(*settings, scene, camera, out_image));
        if let Some(hook) = self.render_hook.as_mut() {
            hook(settings);
        }
        let mode = settings
            .mode()
            .ok_or(EngineError::InvalidRenderMode(settings.render_mode))?;
        if self.fail_render_mode == Some(mode) {
            return Err(EngineError::RenderFailed(format!("{} pass failed", mode.name())));
        }
        let fill = match mode {
            RenderMode::Default => 0.8,
            RenderMode::Albedo => 0.3,
            _ => 0.6,
        };
        self.images.insert(
            out_image,
            (settings.viewport_width, settings.viewport_height, fill),
        );
        Ok(())
    }

    fn is_denoiser_supported(&self) -> bool {
        self.log.push(Call::IsDenoiserSupported);
        self.denoiser
    }

    fn denoise(
        &mut self,
        main: ImageHandle,
        _main_is_hdr: bool,
        albedo: Option<ImageHandle>,
        normal: Option<ImageHandle>,
        out_image: ImageHandle,
    ) -> EngineResult<ImageHandle> {
        self.log.push(Call::Denoise {
            main,
            albedo,
            normal,
            out: out_image,
        });
        if self.fail_denoise {
            return Err(EngineError::DenoiseFailed("scripted failure".into()));
        }
        let redirected = match self.denoise_returns {
            Some(DenoiseTarget::Main) => Some(main),
            Some(DenoiseTarget::Albedo) => albedo,
            Some(DenoiseTarget::Normal) => normal,
            None => None,
        };
        if let Some(image) = redirected {
            return Ok(image);
        }
        let (w, h, _) = self.images.get(&main).copied().unwrap_or_default();
        self.images.insert(out_image, (w, h, 0.4));
        Ok(out_image)
    }

    fn post_process(&mut self, image: ImageHandle) {
        self.log.push(Call::PostProcess(image));
        if let Some((_, _, fill)) = self.images.get_mut(&image) {
            *fill *= 0.5;
        }
    }

    fn dump_image_data(&mut self, image: ImageHandle) -> EngineResult<Vec<f32>> {
        self.log.push(Call::DumpImageData(image));
        let (w, h, fill) = *self.images.get(&image).ok_or(EngineError::InvalidHandle {
            kind: "image",
            raw: image.raw(),
        })?;
        Ok(vec![fill; w as usize * h as usize * 3])
    }

    fn write_image_to_disk(&mut self, image: ImageHandle, _: &Path, _: ImageFileType) -> bool {
        self.log.push(Call::WriteImageToDisk(image));
        self.images.contains_key(&image)
    }
}
