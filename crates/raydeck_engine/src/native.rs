//! Binding to the native renderer library.
//!
//! The library exports a C interface over `uintptr_t` handles where zero
//! means failure. This module declares that interface and wraps it in a
//! [`RenderEngine`] implementation. Image extents are tracked on this side
//! so `dump_image_data` can size its buffer.

use std::collections::HashMap;
use std::ffi::{c_char, CString};
use std::path::Path;

use raydeck_math::Vec3;

use crate::engine::{EngineError, EngineResult, RenderEngine};
use crate::handle::{CameraHandle, ImageHandle, ModelHandle, SceneHandle};
use crate::settings::{ImageFileType, RenderSettings};

type RawHandle = usize;

extern "C" {
    fn Raylib_Initialize() -> i32;
    fn Raylib_Terminate() -> i32;

    fn Raylib_LoadOBJModel(obj_path: *const c_char) -> RawHandle;
    fn Raylib_TransformOBJModel(
        model: RawHandle,
        translation_x: f32,
        translation_y: f32,
        translation_z: f32,
        yaw: f32,
        pitch: f32,
        roll: f32,
        scale_x: f32,
        scale_y: f32,
        scale_z: f32,
    );
    fn Raylib_FinalizeOBJModel(model: RawHandle);
    fn Raylib_UnloadOBJModel(model: RawHandle) -> i32;

    fn Raylib_CreateScene() -> RawHandle;
    fn Raylib_AddOBJModelToScene(scene: RawHandle, model: RawHandle);
    fn Raylib_SetSunIlluminance(scene: RawHandle, r: f32, g: f32, b: f32);
    fn Raylib_SetSunDirection(scene: RawHandle, x: f32, y: f32, z: f32);
    fn Raylib_FinalizeScene(scene: RawHandle);
    fn Raylib_DestroyScene(scene: RawHandle) -> i32;

    fn Raylib_CreateCamera() -> RawHandle;
    fn Raylib_CameraSetPosition(camera: RawHandle, x: f32, y: f32, z: f32);
    fn Raylib_CameraSetLookAt(camera: RawHandle, x: f32, y: f32, z: f32);
    fn Raylib_CameraSetPerspective(camera: RawHandle, fov_y_degrees: f32, aspect_wh: f32);
    fn Raylib_CameraSetLens(camera: RawHandle, aperture: f32, focal_distance: f32);
    fn Raylib_CameraSetMotion(camera: RawHandle, begin_time: f32, end_time: f32);
    fn Raylib_CameraCopy(src: RawHandle, dst: RawHandle);
    fn Raylib_DestroyCamera(camera: RawHandle) -> i32;

    fn Raylib_CreateImage(width: u32, height: u32) -> RawHandle;
    fn Raylib_DumpImageData(image: RawHandle, out: *mut f32);
    fn Raylib_DestroyImage(image: RawHandle) -> i32;

    fn Raylib_Render(
        settings: *const RenderSettings,
        scene: RawHandle,
        camera: RawHandle,
        out_image: RawHandle,
    );
    fn Raylib_Denoise(
        main: RawHandle,
        main_is_hdr: i32,
        albedo: RawHandle,
        normal: RawHandle,
        out_image: RawHandle,
    ) -> i32;
    fn Raylib_PostProcess(image: RawHandle);
    fn Raylib_IsDenoiserSupported() -> i32;

    fn Raylib_WriteImageToDisk(image: RawHandle, filepath: *const c_char, file_type: u32) -> i32;
}

fn raw(id: u64) -> RawHandle {
    id as RawHandle
}

/// The library reports success as a non-zero `int32_t`.
fn status(code: i32) -> bool {
    code != 0
}

fn path_to_cstring(path: &Path) -> Option<CString> {
    CString::new(path.to_str()?).ok()
}

/// [`RenderEngine`] backed by the native renderer library.
///
/// The library keeps process-wide state, so at most one `NativeEngine`
/// should be initialized at a time.
#[derive(Debug, Default)]
pub struct NativeEngine {
    initialized: bool,
    image_extents: HashMap<ImageHandle, (u32, u32)>,
}

impl NativeEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderEngine for NativeEngine {
    fn name(&self) -> &str {
        "native"
    }

    fn initialize(&mut self) -> bool {
        // SAFETY: no preconditions; the library reports failure through the return value.
        self.initialized = status(unsafe { Raylib_Initialize() });
        if !self.initialized {
            log::error!("Native renderer failed to initialize");
        }
        self.initialized
    }

    fn terminate(&mut self) {
        if self.initialized {
            // SAFETY: paired with a successful `Raylib_Initialize`.
            unsafe { Raylib_Terminate() };
            self.initialized = false;
            self.image_extents.clear();
        }
    }

    fn load_model(&mut self, path: &Path) -> Option<ModelHandle> {
        let c_path = path_to_cstring(path)?;
        // SAFETY: `c_path` is a valid NUL-terminated string for the duration of the call.
        ModelHandle::from_raw(unsafe { Raylib_LoadOBJModel(c_path.as_ptr()) } as u64)
    }

    fn transform_model(
        &mut self,
        model: ModelHandle,
        translation: Vec3,
        yaw_pitch_roll: Vec3,
        scale: Vec3,
    ) {
        // SAFETY: handles are only constructed from ids returned by the library.
        unsafe {
            Raylib_TransformOBJModel(
                raw(model.raw()),
                translation.x,
                translation.y,
                translation.z,
                yaw_pitch_roll.x,
                yaw_pitch_roll.y,
                yaw_pitch_roll.z,
                scale.x,
                scale.y,
                scale.z,
            )
        }
    }

    fn finalize_model(&mut self, model: ModelHandle) {
        // SAFETY: handles are only constructed from ids returned by the library.
        unsafe { Raylib_FinalizeOBJModel(raw(model.raw())) }
    }

    fn unload_model(&mut self, model: ModelHandle) -> bool {
        // SAFETY: the handle came from `Raylib_LoadOBJModel`; the library
        // rejects ids it no longer knows.
        status(unsafe { Raylib_UnloadOBJModel(raw(model.raw())) })
    }

    fn create_scene(&mut self) -> Option<SceneHandle> {
        // SAFETY: no arguments; zero signals failure.
        SceneHandle::from_raw(unsafe { Raylib_CreateScene() } as u64)
    }

    fn add_model_to_scene(&mut self, scene: SceneHandle, model: ModelHandle) {
        // SAFETY: handles are only constructed from ids returned by the library.
        unsafe { Raylib_AddOBJModelToScene(raw(scene.raw()), raw(model.raw())) }
    }

    fn set_sun_illuminance(&mut self, scene: SceneHandle, rgb: Vec3) {
        // SAFETY: handles are only constructed from ids returned by the library.
        unsafe { Raylib_SetSunIlluminance(raw(scene.raw()), rgb.x, rgb.y, rgb.z) }
    }

    fn set_sun_direction(&mut self, scene: SceneHandle, direction: Vec3) {
        // SAFETY: handles are only constructed from ids returned by the library.
        unsafe { Raylib_SetSunDirection(raw(scene.raw()), direction.x, direction.y, direction.z) }
    }

    fn finalize_scene(&mut self, scene: SceneHandle) {
        // SAFETY: handles are only constructed from ids returned by the library.
        unsafe { Raylib_FinalizeScene(raw(scene.raw())) }
    }

    fn destroy_scene(&mut self, scene: SceneHandle) -> bool {
        // SAFETY: the scene id came from `Raylib_CreateScene`.
        status(unsafe { Raylib_DestroyScene(raw(scene.raw())) })
    }

    fn create_camera(&mut self) -> Option<CameraHandle> {
        // SAFETY: no arguments; zero signals failure.
        CameraHandle::from_raw(unsafe { Raylib_CreateCamera() } as u64)
    }

    fn camera_set_position(&mut self, camera: CameraHandle, position: Vec3) {
        // SAFETY: handles are only constructed from ids returned by the library.
        unsafe { Raylib_CameraSetPosition(raw(camera.raw()), position.x, position.y, position.z) }
    }

    fn camera_set_look_at(&mut self, camera: CameraHandle, target: Vec3) {
        // SAFETY: handles are only constructed from ids returned by the library.
        unsafe { Raylib_CameraSetLookAt(raw(camera.raw()), target.x, target.y, target.z) }
    }

    fn camera_set_perspective(&mut self, camera: CameraHandle, fov_y_degrees: f32, aspect_wh: f32) {
        // SAFETY: handles are only constructed from ids returned by the library.
        unsafe { Raylib_CameraSetPerspective(raw(camera.raw()), fov_y_degrees, aspect_wh) }
    }

    fn camera_set_lens(&mut self, camera: CameraHandle, aperture: f32, focal_distance: f32) {
        // SAFETY: handles are only constructed from ids returned by the library.
        unsafe { Raylib_CameraSetLens(raw(camera.raw()), aperture, focal_distance) }
    }

    fn camera_set_motion(&mut self, camera: CameraHandle, begin_time: f32, end_time: f32) {
        // SAFETY: handles are only constructed from ids returned by the library.
        unsafe { Raylib_CameraSetMotion(raw(camera.raw()), begin_time, end_time) }
    }

    fn copy_camera(&mut self, src: CameraHandle, dst: CameraHandle) {
        // SAFETY: handles are only constructed from ids returned by the library.
        unsafe { Raylib_CameraCopy(raw(src.raw()), raw(dst.raw())) }
    }

    fn destroy_camera(&mut self, camera: CameraHandle) -> bool {
        // SAFETY: the camera id came from `Raylib_CreateCamera`.
        status(unsafe { Raylib_DestroyCamera(raw(camera.raw())) })
    }

    fn create_image(&mut self, width: u32, height: u32) -> Option<ImageHandle> {
        // SAFETY: plain integer arguments; zero signals failure.
        let image = ImageHandle::from_raw(unsafe { Raylib_CreateImage(width, height) } as u64)?;
        self.image_extents.insert(image, (width, height));
        Some(image)
    }

    fn destroy_image(&mut self, image: ImageHandle) -> bool {
        self.image_extents.remove(&image);
        // SAFETY: the image id came from `Raylib_CreateImage`.
        status(unsafe { Raylib_DestroyImage(raw(image.raw())) })
    }

    fn render(
        &mut self,
        settings: &RenderSettings,
        scene: SceneHandle,
        camera: CameraHandle,
        out_image: ImageHandle,
    ) -> EngineResult<()> {
        if !self.initialized {
            return Err(EngineError::Unavailable);
        }
        if settings.mode().is_none() {
            return Err(EngineError::InvalidRenderMode(settings.render_mode));
        }
        let extent = self
            .image_extents
            .get_mut(&out_image)
            .ok_or(EngineError::InvalidHandle {
                kind: "image",
                raw: out_image.raw(),
            })?;
        // SAFETY: `settings` is a `repr(C)` struct matching the native layout and
        // outlives the blocking call.
        unsafe {
            Raylib_Render(
                settings as *const RenderSettings,
                raw(scene.raw()),
                raw(camera.raw()),
                raw(out_image.raw()),
            )
        };
        // The renderer reallocates the output to the viewport size.
        *extent = (settings.viewport_width, settings.viewport_height);
        Ok(())
    }

    fn is_denoiser_supported(&self) -> bool {
        // SAFETY: no arguments, no side effects.
        status(unsafe { Raylib_IsDenoiserSupported() })
    }

    fn denoise(
        &mut self,
        main: ImageHandle,
        main_is_hdr: bool,
        albedo: Option<ImageHandle>,
        normal: Option<ImageHandle>,
        out_image: ImageHandle,
    ) -> EngineResult<ImageHandle> {
        let main_extent = *self
            .image_extents
            .get(&main)
            .ok_or(EngineError::InvalidHandle {
                kind: "image",
                raw: main.raw(),
            })?;
        // SAFETY: all ids came from `Raylib_CreateImage`; zero stands for a
        // missing guide image, which the library accepts.
        let ok = status(unsafe {
            Raylib_Denoise(
                raw(main.raw()),
                main_is_hdr as i32,
                albedo.map_or(0, |h| raw(h.raw())),
                normal.map_or(0, |h| raw(h.raw())),
                raw(out_image.raw()),
            )
        });
        if !ok {
            return Err(EngineError::DenoiseFailed(
                "native denoiser reported failure".into(),
            ));
        }
        self.image_extents.insert(out_image, main_extent);
        Ok(out_image)
    }

    fn post_process(&mut self, image: ImageHandle) {
        // SAFETY: handles are only constructed from ids returned by the library.
        unsafe { Raylib_PostProcess(raw(image.raw())) }
    }

    fn dump_image_data(&mut self, image: ImageHandle) -> EngineResult<Vec<f32>> {
        let (width, height) = *self
            .image_extents
            .get(&image)
            .ok_or(EngineError::InvalidHandle {
                kind: "image",
                raw: image.raw(),
            })?;
        let mut data = vec![0.0f32; width as usize * height as usize * 3];
        // SAFETY: `data` holds exactly `width * height * 3` floats, the amount
        // the library writes for an image of this extent.
        unsafe { Raylib_DumpImageData(raw(image.raw()), data.as_mut_ptr()) };
        Ok(data)
    }

    fn write_image_to_disk(
        &mut self,
        image: ImageHandle,
        path: &Path,
        file_type: ImageFileType,
    ) -> bool {
        let Some(c_path) = path_to_cstring(path) else {
            log::error!("Path is not representable for the native renderer: {}", path.display());
            return false;
        };
        // SAFETY: `c_path` stays alive across the call; the library validates
        // the handle and the file type.
        status(unsafe {
            Raylib_WriteImageToDisk(raw(image.raw()), c_path.as_ptr(), file_type as u32)
        })
    }
}
