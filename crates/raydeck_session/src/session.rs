//! One render request, from scene descriptor to display buffer.
//!
//! A session drives the engine through
//! `Loading -> SceneBuilt -> Rendering -> (DenoisePass) -> Converting`, records
//! every handle it acquires and releases all of them, newest first, before
//! [`RenderSession::run`] returns, whether it succeeded or not. A session
//! dropped while unwinding from a panicking engine call releases whatever it
//! still holds.

use raydeck_core::{convert, resolve_content_path, DisplayBuffer, SceneDescriptor};
use raydeck_engine::{
    CameraHandle, EngineError, ImageHandle, RenderEngine, RenderMode, RenderSettings,
    SceneHandle,
};
use raydeck_math::normalize_unguarded;

use crate::cancel::CancellationToken;
use crate::config::{DenoisePolicy, QualitySettings, SessionConfig, Viewport};
use crate::error::{SessionError, SessionResult};
use crate::resources::{Resource, ResourceList};
use crate::state::SessionState;

/// Result of a successful render request.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutput {
    /// 8-bit BGR display buffer
    pub display: DisplayBuffer,
    /// Whether the display buffer came from the denoised image
    pub denoised: bool,
    pub final_state: SessionState,
}

/// Orchestrates a single render over a borrowed engine.
pub struct RenderSession<'a> {
    engine: &'a mut dyn RenderEngine,
    config: &'a SessionConfig,
    cancel: CancellationToken,
    state: SessionState,
    history: Vec<SessionState>,
    resources: ResourceList,
}

impl<'a> RenderSession<'a> {
    pub fn new(
        engine: &'a mut dyn RenderEngine,
        config: &'a SessionConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            engine,
            config,
            cancel,
            state: SessionState::Idle,
            history: vec![SessionState::Idle],
            resources: ResourceList::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Every state visited so far, starting with `Idle`.
    pub fn history(&self) -> &[SessionState] {
        &self.history
    }

    /// Render `descriptor` and convert the result for display.
    ///
    /// Failures are logged once here and returned; every acquired handle has
    /// been released by the time this returns.
    pub fn run(
        &mut self,
        descriptor: &SceneDescriptor,
        quality: QualitySettings,
        viewport: Viewport,
    ) -> SessionResult<RenderOutput> {
        if self.state != SessionState::Idle {
            log::warn!("Render session reused after reaching {}", self.state);
        }

        let result = self.execute(descriptor, quality, viewport);
        self.resources.release_all(&mut *self.engine);

        match result {
            Ok((display, denoised)) => {
                self.transition(SessionState::Complete);
                Ok(RenderOutput {
                    display,
                    denoised,
                    final_state: self.state,
                })
            }
            Err(e) => {
                self.transition(SessionState::Failed);
                log::error!("Render of '{}' failed: {}", descriptor.name, e);
                Err(e)
            }
        }
    }

    fn execute(
        &mut self,
        descriptor: &SceneDescriptor,
        quality: QualitySettings,
        viewport: Viewport,
    ) -> SessionResult<(DisplayBuffer, bool)> {
        let viewport = viewport.validate()?;

        // Loading
        self.transition(SessionState::Loading);
        let path = resolve_content_path(
            &descriptor.filepath,
            self.config.search_start(),
            self.config.content_search_depth,
        )?;
        let model = self
            .engine
            .load_model(&path)
            .ok_or_else(|| SessionError::ModelLoad(path.clone()))?;
        self.resources.push(Resource::Model(model));
        log::info!("Load {}", path.display());
        self.engine.finalize_model(model);

        // SceneBuilt
        self.transition(SessionState::SceneBuilt);
        let scene = self.create_scene()?;
        let camera = self.create_camera()?;
        let main_image = self.create_image(viewport)?;

        self.engine.add_model_to_scene(scene, model);
        self.engine
            .set_sun_illuminance(scene, descriptor.sun_illuminance);
        self.engine
            .set_sun_direction(scene, normalize_unguarded(descriptor.sun_direction));
        self.engine.finalize_scene(scene);
        self.configure_camera(camera, descriptor, viewport);

        // Rendering
        self.transition(SessionState::Rendering);
        let settings = viewport.render_settings(quality);
        self.check_cancelled()?;
        log::info!("Render...");
        self.engine.render(&settings, scene, camera, main_image)?;

        let denoise = self.config.denoise == DenoisePolicy::Auto
            && self.engine.is_denoiser_supported();
        let final_image = if denoise {
            self.denoise_pass(&settings, scene, camera, main_image)?
        } else {
            log::info!("PostProcess...");
            self.engine.post_process(main_image);
            main_image
        };

        // Converting
        self.transition(SessionState::Converting);
        log::info!("Display...");
        let floats = self.engine.dump_image_data(final_image)?;
        let display = convert(&floats, viewport.width, viewport.height)?;
        Ok((display, denoise))
    }

    /// Render albedo and normal guides with a pinhole copy of the camera and
    /// denoise the main image. Returns the image to display.
    fn denoise_pass(
        &mut self,
        settings: &RenderSettings,
        scene: SceneHandle,
        camera: CameraHandle,
        main_image: ImageHandle,
    ) -> SessionResult<ImageHandle> {
        self.transition(SessionState::DenoisePass);
        let viewport = Viewport::new(settings.viewport_width, settings.viewport_height);

        let mut aux = Vec::with_capacity(3);
        let result = self.render_guides_and_denoise(
            settings, scene, camera, main_image, viewport, &mut aux,
        );

        // Guides never outlive this stage. The denoised image stays held
        // until the display buffer has been read from it.
        for resource in aux.into_iter().rev() {
            self.resources.release(&mut *self.engine, resource);
        }
        result
    }

    fn render_guides_and_denoise(
        &mut self,
        settings: &RenderSettings,
        scene: SceneHandle,
        camera: CameraHandle,
        main_image: ImageHandle,
        viewport: Viewport,
        aux: &mut Vec<Resource>,
    ) -> SessionResult<ImageHandle> {
        let albedo = self.create_image(viewport)?;
        aux.push(Resource::Image(albedo));
        let normal = self.create_image(viewport)?;
        aux.push(Resource::Image(normal));
        let denoised = self.create_image(viewport)?;

        let aux_camera = self.create_camera()?;
        aux.push(Resource::Camera(aux_camera));
        self.engine.copy_camera(camera, aux_camera);
        self.engine
            .camera_set_lens(aux_camera, 0.0, self.config.lens_focal_distance);

        for (mode, image) in [
            (RenderMode::Albedo, albedo),
            (RenderMode::MicrosurfaceNormal, normal),
        ] {
            self.check_cancelled()?;
            log::info!("Render {}...", mode.name());
            self.engine
                .render(&settings.with_mode(mode), scene, aux_camera, image)?;
        }

        self.check_cancelled()?;
        log::info!("Denoise...");
        let out = self
            .engine
            .denoise(main_image, true, Some(albedo), Some(normal), denoised)?;
        if out == main_image || out == albedo || out == normal {
            return Err(EngineError::DenoiseFailed(format!(
                "denoise returned input image {}",
                out.raw()
            ))
            .into());
        }
        if out != denoised && !self.resources.contains(Resource::Image(out)) {
            self.resources.push(Resource::Image(out));
        }

        log::info!("PostProcess...");
        self.engine.post_process(out);
        self.engine.post_process(main_image);
        Ok(out)
    }

    fn configure_camera(
        &mut self,
        camera: CameraHandle,
        descriptor: &SceneDescriptor,
        viewport: Viewport,
    ) {
        let config = self.config;
        self.engine
            .camera_set_position(camera, descriptor.camera_location);
        self.engine
            .camera_set_look_at(camera, descriptor.camera_look_at);
        self.engine
            .camera_set_perspective(camera, config.fov_y_degrees, viewport.aspect());
        self.engine
            .camera_set_lens(camera, config.lens_aperture, config.lens_focal_distance);
        let (begin, end) = config.motion_window;
        self.engine.camera_set_motion(camera, begin, end);
    }

    fn create_scene(&mut self) -> SessionResult<SceneHandle> {
        let scene = self
            .engine
            .create_scene()
            .ok_or(SessionError::ResourceCreation("scene"))?;
        self.resources.push(Resource::Scene(scene));
        Ok(scene)
    }

    fn create_camera(&mut self) -> SessionResult<CameraHandle> {
        let camera = self
            .engine
            .create_camera()
            .ok_or(SessionError::ResourceCreation("camera"))?;
        self.resources.push(Resource::Camera(camera));
        Ok(camera)
    }

    fn create_image(&mut self, viewport: Viewport) -> SessionResult<ImageHandle> {
        let image = self
            .engine
            .create_image(viewport.width, viewport.height)
            .ok_or(SessionError::ResourceCreation("image"))?;
        self.resources.push(Resource::Image(image));
        Ok(image)
    }

    fn check_cancelled(&self) -> SessionResult<()> {
        if self.cancel.is_cancelled() {
            log::debug!("Cancellation observed in {}", self.state);
            return Err(SessionError::Cancelled);
        }
        Ok(())
    }

    fn transition(&mut self, next: SessionState) {
        log::debug!("Session: {} -> {}", self.state, next);
        self.state = next;
        self.history.push(next);
    }
}

impl Drop for RenderSession<'_> {
    fn drop(&mut self) {
        if !self.resources.is_empty() {
            log::warn!(
                "Render session dropped in {} holding {} resources; releasing",
                self.state,
                self.resources.len()
            );
            self.resources.release_all(&mut *self.engine);
        }
    }
}
