//! Process-wide owner of the render engine.

use std::sync::{Mutex, TryLockError};

use raydeck_core::SceneDescriptor;
use raydeck_engine::RenderEngine;

use crate::cancel::CancellationToken;
use crate::config::{QualitySettings, SessionConfig, Viewport};
use crate::error::{SessionError, SessionResult};
use crate::session::{RenderOutput, RenderSession};

/// Outcome of the one-time engine initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    Ready,
    Unavailable,
}

/// Owns the engine, initializes it once and runs one render at a time.
///
/// A request that arrives while another is in flight fails with
/// [`SessionError::Busy`] instead of waiting. If initialization failed,
/// every request fails with [`SessionError::EngineUnavailable`] without
/// touching the engine.
pub struct RenderService {
    engine: Mutex<Box<dyn RenderEngine>>,
    status: EngineStatus,
    config: SessionConfig,
}

impl RenderService {
    pub fn new<E: RenderEngine + 'static>(engine: E, config: SessionConfig) -> Self {
        Self::from_boxed(Box::new(engine), config)
    }

    pub fn from_boxed(mut engine: Box<dyn RenderEngine>, config: SessionConfig) -> Self {
        let status = if engine.initialize() {
            log::info!("Render engine '{}' ready", engine.name());
            EngineStatus::Ready
        } else {
            log::error!("Render engine '{}' failed to initialize", engine.name());
            EngineStatus::Unavailable
        };
        Self {
            engine: Mutex::new(engine),
            status,
            config,
        }
    }

    pub fn status(&self) -> EngineStatus {
        self.status
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Run one render session. See [`RenderSession::run`].
    pub fn render(
        &self,
        descriptor: &SceneDescriptor,
        quality: QualitySettings,
        viewport: Viewport,
        cancel: &CancellationToken,
    ) -> SessionResult<RenderOutput> {
        if self.status == EngineStatus::Unavailable {
            let err = SessionError::EngineUnavailable;
            log::error!("Render of '{}' rejected: {}", descriptor.name, err);
            return Err(err);
        }

        let mut engine = match self.engine.try_lock() {
            Ok(engine) => engine,
            Err(TryLockError::WouldBlock) => {
                let err = SessionError::Busy;
                log::error!("Render of '{}' rejected: {}", descriptor.name, err);
                return Err(err);
            }
            Err(TryLockError::Poisoned(poisoned)) => {
                // A session dropped while unwinding has already released its
                // handles.
                log::warn!("Render engine lock was poisoned by an earlier panic; continuing");
                poisoned.into_inner()
            }
        };

        let mut session = RenderSession::new(&mut **engine, &self.config, cancel.clone());
        session.run(descriptor, quality, viewport)
    }
}

impl Drop for RenderService {
    fn drop(&mut self) {
        if self.status != EngineStatus::Ready {
            return;
        }
        let engine = match self.engine.get_mut() {
            Ok(engine) => engine,
            Err(poisoned) => poisoned.into_inner(),
        };
        engine.terminate();
    }
}
