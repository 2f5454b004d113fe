//! Session error types.

use std::path::PathBuf;

use raydeck_core::{ContentNotFound, ConvertError};
use raydeck_engine::EngineError;
use thiserror::Error;

/// Everything that can end a render request early.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Render engine is unavailable (initialization failed)")]
    EngineUnavailable,

    #[error(transparent)]
    ContentNotFound(#[from] ContentNotFound),

    #[error("Failed to load model: {}", .0.display())]
    ModelLoad(PathBuf),

    #[error("Render engine could not create {0}")]
    ResourceCreation(&'static str),

    #[error("Render failed: {0}")]
    Render(#[from] EngineError),

    #[error("Display conversion failed: {0}")]
    Convert(#[from] ConvertError),

    #[error("Render cancelled")]
    Cancelled,

    #[error("Another render is already in progress")]
    Busy,

    #[error("Invalid viewport {width}x{height}: both dimensions must be non-zero")]
    InvalidViewport { width: u32, height: u32 },
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
