//! Raydeck Engine - render engine capability interface and implementations.
//!
//! This crate provides:
//!
//! - **`RenderEngine`**: the operations a session drives, over typed handles
//! - **`HeadlessEngine`**: a pure Rust implementation used by default and in tests
//! - **`NativeEngine`**: binding to the native renderer (`--features native`)
//! - **`RenderSettings`**: the wire struct passed to every render call
//!
//! # Example
//!
//! ```ignore
//! use raydeck_engine::{HeadlessEngine, RenderEngine, RenderSettings};
//!
//! let mut engine = HeadlessEngine::new();
//! engine.initialize();
//! let scene = engine.create_scene().unwrap();
//! let camera = engine.create_camera().unwrap();
//! let image = engine.create_image(640, 360).unwrap();
//! engine.finalize_scene(scene);
//! engine.render(&RenderSettings::new(640, 360, 10, 5), scene, camera, image)?;
//! ```

pub mod engine;
pub mod handle;
pub mod headless;
#[cfg(feature = "native")]
pub mod native;
pub mod settings;

// Re-export commonly used types
pub use engine::{EngineError, EngineResult, RenderEngine};
pub use handle::{CameraHandle, ImageHandle, ModelHandle, SceneHandle};
pub use headless::{HeadlessConfig, HeadlessEngine};
#[cfg(feature = "native")]
pub use native::NativeEngine;
pub use settings::{render_mode_name, ImageFileType, RenderMode, RenderSettings, RAY_T_MIN};
