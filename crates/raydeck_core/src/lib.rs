//! Raydeck Core - scene catalog and display-side data handling.
//!
//! This crate provides:
//!
//! - **Scene catalog**: `SceneCatalog`, `SceneDescriptor`, `SunParam`
//! - **Content lookup**: bounded ancestor search for model files
//! - **Display conversion**: linear float buffers to 8-bit BGR `DisplayBuffer`s
//!
//! # Example
//!
//! ```ignore
//! use raydeck_core::SceneCatalog;
//!
//! let catalog = SceneCatalog::load("scenes.json")?;
//! for scene in catalog.scenes() {
//!     println!("{} -> {}", scene.name, scene.filepath);
//! }
//! ```

pub mod catalog;
pub mod content;
pub mod convert;

// Re-export commonly used types
pub use catalog::{CatalogError, CatalogResult, SceneCatalog, SceneDescriptor, SunParam};
pub use content::{resolve_content_path, ContentNotFound, CONTENT_SEARCH_DEPTH};
pub use convert::{channel_to_byte, convert, ConvertError, DisplayBuffer};
