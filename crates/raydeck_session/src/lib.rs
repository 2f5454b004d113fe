//! Raydeck Session - drives a render engine through one render request.
//!
//! This crate provides:
//!
//! - **`RenderSession`**: the state machine from scene descriptor to display buffer
//! - **`RenderService`**: one-time engine initialization and the busy guard
//! - **`SessionConfig`**, **`QualitySettings`**, **`Viewport`**: request parameters
//! - **`CancellationToken`**: cooperative cancellation at stage boundaries
//!
//! # Example
//!
//! ```ignore
//! use raydeck_core::SceneCatalog;
//! use raydeck_engine::HeadlessEngine;
//! use raydeck_session::{CancellationToken, QualitySettings, RenderService, SessionConfig, Viewport};
//!
//! let catalog = SceneCatalog::load("scenes.json")?;
//! let service = RenderService::new(HeadlessEngine::new(), SessionConfig::default());
//! let output = service.render(
//!     &catalog.scenes()[0],
//!     QualitySettings::default(),
//!     Viewport::new(640, 360),
//!     &CancellationToken::new(),
//! )?;
//! output.display.to_rgb_image().save("render.png")?;
//! ```

pub mod cancel;
pub mod config;
pub mod error;
pub mod resources;
pub mod service;
pub mod session;
pub mod state;

#[cfg(test)]
mod recording;

// Re-export commonly used types
pub use cancel::CancellationToken;
pub use config::{DenoisePolicy, QualitySettings, SessionConfig, Viewport};
pub use error::{SessionError, SessionResult};
pub use service::{EngineStatus, RenderService};
pub use session::{RenderOutput, RenderSession};
pub use state::SessionState;

#[cfg(test)]
mod tests {
    use super::*;
    use raydeck_core::SceneCatalog;
    use raydeck_engine::{HeadlessConfig, HeadlessEngine};

    const CATALOG: &str = r#"{
        "defaultSunIlluminance": [2.0, 2.0, 2.0],
        "defaultSunDirection": [0.0, 0.0, -1.0],
        "scenes": [
            {
                "name": "wall",
                "filepath": "content/wall.obj",
                "cameraLocation": [0.0, 0.0, 0.0],
                "cameraLookAt": [0.0, 0.0, -1.0],
                "sunIlluminance": "default",
                "sunDirection": "default"
            }
        ]
    }"#;

    fn write_wall(root: &std::path::Path) {
        std::fs::create_dir_all(root.join("content")).unwrap();
        std::fs::write(
            root.join("content/wall.obj"),
            "v -20 -20 -4\nv 20 -20 -4\nv 20 20 -4\nv -20 20 -4\nf 1 2 3 4\n",
        )
        .unwrap();
    }

    fn render_with(denoiser: bool) -> RenderOutput {
        let dir = tempfile::tempdir().unwrap();
        write_wall(dir.path());
        let catalog = SceneCatalog::from_json_str(CATALOG).unwrap();
        let config = SessionConfig {
            search_root: Some(dir.path().join("nested")),
            ..Default::default()
        };
        std::fs::create_dir_all(dir.path().join("nested")).unwrap();

        let engine = HeadlessEngine::with_config(HeadlessConfig {
            denoiser,
            ..Default::default()
        });
        let service = RenderService::new(engine, config);
        service
            .render(
                &catalog.scenes()[0],
                QualitySettings::new(4, 2),
                Viewport::new(16, 9),
                &CancellationToken::new(),
            )
            .unwrap()
    }

    #[test]
    fn test_headless_end_to_end() {
        let output = render_with(false);
        assert_eq!(output.final_state, SessionState::Complete);
        assert!(!output.denoised);
        assert_eq!((output.display.width, output.display.height), (16, 9));
        assert_eq!(output.display.pixels.len(), 16 * 9 * 3);
        // Grey wall lit head-on
        assert!(output.display.pixels.iter().any(|&b| b > 0));
    }

    #[test]
    fn test_headless_end_to_end_denoised() {
        let output = render_with(true);
        assert!(output.denoised);
        assert_eq!(output.display.pixels.len(), 16 * 9 * 3);
        assert!(output.display.pixels.iter().any(|&b| b > 0));
    }
}
