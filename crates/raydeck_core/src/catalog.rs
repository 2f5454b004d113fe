//! Scene catalog parsing.
//!
//! A catalog is a JSON document listing the scenes a host can render:
//!
//! ```json
//! {
//!   "defaultSunIlluminance": [1.0, 1.0, 1.0],
//!   "defaultSunDirection": [0.0, -1.0, 0.0],
//!   "scenes": [
//!     {
//!       "name": "CornellBox",
//!       "filepath": "content/cornell_box/CornellBox-Mirror.obj",
//!       "cameraLocation": [0.0, 1.0, 4.0],
//!       "cameraLookAt": [0.0, 1.0, -1.0],
//!       "sunIlluminance": "default",
//!       "sunDirection": [0.0, -1.0, -0.5]
//!     }
//!   ]
//! }
//! ```
//!
//! Sun fields accept either a 3-element array or any non-array value, which
//! means "use the catalog default". Defaults are resolved while parsing, so
//! every [`SceneDescriptor`] handed out carries concrete vectors.

use std::collections::HashSet;
use std::path::Path;

use raydeck_math::Vec3;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Errors that can occur while loading a scene catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed scene catalog: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate scene name: {0}")]
    DuplicateScene(String),
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// A sun parameter as written in the catalog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SunParam {
    /// Literal value from the scene entry.
    Explicit(Vec3),
    /// Use the catalog-level default.
    Inherit,
}

impl SunParam {
    /// Resolve against the catalog default.
    pub fn resolve(self, default: Vec3) -> Vec3 {
        match self {
            SunParam::Explicit(v) => v,
            SunParam::Inherit => default,
        }
    }
}

impl<'de> Deserialize<'de> for SunParam {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        if value.is_number() {
            return Err(D::Error::custom(format!(
                "expected a 3-element array or a sentinel, found number {}",
                value
            )));
        }
        if !value.is_array() {
            return Ok(SunParam::Inherit);
        }
        // Arrays are literals and must hold exactly three numbers.
        let xyz: [f32; 3] = serde_json::from_value(value).map_err(D::Error::custom)?;
        Ok(SunParam::Explicit(Vec3::from_array(xyz)))
    }
}

/// One renderable scene with all sun parameters resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneDescriptor {
    /// Display label, unique within the catalog
    pub name: String,

    /// Model path relative to the content root
    pub filepath: String,

    pub camera_location: Vec3,
    pub camera_look_at: Vec3,

    /// Sun illuminance (RGB)
    pub sun_illuminance: Vec3,

    /// Sun direction, not necessarily normalized
    pub sun_direction: Vec3,
}

/// Ordered list of scenes plus the document-level sun defaults.
///
/// Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneCatalog {
    pub default_sun_illuminance: Vec3,
    pub default_sun_direction: Vec3,
    scenes: Vec<SceneDescriptor>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCatalog {
    default_sun_illuminance: [f32; 3],
    default_sun_direction: [f32; 3],
    scenes: Vec<RawScene>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScene {
    name: String,
    filepath: String,
    camera_location: [f32; 3],
    camera_look_at: [f32; 3],
    sun_illuminance: SunParam,
    sun_direction: SunParam,
}

impl SceneCatalog {
    /// Load a catalog from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> CatalogResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&content)?;
        log::info!(
            "Loaded {} scene(s) from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Parse a catalog from a JSON string (useful for testing).
    pub fn from_json_str(content: &str) -> CatalogResult<Self> {
        let raw: RawCatalog = serde_json::from_str(content)?;

        let default_sun_illuminance = Vec3::from_array(raw.default_sun_illuminance);
        let default_sun_direction = Vec3::from_array(raw.default_sun_direction);

        let mut seen = HashSet::new();
        let mut scenes = Vec::with_capacity(raw.scenes.len());
        for scene in raw.scenes {
            if !seen.insert(scene.name.clone()) {
                return Err(CatalogError::DuplicateScene(scene.name));
            }
            scenes.push(SceneDescriptor {
                name: scene.name,
                filepath: scene.filepath,
                camera_location: Vec3::from_array(scene.camera_location),
                camera_look_at: Vec3::from_array(scene.camera_look_at),
                sun_illuminance: scene.sun_illuminance.resolve(default_sun_illuminance),
                sun_direction: scene.sun_direction.resolve(default_sun_direction),
            });
        }

        Ok(Self {
            default_sun_illuminance,
            default_sun_direction,
            scenes,
        })
    }

    /// Scenes in file order.
    pub fn scenes(&self) -> &[SceneDescriptor] {
        &self.scenes
    }

    /// Get a scene by display index.
    pub fn get(&self, index: usize) -> Option<&SceneDescriptor> {
        self.scenes.get(index)
    }

    /// Find a scene by name.
    pub fn find(&self, name: &str) -> Option<&SceneDescriptor> {
        self.scenes.iter().find(|s| s.name == name)
    }

    /// Scene names in display order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scenes.iter().map(|s| s.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}
