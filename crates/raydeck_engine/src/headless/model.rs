//! OBJ model records for the headless engine.

use std::path::{Path, PathBuf};

use raydeck_math::{EulerRot, Mat4, Quat, Vec3};

/// A loaded model: where it came from, how much geometry it holds and the
/// placement applied before finalization.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelData {
    pub path: PathBuf,
    pub mesh_count: usize,
    pub triangle_count: usize,
    pub placement: Mat4,
    pub finalized: bool,
}

impl ModelData {
    /// Parse a Wavefront OBJ file. A missing or broken material library is
    /// not an error.
    pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Self, tobj::LoadError> {
        let path = path.as_ref();
        let (models, materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                single_index: true,
                triangulate: true,
                ..Default::default()
            },
        )?;
        if let Err(e) = materials {
            log::warn!("{}: no usable material library ({})", path.display(), e);
        }

        let triangle_count = models.iter().map(|m| m.mesh.indices.len() / 3).sum();
        log::info!(
            "Loaded {} triangle(s) from {} mesh(es) in {}",
            triangle_count,
            models.len(),
            path.display()
        );

        Ok(Self {
            path: path.to_path_buf(),
            mesh_count: models.len(),
            triangle_count,
            placement: Mat4::IDENTITY,
            finalized: false,
        })
    }

    /// Compose scale, then rotation (yaw about Y, pitch about X, roll about Z,
    /// in degrees), then translation onto the current placement.
    pub fn transform(&mut self, translation: Vec3, yaw_pitch_roll: Vec3, scale: Vec3) {
        let rotation = Quat::from_euler(
            EulerRot::YXZ,
            yaw_pitch_roll.x.to_radians(),
            yaw_pitch_roll.y.to_radians(),
            yaw_pitch_roll.z.to_radians(),
        );
        self.placement =
            Mat4::from_scale_rotation_translation(scale, rotation, translation) * self.placement;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_obj_counts_triangles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quad.obj");
        std::fs::write(&path, "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n").unwrap();

        let model = ModelData::load_obj(&path).unwrap();
        assert_eq!(model.mesh_count, 1);
        // The quad is triangulated
        assert_eq!(model.triangle_count, 2);
        assert_eq!(model.placement, Mat4::IDENTITY);
        assert!(!model.finalized);
    }

    #[test]
    fn test_load_missing_obj_fails() {
        assert!(ModelData::load_obj("/no/such/file.obj").is_err());
    }

    #[test]
    fn test_transform_translates_and_scales() {
        let mut model = ModelData {
            path: PathBuf::from("m.obj"),
            mesh_count: 1,
            triangle_count: 1,
            placement: Mat4::IDENTITY,
            finalized: false,
        };
        model.transform(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO, Vec3::splat(2.0));

        let p = model.placement.transform_point3(Vec3::ONE);
        assert!((p - Vec3::new(3.0, 4.0, 5.0)).length() < 1e-5);
    }
}
