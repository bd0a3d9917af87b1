//! File importers that produce [`ImportedScene`]s.
//!
//! - [`ObjImporter`] reads Wavefront OBJ through `tobj`
//! - [`GltfImporter`] reads glTF 2.0 (`.gltf` and binary `.glb`)
//! - [`FileImporter`] picks one of the above from the file extension
//!
//! Importers always hand out one normal per position: files without normals
//! (or with a mismatched count) get smooth per-vertex normals generated here.

mod gltf_importer;
mod obj_importer;

use std::path::Path;

pub use gltf_importer::GltfImporter;
pub use obj_importer::ObjImporter;

use super::{
    error::SceneLoadError,
    import::{ImportedScene, SceneImporter},
};

/// Normal given to vertices no triangle touches.
const FALLBACK_NORMAL: [f32; 3] = [0.0, 1.0, 0.0];

/// Dispatches to a format importer by file extension.
#[derive(Debug, Default)]
pub struct FileImporter {
    obj: ObjImporter,
    gltf: GltfImporter,
}

impl FileImporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// File extensions accepted by [`FileImporter::import`], lowercase.
    pub const SUPPORTED_EXTENSIONS: &'static [&'static str] = &["obj", "gltf", "glb"];
}

impl SceneImporter for FileImporter {
    fn import(&self, path: &Path) -> Result<ImportedScene, SceneLoadError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "obj" => self.obj.import(path),
            "gltf" | "glb" => self.gltf.import(path),
            other => Err(SceneLoadError::import(
                path,
                format!(
                    "unsupported file extension '{}' (expected one of: {})",
                    other,
                    Self::SUPPORTED_EXTENSIONS.join(", ")
                ),
            )),
        }
    }
}

/// Area-weighted smooth normals, one per position.
///
/// Faces referencing positions that do not exist are skipped here; the
/// flattener reports them as errors later.
pub fn smooth_normals(positions: &[[f32; 3]], faces: &[[u32; 3]]) -> Vec<[f32; 3]> {
    let mut normals = vec![[0.0f32; 3]; positions.len()];

    for face in faces {
        let [i0, i1, i2] = face.map(|i| i as usize);
        let (Some(v0), Some(v1), Some(v2)) =
            (positions.get(i0), positions.get(i1), positions.get(i2))
        else {
            continue;
        };

        let edge1 = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
        let edge2 = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];

        // unnormalized cross product, so larger faces weigh more
        let face_normal = [
            edge1[1] * edge2[2] - edge1[2] * edge2[1],
            edge1[2] * edge2[0] - edge1[0] * edge2[2],
            edge1[0] * edge2[1] - edge1[1] * edge2[0],
        ];

        for vertex_idx in [i0, i1, i2] {
            let normal = &mut normals[vertex_idx];
            normal[0] += face_normal[0];
            normal[1] += face_normal[1];
            normal[2] += face_normal[2];
        }
    }

    for normal in &mut normals {
        let length = (normal[0].powi(2) + normal[1].powi(2) + normal[2].powi(2)).sqrt();
        if length > 0.0 && length.is_finite() {
            normal.iter_mut().for_each(|c| *c /= length);
        } else {
            *normal = FALLBACK_NORMAL;
        }
    }

    normals
}

/// Keeps the file's normals when they line up with the positions.
fn normals_or_generated(
    normals: Vec<[f32; 3]>,
    positions: &[[f32; 3]],
    faces: &[[u32; 3]],
) -> Vec<[f32; 3]> {
    if !normals.is_empty() && normals.len() == positions.len() {
        normals
    } else {
        if !normals.is_empty() {
            log::warn!(
                "Ignoring {} normals for {} positions, generating smooth normals",
                normals.len(),
                positions.len()
            );
        }
        smooth_normals(positions, faces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: [f32; 3], b: [f32; 3]) {
        for i in 0..3 {
            assert!((a[i] - b[i]).abs() < 1e-5, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn test_smooth_normals_of_flat_quad() {
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]];
        let faces = [[0, 1, 2], [0, 2, 3]];
        for normal in smooth_normals(&positions, &faces) {
            assert_close(normal, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn test_smooth_normals_average_across_an_edge() {
        // two faces folded 90 degrees along the x axis
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        let faces = [[0, 1, 2], [0, 3, 1]];
        let normals = smooth_normals(&positions, &faces);
        let s = std::f32::consts::FRAC_1_SQRT_2;
        assert_close(normals[0], [0.0, s, s]);
        assert_close(normals[2], [0.0, 0.0, 1.0]);
        assert_close(normals[3], [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_unreferenced_and_degenerate_vertices_get_fallback() {
        let positions = [[0.0; 3], [0.0; 3], [0.0; 3], [5.0, 5.0, 5.0]];
        let faces = [[0, 1, 2], [0, 1, 9]];
        let normals = smooth_normals(&positions, &faces);
        assert_eq!(normals.len(), 4);
        assert!(normals.iter().all(|&n| n == FALLBACK_NORMAL));
    }

    #[test]
    fn test_file_normals_kept_only_when_counts_match() {
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let faces = [[0, 1, 2]];

        let provided = vec![[1.0, 0.0, 0.0]; 3];
        assert_eq!(normals_or_generated(provided.clone(), &positions, &faces), provided);

        let short = vec![[1.0, 0.0, 0.0]; 2];
        let generated = normals_or_generated(short, &positions, &faces);
        assert_eq!(generated.len(), 3);
        assert_close(generated[0], [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_unknown_extension_is_an_import_error() {
        let importer = FileImporter::new();
        let err = importer.import(Path::new("model.stl")).unwrap_err();
        assert!(matches!(err, SceneLoadError::Import { .. }));
        assert!(err.to_string().contains("stl"));
    }
}
