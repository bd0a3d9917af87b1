use std::{io::BufRead, path::Path};

use super::normals_or_generated;
use crate::gfx::scene::{
    error::SceneLoadError,
    import::{ImportedScene, RawMesh, SceneImporter, SceneNode},
};

/// Wavefront OBJ importer.
///
/// Every `o`/`g` group becomes its own mesh and node under a synthetic root,
/// in file order. Materials are not read.
#[derive(Debug, Clone)]
pub struct ObjImporter {
    options: tobj::LoadOptions,
}

impl Default for ObjImporter {
    fn default() -> Self {
        Self {
            options: tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        }
    }
}

impl ObjImporter {
    /// Parses OBJ text from a reader; `name` labels the root node.
    pub fn import_reader<R: BufRead>(
        &self,
        reader: &mut R,
        name: &str,
    ) -> Result<ImportedScene, SceneLoadError> {
        let (models, _) = tobj::load_obj_buf(reader, &self.options, |_| {
            Err(tobj::LoadError::OpenFileFailed)
        })
        .map_err(|e| SceneLoadError::import(name, e))?;
        Ok(build_scene(name, models))
    }
}

impl SceneImporter for ObjImporter {
    fn import(&self, path: &Path) -> Result<ImportedScene, SceneLoadError> {
        let (models, materials) =
            tobj::load_obj(path, &self.options).map_err(|e| SceneLoadError::import(path, e))?;

        if let Err(e) = materials {
            log::debug!("No materials for {}: {}", path.display(), e);
        }

        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "root".to_string());
        Ok(build_scene(&name, models))
    }
}

fn build_scene(name: &str, models: Vec<tobj::Model>) -> ImportedScene {
    let mut root = SceneNode::new(name);
    let mut meshes = Vec::with_capacity(models.len());

    for (i, model) in models.into_iter().enumerate() {
        // tobj reports a geometry-free file as one empty model
        if model.mesh.positions.is_empty() {
            log::debug!("Skipping OBJ model {} without vertices", i);
            continue;
        }
        let mesh = model.mesh;
        let positions: Vec<[f32; 3]> = mesh
            .positions
            .chunks_exact(3)
            .map(|p| [p[0], p[1], p[2]])
            .collect();
        let faces: Vec<[u32; 3]> = mesh
            .indices
            .chunks_exact(3)
            .map(|f| [f[0], f[1], f[2]])
            .collect();
        let normals = normals_or_generated(
            mesh.normals
                .chunks_exact(3)
                .map(|n| [n[0], n[1], n[2]])
                .collect(),
            &positions,
            &faces,
        );

        let mesh_name = if model.name.is_empty() {
            format!("mesh_{i}")
        } else {
            model.name
        };
        log::debug!(
            "OBJ group '{}': {} vertices, {} triangles",
            mesh_name,
            positions.len(),
            faces.len()
        );

        root.children
            .push(SceneNode::new(mesh_name.clone()).with_meshes([meshes.len()]));
        meshes.push(RawMesh::new(mesh_name, positions, normals, faces));
    }

    ImportedScene::new(meshes, root)
}
