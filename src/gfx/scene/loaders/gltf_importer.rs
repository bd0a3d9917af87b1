use std::{collections::HashSet, path::Path};

use cgmath::Matrix4;

use super::normals_or_generated;
use crate::gfx::scene::{
    error::SceneLoadError,
    import::{ImportedScene, RawMesh, SceneImporter, SceneNode},
};

/// glTF 2.0 importer for `.gltf` (with external or embedded buffers) and `.glb`.
///
/// Each triangle primitive becomes one mesh in the scene table; a glTF mesh
/// with several primitives is referenced as several meshes by its node.
/// The default scene (or the first one) is wrapped in a synthetic root whose
/// children are the scene's root nodes.
#[derive(Debug, Default, Clone, Copy)]
pub struct GltfImporter;

impl GltfImporter {
    /// Imports a self-contained document (`.glb` or `.gltf` with data URIs).
    pub fn import_slice(&self, bytes: &[u8]) -> Result<ImportedScene, SceneLoadError> {
        let (document, buffers, _images) =
            gltf::import_slice(bytes).map_err(|e| SceneLoadError::import("<memory>", e))?;
        Ok(convert_document(&document, &buffers))
    }
}

impl SceneImporter for GltfImporter {
    fn import(&self, path: &Path) -> Result<ImportedScene, SceneLoadError> {
        let (document, buffers, _images) =
            gltf::import(path).map_err(|e| SceneLoadError::import(path, e))?;
        Ok(convert_document(&document, &buffers))
    }
}

/// Maps glTF mesh index to the scene-table indices of its primitives.
type MeshMap = Vec<Vec<usize>>;

fn convert_document(document: &gltf::Document, buffers: &[gltf::buffer::Data]) -> ImportedScene {
    let mut problems = Vec::new();
    let mut meshes = Vec::new();
    let mut mesh_map: MeshMap = Vec::new();

    for mesh in document.meshes() {
        let mesh_name = mesh
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("mesh_{}", mesh.index()));
        let primitive_count = mesh.primitives().len();
        let mut loaded = Vec::new();

        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!(
                    "Skipping unsupported primitive mode {:?} in mesh {}",
                    primitive.mode(),
                    mesh_name
                );
                continue;
            }

            let name = if primitive_count > 1 {
                format!("{}.{}", mesh_name, primitive.index())
            } else {
                mesh_name.clone()
            };

            match load_primitive(&primitive, buffers, name) {
                Ok(raw) => {
                    loaded.push(meshes.len());
                    meshes.push(raw);
                }
                Err(problem) => problems.push(problem),
            }
        }
        mesh_map.push(loaded);
    }

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next());

    let mut imported = match scene {
        Some(scene) => {
            let name = scene
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("scene_{}", scene.index()));
            let mut root = SceneNode::new(name);
            let mut visited = HashSet::new();
            for node in scene.nodes() {
                if let Some(child) = convert_node(&node, &mesh_map, &mut visited, &mut problems) {
                    root.children.push(child);
                }
            }
            ImportedScene::new(meshes, root)
        }
        None => ImportedScene {
            meshes,
            root: None,
            incomplete: false,
            diagnostic: "document defines no scenes".to_string(),
        },
    };

    for problem in problems {
        imported.flag_incomplete(problem);
    }
    imported
}

fn load_primitive(
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
    name: String,
) -> Result<RawMesh, String> {
    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

    // document validation already requires POSITION; this only guards unvalidated input
    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .ok_or_else(|| format!("primitive '{name}' has no POSITION attribute"))?
        .collect();

    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        // non-indexed primitives draw their vertices in order
        None => (0..positions.len() as u32).collect(),
    };
    if indices.len() % 3 != 0 {
        return Err(format!(
            "primitive '{}' has {} indices, not a whole number of triangles",
            name,
            indices.len()
        ));
    }
    let faces: Vec<[u32; 3]> = indices
        .chunks_exact(3)
        .map(|f| [f[0], f[1], f[2]])
        .collect();

    let normals = normals_or_generated(
        reader
            .read_normals()
            .map(|normals| normals.collect())
            .unwrap_or_default(),
        &positions,
        &faces,
    );

    Ok(RawMesh::new(name, positions, normals, faces))
}

/// Converts a node subtree. Nodes reached twice make the document malformed
/// and are reported instead of converted again.
fn convert_node(
    node: &gltf::Node,
    mesh_map: &MeshMap,
    visited: &mut HashSet<usize>,
    problems: &mut Vec<String>,
) -> Option<SceneNode> {
    if !visited.insert(node.index()) {
        problems.push(format!("node {} is reachable more than once", node.index()));
        return None;
    }

    let name = node
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("node_{}", node.index()));
    let meshes = node
        .mesh()
        .and_then(|mesh| mesh_map.get(mesh.index()))
        .cloned()
        .unwrap_or_default();

    let mut converted = SceneNode::new(name)
        .with_transform(Matrix4::from(node.transform().matrix()))
        .with_meshes(meshes);
    for child in node.children() {
        if let Some(child) = convert_node(&child, mesh_map, visited, problems) {
            converted.children.push(child);
        }
    }
    Some(converted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::flatten::flatten;

    /// Positions (0,0,0) (1,0,0) (0,1,0) followed by u16 indices 0 1 2.
    const BUFFER_URI: &str =
        "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAABAAIAAAA=";

    fn document(meshes: &str, nodes: &str, scenes: &str) -> String {
        format!(
            r#"{{
  "asset": {{ "version": "2.0" }},
  "buffers": [{{ "byteLength": 44, "uri": "{BUFFER_URI}" }}],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 }},
    {{ "buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963 }}
  ],
  "accessors": [
    {{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
       "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] }},
    {{ "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }},
    {{ "bufferView": 1, "componentType": 5123, "count": 2, "type": "SCALAR" }}
  ],
  "meshes": {meshes},
  "nodes": {nodes}{scenes}
}}"#
        )
    }

    const TWO_MESHES: &str = r#"[
    { "name": "indexed", "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1 }] },
    { "name": "plain", "primitives": [{ "attributes": { "POSITION": 0 } }] }
  ]"#;

    const HIERARCHY: &str = r#"[
    { "name": "parent", "mesh": 0, "children": [1], "translation": [1.0, 0.0, 0.0] },
    { "name": "child", "mesh": 1 },
    { "name": "sibling" }
  ]"#;

    const SCENES: &str = r#",
  "scene": 0,
  "scenes": [{ "name": "main", "nodes": [0, 2] }]"#;

    fn import(json: &str) -> ImportedScene {
        GltfImporter.import_slice(json.as_bytes()).unwrap()
    }

    #[test]
    fn test_hierarchy_is_preserved_under_synthetic_root() {
        let scene = import(&document(TWO_MESHES, HIERARCHY, SCENES));
        assert!(!scene.incomplete, "{}", scene.diagnostic);

        let root = scene.root.as_ref().unwrap();
        assert_eq!(root.name, "main");
        let names: Vec<&str> = root.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["parent", "sibling"]);

        let parent = &root.children[0];
        assert_eq!(parent.meshes, vec![0]);
        assert_eq!(parent.children[0].name, "child");
        assert_eq!(parent.children[0].meshes, vec![1]);
        assert_eq!(parent.transform.w.x, 1.0);
    }

    #[test]
    fn test_indexed_and_plain_primitives_read_alike() {
        let scene = import(&document(TWO_MESHES, HIERARCHY, SCENES));
        assert_eq!(scene.meshes.len(), 2);
        for mesh in &scene.meshes {
            assert_eq!(mesh.positions.len(), 3);
            assert_eq!(mesh.faces, vec![[0, 1, 2]]);
            assert_eq!(mesh.normals.len(), 3);
            assert!(mesh.normals.iter().all(|n| (n[2] - 1.0).abs() < 1e-5));
        }
        assert_eq!(scene.meshes[0].positions[1], [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_imported_gltf_flattens_in_pre_order() {
        let collection = flatten(&import(&document(TWO_MESHES, HIERARCHY, SCENES))).unwrap();
        let names: Vec<&str> = collection.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["indexed", "plain"]);
    }

    #[test]
    fn test_partial_triangle_marks_scene_incomplete() {
        let meshes = r#"[
    { "name": "whole", "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1 }] },
    { "name": "partial", "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 2 }] }
  ]"#;
        let nodes = r#"[{ "name": "a", "mesh": 0 }, { "name": "b", "mesh": 1 }]"#;
        let scenes = r#",
  "scenes": [{ "nodes": [0, 1] }]"#;

        let scene = import(&document(meshes, nodes, scenes));
        assert!(scene.incomplete);
        assert!(scene.diagnostic.contains("partial"), "{}", scene.diagnostic);
        assert_eq!(scene.meshes.len(), 1);
        assert!(matches!(flatten(&scene), Err(SceneLoadError::Incomplete(_))));
    }

    #[test]
    fn test_missing_positions_fail_validation() {
        let meshes = r#"[
    { "name": "normals_only", "primitives": [{ "attributes": { "NORMAL": 0 } }] }
  ]"#;
        let nodes = r#"[{ "name": "only", "mesh": 0 }]"#;
        let scenes = r#",
  "scenes": [{ "nodes": [0] }]"#;

        let err = GltfImporter
            .import_slice(document(meshes, nodes, scenes).as_bytes())
            .unwrap_err();
        match err {
            SceneLoadError::Import { diagnostic, .. } => {
                assert!(diagnostic.contains("POSITION"), "{diagnostic}")
            }
            other => panic!("expected Import, got {other:?}"),
        }
    }

    #[test]
    fn test_document_without_scenes_has_no_root() {
        let scene = import(&document(TWO_MESHES, HIERARCHY, ""));
        assert!(scene.root.is_none());
        assert!(matches!(flatten(&scene), Err(SceneLoadError::MissingRoot(_))));
    }

    #[test]
    fn test_malformed_bytes_are_an_import_error() {
        let err = GltfImporter.import_slice(b"not a gltf file").unwrap_err();
        assert!(matches!(err, SceneLoadError::Import { .. }));
    }
}
