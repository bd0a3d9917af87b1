//! Flattens an imported scene hierarchy into a list of renderable meshes.
//!
//! Nodes are visited depth-first in pre-order; within a node, mesh references
//! are emitted in the order the node lists them. The same scene therefore always
//! produces the same collection. Geometry is copied as-is: node transforms are
//! not applied, faces are not re-triangulated, re-wound or filtered.

use super::{
    error::SceneLoadError,
    import::{ImportedScene, RawMesh, SceneNode},
    model::{MeshCollection, RenderableMesh},
    vertex::Vertex3D,
};

/// Walks `scene` and transcodes every referenced mesh.
///
/// Either the whole scene flattens or an error is returned; a partially
/// flattened list is never produced.
pub fn flatten(scene: &ImportedScene) -> Result<MeshCollection, SceneLoadError> {
    if scene.incomplete {
        return Err(SceneLoadError::Incomplete(scene.diagnostic.clone()));
    }
    let root = scene
        .root
        .as_ref()
        .ok_or_else(|| SceneLoadError::MissingRoot(scene.diagnostic.clone()))?;

    let mut meshes = Vec::new();
    // explicit stack so arbitrarily deep hierarchies cannot overflow the call stack
    let mut stack: Vec<&SceneNode> = vec![root];
    while let Some(node) = stack.pop() {
        for &index in &node.meshes {
            let raw = scene
                .meshes
                .get(index)
                .ok_or_else(|| SceneLoadError::DanglingMeshReference {
                    node: node.name.clone(),
                    index,
                    available: scene.meshes.len(),
                })?;
            meshes.push(transcode_mesh(raw)?);
        }
        // reversed so the first child is popped next
        stack.extend(node.children.iter().rev());
    }

    log::debug!(
        "Flattened {} nodes into {} meshes",
        root.node_count(),
        meshes.len()
    );
    Ok(MeshCollection::new(meshes))
}

/// Copies one raw mesh into GPU vertex/index layout.
pub fn transcode_mesh(raw: &RawMesh) -> Result<RenderableMesh, SceneLoadError> {
    if raw.normals.len() != raw.positions.len() {
        return Err(SceneLoadError::NormalCountMismatch {
            mesh: raw.name.clone(),
            positions: raw.positions.len(),
            normals: raw.normals.len(),
        });
    }

    let vertices: Vec<Vertex3D> = raw
        .positions
        .iter()
        .zip(&raw.normals)
        .map(|(&position, &normal)| Vertex3D::new(position, normal))
        .collect();

    let mut indices = Vec::with_capacity(raw.faces.len() * 3);
    for (face_idx, face) in raw.faces.iter().enumerate() {
        if let Some(&index) = face.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(SceneLoadError::IndexOutOfRange {
                mesh: raw.name.clone(),
                face: face_idx,
                index,
                vertex_count: vertices.len(),
            });
        }
        indices.extend_from_slice(face);
    }

    Ok(RenderableMesh {
        name: raw.name.clone(),
        vertices,
        indices,
    })
}
