use std::path::PathBuf;

use thiserror::Error;

/// Why a model could not be turned into a mesh collection.
///
/// Every variant is recoverable: the caller keeps whatever it was showing before.
#[derive(Debug, Error)]
pub enum SceneLoadError {
    /// The importer could not produce a scene at all.
    #[error("failed to import '{}': {diagnostic}", path.display())]
    Import { path: PathBuf, diagnostic: String },

    /// The importer produced a scene but flagged it as incomplete.
    #[error("imported scene is incomplete: {0}")]
    Incomplete(String),

    #[error("imported scene has no root node: {0}")]
    MissingRoot(String),

    #[error("node '{node}' references mesh {index}, but the scene holds {available} meshes")]
    DanglingMeshReference {
        node: String,
        index: usize,
        available: usize,
    },

    #[error("mesh '{mesh}' has {positions} positions but {normals} normals")]
    NormalCountMismatch {
        mesh: String,
        positions: usize,
        normals: usize,
    },

    #[error("mesh '{mesh}' face {face} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        mesh: String,
        face: usize,
        index: u32,
        vertex_count: usize,
    },
}

impl SceneLoadError {
    pub fn import(path: impl Into<PathBuf>, diagnostic: impl ToString) -> Self {
        Self::Import {
            path: path.into(),
            diagnostic: diagnostic.to_string(),
        }
    }
}
