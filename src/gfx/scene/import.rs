//! The in-memory scene hierarchy produced by a model importer.
//!
//! Importers own file parsing; everything downstream (flattening, rendering)
//! only sees these types. Meshes live in one scene-wide table and nodes refer
//! to them by index, the same way glTF and Assimp scenes are organized.

use std::path::Path;

use cgmath::{Matrix4, SquareMatrix};

use super::error::SceneLoadError;

/// Triangle-mesh geometry as read from the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMesh {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    /// One normal per position, matched by index
    pub normals: Vec<[f32; 3]>,
    pub faces: Vec<[u32; 3]>,
}

impl RawMesh {
    pub fn new(
        name: impl Into<String>,
        positions: Vec<[f32; 3]>,
        normals: Vec<[f32; 3]>,
        faces: Vec<[u32; 3]>,
    ) -> Self {
        Self {
            name: name.into(),
            positions,
            normals,
            faces,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    /// Local transform from the file. Carried for diagnostics, not composed into geometry.
    pub transform: Matrix4<f32>,
    /// Indices into [`ImportedScene::meshes`]
    pub meshes: Vec<usize>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Matrix4::identity(),
            meshes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_meshes(mut self, meshes: impl IntoIterator<Item = usize>) -> Self {
        self.meshes.extend(meshes);
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_transform(mut self, transform: Matrix4<f32>) -> Self {
        self.transform = transform;
        self
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

/// A parsed scene, possibly flagged as incomplete by the importer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportedScene {
    pub meshes: Vec<RawMesh>,
    pub root: Option<SceneNode>,
    /// Set when the importer hit data it could not represent
    pub incomplete: bool,
    /// Importer messages, reported when the scene is rejected
    pub diagnostic: String,
}

impl ImportedScene {
    pub fn new(meshes: Vec<RawMesh>, root: SceneNode) -> Self {
        Self {
            meshes,
            root: Some(root),
            incomplete: false,
            diagnostic: String::new(),
        }
    }

    /// Marks the scene incomplete and appends a message to the diagnostic.
    pub fn flag_incomplete(&mut self, message: impl AsRef<str>) {
        self.incomplete = true;
        if !self.diagnostic.is_empty() {
            self.diagnostic.push_str("; ");
        }
        self.diagnostic.push_str(message.as_ref());
    }
}

/// Turns a file on disk into an [`ImportedScene`].
///
/// A scene that parsed but holds no geometry is `Ok`; only a file that could
/// not be read or parsed is an error.
pub trait SceneImporter {
    fn import(&self, path: &Path) -> Result<ImportedScene, SceneLoadError>;
}

impl<T: SceneImporter + ?Sized> SceneImporter for Box<T> {
    fn import(&self, path: &Path) -> Result<ImportedScene, SceneLoadError> {
        (**self).import(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_count_walks_whole_tree() {
        let root = SceneNode::new("root")
            .with_child(SceneNode::new("a").with_child(SceneNode::new("a1")))
            .with_child(SceneNode::new("b"));
        assert_eq!(root.node_count(), 4);
    }

    #[test]
    fn test_flag_incomplete_accumulates_messages() {
        let mut scene = ImportedScene::new(Vec::new(), SceneNode::new("root"));
        assert!(!scene.incomplete);

        scene.flag_incomplete("primitive 0 has no positions");
        scene.flag_incomplete("primitive 3 has no positions");
        assert!(scene.incomplete);
        assert_eq!(
            scene.diagnostic,
            "primitive 0 has no positions; primitive 3 has no positions"
        );
    }
}
