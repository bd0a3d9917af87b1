use std::{
    ops::Index,
    path::{Path, PathBuf},
};

use super::vertex::Vertex3D;

/// A self-contained vertex/index buffer pair ready for upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderableMesh {
    pub name: String,
    pub vertices: Vec<Vertex3D>,
    pub indices: Vec<u32>,
}

impl RenderableMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Meshes without triangles are kept in the collection but never drawn.
    pub fn is_drawable(&self) -> bool {
        !self.vertices.is_empty() && !self.indices.is_empty()
    }
}

/// The flattened meshes of one loaded model, in traversal order.
///
/// Collections are immutable once built; a reload produces a new collection
/// that replaces the old one as a whole.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshCollection {
    meshes: Vec<RenderableMesh>,
    source: Option<PathBuf>,
}

impl MeshCollection {
    pub fn new(meshes: Vec<RenderableMesh>) -> Self {
        Self {
            meshes,
            source: None,
        }
    }

    /// An empty collection, shown before any model is loaded.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn meshes(&self) -> &[RenderableMesh] {
        &self.meshes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RenderableMesh> {
        self.meshes.iter()
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn statistics(&self) -> MeshStatistics {
        MeshStatistics {
            mesh_count: self.meshes.len(),
            total_vertices: self.meshes.iter().map(RenderableMesh::vertex_count).sum(),
            total_triangles: self.meshes.iter().map(RenderableMesh::triangle_count).sum(),
        }
    }
}

impl Index<usize> for MeshCollection {
    type Output = RenderableMesh;

    fn index(&self, index: usize) -> &Self::Output {
        &self.meshes[index]
    }
}

impl<'a> IntoIterator for &'a MeshCollection {
    type Item = &'a RenderableMesh;
    type IntoIter = std::slice::Iter<'a, RenderableMesh>;

    fn into_iter(self) -> Self::IntoIter {
        self.meshes.iter()
    }
}

/// Mesh statistics for logging and UI display
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeshStatistics {
    pub mesh_count: usize,
    pub total_vertices: usize,
    pub total_triangles: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh(vertex_count: usize, indices: Vec<u32>) -> RenderableMesh {
        RenderableMesh {
            name: String::new(),
            vertices: vec![Vertex3D::new([0.0; 3], [0.0, 1.0, 0.0]); vertex_count],
            indices,
        }
    }

    #[test]
    fn test_statistics_sum_over_meshes() {
        let collection = MeshCollection::new(vec![
            mesh(3, vec![0, 1, 2]),
            mesh(4, vec![0, 1, 2, 2, 3, 0]),
            mesh(0, vec![]),
        ]);
        assert_eq!(
            collection.statistics(),
            MeshStatistics {
                mesh_count: 3,
                total_vertices: 7,
                total_triangles: 3,
            }
        );
        assert_eq!(collection.iter().filter(|m| m.is_drawable()).count(), 2);
    }

    #[test]
    fn test_empty_collection() {
        let collection = MeshCollection::empty();
        assert!(collection.is_empty());
        assert_eq!(collection.source(), None);
        assert_eq!(collection.statistics(), MeshStatistics::default());
    }
}
