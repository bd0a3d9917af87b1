//! GPU copies of the active mesh collection.

use std::sync::Arc;

use wgpu::util::DeviceExt;

use crate::gfx::scene::{MeshCollection, RenderableMesh};

/// Vertex and index buffers for one [`RenderableMesh`]
pub struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    /// Uploads a mesh; meshes without triangles have nothing to upload.
    pub fn upload(device: &wgpu::Device, mesh: &RenderableMesh) -> Option<Self> {
        if !mesh.is_drawable() {
            return None;
        }
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", mesh.name)),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", mesh.name)),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Some(Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        })
    }
}

/// Remembers which collection the current GPU buffers came from.
///
/// Holding the `Arc` keeps the address alive, so a new collection can never
/// be mistaken for the uploaded one.
#[derive(Default)]
pub struct UploadKey(Option<Arc<MeshCollection>>);

impl UploadKey {
    pub fn is_current(&self, collection: &Arc<MeshCollection>) -> bool {
        self.0
            .as_ref()
            .is_some_and(|uploaded| Arc::ptr_eq(uploaded, collection))
    }

    pub fn set(&mut self, collection: &Arc<MeshCollection>) {
        self.0 = Some(Arc::clone(collection));
    }
}

/// Lazily uploaded GPU buffers for the collection being shown
#[derive(Default)]
pub struct GpuMeshCache {
    key: UploadKey,
    meshes: Vec<GpuMesh>,
}

impl GpuMeshCache {
    /// Uploads `collection` if it is not the one already on the GPU.
    ///
    /// Buffers of the previous collection are dropped here.
    pub fn sync(&mut self, device: &wgpu::Device, collection: &Arc<MeshCollection>) {
        if self.key.is_current(collection) {
            return;
        }
        self.meshes = collection
            .iter()
            .filter_map(|mesh| GpuMesh::upload(device, mesh))
            .collect();
        self.key.set(collection);
        log::debug!(
            "Uploaded {} of {} meshes to the GPU",
            self.meshes.len(),
            collection.len()
        );
    }

    pub fn meshes(&self) -> &[GpuMesh] {
        &self.meshes
    }
}

pub trait DrawMesh<'a> {
    fn draw_mesh(&mut self, mesh: &'a GpuMesh);
}

impl<'a, 'b> DrawMesh<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(&mut self, mesh: &'b GpuMesh) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_key_tracks_pointer_identity() {
        let first = Arc::new(MeshCollection::empty());
        let equal_but_new = Arc::new(MeshCollection::empty());

        let mut key = UploadKey::default();
        assert!(!key.is_current(&first));

        key.set(&first);
        assert!(key.is_current(&first));
        assert!(key.is_current(&Arc::clone(&first)));
        assert!(!key.is_current(&equal_but_new));

        key.set(&equal_but_new);
        assert!(!key.is_current(&first));
    }
}
