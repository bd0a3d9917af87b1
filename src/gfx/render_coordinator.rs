//! Ties the camera, the shared parameters and the active mesh collection
//! together and hands one frame's worth of state to a render backend.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use cgmath::{Matrix4, Point3};

use super::{
    camera::OrbitCamera,
    params::ViewerParams,
    scene::{flatten, MeshCollection, MeshStatistics, SceneImporter, SceneLoadError},
};

/// Everything a backend needs to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameInputs<'a> {
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
    pub camera_position: Point3<f32>,
    pub params: &'a ViewerParams,
    /// Backends may key GPU resources on the identity of this pointer
    pub meshes: &'a Arc<MeshCollection>,
}

/// Receives frames from a [`RenderCoordinator`].
pub trait RenderBackend {
    type Error;

    fn submit(&mut self, frame: FrameInputs<'_>) -> Result<(), Self::Error>;
}

/// Owns the viewer state that outlives a single frame.
pub struct RenderCoordinator<I> {
    importer: I,
    camera: OrbitCamera,
    params: ViewerParams,
    active: Arc<MeshCollection>,
    last_loaded: Option<PathBuf>,
}

impl<I: SceneImporter> RenderCoordinator<I> {
    pub fn new(importer: I, camera: OrbitCamera, params: ViewerParams) -> Self {
        Self {
            importer,
            camera,
            params,
            active: Arc::new(MeshCollection::empty()),
            last_loaded: None,
        }
    }

    /// Imports and flattens `path`, then makes the result the active collection.
    ///
    /// On failure the previously active collection is left untouched.
    pub fn load_model(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<Arc<MeshCollection>, SceneLoadError> {
        let path = path.as_ref();
        log::info!("Loading model from {}", path.display());

        let collection = self
            .importer
            .import(path)
            .and_then(|scene| flatten(&scene))
            .map_err(|e| {
                log::error!("Failed to load {}: {}", path.display(), e);
                e
            })?;

        let collection = Arc::new(collection.with_source(path));
        let stats = collection.statistics();
        log::info!(
            "Loaded {}: {} meshes, {} vertices, {} triangles",
            path.display(),
            stats.mesh_count,
            stats.total_vertices,
            stats.total_triangles
        );

        self.active = Arc::clone(&collection);
        self.last_loaded = Some(path.to_path_buf());
        Ok(collection)
    }

    /// Submits the current camera, parameters and meshes to `backend`.
    pub fn render_frame<B: RenderBackend>(&self, backend: &mut B) -> Result<(), B::Error> {
        backend.submit(self.frame_inputs())
    }

    pub fn frame_inputs(&self) -> FrameInputs<'_> {
        FrameInputs {
            view: self.camera.view_matrix(),
            projection: self.camera.projection_matrix(),
            camera_position: self.camera.position(),
            params: &self.params,
            meshes: &self.active,
        }
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    pub fn params(&self) -> &ViewerParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut ViewerParams {
        &mut self.params
    }

    /// Camera and parameters together, for UI code that edits both.
    pub fn camera_and_params_mut(&mut self) -> (&mut OrbitCamera, &mut ViewerParams) {
        (&mut self.camera, &mut self.params)
    }

    pub fn active_meshes(&self) -> &Arc<MeshCollection> {
        &self.active
    }

    pub fn last_loaded(&self) -> Option<&Path> {
        self.last_loaded.as_deref()
    }

    pub fn statistics(&self) -> MeshStatistics {
        self.active.statistics()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::{ImportedScene, RawMesh, SceneNode};
    use std::{cell::RefCell, collections::HashMap};

    /// Returns canned scenes by path; unknown paths fail to import.
    #[derive(Default)]
    struct ScriptedImporter {
        scenes: HashMap<PathBuf, ImportedScene>,
        calls: RefCell<Vec<PathBuf>>,
    }

    impl ScriptedImporter {
        fn with(mut self, path: &str, scene: ImportedScene) -> Self {
            self.scenes.insert(PathBuf::from(path), scene);
            self
        }
    }

    impl SceneImporter for ScriptedImporter {
        fn import(&self, path: &Path) -> Result<ImportedScene, SceneLoadError> {
            self.calls.borrow_mut().push(path.to_path_buf());
            self.scenes
                .get(path)
                .cloned()
                .ok_or_else(|| SceneLoadError::import(path, "no such file"))
        }
    }

    #[derive(Default)]
    struct RecordingBackend {
        frames: Vec<(Matrix4<f32>, Matrix4<f32>, Point3<f32>, ViewerParams, Arc<MeshCollection>)>,
    }

    impl RenderBackend for RecordingBackend {
        type Error = std::convert::Infallible;

        fn submit(&mut self, frame: FrameInputs<'_>) -> Result<(), Self::Error> {
            self.frames.push((
                frame.view,
                frame.projection,
                frame.camera_position,
                *frame.params,
                Arc::clone(frame.meshes),
            ));
            Ok(())
        }
    }

    fn triangle(name: &str) -> RawMesh {
        RawMesh::new(
            name,
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vec![[0.0, 0.0, 1.0]; 3],
            vec![[0, 1, 2]],
        )
    }

    fn two_plus_one() -> ImportedScene {
        let root = SceneNode::new("root")
            .with_meshes([0, 1])
            .with_child(SceneNode::new("child").with_meshes([2]));
        ImportedScene::new(vec![triangle("a"), triangle("b"), triangle("c")], root)
    }

    fn incomplete() -> ImportedScene {
        let mut scene = ImportedScene::new(vec![triangle("a")], SceneNode::new("root").with_meshes([0]));
        scene.flag_incomplete("truncated");
        scene
    }

    fn coordinator() -> RenderCoordinator<ScriptedImporter> {
        let importer = ScriptedImporter::default()
            .with("good.glb", two_plus_one())
            .with("broken.glb", incomplete());
        RenderCoordinator::new(importer, OrbitCamera::default(), ViewerParams::default())
    }

    #[test]
    fn test_starts_with_empty_collection() {
        let coordinator = coordinator();
        assert!(coordinator.active_meshes().is_empty());
        assert_eq!(coordinator.last_loaded(), None);
    }

    #[test]
    fn test_load_replaces_active_collection() {
        let mut coordinator = coordinator();
        let loaded = coordinator.load_model("good.glb").unwrap();

        assert!(Arc::ptr_eq(&loaded, coordinator.active_meshes()));
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.source(), Some(Path::new("good.glb")));
        assert_eq!(coordinator.last_loaded(), Some(Path::new("good.glb")));
        assert_eq!(coordinator.statistics().total_triangles, 3);
    }

    #[test]
    fn test_failed_load_keeps_previous_collection() {
        let mut coordinator = coordinator();
        let loaded = coordinator.load_model("good.glb").unwrap();

        let err = coordinator.load_model("broken.glb").unwrap_err();
        assert!(matches!(err, SceneLoadError::Incomplete(_)));
        assert!(Arc::ptr_eq(&loaded, coordinator.active_meshes()));

        let err = coordinator.load_model("missing.obj").unwrap_err();
        assert!(matches!(err, SceneLoadError::Import { .. }));
        assert!(Arc::ptr_eq(&loaded, coordinator.active_meshes()));
        assert_eq!(coordinator.last_loaded(), Some(Path::new("good.glb")));
    }

    #[test]
    fn test_reload_builds_equal_but_distinct_collection() {
        let mut coordinator = coordinator();
        let first = coordinator.load_model("good.glb").unwrap();
        let second = coordinator.load_model("good.glb").unwrap();
        assert_eq!(*first, *second);
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(coordinator.importer.calls.borrow().len(), 2);
    }

    #[test]
    fn test_render_frame_submits_current_state() {
        let mut coordinator = coordinator();
        let mut backend = RecordingBackend::default();

        coordinator.render_frame(&mut backend).unwrap();
        let loaded = coordinator.load_model("good.glb").unwrap();
        coordinator.camera_mut().orbit(10.0, 0.0);
        coordinator.params_mut().wireframe = true;
        coordinator.render_frame(&mut backend).unwrap();

        assert_eq!(backend.frames.len(), 2);
        let (_, _, _, first_params, first_meshes) = &backend.frames[0];
        assert!(first_meshes.is_empty());
        assert!(!first_params.wireframe);

        let (view, projection, position, params, meshes) = &backend.frames[1];
        assert!(Arc::ptr_eq(meshes, &loaded));
        assert!(params.wireframe);
        assert_eq!(*view, coordinator.camera().view_matrix());
        assert_eq!(*projection, coordinator.camera().projection_matrix());
        assert_eq!(*position, coordinator.camera().position());
    }
}
