//! # Scene Module
//!
//! Turns model files into flat lists of GPU-ready meshes.
//!
//! ## Key Components
//!
//! - [`SceneImporter`] - Parses a file into an [`ImportedScene`] hierarchy
//! - [`FileImporter`] - Chooses the OBJ or glTF importer by extension
//! - [`flatten`] - Pre-order walk producing a [`MeshCollection`]
//! - [`Vertex3D`] - Interleaved position/normal vertex layout
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use meshview::gfx::scene::{flatten, FileImporter, SceneImporter};
//!
//! let scene = FileImporter::new().import(Path::new("model.glb"))?;
//! let meshes = flatten(&scene)?;
//! println!("{} meshes", meshes.len());
//! # Ok::<(), meshview::gfx::scene::SceneLoadError>(())
//! ```

pub mod error;
pub mod flatten;
pub mod import;
pub mod loaders;
pub mod model;
pub mod vertex;

pub use error::SceneLoadError;
pub use flatten::flatten;
pub use import::{ImportedScene, RawMesh, SceneImporter, SceneNode};
pub use loaders::{FileImporter, GltfImporter, ObjImporter};
pub use model::{MeshCollection, MeshStatistics, RenderableMesh};
pub use vertex::Vertex3D;
