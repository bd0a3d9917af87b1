//! # Graphics Module
//!
//! Everything between a model file and pixels on screen.
//!
//! - **Camera** ([`camera`]) - Orbit camera and the input controller driving it
//! - **Scene** ([`scene`]) - Importers and the flattening of scene hierarchies into meshes
//! - **Coordination** ([`render_coordinator`]) - The active mesh collection, camera and parameters
//! - **Rendering** ([`rendering`]) - The wgpu Phong backend
//! - **UI** ([`ui`]) - The ImGui control panel
//!
//! ## Usage
//!
//! ```no_run
//! use meshview::gfx::{camera::OrbitCamera, params::ViewerParams, RenderCoordinator};
//! use meshview::gfx::scene::FileImporter;
//!
//! let mut coordinator =
//!     RenderCoordinator::new(FileImporter::new(), OrbitCamera::new(), ViewerParams::default());
//! match coordinator.load_model("bunny.obj") {
//!     Ok(meshes) => println!("{} meshes", meshes.len()),
//!     Err(err) => eprintln!("{err}"),
//! }
//! ```

pub mod camera;
pub mod params;
pub mod render_coordinator;
pub mod rendering;
pub mod resources;
pub mod scene;
pub mod ui;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use params::ViewerParams;
pub use render_coordinator::{FrameInputs, RenderBackend, RenderCoordinator};
pub use rendering::RenderEngine;
