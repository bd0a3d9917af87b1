//! meshview
//!
//! An interactive 3D model viewer built on wgpu and winit: load an OBJ or glTF
//! model, orbit around it and tune its Phong lighting live.

pub mod app;
pub mod config;
pub mod gfx;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::ViewerApp;
pub use config::ViewerConfig;

/// Creates a viewer with the default configuration and no model loaded
pub fn default() -> anyhow::Result<ViewerApp> {
    ViewerApp::new(ViewerConfig::default())
}
