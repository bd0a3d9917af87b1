pub mod camera_controller;
pub mod camera_utils;
pub mod orbit_camera;

// Re-export main types
pub use camera_controller::{CameraController, CameraInput};
pub use camera_utils::OPENGL_TO_WGPU_MATRIX;
pub use orbit_camera::{OrbitCamera, Sensitivities};
