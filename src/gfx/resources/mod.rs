// src/gfx/resources/mod.rs
//! GPU resource management
//!
//! Handles the depth buffer and the per-frame uniform bindings.

pub mod global_bindings;
pub mod texture_resource;

// Re-export main types
pub use global_bindings::{FrameUBO, FrameUniform, GlobalBindings};
pub use texture_resource::TextureResource;
