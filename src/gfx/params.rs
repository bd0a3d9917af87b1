//! Live-tunable material, lighting and model-transform parameters.
//!
//! The UI panel edits a [`ViewerParams`] in place and the render backend reads
//! it every frame; nothing else holds a copy.

use cgmath::{Deg, InnerSpace, Matrix, Matrix4, SquareMatrix, Vector3};
use serde::{Deserialize, Serialize};

/// Ambient/diffuse/specular RGB triple for a Phong material or light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhongColors {
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
}

impl PhongColors {
    pub const fn grey(ambient: f32, diffuse: f32, specular: f32) -> Self {
        Self {
            ambient: [ambient; 3],
            diffuse: [diffuse; 3],
            specular: [specular; 3],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerParams {
    pub material: PhongColors,
    pub light: PhongColors,
    pub shininess: f32,
    pub translate: [f32; 3],
    pub rotation_axis: [f32; 3],
    /// Degrees
    pub rotation_angle: f32,
    pub scale: f32,
    pub background: [f32; 3],
    pub wireframe: bool,
}

impl Default for ViewerParams {
    fn default() -> Self {
        Self {
            material: PhongColors::grey(0.7, 0.8, 0.8),
            light: PhongColors::grey(0.2, 0.7, 0.9),
            shininess: 32.0,
            translate: [0.0, -1.5, 0.0],
            rotation_axis: [1.0, 0.0, 0.0],
            rotation_angle: -90.0,
            scale: 0.2,
            background: [0.2; 3],
            wireframe: false,
        }
    }
}

impl ViewerParams {
    /// `translate * rotate(axis, angle) * scale`, applied to every mesh.
    ///
    /// A zero-length or non-finite rotation axis means no rotation.
    pub fn model_matrix(&self) -> Matrix4<f32> {
        let translation = Matrix4::from_translation(Vector3::from(self.translate));
        let axis = Vector3::from(self.rotation_axis);
        let magnitude = axis.magnitude();
        let rotation = if magnitude > f32::EPSILON && magnitude.is_finite() {
            Matrix4::from_axis_angle(axis / magnitude, Deg(self.rotation_angle))
        } else {
            Matrix4::identity()
        };
        translation * rotation * Matrix4::from_scale(self.scale)
    }

    /// Inverse-transpose of the model matrix, for transforming normals.
    /// Falls back to identity when the model matrix is singular (scale 0).
    pub fn normal_matrix(&self) -> Matrix4<f32> {
        self.model_matrix()
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or_else(Matrix4::identity)
    }

    pub fn clear_color(&self) -> wgpu::Color {
        let [r, g, b] = self.background;
        wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        }
    }
}
