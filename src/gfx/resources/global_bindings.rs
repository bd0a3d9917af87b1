//! Per-frame uniform data and its bind group
//!
//! One uniform buffer carries everything the Phong shader needs for a frame:
//! camera and model matrices, the light position and the material/light colors.
//! It is bound to group 0 in every pipeline.

use cgmath::{Matrix4, Point3};

use crate::{
    gfx::{
        camera::{camera_utils::convert_matrix4_to_array, OPENGL_TO_WGPU_MATRIX},
        params::ViewerParams,
        render_coordinator::FrameInputs,
    },
    wgpu_utils::{binding_types, uniform_buffer::UniformBuffer},
};

/// MUST match the `FrameUniform` struct in `phong.wgsl` exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniform {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
    view_position: [f32; 4],
    light_position: [f32; 4],
    material_ambient: [f32; 4],
    material_diffuse: [f32; 4],
    /// `w` holds the shininess exponent
    material_specular: [f32; 4],
    light_ambient: [f32; 4],
    light_diffuse: [f32; 4],
    light_specular: [f32; 4],
}

fn rgb(color: [f32; 3], w: f32) -> [f32; 4] {
    [color[0], color[1], color[2], w]
}

fn homogeneous(point: Point3<f32>) -> [f32; 4] {
    point.to_homogeneous().into()
}

impl FrameUniform {
    /// Packs one frame. The light sits at the camera position.
    pub fn new(
        view: Matrix4<f32>,
        projection: Matrix4<f32>,
        camera_position: Point3<f32>,
        params: &ViewerParams,
    ) -> Self {
        let view_proj = OPENGL_TO_WGPU_MATRIX * projection * view;
        Self {
            view_proj: convert_matrix4_to_array(view_proj),
            model: convert_matrix4_to_array(params.model_matrix()),
            normal_matrix: convert_matrix4_to_array(params.normal_matrix()),
            view_position: homogeneous(camera_position),
            light_position: homogeneous(camera_position),
            material_ambient: rgb(params.material.ambient, 1.0),
            material_diffuse: rgb(params.material.diffuse, 1.0),
            material_specular: rgb(params.material.specular, params.shininess),
            light_ambient: rgb(params.light.ambient, 1.0),
            light_diffuse: rgb(params.light.diffuse, 1.0),
            light_specular: rgb(params.light.specular, 1.0),
        }
    }

    pub fn from_frame(frame: &FrameInputs<'_>) -> Self {
        Self::new(
            frame.view,
            frame.projection,
            frame.camera_position,
            frame.params,
        )
    }
}

pub type FrameUBO = UniformBuffer<FrameUniform>;

/// Bind group layout and bind group for the frame uniform buffer
pub struct GlobalBindings {
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device, ubo: &FrameUBO) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: binding_types::uniform(),
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Global Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.binding_resource(),
            }],
        });

        Self {
            bind_group_layout,
            bind_group,
        }
    }

    /// Used when creating render pipelines that need access to global uniforms.
    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::OrbitCamera;

    #[test]
    fn test_layout_is_uniform_compatible() {
        // three mat4 and eight vec4
        assert_eq!(std::mem::size_of::<FrameUniform>(), 3 * 64 + 8 * 16);
        assert_eq!(std::mem::size_of::<FrameUniform>() % 16, 0);
    }

    #[test]
    fn test_light_follows_camera() {
        let camera = OrbitCamera::default();
        let params = ViewerParams::default();
        let uniform = FrameUniform::new(
            camera.view_matrix(),
            camera.projection_matrix(),
            camera.position(),
            &params,
        );

        let eye = camera.position();
        assert_eq!(uniform.view_position, [eye.x, eye.y, eye.z, 1.0]);
        assert_eq!(uniform.light_position, uniform.view_position);
    }

    #[test]
    fn test_colors_and_shininess_are_packed() {
        let params = ViewerParams {
            shininess: 64.0,
            ..Default::default()
        };
        let camera = OrbitCamera::default();
        let uniform = FrameUniform::new(
            camera.view_matrix(),
            camera.projection_matrix(),
            camera.position(),
            &params,
        );

        assert_eq!(uniform.material_ambient, [0.7, 0.7, 0.7, 1.0]);
        assert_eq!(uniform.material_specular, [0.8, 0.8, 0.8, 64.0]);
        assert_eq!(uniform.light_diffuse, [0.7, 0.7, 0.7, 1.0]);
    }

    #[test]
    fn test_view_proj_applies_depth_correction() {
        let camera = OrbitCamera::default();
        let params = ViewerParams::default();
        let uniform = FrameUniform::new(
            camera.view_matrix(),
            camera.projection_matrix(),
            camera.position(),
            &params,
        );
        let expected = OPENGL_TO_WGPU_MATRIX * camera.projection_matrix() * camera.view_matrix();
        assert_eq!(uniform.view_proj, convert_matrix4_to_array(expected));
    }
}
