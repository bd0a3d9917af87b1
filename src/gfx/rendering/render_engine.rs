//! WGPU-based Phong rendering backend for the viewer
//!
//! Owns the surface, device and pipelines, uploads the active mesh collection
//! on demand and draws it with the shared viewer parameters, optionally
//! followed by a UI overlay in the same command encoder.

use std::sync::Arc;

use anyhow::Context;
use wgpu::{Device, TextureFormat};

use crate::gfx::{
    render_coordinator::{FrameInputs, RenderBackend},
    resources::{
        global_bindings::{FrameUBO, FrameUniform, GlobalBindings},
        texture_resource::TextureResource,
    },
};

use super::gpu_mesh::{DrawMesh, GpuMeshCache};
use super::pipeline_manager::{PipelineConfig, PipelineManager};

const PHONG_PIPELINE: &str = "Phong";
const WIREFRAME_PIPELINE: &str = "PhongWireframe";

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    format: TextureFormat,
    pipeline_manager: PipelineManager,
    frame_ubo: FrameUBO,
    global_bindings: GlobalBindings,
    mesh_cache: GpuMeshCache,
    warned_no_wireframe: bool,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// Requests `POLYGON_MODE_LINE` when the adapter offers it; without it the
    /// wireframe toggle falls back to filled rendering.
    ///
    /// # Arguments
    /// * `window` - Window surface target for rendering
    /// * `width` - Initial surface width in pixels
    /// * `height` - Initial surface height in pixels
    /// * `vsync` - Present with vertical sync
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> anyhow::Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .context("Failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("Failed to request adapter")?;
        log::info!("Using adapter: {}", adapter.get_info().name);

        let optional_features = adapter.features() & wgpu::Features::POLYGON_MODE_LINE;
        if optional_features.is_empty() {
            log::warn!("Adapter does not support line polygon mode; wireframe is unavailable");
        }

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: optional_features,
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Failed to request a device")?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .context("Surface reports no supported formats")?;
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: choose_present_mode(vsync, &surface_capabilities.present_modes),
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let frame_ubo = FrameUBO::new(&device);
        let global_bindings = GlobalBindings::new(&device, &frame_ubo);

        let device_handle: Arc<Device> = device.into();
        let queue_handle: Arc<wgpu::Queue> = queue.into();
        let mut pipeline_manager = PipelineManager::new(device_handle.clone());

        pipeline_manager.load_shader("phong", include_str!("phong.wgsl"));

        // Imported models have no reliable winding, so both faces are drawn
        let phong = PipelineConfig::default()
            .with_label(PHONG_PIPELINE)
            .with_shader("phong")
            .with_cull_mode(None)
            .with_depth_format(TextureResource::DEPTH_FORMAT)
            .with_color_format(format)
            .with_bind_group_layouts(vec![global_bindings.bind_group_layout().clone()]);
        pipeline_manager.register_pipeline(PHONG_PIPELINE, phong.clone());

        if !optional_features.is_empty() {
            pipeline_manager.register_pipeline(
                WIREFRAME_PIPELINE,
                phong
                    .with_label(WIREFRAME_PIPELINE)
                    .with_polygon_mode(wgpu::PolygonMode::Line),
            );
        }

        if let Err(errors) = pipeline_manager.create_all_pipelines() {
            anyhow::bail!("Failed to create pipelines: {}", errors.join("; "));
        }

        Ok(RenderEngine {
            surface,
            device: device_handle,
            queue: queue_handle,
            config,
            depth_texture,
            format,
            pipeline_manager,
            frame_ubo,
            global_bindings,
            mesh_cache: GpuMeshCache::default(),
            warned_no_wireframe: false,
        })
    }

    /// Renders one frame with an optional overlay drawn on top
    ///
    /// # Errors
    /// Returns the surface error when no frame could be acquired; the caller
    /// decides whether to reconfigure, skip or quit.
    pub fn render_frame<F>(
        &mut self,
        frame: &FrameInputs<'_>,
        overlay: Option<F>,
    ) -> Result<(), wgpu::SurfaceError>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        self.mesh_cache.sync(&self.device, frame.meshes);
        self.frame_ubo
            .update_content(&self.queue, FrameUniform::from_frame(frame));

        let surface_texture = self.surface.get_current_texture()?;
        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let pipeline_name = self.pipeline_for(frame.params.wireframe);

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(frame.params.clear_color()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(pipeline) = self.pipeline_manager.get_pipeline(pipeline_name) {
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);
                for mesh in self.mesh_cache.meshes() {
                    render_pass.draw_mesh(mesh);
                }
            }
        }

        if let Some(overlay) = overlay {
            overlay(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Wraps the engine so a coordinator frame is followed by `overlay`.
    pub fn with_overlay<F>(&mut self, overlay: F) -> OverlayPass<'_, F>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        OverlayPass {
            engine: self,
            overlay: Some(overlay),
        }
    }

    fn pipeline_for(&mut self, wireframe: bool) -> &'static str {
        if !wireframe {
            return PHONG_PIPELINE;
        }
        if self.pipeline_manager.has_pipeline(WIREFRAME_PIPELINE) {
            return WIREFRAME_PIPELINE;
        }
        if !self.warned_no_wireframe {
            log::warn!("Wireframe requested but unsupported; drawing filled");
            self.warned_no_wireframe = true;
        }
        PHONG_PIPELINE
    }

    /// Resizes the surface and recreates the depth buffer
    ///
    /// Zero-sized requests (minimized windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    /// Reconfigures the surface at its current size, e.g. after it was lost.
    pub fn reconfigure(&mut self) {
        self.resize(self.config.width, self.config.height);
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Used for creating compatible render targets and UI systems.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn supports_wireframe(&self) -> bool {
        self.pipeline_manager.has_pipeline(WIREFRAME_PIPELINE)
    }
}

impl RenderBackend for RenderEngine {
    type Error = wgpu::SurfaceError;

    fn submit(&mut self, frame: FrameInputs<'_>) -> Result<(), Self::Error> {
        self.render_frame(
            &frame,
            None::<fn(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView)>,
        )
    }
}

/// A [`RenderEngine`] borrowed for one frame with an overlay attached
pub struct OverlayPass<'e, F> {
    engine: &'e mut RenderEngine,
    overlay: Option<F>,
}

impl<F> RenderBackend for OverlayPass<'_, F>
where
    F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
{
    type Error = wgpu::SurfaceError;

    fn submit(&mut self, frame: FrameInputs<'_>) -> Result<(), Self::Error> {
        self.engine.render_frame(&frame, self.overlay.take())
    }
}

fn choose_present_mode(vsync: bool, supported: &[wgpu::PresentMode]) -> wgpu::PresentMode {
    let preferred = if vsync {
        wgpu::PresentMode::Fifo
    } else {
        wgpu::PresentMode::Immediate
    };
    if supported.contains(&preferred) {
        preferred
    } else {
        // Fifo is always available
        wgpu::PresentMode::Fifo
    }
}
