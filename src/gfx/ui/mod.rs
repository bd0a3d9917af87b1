//! Dear ImGui integration: platform glue, per-frame logic and overlay rendering.

pub mod panel;

use imgui::{Context, FontConfig, FontSource, MouseCursor};
use imgui_wgpu::{Renderer, RendererConfig};
use imgui_winit_support::{HiDpiMode, WinitPlatform};
use std::time::Instant;
use wgpu::{CommandEncoder, Device, Queue, TextureFormat, TextureView};
use winit::{
    event::{Event, WindowEvent},
    window::Window,
};

pub use panel::{viewer_panel, PanelResponse, PanelState};

pub struct UiManager {
    pub context: Context,
    platform: WinitPlatform,
    renderer: Renderer,
    last_frame: Instant,
    last_cursor: Option<MouseCursor>,
}

impl UiManager {
    pub fn new(
        device: &Device,
        queue: &Queue,
        output_color_format: TextureFormat,
        window: &Window,
    ) -> Self {
        let mut context = Context::create();
        context.set_ini_filename(None);

        // Locked scale: display size is kept in physical pixels to match the surface
        let mut platform = WinitPlatform::new(&mut context);
        platform.attach_window(context.io_mut(), window, HiDpiMode::Locked(1.0));
        log::debug!("Window scale factor: {}", window.scale_factor());

        let font_size = 18.0;
        context.fonts().add_font(&[FontSource::DefaultFontData {
            config: Some(FontConfig {
                oversample_h: 1,
                pixel_snap_h: true,
                size_pixels: font_size,
                ..Default::default()
            }),
        }]);

        let renderer_config = RendererConfig {
            texture_format: output_color_format,
            ..Default::default()
        };
        let renderer = Renderer::new(&mut context, device, queue, renderer_config);

        Self {
            context,
            platform,
            renderer,
            last_frame: Instant::now(),
            last_cursor: None,
        }
    }

    /// Keeps ImGui's display size equal to the render target size.
    pub fn update_display_size(&mut self, width: u32, height: u32) {
        self.context.io_mut().display_size = [width as f32, height as f32];
    }

    /// Feeds a window event to ImGui.
    ///
    /// Returns true when ImGui wants the device the event came from, in which
    /// case the event should not reach the camera.
    pub fn handle_input<T>(&mut self, window: &Window, event: &Event<T>) -> bool {
        let Event::WindowEvent {
            event: window_event,
            ..
        } = event
        else {
            return false;
        };
        let device = input_device(window_event);
        if device.is_none() && !matches!(window_event, WindowEvent::Focused(_)) {
            return false;
        }

        self.platform
            .handle_event(self.context.io_mut(), window, event);
        let io = self.context.io();
        match device {
            Some(InputDevice::Mouse) => io.want_capture_mouse,
            Some(InputDevice::Keyboard) => io.want_capture_keyboard,
            None => false,
        }
    }

    /// For raw device events, which never pass through [`UiManager::handle_input`].
    pub fn wants_mouse(&self) -> bool {
        self.context.io().want_capture_mouse
    }

    /// Builds this frame's UI. Drawing happens later in [`UiManager::render_display_only`].
    pub fn update_logic<F, R>(&mut self, window: &Window, run_ui: F) -> Option<R>
    where
        F: FnOnce(&imgui::Ui) -> R,
    {
        let now = Instant::now();
        self.context
            .io_mut()
            .update_delta_time(now - self.last_frame);
        self.last_frame = now;

        if let Err(e) = self.platform.prepare_frame(self.context.io_mut(), window) {
            log::warn!("Skipping UI frame: {:?}", e);
            return None;
        }

        let ui = self.context.frame();
        let result = run_ui(ui);

        if self.last_cursor != ui.mouse_cursor() {
            self.last_cursor = ui.mouse_cursor();
            self.platform.prepare_render(ui, window);
        }

        Some(result)
    }

    /// Draws the UI built by the last [`UiManager::update_logic`] over `color_attachment`.
    pub fn render_display_only(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        color_attachment: &TextureView,
    ) {
        let draw_data = self.context.render();

        if draw_data.display_size[0] <= 0.0 || draw_data.display_size[1] <= 0.0 {
            // zero-sized scissor rects are rejected by wgpu
            return;
        }

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("imgui_render_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_attachment,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if let Err(e) = self
            .renderer
            .render(draw_data, queue, device, &mut render_pass)
        {
            log::error!("Failed to render ImGui: {:?}", e);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputDevice {
    Mouse,
    Keyboard,
}

/// The device whose ImGui capture flag decides where `event` goes.
fn input_device(event: &WindowEvent) -> Option<InputDevice> {
    match event {
        WindowEvent::CursorMoved { .. }
        | WindowEvent::MouseInput { .. }
        | WindowEvent::MouseWheel { .. } => Some(InputDevice::Mouse),
        WindowEvent::KeyboardInput { .. } | WindowEvent::ModifiersChanged(_) => {
            Some(InputDevice::Keyboard)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::event::{DeviceId, ElementState, Modifiers, MouseButton, MouseScrollDelta, TouchPhase};

    #[test]
    fn test_events_route_by_device() {
        let device_id = unsafe { DeviceId::dummy() };

        let wheel = WindowEvent::MouseWheel {
            device_id,
            delta: MouseScrollDelta::LineDelta(0.0, 1.0),
            phase: TouchPhase::Moved,
        };
        let click = WindowEvent::MouseInput {
            device_id,
            state: ElementState::Pressed,
            button: MouseButton::Left,
        };
        assert_eq!(input_device(&wheel), Some(InputDevice::Mouse));
        assert_eq!(input_device(&click), Some(InputDevice::Mouse));
        assert_eq!(
            input_device(&WindowEvent::ModifiersChanged(Modifiers::default())),
            Some(InputDevice::Keyboard)
        );
        assert_eq!(input_device(&WindowEvent::Focused(true)), None);
        assert_eq!(input_device(&WindowEvent::CloseRequested), None);
    }
}
