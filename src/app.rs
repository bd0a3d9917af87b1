use std::{path::Path, sync::Arc};

use anyhow::Context;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::{
    config::ViewerConfig,
    gfx::{
        camera::{CameraController, CameraInput, OrbitCamera},
        render_coordinator::RenderCoordinator,
        rendering::RenderEngine,
        scene::FileImporter,
        ui::{panel::PanelContext, viewer_panel, PanelState, UiManager},
    },
};

/// The model viewer: owns the event loop and all application state.
pub struct ViewerApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    config: ViewerConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    coordinator: RenderCoordinator<FileImporter>,
    controller: CameraController,
    panel: PanelState,
    startup_error: Option<anyhow::Error>,
}

impl ViewerApp {
    /// Builds the viewer and loads the configured model, if any.
    ///
    /// A model that fails to load is reported in the panel; the viewer still
    /// starts with an empty scene.
    pub fn new(config: ViewerConfig) -> anyhow::Result<Self> {
        let event_loop = EventLoop::new().context("Failed to create event loop")?;

        let mut camera = OrbitCamera::new();
        camera.set_sensitivities(config.camera.sensitivities);
        camera.set_viewport(config.window.width, config.window.height);

        let mut coordinator = RenderCoordinator::new(FileImporter::new(), camera, config.params);
        let mut panel = PanelState::new(config.model.as_deref());
        if let Some(path) = &config.model {
            let result = coordinator.load_model(path);
            panel.record_load(&result);
        }

        let controller = CameraController::new(config.camera.key_orbit_speed);

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                config,
                window: None,
                render_engine: None,
                ui_manager: None,
                coordinator,
                controller,
                panel,
                startup_error: None,
            },
        })
    }

    /// Runs until the window is closed or Escape is pressed.
    pub fn run(mut self) -> anyhow::Result<()> {
        let event_loop = self
            .event_loop
            .take()
            .context("Event loop already consumed")?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop
            .run_app(&mut self.app_state)
            .context("Event loop terminated with an error")?;

        match self.app_state.startup_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window_config = &self.config.window;
        let attributes = Window::default_attributes()
            .with_title(window_config.title.clone())
            .with_inner_size(PhysicalSize::new(window_config.width, window_config.height));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .context("Failed to create window")?,
        );

        let PhysicalSize { width, height } = window.inner_size();
        let render_engine = pollster::block_on(RenderEngine::new(
            window.clone(),
            width,
            height,
            window_config.vsync,
        ))?;

        let mut ui_manager = UiManager::new(
            render_engine.device(),
            render_engine.queue(),
            render_engine.surface_format(),
            &window,
        );
        ui_manager.update_display_size(width, height);

        if width > 0 && height > 0 {
            self.coordinator
                .camera_mut()
                .apply(CameraInput::Resize { width, height });
        }

        log::info!("Window created at {}x{}", width, height);
        self.window = Some(window);
        self.render_engine = Some(render_engine);
        self.ui_manager = Some(ui_manager);
        Ok(())
    }

    fn ui_wants_mouse(&self) -> bool {
        self.ui_manager
            .as_ref()
            .is_some_and(UiManager::wants_mouse)
    }

    fn apply_camera_input(&mut self, input: CameraInput) {
        self.coordinator.camera_mut().apply(input);
    }

    /// One frame: held keys, UI, pending load, then render.
    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        for input in self.controller.held_inputs() {
            self.apply_camera_input(input);
        }

        let AppState {
            window: Some(window),
            render_engine: Some(render_engine),
            ui_manager: Some(ui_manager),
            coordinator,
            panel,
            ..
        } = self
        else {
            return;
        };

        let context = PanelContext {
            statistics: coordinator.statistics(),
            loaded_from: coordinator.last_loaded().map(Path::to_path_buf),
            wireframe_supported: render_engine.supports_wireframe(),
        };
        let response = {
            let (camera, params) = coordinator.camera_and_params_mut();
            ui_manager.update_logic(window, |ui| viewer_panel(ui, panel, camera, params, &context))
        };
        let ui_built = response.is_some();

        // loads happen between frames, never while one is being drawn
        if let Some(path) = response.and_then(|r| r.load_requested) {
            let result = coordinator.load_model(&path);
            panel.record_load(&result);
        }

        let result = if ui_built {
            coordinator.render_frame(&mut render_engine.with_overlay(
                |device, queue, encoder, color_attachment| {
                    ui_manager.render_display_only(device, queue, encoder, color_attachment);
                },
            ))
        } else {
            coordinator.render_frame(render_engine)
        };

        match result {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated, reconfiguring");
                render_engine.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory, exiting");
                event_loop.exit();
            }
            Err(e) => log::warn!("Dropped frame: {}", e),
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(err) = self.init_graphics(event_loop) {
            log::error!("{:#}", err);
            self.startup_error = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };

        let ui_captured = match self.ui_manager.as_mut() {
            Some(ui_manager) => {
                let ui_event: winit::event::Event<()> = winit::event::Event::WindowEvent {
                    window_id,
                    event: event.clone(),
                };
                ui_manager.handle_input(&window, &ui_event)
            }
            None => false,
        };

        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state,
                        ..
                    },
                ..
            } => {
                // releases always reach the controller so keys cannot stick
                if state == ElementState::Pressed && ui_captured {
                    return;
                }
                if key_code == KeyCode::Escape && state == ElementState::Pressed {
                    log::info!("Escape pressed, exiting");
                    event_loop.exit();
                    return;
                }
                if let Some(input) = self.controller.process_key(key_code, state) {
                    self.apply_camera_input(input);
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                if state == ElementState::Released || !ui_captured {
                    self.controller.process_mouse_button(state);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if !ui_captured {
                    let input = self.controller.process_scroll(delta);
                    self.apply_camera_input(input);
                }
            }
            WindowEvent::Focused(false) => self.controller.release_all(),
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if width == 0 || height == 0 {
                    return;
                }
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
                if let Some(ui_manager) = self.ui_manager.as_mut() {
                    ui_manager.update_display_size(width, height);
                }
                self.apply_camera_input(CameraInput::Resize { width, height });
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.ui_wants_mouse() {
                return;
            }
            if let Some(input) = self.controller.process_mouse_motion(delta) {
                self.apply_camera_input(input);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}
