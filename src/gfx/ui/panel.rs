use std::path::{Path, PathBuf};

use imgui::{Condition, TreeNodeFlags, Ui};

use crate::gfx::{
    camera::{OrbitCamera, Sensitivities},
    params::ViewerParams,
    scene::{MeshStatistics, SceneLoadError},
};

const ERROR_COLOR: [f32; 4] = [1.0, 0.35, 0.35, 1.0];
const SHININESS_RANGE: (f32, f32) = (0.0, 100.0);

/// Panel state that lives across frames.
#[derive(Debug, Clone, Default)]
pub struct PanelState {
    pub model_path: String,
    pub last_error: Option<String>,
}

/// What the user asked for this frame that the panel cannot do itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelResponse {
    pub load_requested: Option<PathBuf>,
}

impl PanelState {
    pub fn new(initial_model: Option<&Path>) -> Self {
        Self {
            model_path: initial_model
                .map(|path| path.display().to_string())
                .unwrap_or_default(),
            last_error: None,
        }
    }

    /// The path in the text field, if there is one.
    pub fn requested_path(&self) -> Option<PathBuf> {
        let trimmed = self.model_path.trim();
        (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
    }

    /// Shows a load failure inline, or clears the previous one on success.
    pub fn record_load<T>(&mut self, result: &Result<T, SceneLoadError>) {
        self.last_error = result.as_ref().err().map(|e| e.to_string());
    }
}

/// Inputs the panel needs that it does not edit
pub struct PanelContext {
    pub statistics: MeshStatistics,
    pub loaded_from: Option<PathBuf>,
    pub wireframe_supported: bool,
}

pub fn viewer_panel(
    ui: &Ui,
    state: &mut PanelState,
    camera: &mut OrbitCamera,
    params: &mut ViewerParams,
    context: &PanelContext,
) -> PanelResponse {
    let mut response = PanelResponse::default();

    ui.window("Viewer")
        .size([360.0, 640.0], Condition::FirstUseEver)
        .position([10.0, 10.0], Condition::FirstUseEver)
        .build(|| {
            ui.text("Model");
            ui.separator();
            let submitted = ui
                .input_text("##model_path", &mut state.model_path)
                .enter_returns_true(true)
                .build();
            ui.same_line();
            if ui.button("Load") || submitted {
                response.load_requested = state.requested_path();
            }
            if let Some(error) = &state.last_error {
                ui.text_colored(ERROR_COLOR, error);
            }

            match &context.loaded_from {
                Some(path) => ui.text(format!("Showing: {}", path.display())),
                None => ui.text("No model loaded"),
            }
            let stats = context.statistics;
            ui.text(format!(
                "Meshes: {}  Vertices: {}  Triangles: {}",
                stats.mesh_count, stats.total_vertices, stats.total_triangles
            ));

            if ui.collapsing_header("Display", TreeNodeFlags::DEFAULT_OPEN) {
                if context.wireframe_supported {
                    ui.checkbox("Wireframe", &mut params.wireframe);
                } else {
                    ui.text_disabled("Wireframe unsupported on this GPU");
                }
                ui.color_edit3("Background", &mut params.background);
            }

            if ui.collapsing_header("Material", TreeNodeFlags::DEFAULT_OPEN) {
                ui.color_edit3("Ambient##material", &mut params.material.ambient);
                ui.color_edit3("Diffuse##material", &mut params.material.diffuse);
                ui.color_edit3("Specular##material", &mut params.material.specular);
                ui.slider("Shininess", SHININESS_RANGE.0, SHININESS_RANGE.1, &mut params.shininess);
            }

            if ui.collapsing_header("Light", TreeNodeFlags::empty()) {
                ui.color_edit3("Ambient##light", &mut params.light.ambient);
                ui.color_edit3("Diffuse##light", &mut params.light.diffuse);
                ui.color_edit3("Specular##light", &mut params.light.specular);
            }

            if ui.collapsing_header("Transform", TreeNodeFlags::empty()) {
                ui.slider("Translate X", -10.0, 10.0, &mut params.translate[0]);
                ui.slider("Translate Y", -10.0, 10.0, &mut params.translate[1]);
                ui.slider("Translate Z", -10.0, 10.0, &mut params.translate[2]);
                ui.input_float3("Rotation axis", &mut params.rotation_axis)
                    .build();
                ui.slider("Rotation angle", -180.0, 180.0, &mut params.rotation_angle);
                ui.slider("Scale", 0.01, 5.0, &mut params.scale);
                if ui.button("Reset Transform") {
                    let defaults = ViewerParams::default();
                    params.translate = defaults.translate;
                    params.rotation_axis = defaults.rotation_axis;
                    params.rotation_angle = defaults.rotation_angle;
                    params.scale = defaults.scale;
                }
            }

            if ui.collapsing_header("Camera", TreeNodeFlags::DEFAULT_OPEN) {
                let mut sensitivities = camera.sensitivities();
                let mut changed = false;
                changed |= ui.slider("Orbit speed", 0.01, 2.0, &mut sensitivities.orbit);
                changed |= ui.slider("Zoom speed", 0.01, 5.0, &mut sensitivities.zoom);
                changed |= ui.slider("FOV speed", 0.01, 5.0, &mut sensitivities.fov);
                if changed {
                    camera.set_sensitivities(sensitivities);
                }
                if ui.button("Reset Sensitivities") {
                    camera.set_sensitivities(Sensitivities::default());
                }
                ui.same_line();
                if ui.button("Reset Camera") {
                    camera.reset();
                }
                ui.text(format!(
                    "Azimuth {:.1}  Elevation {:.1}  Distance {:.1}  FOV {:.1}",
                    camera.azimuth(),
                    camera.elevation(),
                    camera.distance(),
                    camera.fov()
                ));
            }
        });

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requested_path_is_trimmed() {
        let mut state = PanelState::new(None);
        assert_eq!(state.requested_path(), None);

        state.model_path = "   ".to_string();
        assert_eq!(state.requested_path(), None);

        state.model_path = "  models/bunny.obj \n".to_string();
        assert_eq!(state.requested_path(), Some(PathBuf::from("models/bunny.obj")));
    }

    #[test]
    fn test_initial_model_fills_path_field() {
        let state = PanelState::new(Some(Path::new("teapot.glb")));
        assert_eq!(state.model_path, "teapot.glb");
    }

    #[test]
    fn test_default_shininess_fits_slider() {
        let shininess = ViewerParams::default().shininess;
        assert_eq!(SHININESS_RANGE, (0.0, 100.0));
        assert!((SHININESS_RANGE.0..=SHININESS_RANGE.1).contains(&shininess));
    }

    #[test]
    fn test_record_load_sets_and_clears_error() {
        let mut state = PanelState::new(None);

        let failed: Result<(), _> = Err(SceneLoadError::Incomplete("bad buffer".to_string()));
        state.record_load(&failed);
        let message = state.last_error.clone().unwrap();
        assert!(message.contains("bad buffer"));

        state.record_load(&Ok::<(), SceneLoadError>(()));
        assert_eq!(state.last_error, None);
    }
}
