//! Viewer configuration loaded from an optional TOML file.
//!
//! Every section uses `#[serde(default)]`, so a file only needs the keys it
//! overrides:
//!
//! ```toml
//! model = "assets/teapot.obj"
//!
//! [window]
//! width = 1600
//!
//! [params]
//! wireframe = true
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::gfx::{camera::Sensitivities, params::ViewerParams};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 800,
            title: "Model Viewer".to_string(),
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Degrees per frame while an arrow key is held
    pub key_orbit_speed: f32,
    pub sensitivities: Sensitivities,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            key_orbit_speed: 5.0,
            sensitivities: Sensitivities::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Model loaded at startup
    pub model: Option<PathBuf>,
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub params: ViewerParams,
}

impl ViewerConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Command-line values win over the file.
    pub fn apply_overrides(
        &mut self,
        model: Option<PathBuf>,
        width: Option<u32>,
        height: Option<u32>,
    ) {
        if model.is_some() {
            self.model = model;
        }
        if let Some(width) = width {
            self.window.width = width;
        }
        if let Some(height) = height {
            self.window.height = height;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = ViewerConfig::from_toml_str("").unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.camera.key_orbit_speed, 5.0);
        assert_eq!(config.params, ViewerParams::default());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = ViewerConfig::from_toml_str(
            r#"
model = "bunny.obj"

[window]
width = 1600

[camera.sensitivities]
zoom = 2.0

[params]
wireframe = true
shininess = 8.0
"#,
        )
        .unwrap();

        assert_eq!(config.model, Some(PathBuf::from("bunny.obj")));
        assert_eq!(config.window.width, 1600);
        assert_eq!(config.window.height, 800);
        assert_eq!(config.camera.sensitivities.zoom, 2.0);
        assert_eq!(config.camera.sensitivities.orbit, 0.3);
        assert!(config.params.wireframe);
        assert_eq!(config.params.shininess, 8.0);
        assert_eq!(config.params.translate, [0.0, -1.5, 0.0]);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(ViewerConfig::from_toml_str("[window]\nwidth = \"wide\"").is_err());
    }

    #[test]
    fn test_missing_file_error_names_path() {
        let err = ViewerConfig::load(Path::new("/nonexistent/viewer.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/viewer.toml"));
    }

    #[test]
    fn test_cli_overrides_win() {
        let mut config = ViewerConfig {
            model: Some(PathBuf::from("from_file.obj")),
            ..Default::default()
        };
        config.apply_overrides(None, Some(640), None);
        assert_eq!(config.model, Some(PathBuf::from("from_file.obj")));
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 800);

        config.apply_overrides(Some(PathBuf::from("cli.glb")), None, Some(480));
        assert_eq!(config.model, Some(PathBuf::from("cli.glb")));
        assert_eq!(config.window.height, 480);
    }
}
