use crate::light::{Lighting, MAX_POINT_LIGHTS, Material};
use glam::Vec3;
use glimmer_camera::{Camera, PITCH, SENSITIVITY, SPEED, YAW, ZOOM};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: "Glimmer".into(),
        }
    }
}

/// Initial camera placement; angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    pub world_up: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub speed: f32,
    pub sensitivity: f32,
    pub zoom: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            world_up: Vec3::Y,
            yaw: YAW,
            pitch: PITCH,
            speed: SPEED,
            sensitivity: SENSITIVITY,
            zoom: ZOOM,
        }
    }
}

impl CameraConfig {
    pub fn build(&self) -> Camera {
        let mut camera =
            Camera::with_orientation(self.position, self.world_up, self.yaw, self.pitch);
        camera.speed = self.speed;
        camera.sensitivity = self.sensitivity;
        camera.apply_zoom(camera.zoom() - self.zoom);
        camera
    }
}

/// Everything the viewer reads at startup. Every field is optional in the
/// JSON file and defaults to the built-in scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub clear_color: [f32; 4],
    pub camera: CameraConfig,
    pub lighting: Lighting,
    pub material: Material,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            clear_color: [0.1, 0.1, 0.1, 1.0],
            camera: CameraConfig::default(),
            lighting: Lighting::default(),
            material: Material::default(),
        }
    }
}

impl ViewerConfig {
    /// Load and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size {}x{} must be non-zero",
                self.window.width, self.window.height
            )));
        }
        if self.lighting.point_lights.len() > MAX_POINT_LIGHTS {
            return Err(ConfigError::Invalid(format!(
                "{} point lights given, at most {MAX_POINT_LIGHTS} supported",
                self.lighting.point_lights.len()
            )));
        }
        if let Some(spot) = &self.lighting.spot {
            if spot.cut_off > spot.outer_cut_off {
                return Err(ConfigError::Invalid(format!(
                    "spot cut_off {} exceeds outer_cut_off {}",
                    spot.cut_off, spot.outer_cut_off
                )));
            }
        }
        if self.camera.world_up.length_squared() == 0.0 {
            return Err(ConfigError::Invalid("camera world_up must be non-zero".into()));
        }
        Ok(())
    }

    /// Width over height of the configured window.
    pub fn aspect(&self) -> f32 {
        self.window.width as f32 / self.window.height.max(1) as f32
    }
}
