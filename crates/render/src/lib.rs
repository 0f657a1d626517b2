//! Per-frame driver for the viewer.
//!
//! # Invariants
//! - Camera and timing state live in [`Driver`], never in globals.
//! - Every uniform of a frame is written before that frame's first draw.
//! - Unused light slots are pushed dark, so the shader never reads values
//!   from a previous frame.

mod clock;
mod config;
mod driver;
mod light;

pub use clock::FrameClock;
pub use config::{CameraConfig, ConfigError, ViewerConfig, WindowConfig};
pub use driver::{Driver, FrameOutcome, FrameStats};
pub use light::{
    Attenuation, DirectionalLight, Lighting, MAX_POINT_LIGHTS, Material, POINT_LIGHT_POSITIONS,
    PointLight, SpotLight,
};

pub fn crate_info() -> &'static str {
    "glimmer-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
