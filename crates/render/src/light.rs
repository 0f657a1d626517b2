use glam::Vec3;
use glimmer_camera::Camera;
use glimmer_gpu::ShaderProgram;
use serde::{Deserialize, Serialize};

/// Number of point-light slots in the shader.
pub const MAX_POINT_LIGHTS: usize = 4;

/// Positions of the default point lights.
pub const POINT_LIGHT_POSITIONS: [Vec3; MAX_POINT_LIGHTS] = [
    Vec3::new(0.7, 0.2, 2.0),
    Vec3::new(2.3, -3.3, -4.0),
    Vec3::new(-4.0, 2.0, -12.0),
    Vec3::new(0.0, 0.0, -3.0),
];

/// Distance attenuation `1 / (constant + linear d + quadratic d^2)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for Attenuation {
    /// Roughly a 50 unit range.
    fn default() -> Self {
        Self {
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
        }
    }
}

impl Attenuation {
    /// No falloff; used for unused light slots.
    pub const NONE: Self = Self {
        constant: 1.0,
        linear: 0.0,
        quadratic: 0.0,
    };

    fn apply(&self, program: &mut dyn ShaderProgram, prefix: &str) {
        program.set_float(&format!("{prefix}.constant"), self.constant);
        program.set_float(&format!("{prefix}.linear"), self.linear);
        program.set_float(&format!("{prefix}.quadratic"), self.quadratic);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionalLight {
    pub direction: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Vec3::new(-0.2, -1.0, -0.3),
            ambient: Vec3::splat(0.05),
            diffuse: Vec3::splat(0.4),
            specular: Vec3::splat(0.5),
        }
    }
}

impl DirectionalLight {
    /// A light that contributes nothing.
    pub const OFF: Self = Self {
        direction: Vec3::NEG_Y,
        ambient: Vec3::ZERO,
        diffuse: Vec3::ZERO,
        specular: Vec3::ZERO,
    };

    pub fn apply(&self, program: &mut dyn ShaderProgram) {
        program.set_vec3("dir_light.direction", self.direction);
        program.set_vec3("dir_light.ambient", self.ambient);
        program.set_vec3("dir_light.diffuse", self.diffuse);
        program.set_vec3("dir_light.specular", self.specular);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointLight {
    pub position: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub attenuation: Attenuation,
}

impl Default for PointLight {
    fn default() -> Self {
        Self::at(Vec3::new(1.2, 1.0, 2.0))
    }
}

impl PointLight {
    pub const OFF: Self = Self {
        position: Vec3::ZERO,
        ambient: Vec3::ZERO,
        diffuse: Vec3::ZERO,
        specular: Vec3::ZERO,
        attenuation: Attenuation::NONE,
    };

    /// White light at `position` with the default attenuation.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ambient: Vec3::splat(0.05),
            diffuse: Vec3::splat(0.8),
            specular: Vec3::ONE,
            attenuation: Attenuation::default(),
        }
    }

    /// Push into `point_lights[slot]`.
    pub fn apply(&self, program: &mut dyn ShaderProgram, slot: usize) {
        let prefix = format!("point_lights[{slot}]");
        program.set_vec3(&format!("{prefix}.position"), self.position);
        program.set_vec3(&format!("{prefix}.ambient"), self.ambient);
        program.set_vec3(&format!("{prefix}.diffuse"), self.diffuse);
        program.set_vec3(&format!("{prefix}.specular"), self.specular);
        self.attenuation.apply(program, &prefix);
    }
}

/// Cone light. Cut-off angles are in degrees and pushed as cosines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotLight {
    pub position: Vec3,
    pub direction: Vec3,
    /// Track the camera every frame (a flashlight).
    pub follow_camera: bool,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub attenuation: Attenuation,
    pub cut_off: f32,
    pub outer_cut_off: f32,
}

impl Default for SpotLight {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            direction: Vec3::NEG_Z,
            follow_camera: true,
            ambient: Vec3::ZERO,
            diffuse: Vec3::ONE,
            specular: Vec3::ONE,
            attenuation: Attenuation::default(),
            cut_off: 12.5,
            outer_cut_off: 15.0,
        }
    }
}

impl SpotLight {
    pub const OFF: Self = Self {
        position: Vec3::ZERO,
        direction: Vec3::NEG_Z,
        follow_camera: false,
        ambient: Vec3::ZERO,
        diffuse: Vec3::ZERO,
        specular: Vec3::ZERO,
        attenuation: Attenuation::NONE,
        cut_off: 0.0,
        outer_cut_off: 0.0,
    };

    pub fn apply(&self, program: &mut dyn ShaderProgram, camera: &Camera) {
        let (position, direction) = if self.follow_camera {
            (camera.position, camera.forward())
        } else {
            (self.position, self.direction)
        };
        program.set_vec3("spot_light.position", position);
        program.set_vec3("spot_light.direction", direction);
        program.set_vec3("spot_light.ambient", self.ambient);
        program.set_vec3("spot_light.diffuse", self.diffuse);
        program.set_vec3("spot_light.specular", self.specular);
        self.attenuation.apply(program, "spot_light");
        program.set_float("spot_light.cut_off", self.cut_off.to_radians().cos());
        program.set_float(
            "spot_light.outer_cut_off",
            self.outer_cut_off.to_radians().cos(),
        );
    }
}

/// Every light in the scene. Missing lights are pushed as `OFF` so the
/// shader never reads stale values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lighting {
    pub directional: Option<DirectionalLight>,
    pub point_lights: Vec<PointLight>,
    pub spot: Option<SpotLight>,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            directional: Some(DirectionalLight::default()),
            point_lights: POINT_LIGHT_POSITIONS.into_iter().map(PointLight::at).collect(),
            spot: Some(SpotLight::default()),
        }
    }
}

impl Lighting {
    /// No lights at all.
    pub fn dark() -> Self {
        Self {
            directional: None,
            point_lights: Vec::new(),
            spot: None,
        }
    }

    pub fn apply(&self, program: &mut dyn ShaderProgram, camera: &Camera) {
        self.directional
            .unwrap_or(DirectionalLight::OFF)
            .apply(program);
        for slot in 0..MAX_POINT_LIGHTS {
            self.point_lights
                .get(slot)
                .unwrap_or(&PointLight::OFF)
                .apply(program, slot);
        }
        self.spot.unwrap_or(SpotLight::OFF).apply(program, camera);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self { shininess: 32.0 }
    }
}

impl Material {
    pub fn apply(&self, program: &mut dyn ShaderProgram) {
        program.set_float("material.shininess", self.shininess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glimmer_gpu::RecordingProgram;

    #[test]
    fn default_lighting_fills_every_slot() {
        let mut program = RecordingProgram::new();
        let camera = Camera::new(Vec3::new(0.0, 0.0, 3.0));
        Lighting::default().apply(&mut program, &camera);

        for (slot, position) in POINT_LIGHT_POSITIONS.iter().enumerate() {
            let prefix = format!("point_lights[{slot}]");
            assert_eq!(program.vec3(&format!("{prefix}.position")), Some(*position));
            assert_eq!(program.float(&format!("{prefix}.linear")), Some(0.09));
            assert_eq!(program.float(&format!("{prefix}.quadratic")), Some(0.032));
        }
        assert_eq!(
            program.vec3("dir_light.direction"),
            Some(Vec3::new(-0.2, -1.0, -0.3))
        );
    }

    #[test]
    fn flashlight_follows_camera() {
        let mut program = RecordingProgram::new();
        let camera = Camera::new(Vec3::new(1.0, 2.0, 3.0));
        SpotLight::default().apply(&mut program, &camera);

        assert_eq!(program.vec3("spot_light.position"), Some(camera.position));
        assert_eq!(program.vec3("spot_light.direction"), Some(camera.forward()));
        let inner = program.float("spot_light.cut_off").unwrap();
        let outer = program.float("spot_light.outer_cut_off").unwrap();
        assert!((inner - 12.5f32.to_radians().cos()).abs() < 1e-6);
        // Inner cone is narrower, so its cosine is larger.
        assert!(inner > outer);
    }

    #[test]
    fn missing_lights_are_pushed_dark() {
        let mut program = RecordingProgram::new();
        let camera = Camera::default();
        let lighting = Lighting {
            point_lights: vec![PointLight::default()],
            ..Lighting::dark()
        };
        lighting.apply(&mut program, &camera);

        assert_eq!(program.vec3("dir_light.diffuse"), Some(Vec3::ZERO));
        assert_eq!(program.vec3("point_lights[0].diffuse"), Some(Vec3::splat(0.8)));
        assert_eq!(program.vec3("point_lights[3].diffuse"), Some(Vec3::ZERO));
        // A unit constant keeps the attenuation finite.
        assert_eq!(program.float("point_lights[3].constant"), Some(1.0));
        assert_eq!(program.vec3("spot_light.specular"), Some(Vec3::ZERO));
    }

    #[test]
    fn material_pushes_shininess() {
        let mut program = RecordingProgram::new();
        Material::default().apply(&mut program);
        assert_eq!(program.float("material.shininess"), Some(32.0));
    }
}
