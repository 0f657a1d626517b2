use glam::{Mat4, Vec3};

/// Semantic role of a texture within a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextureKind {
    Diffuse,
    Specular,
    Normal,
    Height,
}

impl TextureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Diffuse => "diffuse",
            Self::Specular => "specular",
            Self::Normal => "normal",
            Self::Height => "height",
        }
    }
}

/// Which sampler of a program a texture unit feeds: the `index`-th texture
/// of `kind` on the mesh being drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SamplerRole {
    pub kind: TextureKind,
    pub index: u32,
}

impl SamplerRole {
    pub fn new(kind: TextureKind, index: u32) -> Self {
        Self { kind, index }
    }
}

/// A uniform value as recorded by [`crate::RecordingProgram`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec3(Vec3),
    Mat4(Mat4),
}

/// The shader-program capability: activate, then set uniforms by name.
///
/// Unknown names are the caller's bug; implementations may ignore them.
pub trait ShaderProgram {
    fn use_program(&mut self);

    fn set_float(&mut self, name: &str, value: f32);

    fn set_vec3(&mut self, name: &str, value: Vec3);

    fn set_mat4(&mut self, name: &str, value: &Mat4);

    /// Route texture `unit` to the sampler playing `role`.
    fn set_sampler(&mut self, role: SamplerRole, unit: u32);
}
