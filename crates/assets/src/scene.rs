//! Importer-neutral scene graph.
//!
//! Importers translate their file format into these owned types; the model
//! loader only ever walks a [`Scene`]. Nodes own their children, so a scene
//! tree cannot contain cycles.

use glam::{Vec2, Vec3};
use glimmer_gpu::TextureKind;
use std::path::Path;

/// A parsed scene file.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub root: Option<SceneNode>,
    pub meshes: Vec<SceneMesh>,
    pub materials: Vec<SceneMaterial>,
    /// Set by importers that could only read part of the file.
    pub incomplete: bool,
}

impl Scene {
    /// A scene is usable when it is complete and has a root node.
    pub fn is_usable(&self) -> bool {
        !self.incomplete && self.root.is_some()
    }
}

/// One node of the hierarchy: references meshes by index into [`Scene::meshes`].
#[derive(Debug, Clone, Default)]
pub struct SceneNode {
    pub name: String,
    pub meshes: Vec<usize>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Mesh data as the importer produced it. Faces are expected to be triangles.
#[derive(Debug, Clone, Default)]
pub struct SceneMesh {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    /// First texture-coordinate channel, if the mesh has one.
    pub tex_coords: Option<Vec<Vec2>>,
    pub tangents: Vec<Vec3>,
    pub bitangents: Vec<Vec3>,
    pub faces: Vec<Vec<u32>>,
    /// Index into [`Scene::materials`].
    pub material: Option<usize>,
}

/// Texture references of a material, as paths relative to the scene file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneMaterial {
    pub name: String,
    pub diffuse: Vec<String>,
    pub specular: Vec<String>,
    pub normal: Vec<String>,
    pub height: Vec<String>,
}

impl SceneMaterial {
    pub fn textures(&self, kind: TextureKind) -> &[String] {
        match kind {
            TextureKind::Diffuse => &self.diffuse,
            TextureKind::Specular => &self.specular,
            TextureKind::Normal => &self.normal,
            TextureKind::Height => &self.height,
        }
    }
}

/// Errors from scene importers.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("OBJ parse error: {0}")]
    Obj(#[from] tobj::LoadError),
    #[error("glTF parse error: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("unsupported scene format: {0}")]
    UnsupportedFormat(String),
}

/// The scene-import capability.
pub trait SceneImporter {
    fn import(&self, path: &Path) -> Result<Scene, ImportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_scene_is_not_usable() {
        assert!(!Scene::default().is_usable());
    }

    #[test]
    fn incomplete_scene_is_not_usable() {
        let scene = Scene {
            root: Some(SceneNode::new("root")),
            incomplete: true,
            ..Scene::default()
        };
        assert!(!scene.is_usable());
    }

    #[test]
    fn material_textures_by_kind() {
        let material = SceneMaterial {
            diffuse: vec!["d.png".into()],
            specular: vec!["s.png".into()],
            ..SceneMaterial::default()
        };
        assert_eq!(material.textures(TextureKind::Diffuse), ["d.png"]);
        assert_eq!(material.textures(TextureKind::Specular), ["s.png"]);
        assert!(material.textures(TextureKind::Height).is_empty());
    }
}
