//! File-format adapters producing a [`Scene`](crate::Scene).

mod gltf;
mod obj;

pub use self::gltf::GltfImporter;
pub use self::obj::ObjImporter;

use crate::scene::{ImportError, Scene, SceneImporter};
use std::path::Path;

/// Picks an importer from the file extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileImporter;

impl SceneImporter for FileImporter {
    fn import(&self, path: &Path) -> Result<Scene, ImportError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "obj" => ObjImporter.import(path),
            "gltf" | "glb" => GltfImporter.import(path),
            _ => Err(ImportError::UnsupportedFormat(path.display().to_string())),
        }
    }
}
