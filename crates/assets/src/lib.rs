//! Scene import pipeline.
//!
//! A [`SceneImporter`] turns a file into an importer-neutral [`Scene`];
//! [`Model`] walks that scene depth-first, flattens every mesh into the
//! interleaved [`Vertex`] layout, uploads it through the GPU device and
//! resolves material textures through a path-keyed [`TextureCache`].
//!
//! Failures never abort the program: a failed import yields an empty model,
//! a bad mesh is skipped and a texture that cannot be decoded is cached as
//! empty.

mod decode;
mod import;
mod mesh;
mod model;
pub mod primitives;
mod scene;
mod vertex;

pub use decode::{DecodeError, DecodedImage, FileImageDecoder, ImageDecoder};
pub use import::{FileImporter, GltfImporter, ObjImporter};
pub use mesh::{Mesh, MeshError, Texture, TextureBinding};
pub use model::{Model, TextureCache};
pub use scene::{ImportError, Scene, SceneImporter, SceneMaterial, SceneMesh, SceneNode};
pub use vertex::{MAX_BONE_INFLUENCE, Vertex};

pub fn crate_info() -> &'static str {
    "glimmer-assets v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("assets"));
    }
}
