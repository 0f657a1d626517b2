use crate::scene::{ImportError, Scene, SceneImporter, SceneMaterial, SceneMesh, SceneNode};
use glam::{Vec2, Vec3};
use std::collections::HashSet;
use std::path::Path;

/// glTF 2.0 importer (`.gltf` with external or embedded buffers, `.glb`).
///
/// Every triangle primitive becomes one [`SceneMesh`]. Only images
/// referenced by URI become texture paths; images stored in buffer views
/// are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct GltfImporter;

impl SceneImporter for GltfImporter {
    fn import(&self, path: &Path) -> Result<Scene, ImportError> {
        let gltf::Gltf { document, blob } = gltf::Gltf::open(path)?;
        let buffers = gltf::import_buffers(&document, path.parent(), blob)?;

        let materials = document.materials().map(convert_material).collect();

        // glTF mesh index -> scene mesh indices (one per primitive)
        let mut meshes = Vec::new();
        let mut primitives_of = Vec::with_capacity(document.meshes().len());
        for mesh in document.meshes() {
            let mut indices = Vec::new();
            for primitive in mesh.primitives() {
                if primitive.mode() != gltf::mesh::Mode::Triangles {
                    tracing::warn!(
                        mesh = mesh.index(),
                        mode = ?primitive.mode(),
                        "skipping non-triangle primitive"
                    );
                    continue;
                }
                indices.push(meshes.len());
                meshes.push(convert_primitive(&mesh, &primitive, &buffers));
            }
            primitives_of.push(indices);
        }

        let root = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .map(|scene| {
                let mut root = SceneNode::new(scene.name().unwrap_or("root"));
                let mut visited = HashSet::new();
                for node in scene.nodes() {
                    if let Some(child) = convert_node(&node, &primitives_of, &mut visited) {
                        root.children.push(child);
                    }
                }
                root
            });

        Ok(Scene {
            root,
            meshes,
            materials,
            incomplete: false,
        })
    }
}

fn convert_node(
    node: &gltf::Node,
    primitives_of: &[Vec<usize>],
    visited: &mut HashSet<usize>,
) -> Option<SceneNode> {
    if !visited.insert(node.index()) {
        tracing::warn!(node = node.index(), "node reached twice, ignoring the repeat");
        return None;
    }
    let mut out = SceneNode::new(node.name().unwrap_or_default());
    if let Some(mesh) = node.mesh() {
        out.meshes.extend_from_slice(&primitives_of[mesh.index()]);
    }
    for child in node.children() {
        if let Some(child) = convert_node(&child, primitives_of, visited) {
            out.children.push(child);
        }
    }
    Some(out)
}

fn convert_primitive(
    mesh: &gltf::Mesh,
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
) -> SceneMesh {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data.0[..]));

    let positions: Vec<Vec3> = reader
        .read_positions()
        .map(|iter| iter.map(Vec3::from).collect())
        .unwrap_or_default();
    let normals: Vec<Vec3> = reader
        .read_normals()
        .map(|iter| iter.map(Vec3::from).collect())
        .unwrap_or_default();
    let tex_coords = reader
        .read_tex_coords(0)
        .map(|uvs| uvs.into_f32().map(Vec2::from).collect());

    // Tangents carry handedness in w.
    let (tangents, bitangents) = match reader.read_tangents() {
        Some(iter) if normals.len() == positions.len() => iter
            .zip(&normals)
            .map(|(t, n)| {
                let tangent = Vec3::new(t[0], t[1], t[2]);
                (tangent, n.cross(tangent) * t[3])
            })
            .unzip(),
        _ => (Vec::new(), Vec::new()),
    };

    let indices: Vec<u32> = reader
        .read_indices()
        .map(|iter| iter.into_u32().collect())
        .unwrap_or_else(|| (0..positions.len() as u32).collect());

    SceneMesh {
        name: mesh.name().unwrap_or_default().to_string(),
        positions,
        normals,
        tex_coords,
        tangents,
        bitangents,
        faces: indices.chunks_exact(3).map(<[u32]>::to_vec).collect(),
        material: primitive.material().index(),
    }
}

fn convert_material(material: gltf::Material) -> SceneMaterial {
    let diffuse = material
        .pbr_metallic_roughness()
        .base_color_texture()
        .and_then(|info| image_uri(info.texture()));
    let normal = material
        .normal_texture()
        .and_then(|info| image_uri(info.texture()));
    SceneMaterial {
        name: material.name().unwrap_or_default().to_string(),
        diffuse: diffuse.into_iter().collect(),
        specular: Vec::new(),
        normal: normal.into_iter().collect(),
        height: Vec::new(),
    }
}

fn image_uri(texture: gltf::Texture) -> Option<String> {
    match texture.source().source() {
        gltf::image::Source::Uri { uri, .. } if !uri.starts_with("data:") => Some(uri.to_string()),
        _ => None,
    }
}
