use crate::scene::{ImportError, Scene, SceneImporter, SceneMaterial, SceneMesh, SceneNode};
use glam::{Vec2, Vec3};
use std::path::Path;

/// Wavefront OBJ (+ MTL) importer built on `tobj`.
///
/// Faces are triangulated and vertices re-indexed so one index addresses
/// position, normal and texture coordinate together. Texture coordinates
/// are flipped to a top-left origin.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjImporter;

impl SceneImporter for ObjImporter {
    fn import(&self, path: &Path) -> Result<Scene, ImportError> {
        let options = tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        };
        let (models, materials) = tobj::load_obj(path, &options)?;
        let materials = match materials {
            Ok(materials) => materials,
            Err(err) => {
                tracing::warn!(path = %path.display(), "material library not loaded: {err}");
                Vec::new()
            }
        };

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut root = SceneNode::new(stem);
        let mut meshes = Vec::with_capacity(models.len());
        for model in models {
            let mut node = SceneNode::new(model.name.clone());
            node.meshes.push(meshes.len());
            root.children.push(node);
            meshes.push(convert_mesh(model));
        }

        Ok(Scene {
            root: Some(root),
            meshes,
            materials: materials.into_iter().map(convert_material).collect(),
            incomplete: false,
        })
    }
}

fn convert_mesh(model: tobj::Model) -> SceneMesh {
    let mesh = model.mesh;
    let tex_coords = (!mesh.texcoords.is_empty()).then(|| {
        mesh.texcoords
            .chunks_exact(2)
            .map(|uv| Vec2::new(uv[0], 1.0 - uv[1]))
            .collect()
    });
    SceneMesh {
        name: model.name,
        positions: mesh.positions.chunks_exact(3).map(Vec3::from_slice).collect(),
        normals: mesh.normals.chunks_exact(3).map(Vec3::from_slice).collect(),
        tex_coords,
        tangents: Vec::new(),
        bitangents: Vec::new(),
        faces: mesh.indices.chunks_exact(3).map(<[u32]>::to_vec).collect(),
        material: mesh.material_id,
    }
}

fn convert_material(material: tobj::Material) -> SceneMaterial {
    SceneMaterial {
        name: material.name,
        diffuse: material.diffuse_texture.into_iter().collect(),
        specular: material.specular_texture.into_iter().collect(),
        normal: material.normal_texture.into_iter().collect(),
        height: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
mtllib quad.mtl
o quad
v -1 -1 0
v 1 -1 0
v 1 1 0
v -1 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
usemtl brick
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    const MTL: &str = "\
newmtl brick
Kd 1 1 1
map_Kd brick_diffuse.png
map_Ks brick_specular.png
";

    #[test]
    fn quad_is_triangulated_with_material() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("quad.obj"), QUAD).unwrap();
        std::fs::write(dir.path().join("quad.mtl"), MTL).unwrap();

        let scene = ObjImporter.import(&dir.path().join("quad.obj")).unwrap();
        assert!(scene.is_usable());
        assert_eq!(scene.meshes.len(), 1);

        let mesh = &scene.meshes[0];
        assert_eq!(mesh.positions.len(), 4);
        assert_eq!(mesh.normals.len(), 4);
        assert_eq!(mesh.faces.len(), 2);
        assert!(mesh.faces.iter().all(|f| f.len() == 3));
        assert_eq!(mesh.material, Some(0));

        let material = &scene.materials[0];
        assert_eq!(material.name, "brick");
        assert_eq!(material.diffuse, vec!["brick_diffuse.png".to_string()]);
        assert_eq!(material.specular, vec!["brick_specular.png".to_string()]);

        let root = scene.root.as_ref().unwrap();
        assert_eq!(root.name, "quad");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].meshes, vec![0]);
    }

    #[test]
    fn texture_coordinates_are_flipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("quad.obj"), QUAD).unwrap();
        std::fs::write(dir.path().join("quad.mtl"), MTL).unwrap();

        let scene = ObjImporter.import(&dir.path().join("quad.obj")).unwrap();
        let mesh = &scene.meshes[0];
        let uvs = mesh.tex_coords.as_ref().unwrap();
        // vt 0 0 sits at position (-1, -1).
        let corner = mesh
            .positions
            .iter()
            .position(|p| *p == Vec3::new(-1.0, -1.0, 0.0))
            .unwrap();
        assert_eq!(uvs[corner], Vec2::new(0.0, 1.0));
    }

    #[test]
    fn missing_material_library_still_imports_geometry() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("quad.obj"), QUAD).unwrap();

        let scene = ObjImporter.import(&dir.path().join("quad.obj")).unwrap();
        assert!(scene.is_usable());
        assert!(scene.materials.is_empty());
        assert_eq!(scene.meshes[0].faces.len(), 2);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = ObjImporter
            .import(Path::new("/no/such/model.obj"))
            .unwrap_err();
        assert!(matches!(err, ImportError::Obj(_)));
    }
}
