use crate::decode::ImageDecoder;
use crate::mesh::{Mesh, Texture};
use crate::primitives;
use crate::scene::{Scene, SceneImporter, SceneMaterial, SceneMesh, SceneNode};
use crate::vertex::Vertex;
use glimmer_gpu::{GpuDevice, GpuTexture, RawHandle, ShaderProgram, TextureKind};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Texture kinds resolved per material, in binding order.
const MATERIAL_KINDS: [TextureKind; 4] = [
    TextureKind::Diffuse,
    TextureKind::Specular,
    TextureKind::Normal,
    TextureKind::Height,
];

#[derive(Debug)]
struct CachedTexture {
    texture: GpuTexture,
    kind: TextureKind,
}

/// Path-keyed cache of uploaded textures.
///
/// Owns one [`GpuTexture`] per distinct resolved path. A path that failed
/// to load is cached with an empty texture so it is never decoded twice.
pub struct TextureCache {
    device: Rc<dyn GpuDevice>,
    entries: HashMap<PathBuf, CachedTexture>,
}

impl std::fmt::Debug for TextureCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureCache")
            .field("entries", &self.entries)
            .finish()
    }
}

impl TextureCache {
    pub fn new(device: &Rc<dyn GpuDevice>) -> Self {
        Self {
            device: Rc::clone(device),
            entries: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Raw handle cached for `path`, if it was requested before.
    pub fn get(&self, path: &Path) -> Option<RawHandle> {
        self.entries.get(path).map(|entry| entry.texture.raw())
    }

    /// Look `path` up, decoding and uploading on a miss.
    ///
    /// A hit returns the first kind the path was loaded as, so one image
    /// shared between roles keeps its original role.
    pub fn resolve(
        &mut self,
        path: PathBuf,
        kind: TextureKind,
        decoder: &dyn ImageDecoder,
    ) -> Texture {
        if let Some(entry) = self.entries.get(&path) {
            return Texture {
                id: entry.texture.raw(),
                path,
                kind: entry.kind,
            };
        }

        tracing::info!(path = %path.display(), kind = kind.as_str(), "loading texture");
        let texture = match decoder
            .decode(&path)
            .and_then(|image| image.into_texture_image(&path))
        {
            Ok(image) => GpuTexture::new(&self.device, &image),
            Err(err) => {
                tracing::warn!("texture skipped: {err}");
                GpuTexture::empty(&self.device)
            }
        };

        let id = texture.raw();
        self.entries
            .insert(path.clone(), CachedTexture { texture, kind });
        Texture { id, path, kind }
    }
}

/// A drawable set of meshes sharing one texture cache.
///
/// Field order matters: meshes drop before the textures they reference.
#[derive(Debug)]
pub struct Model {
    meshes: Vec<Mesh>,
    textures: TextureCache,
    directory: PathBuf,
}

impl Model {
    pub fn empty(device: &Rc<dyn GpuDevice>) -> Self {
        Self {
            meshes: Vec::new(),
            textures: TextureCache::new(device),
            directory: PathBuf::new(),
        }
    }

    /// Import `path` and upload everything it references.
    ///
    /// Import failures are logged and produce an empty model.
    pub fn load(
        device: &Rc<dyn GpuDevice>,
        path: &Path,
        importer: &dyn SceneImporter,
        decoder: &dyn ImageDecoder,
    ) -> Self {
        let scene = match importer.import(path) {
            Ok(scene) => scene,
            Err(err) => {
                tracing::error!(path = %path.display(), "model import failed: {err}");
                return Self::empty(device);
            }
        };
        let directory = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let model = Self::from_scene(device, &scene, directory, decoder);
        tracing::info!(
            path = %path.display(),
            meshes = model.meshes.len(),
            textures = model.textures.len(),
            "model loaded"
        );
        model
    }

    /// Build a model from an imported scene. Texture paths resolve against
    /// `directory`.
    pub fn from_scene(
        device: &Rc<dyn GpuDevice>,
        scene: &Scene,
        directory: PathBuf,
        decoder: &dyn ImageDecoder,
    ) -> Self {
        let mut model = Self::empty(device);
        let Some(root) = scene.root.as_ref().filter(|_| scene.is_usable()) else {
            tracing::error!(
                incomplete = scene.incomplete,
                has_root = scene.root.is_some(),
                "scene is not usable"
            );
            return model;
        };
        model.directory = directory;
        model.process_node(device, root, scene, decoder);
        model
    }

    /// The textured cube scene: every mesh texture is `(kind, path)`.
    pub fn cube(
        device: &Rc<dyn GpuDevice>,
        textures: &[(TextureKind, PathBuf)],
        decoder: &dyn ImageDecoder,
    ) -> Self {
        let mut model = Self::empty(device);
        let textures = textures
            .iter()
            .map(|(kind, path)| model.textures.resolve(path.clone(), *kind, decoder))
            .collect();
        let (vertices, indices) = primitives::cube();
        match Mesh::new(device, vertices, indices, textures) {
            Ok(mesh) => model.meshes.push(mesh),
            Err(err) => tracing::error!("cube mesh rejected: {err}"),
        }
        model
    }

    // Depth first: this node's meshes in order, then its children.
    fn process_node(
        &mut self,
        device: &Rc<dyn GpuDevice>,
        node: &SceneNode,
        scene: &Scene,
        decoder: &dyn ImageDecoder,
    ) {
        for &index in &node.meshes {
            let Some(source) = scene.meshes.get(index) else {
                tracing::warn!(node = %node.name, index, "node references a missing mesh");
                continue;
            };
            let material = match source.material {
                Some(m) if m >= scene.materials.len() => {
                    tracing::warn!(mesh = %source.name, material = m, "missing material, using default");
                    None
                }
                Some(m) => scene.materials.get(m),
                None => None,
            };
            if let Some(mesh) = self.process_mesh(device, source, material, decoder) {
                self.meshes.push(mesh);
            }
        }
        for child in &node.children {
            self.process_node(device, child, scene, decoder);
        }
    }

    fn process_mesh(
        &mut self,
        device: &Rc<dyn GpuDevice>,
        source: &SceneMesh,
        material: Option<&SceneMaterial>,
        decoder: &dyn ImageDecoder,
    ) -> Option<Mesh> {
        let vertices = source
            .positions
            .iter()
            .enumerate()
            .map(|(i, position)| {
                let mut vertex = Vertex {
                    position: position.to_array(),
                    ..Vertex::default()
                };
                if let Some(normal) = source.normals.get(i) {
                    vertex.normal = normal.to_array();
                }
                if let Some(uv) = source.tex_coords.as_ref().and_then(|uvs| uvs.get(i)) {
                    vertex.tex_coords = uv.to_array();
                }
                if let Some(tangent) = source.tangents.get(i) {
                    vertex.tangent = tangent.to_array();
                }
                if let Some(bitangent) = source.bitangents.get(i) {
                    vertex.bitangent = bitangent.to_array();
                }
                vertex
            })
            .collect();
        let indices = source.faces.iter().flatten().copied().collect();

        let mut textures = Vec::new();
        if let Some(material) = material {
            for kind in MATERIAL_KINDS {
                for relative in material.textures(kind) {
                    let path = self.directory.join(relative);
                    textures.push(self.textures.resolve(path, kind, decoder));
                }
            }
        }

        match Mesh::new(device, vertices, indices, textures) {
            Ok(mesh) => {
                tracing::debug!(
                    mesh = %source.name,
                    vertices = mesh.vertices().len(),
                    indices = mesh.indices().len(),
                    textures = mesh.textures().len(),
                    "mesh uploaded"
                );
                Some(mesh)
            }
            Err(err) => {
                tracing::warn!(mesh = %source.name, "mesh skipped: {err}");
                None
            }
        }
    }

    /// Draw every mesh; returns how many were drawn.
    pub fn draw(&self, program: &mut dyn ShaderProgram) -> usize {
        self.meshes.iter().filter(|mesh| mesh.draw(program)).count()
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn textures(&self) -> &TextureCache {
        &self.textures
    }

    /// Directory texture paths were resolved against.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{DecodeError, DecodedImage};
    use crate::scene::ImportError;
    use glam::{Vec2, Vec3};
    use glimmer_gpu::{NO_RESOURCE, RecordingDevice, RecordingProgram};
    use std::cell::RefCell;

    /// Decoder that serves a 2x2 RGBA image for any path not in `broken`.
    #[derive(Default)]
    struct FakeDecoder {
        broken: Vec<PathBuf>,
        requests: RefCell<Vec<PathBuf>>,
    }

    impl ImageDecoder for FakeDecoder {
        fn decode(&self, path: &Path) -> Result<DecodedImage, DecodeError> {
            self.requests.borrow_mut().push(path.to_path_buf());
            if self.broken.iter().any(|p| p == path) {
                return Ok(DecodedImage {
                    width: 1,
                    height: 1,
                    channels: 2,
                    pixels: vec![0, 0],
                });
            }
            Ok(DecodedImage {
                width: 2,
                height: 2,
                channels: 4,
                pixels: vec![255; 16],
            })
        }
    }

    struct FixedImporter(Option<Scene>);

    impl SceneImporter for FixedImporter {
        fn import(&self, path: &Path) -> Result<Scene, ImportError> {
            self.0
                .clone()
                .ok_or_else(|| ImportError::UnsupportedFormat(path.display().to_string()))
        }
    }

    fn devices() -> (Rc<RecordingDevice>, Rc<dyn GpuDevice>) {
        let recording = Rc::new(RecordingDevice::new());
        let device: Rc<dyn GpuDevice> = recording.clone();
        (recording, device)
    }

    fn triangle(name: &str, material: Option<usize>) -> SceneMesh {
        SceneMesh {
            name: name.into(),
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            normals: vec![Vec3::Z; 3],
            tex_coords: Some(vec![Vec2::ZERO, Vec2::X, Vec2::Y]),
            faces: vec![vec![0, 1, 2]],
            material,
            ..SceneMesh::default()
        }
    }

    fn shared_texture_scene() -> Scene {
        let material = SceneMaterial {
            name: "shared".into(),
            diffuse: vec!["a.png".into()],
            specular: vec!["spec.png".into()],
            ..SceneMaterial::default()
        };
        let mut root = SceneNode::new("root");
        root.meshes = vec![0];
        let mut child = SceneNode::new("child");
        child.meshes = vec![1];
        root.children.push(child);
        Scene {
            root: Some(root),
            meshes: vec![triangle("first", Some(0)), triangle("second", Some(0))],
            materials: vec![material],
            incomplete: false,
        }
    }

    #[test]
    fn shared_texture_is_decoded_and_uploaded_once() {
        let (recording, device) = devices();
        let decoder = FakeDecoder::default();
        let model = Model::load(
            &device,
            Path::new("assets/scene.obj"),
            &FixedImporter(Some(shared_texture_scene())),
            &decoder,
        );

        assert_eq!(model.meshes().len(), 2);
        assert_eq!(recording.texture_uploads(), 2);
        assert_eq!(decoder.requests.borrow().len(), 2);
        assert_eq!(model.textures().len(), 2);

        let first = &model.meshes()[0].textures()[0];
        let second = &model.meshes()[1].textures()[0];
        assert_eq!(first.id, second.id);
        assert_eq!(first.path, Path::new("assets").join("a.png"));
        assert_eq!(first.kind, TextureKind::Diffuse);
        assert_eq!(model.meshes()[0].textures()[1].kind, TextureKind::Specular);
    }

    #[test]
    fn import_failure_gives_empty_model() {
        let (recording, device) = devices();
        let model = Model::load(
            &device,
            Path::new("missing.obj"),
            &FixedImporter(None),
            &FakeDecoder::default(),
        );
        assert!(model.is_empty());

        let mut program = RecordingProgram::new();
        assert_eq!(model.draw(&mut program), 0);
        assert_eq!(recording.draw_count(), 0);
        assert_eq!(recording.live_resources(), 0);
    }

    #[test]
    fn incomplete_scene_gives_empty_model() {
        let (_recording, device) = devices();
        let mut scene = shared_texture_scene();
        scene.incomplete = true;
        let model = Model::from_scene(&device, &scene, PathBuf::new(), &FakeDecoder::default());
        assert!(model.is_empty());
    }

    #[test]
    fn meshes_follow_depth_first_order() {
        let (_recording, device) = devices();
        let mut scene = shared_texture_scene();
        scene.meshes.push(triangle("third", None));
        let root = scene.root.as_mut().unwrap();
        let mut grandchild = SceneNode::new("grandchild");
        grandchild.meshes = vec![2];
        root.children[0].children.push(grandchild);

        let model = Model::from_scene(&device, &scene, PathBuf::new(), &FakeDecoder::default());
        let counts: Vec<_> = model.meshes().iter().map(|m| m.textures().len()).collect();
        assert_eq!(counts, vec![2, 2, 0]);
    }

    #[test]
    fn broken_texture_is_cached_as_empty() {
        let (recording, device) = devices();
        let decoder = FakeDecoder {
            broken: vec![PathBuf::from("a.png")],
            ..FakeDecoder::default()
        };
        let model = Model::from_scene(&device, &shared_texture_scene(), PathBuf::new(), &decoder);

        assert_eq!(model.meshes().len(), 2);
        let diffuse = &model.meshes()[1].textures()[0];
        assert_eq!(diffuse.id, NO_RESOURCE);
        assert!(!diffuse.is_loaded());
        // Broken path requested once, not retried by the second mesh.
        assert_eq!(
            decoder
                .requests
                .borrow()
                .iter()
                .filter(|p| p.as_path() == Path::new("a.png"))
                .count(),
            1
        );
        assert_eq!(recording.texture_uploads(), 1);
    }

    #[test]
    fn bad_meshes_are_isolated() {
        let (_recording, device) = devices();
        let mut scene = shared_texture_scene();
        scene.meshes[0].faces = vec![vec![0, 1, 7]];
        scene.meshes[1].material = Some(9);
        scene.root.as_mut().unwrap().meshes.push(42);

        let model = Model::from_scene(&device, &scene, PathBuf::new(), &FakeDecoder::default());
        assert_eq!(model.meshes().len(), 1);
        assert!(model.meshes()[0].textures().is_empty());
    }

    #[test]
    fn missing_attributes_default_to_zero() {
        let (_recording, device) = devices();
        let mut scene = shared_texture_scene();
        scene.meshes[0].normals.clear();
        scene.meshes[0].tex_coords = None;

        let model = Model::from_scene(&device, &scene, PathBuf::new(), &FakeDecoder::default());
        let vertex = model.meshes()[0].vertices()[1];
        assert_eq!(vertex.position, [1.0, 0.0, 0.0]);
        assert_eq!(vertex.normal, [0.0; 3]);
        assert_eq!(vertex.tex_coords, [0.0; 2]);
    }

    #[test]
    fn dropping_model_releases_everything_once() {
        let (recording, device) = devices();
        let model = Model::from_scene(
            &device,
            &shared_texture_scene(),
            PathBuf::new(),
            &FakeDecoder::default(),
        );
        assert_eq!(recording.live_resources(), 2 * 3 + 2);

        let moved = model;
        drop(moved);
        assert_eq!(recording.live_resources(), 0);
        assert_eq!(recording.double_releases(), 0);
    }

    #[test]
    fn draw_counts_meshes() {
        let (recording, device) = devices();
        let model = Model::from_scene(
            &device,
            &shared_texture_scene(),
            PathBuf::new(),
            &FakeDecoder::default(),
        );
        let mut program = RecordingProgram::new();
        assert_eq!(model.draw(&mut program), 2);
        assert_eq!(recording.draw_count(), 2);
    }

    #[test]
    fn cube_model_binds_given_textures() {
        let (recording, device) = devices();
        let textures = [
            (TextureKind::Diffuse, PathBuf::from("container.png")),
            (TextureKind::Specular, PathBuf::from("container_specular.png")),
        ];
        let model = Model::cube(&device, &textures, &FakeDecoder::default());
        assert_eq!(model.meshes().len(), 1);
        assert_eq!(model.meshes()[0].indices().len(), 36);
        assert_eq!(recording.texture_uploads(), 2);
    }
}
