use crate::vertex::Vertex;
use glimmer_gpu::{
    GpuDevice, IndexBuffer, NO_RESOURCE, RawHandle, SamplerRole, ShaderProgram, TextureKind,
    VertexArray, VertexBuffer,
};
use std::path::PathBuf;
use std::rc::Rc;

/// A texture reference held by a mesh. The owning GPU handle lives in the
/// model's texture cache; `id` is [`NO_RESOURCE`] when loading failed.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub id: RawHandle,
    pub path: PathBuf,
    pub kind: TextureKind,
}

impl Texture {
    pub fn is_loaded(&self) -> bool {
        self.id != NO_RESOURCE
    }
}

/// Texture unit assignment for one texture of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureBinding {
    pub unit: u32,
    pub role: SamplerRole,
    pub texture: RawHandle,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MeshError {
    #[error("mesh has no vertices or no indices")]
    Empty,
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
    #[error("{0} indices exceed the u32 draw count")]
    TooManyIndices(usize),
}

/// GPU-resident triangle mesh.
///
/// Owns its attribute-binding object and both buffers exclusively; the type
/// is not `Clone`. [`Mesh::take`] moves the GPU objects out and leaves this
/// mesh empty, so dropping it releases nothing.
#[derive(Debug)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    textures: Vec<Texture>,
    vertex_array: VertexArray,
    vertex_buffer: VertexBuffer,
    index_buffer: IndexBuffer,
}

impl Mesh {
    /// Validate the data, upload it and declare the vertex layout.
    pub fn new(
        device: &Rc<dyn GpuDevice>,
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
        textures: Vec<Texture>,
    ) -> Result<Self, MeshError> {
        if vertices.is_empty() || indices.is_empty() {
            return Err(MeshError::Empty);
        }
        if u32::try_from(indices.len()).is_err() {
            return Err(MeshError::TooManyIndices(indices.len()));
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(MeshError::IndexOutOfRange {
                index,
                vertex_count: vertices.len(),
            });
        }

        let mut vertex_array = VertexArray::new(device);
        let vertex_buffer = VertexBuffer::new(device, &vertices);
        let index_buffer = IndexBuffer::new(device, &indices);

        vertex_array.bind();
        vertex_array.set_layout(&vertex_buffer, &Vertex::layout());
        vertex_array.attach_index_buffer(&index_buffer);
        vertex_array.unbind();

        Ok(Self {
            vertices,
            indices,
            textures,
            vertex_array,
            vertex_buffer,
            index_buffer,
        })
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn textures(&self) -> &[Texture] {
        &self.textures
    }

    /// True once the GPU objects have been moved out.
    pub fn is_empty(&self) -> bool {
        self.vertex_array.is_empty()
    }

    pub fn vertex_array(&self) -> RawHandle {
        self.vertex_array.raw()
    }

    pub fn vertex_buffer(&self) -> RawHandle {
        self.vertex_buffer.raw()
    }

    pub fn index_buffer(&self) -> RawHandle {
        self.index_buffer.raw()
    }

    /// Move everything into a new mesh, leaving this one empty.
    pub fn take(&mut self) -> Self {
        Self {
            vertices: std::mem::take(&mut self.vertices),
            indices: std::mem::take(&mut self.indices),
            textures: std::mem::take(&mut self.textures),
            vertex_array: self.vertex_array.take(),
            vertex_buffer: self.vertex_buffer.take(),
            index_buffer: self.index_buffer.take(),
        }
    }

    /// Texture units in declaration order; `role.index` counts textures of
    /// the same kind (first diffuse map is index 0, second is 1, ...).
    pub fn texture_bindings(&self) -> Vec<TextureBinding> {
        let mut per_kind = [0u32; 4];
        self.textures
            .iter()
            .enumerate()
            .map(|(unit, texture)| {
                let slot = &mut per_kind[texture.kind as usize];
                let role = SamplerRole::new(texture.kind, *slot);
                *slot += 1;
                TextureBinding {
                    unit: unit as u32,
                    role,
                    texture: texture.id,
                }
            })
            .collect()
    }

    /// Bind textures and buffers and issue one indexed draw.
    ///
    /// Returns false when the mesh is empty and nothing was drawn.
    pub fn draw(&self, program: &mut dyn ShaderProgram) -> bool {
        if self.is_empty() {
            return false;
        }
        let device = self.vertex_array.device();
        for binding in self.texture_bindings() {
            program.set_sampler(binding.role, binding.unit);
            device.bind_texture(binding.unit, binding.texture);
        }
        self.vertex_array.draw_indexed(self.index_buffer.count());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glimmer_gpu::{DeviceCall, RecordingDevice, RecordingProgram};

    fn devices() -> (Rc<RecordingDevice>, Rc<dyn GpuDevice>) {
        let recording = Rc::new(RecordingDevice::new());
        let device: Rc<dyn GpuDevice> = recording.clone();
        (recording, device)
    }

    fn triangle() -> (Vec<Vertex>, Vec<u32>) {
        let vertices = vec![
            Vertex::new([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
            Vertex::new([1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]),
            Vertex::new([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]),
        ];
        (vertices, vec![0, 1, 2])
    }

    fn texture(id: RawHandle, kind: TextureKind) -> Texture {
        Texture {
            id,
            path: PathBuf::from(format!("tex{id}.png")),
            kind,
        }
    }

    #[test]
    fn construction_declares_full_layout() {
        let (recording, device) = devices();
        let (vertices, indices) = triangle();
        let mesh = Mesh::new(&device, vertices, indices, Vec::new()).unwrap();

        let declared: Vec<_> = recording
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                DeviceCall::VertexAttribute {
                    vertex_array,
                    attribute,
                    stride,
                } => Some((vertex_array, attribute.location, stride)),
                _ => None,
            })
            .collect();
        assert_eq!(declared.len(), Vertex::ATTRIBUTES.len());
        assert!(declared
            .iter()
            .all(|&(vao, _, stride)| vao == mesh.vertex_array() && stride == Vertex::STRIDE));
        assert_eq!(recording.live_resources(), 3);
    }

    #[test]
    fn rejects_out_of_range_index() {
        let (_recording, device) = devices();
        let (vertices, _) = triangle();
        let err = Mesh::new(&device, vertices, vec![0, 1, 3], Vec::new()).unwrap_err();
        assert_eq!(
            err,
            MeshError::IndexOutOfRange {
                index: 3,
                vertex_count: 3
            }
        );
    }

    #[test]
    fn rejects_empty_mesh() {
        let (recording, device) = devices();
        let err = Mesh::new(&device, Vec::new(), Vec::new(), Vec::new()).unwrap_err();
        assert_eq!(err, MeshError::Empty);
        assert_eq!(recording.live_resources(), 0);
    }

    #[test]
    fn move_then_drop_releases_each_handle_once() {
        let (recording, device) = devices();
        let (vertices, indices) = triangle();
        let mesh = Mesh::new(&device, vertices, indices, Vec::new()).unwrap();
        let handles = [mesh.vertex_array(), mesh.vertex_buffer(), mesh.index_buffer()];

        let moved = mesh;
        assert_eq!(recording.release_count(), 0);
        drop(moved);
        for handle in handles {
            assert_eq!(recording.releases_of(handle), 1);
        }
        assert_eq!(recording.double_releases(), 0);
    }

    #[test]
    fn take_leaves_source_inert() {
        let (recording, device) = devices();
        let (vertices, indices) = triangle();
        let mut source = Mesh::new(&device, vertices, indices, Vec::new()).unwrap();
        let handles = [source.vertex_array(), source.vertex_buffer(), source.index_buffer()];

        let dest = source.take();
        assert!(source.is_empty());
        assert_eq!(source.vertex_array(), NO_RESOURCE);
        assert!(source.vertices().is_empty());

        let mut program = RecordingProgram::new();
        assert!(!source.draw(&mut program));
        drop(source);
        assert_eq!(recording.release_count(), 0);

        assert!(dest.draw(&mut program));
        drop(dest);
        for handle in handles {
            assert_eq!(recording.releases_of(handle), 1);
        }
        assert_eq!(recording.live_resources(), 0);
    }

    #[test]
    fn texture_bindings_count_per_kind() {
        let (_recording, device) = devices();
        let (vertices, indices) = triangle();
        let textures = vec![
            texture(10, TextureKind::Diffuse),
            texture(11, TextureKind::Diffuse),
            texture(12, TextureKind::Specular),
        ];
        let mesh = Mesh::new(&device, vertices, indices, textures).unwrap();
        let bindings = mesh.texture_bindings();
        assert_eq!(
            bindings,
            vec![
                TextureBinding {
                    unit: 0,
                    role: SamplerRole::new(TextureKind::Diffuse, 0),
                    texture: 10
                },
                TextureBinding {
                    unit: 1,
                    role: SamplerRole::new(TextureKind::Diffuse, 1),
                    texture: 11
                },
                TextureBinding {
                    unit: 2,
                    role: SamplerRole::new(TextureKind::Specular, 0),
                    texture: 12
                },
            ]
        );
    }

    #[test]
    fn draw_binds_textures_before_indexed_draw() {
        let (recording, device) = devices();
        let (vertices, indices) = triangle();
        let textures = vec![texture(7, TextureKind::Diffuse), texture(8, TextureKind::Specular)];
        let mesh = Mesh::new(&device, vertices, indices, textures).unwrap();
        recording.clear_log();

        let mut program = RecordingProgram::new();
        assert!(mesh.draw(&mut program));
        assert_eq!(
            program.sampler(SamplerRole::new(TextureKind::Specular, 0)),
            Some(1)
        );

        let calls = recording.calls();
        assert_eq!(calls[0], DeviceCall::BindTexture { unit: 0, handle: 7 });
        assert_eq!(calls[1], DeviceCall::BindTexture { unit: 1, handle: 8 });
        assert_eq!(
            calls[2],
            DeviceCall::BindVertexArray {
                handle: mesh.vertex_array()
            }
        );
        assert_eq!(
            calls[3],
            DeviceCall::DrawIndexed {
                vertex_array: mesh.vertex_array(),
                index_count: 3
            }
        );
    }
}
