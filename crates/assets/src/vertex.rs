use bytemuck::{Pod, Zeroable};
use glimmer_gpu::{AttributeFormat, VertexAttribute, VertexLayout};
use std::mem::{offset_of, size_of};

/// Maximum number of bones that can influence one vertex.
pub const MAX_BONE_INFLUENCE: usize = 4;

/// Interleaved mesh vertex.
///
/// Bone indices and weights are part of the layout but nothing animates
/// them yet; importers leave them zeroed.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
    pub tangent: [f32; 3],
    pub bitangent: [f32; 3],
    pub bone_ids: [i32; MAX_BONE_INFLUENCE],
    pub bone_weights: [f32; MAX_BONE_INFLUENCE],
}

impl Vertex {
    pub const STRIDE: u32 = size_of::<Vertex>() as u32;

    pub const ATTRIBUTES: [VertexAttribute; 7] = [
        attribute("position", 0, AttributeFormat::Float32x3, offset_of!(Vertex, position)),
        attribute("normal", 1, AttributeFormat::Float32x3, offset_of!(Vertex, normal)),
        attribute("tex_coords", 2, AttributeFormat::Float32x2, offset_of!(Vertex, tex_coords)),
        attribute("tangent", 3, AttributeFormat::Float32x3, offset_of!(Vertex, tangent)),
        attribute("bitangent", 4, AttributeFormat::Float32x3, offset_of!(Vertex, bitangent)),
        attribute("bone_ids", 5, AttributeFormat::Sint32x4, offset_of!(Vertex, bone_ids)),
        attribute("bone_weights", 6, AttributeFormat::Float32x4, offset_of!(Vertex, bone_weights)),
    ];

    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coords: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tex_coords,
            ..Self::default()
        }
    }

    pub fn layout() -> VertexLayout {
        VertexLayout {
            stride: Self::STRIDE,
            attributes: Self::ATTRIBUTES.to_vec(),
        }
    }
}

const fn attribute(
    name: &'static str,
    location: u32,
    format: AttributeFormat,
    offset: usize,
) -> VertexAttribute {
    VertexAttribute {
        name,
        location,
        format,
        offset: offset as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_tightly_packed() {
        assert_eq!(Vertex::STRIDE, 88);
        let layout = Vertex::layout();
        let mut expected_offset = 0;
        for attribute in &layout.attributes {
            assert_eq!(attribute.offset, expected_offset, "{}", attribute.name);
            expected_offset += attribute.format.size();
        }
        assert_eq!(expected_offset, layout.stride);
    }

    #[test]
    fn locations_are_sequential() {
        for (i, attribute) in Vertex::ATTRIBUTES.iter().enumerate() {
            assert_eq!(attribute.location, i as u32);
        }
    }

    #[test]
    fn new_vertex_has_no_bone_influence() {
        let v = Vertex::new([1.0, 2.0, 3.0], [0.0, 1.0, 0.0], [0.5, 0.5]);
        assert_eq!(v.bone_ids, [0; MAX_BONE_INFLUENCE]);
        assert_eq!(v.bone_weights, [0.0; MAX_BONE_INFLUENCE]);
        assert_eq!(v.tangent, [0.0; 3]);
    }
}
