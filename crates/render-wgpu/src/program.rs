use crate::device::WgpuDevice;
use glam::{Mat4, Vec3};
use glimmer_gpu::{SamplerRole, ShaderProgram};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::LazyLock;

/// Byte layout of the Phong `Uniforms` block in [`crate::shaders::PHONG_SHADER`].
pub static PHONG_LAYOUT: LazyLock<UniformLayout> = LazyLock::new(UniformLayout::phong);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Float,
    Vec3,
    Mat4,
}

impl SlotKind {
    fn size(self) -> usize {
        match self {
            Self::Float => 4,
            Self::Vec3 => 12,
            Self::Mat4 => 64,
        }
    }

    fn align(self) -> usize {
        match self {
            Self::Float => 4,
            Self::Vec3 | Self::Mat4 => 16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub offset: usize,
    pub kind: SlotKind,
}

/// Uniform names mapped to byte offsets, laid out with WGSL uniform
/// alignment rules (vec3 and mat4 align to 16, nested structs start and
/// end on 16).
#[derive(Debug, Clone, Default)]
pub struct UniformLayout {
    slots: HashMap<String, Slot>,
    cursor: usize,
}

impl UniformLayout {
    pub fn phong() -> Self {
        let mut layout = Self::default();
        layout.field("projection", SlotKind::Mat4);
        layout.field("view", SlotKind::Mat4);
        layout.field("model", SlotKind::Mat4);
        layout.field("view_pos", SlotKind::Vec3);
        layout.field("material.shininess", SlotKind::Float);

        layout.begin_struct();
        for color in ["direction", "ambient", "diffuse", "specular"] {
            layout.field(&format!("dir_light.{color}"), SlotKind::Vec3);
        }
        layout.end_struct();

        for slot in 0..4 {
            let prefix = format!("point_lights[{slot}]");
            layout.begin_struct();
            for field in ["position", "ambient", "diffuse", "specular"] {
                layout.field(&format!("{prefix}.{field}"), SlotKind::Vec3);
            }
            for field in ["constant", "linear", "quadratic"] {
                layout.field(&format!("{prefix}.{field}"), SlotKind::Float);
            }
            layout.end_struct();
        }

        layout.begin_struct();
        for field in ["position", "direction", "ambient", "diffuse", "specular"] {
            layout.field(&format!("spot_light.{field}"), SlotKind::Vec3);
        }
        for field in ["constant", "linear", "quadratic", "cut_off", "outer_cut_off"] {
            layout.field(&format!("spot_light.{field}"), SlotKind::Float);
        }
        layout.end_struct();
        layout
    }

    fn field(&mut self, name: &str, kind: SlotKind) {
        self.cursor = self.cursor.next_multiple_of(kind.align());
        self.slots.insert(
            name.to_owned(),
            Slot {
                offset: self.cursor,
                kind,
            },
        );
        self.cursor += kind.size();
    }

    fn begin_struct(&mut self) {
        self.cursor = self.cursor.next_multiple_of(16);
    }

    fn end_struct(&mut self) {
        self.cursor = self.cursor.next_multiple_of(16);
    }

    pub fn slot(&self, name: &str) -> Option<Slot> {
        self.slots.get(name).copied()
    }

    /// Total block size in bytes, rounded to 16.
    pub fn size(&self) -> usize {
        self.cursor.next_multiple_of(16)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// The Phong program. Uniform writes land in the device's CPU-side block,
/// which every indexed draw snapshots.
pub struct PhongProgram {
    device: Rc<WgpuDevice>,
}

impl PhongProgram {
    pub fn new(device: &Rc<WgpuDevice>) -> Self {
        Self {
            device: Rc::clone(device),
        }
    }

    fn write(&mut self, name: &str, kind: SlotKind, bytes: &[u8]) {
        match PHONG_LAYOUT.slot(name) {
            Some(slot) if slot.kind == kind => self.device.write_uniform(slot.offset, bytes),
            Some(slot) => {
                tracing::warn!(name, expected = ?slot.kind, got = ?kind, "uniform type mismatch");
            }
            None => tracing::trace!(name, "unknown uniform ignored"),
        }
    }
}

impl ShaderProgram for PhongProgram {
    fn use_program(&mut self) {
        self.device.activate_program();
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.write(name, SlotKind::Float, bytemuck::bytes_of(&value));
    }

    fn set_vec3(&mut self, name: &str, value: Vec3) {
        self.write(name, SlotKind::Vec3, bytemuck::cast_slice(&value.to_array()));
    }

    fn set_mat4(&mut self, name: &str, value: &Mat4) {
        self.write(name, SlotKind::Mat4, bytemuck::cast_slice(&value.to_cols_array()));
    }

    fn set_sampler(&mut self, role: SamplerRole, unit: u32) {
        self.device.set_sampler(role, unit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phong_offsets_match_wgsl_struct() {
        let layout = UniformLayout::phong();
        let offset = |name: &str| layout.slot(name).unwrap().offset;

        assert_eq!(offset("projection"), 0);
        assert_eq!(offset("view"), 64);
        assert_eq!(offset("model"), 128);
        assert_eq!(offset("view_pos"), 192);
        // shininess packs into the vec3's padding
        assert_eq!(offset("material.shininess"), 204);
        assert_eq!(offset("dir_light.direction"), 208);
        assert_eq!(offset("dir_light.specular"), 256);
        assert_eq!(offset("point_lights[0].position"), 272);
        assert_eq!(offset("point_lights[0].constant"), 332);
        assert_eq!(offset("point_lights[0].quadratic"), 340);
        assert_eq!(offset("point_lights[1].position"), 352);
        assert_eq!(offset("point_lights[3].quadratic"), 580);
        assert_eq!(offset("spot_light.position"), 592);
        assert_eq!(offset("spot_light.constant"), 668);
        assert_eq!(offset("spot_light.outer_cut_off"), 684);
        assert_eq!(layout.size(), 688);
    }

    #[test]
    fn slots_do_not_overlap() {
        let layout = UniformLayout::phong();
        let mut spans: Vec<_> = layout
            .slots
            .values()
            .map(|slot| (slot.offset, slot.offset + slot.kind.size()))
            .collect();
        spans.sort();
        for pair in spans.windows(2) {
            assert!(pair[0].1 <= pair[1].0, "{pair:?}");
        }
        assert!(spans.last().unwrap().1 <= layout.size());
    }

    #[test]
    fn every_pushed_uniform_has_a_slot() {
        let layout = UniformLayout::phong();
        // 3 matrices, view_pos, shininess, 4 dir, 4 x 7 point, 10 spot
        assert_eq!(layout.len(), 3 + 2 + 4 + 28 + 10);
        assert!(layout.slot("point_lights[4].position").is_none());
    }
}
