//! Headless implementations of the device and program capabilities.
//!
//! They keep a log of every call instead of touching a GPU, which makes them
//! the test double for everything above this crate and the backend for the
//! command-line inspector.

use crate::device::{
    BufferTarget, GpuDevice, NO_RESOURCE, PixelFormat, PolygonMode, RawHandle, ResourceKind,
    TextureImage, VertexAttribute,
};
use crate::program::{SamplerRole, ShaderProgram, UniformValue};
use glam::{Mat4, Vec3};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};

/// One call made against a [`RecordingDevice`].
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    CreateBuffer {
        target: BufferTarget,
        handle: RawHandle,
        bytes: usize,
    },
    CreateVertexArray {
        handle: RawHandle,
    },
    CreateTexture {
        handle: RawHandle,
        width: u32,
        height: u32,
        format: PixelFormat,
        mip_levels: u32,
    },
    Release {
        kind: ResourceKind,
        handle: RawHandle,
    },
    BindBuffer {
        target: BufferTarget,
        handle: RawHandle,
    },
    BindVertexArray {
        handle: RawHandle,
    },
    VertexAttribute {
        vertex_array: RawHandle,
        attribute: VertexAttribute,
        stride: u32,
    },
    BindTexture {
        unit: u32,
        handle: RawHandle,
    },
    Clear {
        color: [f32; 4],
    },
    PolygonMode {
        mode: PolygonMode,
    },
    DrawIndexed {
        vertex_array: RawHandle,
        index_count: u32,
    },
}

/// Device that hands out increasing ids and records every call.
#[derive(Debug)]
pub struct RecordingDevice {
    next_handle: Cell<RawHandle>,
    bound_vertex_array: Cell<RawHandle>,
    live: RefCell<HashMap<RawHandle, ResourceKind>>,
    double_releases: Cell<usize>,
    calls: RefCell<Vec<DeviceCall>>,
}

impl Default for RecordingDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self {
            next_handle: Cell::new(1),
            bound_vertex_array: Cell::new(NO_RESOURCE),
            live: RefCell::new(HashMap::new()),
            double_releases: Cell::new(0),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Snapshot of the call log.
    pub fn calls(&self) -> Vec<DeviceCall> {
        self.calls.borrow().clone()
    }

    pub fn count_calls(&self, predicate: impl Fn(&DeviceCall) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| predicate(*c)).count()
    }

    pub fn draw_count(&self) -> usize {
        self.count_calls(|c| matches!(c, DeviceCall::DrawIndexed { .. }))
    }

    pub fn texture_uploads(&self) -> usize {
        self.count_calls(|c| matches!(c, DeviceCall::CreateTexture { .. }))
    }

    pub fn release_count(&self) -> usize {
        self.count_calls(|c| matches!(c, DeviceCall::Release { .. }))
    }

    pub fn releases_of(&self, handle: RawHandle) -> usize {
        self.count_calls(|c| matches!(c, DeviceCall::Release { handle: h, .. } if *h == handle))
    }

    /// Resources created and not yet released.
    pub fn live_resources(&self) -> usize {
        self.live.borrow().len()
    }

    /// Releases of ids that were not live at the time.
    pub fn double_releases(&self) -> usize {
        self.double_releases.get()
    }

    pub fn clear_log(&self) {
        self.calls.borrow_mut().clear();
    }

    fn allocate(&self, kind: ResourceKind) -> RawHandle {
        let handle = self.next_handle.get();
        self.next_handle.set(handle + 1);
        self.live.borrow_mut().insert(handle, kind);
        handle
    }

    fn record(&self, call: DeviceCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl GpuDevice for RecordingDevice {
    fn create_buffer(&self, target: BufferTarget, contents: &[u8]) -> RawHandle {
        let handle = self.allocate(ResourceKind::Buffer);
        self.record(DeviceCall::CreateBuffer {
            target,
            handle,
            bytes: contents.len(),
        });
        handle
    }

    fn create_vertex_array(&self) -> RawHandle {
        let handle = self.allocate(ResourceKind::VertexArray);
        self.record(DeviceCall::CreateVertexArray { handle });
        handle
    }

    fn create_texture(&self, image: &TextureImage) -> RawHandle {
        let handle = self.allocate(ResourceKind::Texture);
        self.record(DeviceCall::CreateTexture {
            handle,
            width: image.width,
            height: image.height,
            format: image.format,
            mip_levels: image.mip_level_count(),
        });
        handle
    }

    fn release(&self, kind: ResourceKind, handle: RawHandle) {
        match self.live.borrow_mut().remove(&handle) {
            Some(live_kind) if live_kind == kind => {}
            Some(live_kind) => {
                tracing::error!(handle, ?kind, ?live_kind, "released with mismatched kind");
            }
            None => {
                tracing::error!(handle, ?kind, "release of a resource that is not live");
                self.double_releases.set(self.double_releases.get() + 1);
            }
        }
        self.record(DeviceCall::Release { kind, handle });
    }

    fn bind_buffer(&self, target: BufferTarget, handle: RawHandle) {
        self.record(DeviceCall::BindBuffer { target, handle });
    }

    fn bind_vertex_array(&self, handle: RawHandle) {
        self.bound_vertex_array.set(handle);
        self.record(DeviceCall::BindVertexArray { handle });
    }

    fn vertex_attribute(&self, attribute: VertexAttribute, stride: u32) {
        self.record(DeviceCall::VertexAttribute {
            vertex_array: self.bound_vertex_array.get(),
            attribute,
            stride,
        });
    }

    fn bind_texture(&self, unit: u32, handle: RawHandle) {
        self.record(DeviceCall::BindTexture { unit, handle });
    }

    fn clear(&self, color: [f32; 4]) {
        self.record(DeviceCall::Clear { color });
    }

    fn set_polygon_mode(&self, mode: PolygonMode) {
        self.record(DeviceCall::PolygonMode { mode });
    }

    fn draw_indexed(&self, index_count: u32) {
        self.record(DeviceCall::DrawIndexed {
            vertex_array: self.bound_vertex_array.get(),
            index_count,
        });
    }
}

/// Program that stores uniform values by name.
#[derive(Debug, Default)]
pub struct RecordingProgram {
    uses: usize,
    uniforms: BTreeMap<String, UniformValue>,
    samplers: BTreeMap<SamplerRole, u32>,
}

impl RecordingProgram {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `use_program` was called.
    pub fn uses(&self) -> usize {
        self.uses
    }

    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.uniforms.get(name).copied()
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        match self.uniform(name)? {
            UniformValue::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn vec3(&self, name: &str) -> Option<Vec3> {
        match self.uniform(name)? {
            UniformValue::Vec3(v) => Some(v),
            _ => None,
        }
    }

    pub fn mat4(&self, name: &str) -> Option<Mat4> {
        match self.uniform(name)? {
            UniformValue::Mat4(v) => Some(v),
            _ => None,
        }
    }

    pub fn sampler(&self, role: SamplerRole) -> Option<u32> {
        self.samplers.get(&role).copied()
    }

    pub fn uniform_names(&self) -> impl Iterator<Item = &str> {
        self.uniforms.keys().map(String::as_str)
    }
}

impl ShaderProgram for RecordingProgram {
    fn use_program(&mut self) {
        self.uses += 1;
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.uniforms.insert(name.to_owned(), UniformValue::Float(value));
    }

    fn set_vec3(&mut self, name: &str, value: Vec3) {
        self.uniforms.insert(name.to_owned(), UniformValue::Vec3(value));
    }

    fn set_mat4(&mut self, name: &str, value: &Mat4) {
        self.uniforms.insert(name.to_owned(), UniformValue::Mat4(*value));
    }

    fn set_sampler(&mut self, role: SamplerRole, unit: u32) {
        self.samplers.insert(role, unit);
    }
}
