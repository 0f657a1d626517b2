use crate::device::{BufferTarget, GpuDevice, NO_RESOURCE, RawHandle, ResourceKind, VertexAttribute, VertexLayout};
use crate::handle::GpuHandle;
use bytemuck::Pod;
use std::rc::Rc;

/// Immutable vertex data uploaded once at construction.
#[derive(Debug)]
pub struct VertexBuffer {
    handle: GpuHandle,
    size: usize,
}

impl VertexBuffer {
    pub fn new<T: Pod>(device: &Rc<dyn GpuDevice>, data: &[T]) -> Self {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let raw = device.create_buffer(BufferTarget::Vertex, bytes);
        Self {
            handle: GpuHandle::new(Rc::clone(device), ResourceKind::Buffer, raw),
            size: bytes.len(),
        }
    }

    pub fn raw(&self) -> RawHandle {
        self.handle.raw()
    }

    /// Size of the uploaded data in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.handle.is_empty()
    }

    pub fn bind(&self) {
        self.handle.device().bind_buffer(BufferTarget::Vertex, self.raw());
    }

    pub fn unbind(&self) {
        self.handle.device().bind_buffer(BufferTarget::Vertex, NO_RESOURCE);
    }

    pub fn take(&mut self) -> Self {
        Self {
            handle: self.handle.take(),
            size: std::mem::take(&mut self.size),
        }
    }
}

/// Draw count for `len` indices. Index data is addressed with `u32`, so
/// longer buffers cannot be drawn in one call.
fn index_count(len: usize) -> u32 {
    let count = u32::try_from(len);
    debug_assert!(count.is_ok(), "{len} indices exceed the u32 draw count");
    count.unwrap_or(u32::MAX)
}

/// Immutable `u32` index data uploaded once at construction.
#[derive(Debug)]
pub struct IndexBuffer {
    handle: GpuHandle,
    count: u32,
}

impl IndexBuffer {
    pub fn new(device: &Rc<dyn GpuDevice>, indices: &[u32]) -> Self {
        let raw = device.create_buffer(BufferTarget::Index, bytemuck::cast_slice(indices));
        Self {
            handle: GpuHandle::new(Rc::clone(device), ResourceKind::Buffer, raw),
            count: index_count(indices.len()),
        }
    }

    pub fn raw(&self) -> RawHandle {
        self.handle.raw()
    }

    /// Number of indices uploaded.
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.handle.is_empty()
    }

    pub fn bind(&self) {
        self.handle.device().bind_buffer(BufferTarget::Index, self.raw());
    }

    pub fn unbind(&self) {
        self.handle.device().bind_buffer(BufferTarget::Index, NO_RESOURCE);
    }

    pub fn take(&mut self) -> Self {
        Self {
            handle: self.handle.take(),
            count: std::mem::take(&mut self.count),
        }
    }
}

/// Attribute-binding object: records which buffer bytes feed which vertex
/// attribute, plus the index buffer used for indexed draws.
#[derive(Debug)]
pub struct VertexArray {
    handle: GpuHandle,
}

impl VertexArray {
    pub fn new(device: &Rc<dyn GpuDevice>) -> Self {
        let raw = device.create_vertex_array();
        Self {
            handle: GpuHandle::new(Rc::clone(device), ResourceKind::VertexArray, raw),
        }
    }

    pub fn raw(&self) -> RawHandle {
        self.handle.raw()
    }

    pub fn is_empty(&self) -> bool {
        self.handle.is_empty()
    }

    pub fn device(&self) -> &Rc<dyn GpuDevice> {
        self.handle.device()
    }

    pub fn bind(&self) {
        self.device().bind_vertex_array(self.raw());
    }

    pub fn unbind(&self) {
        self.device().bind_vertex_array(NO_RESOURCE);
    }

    /// Declare one attribute sourced from `vbo`. The array must be bound.
    pub fn link_attribute(&mut self, vbo: &VertexBuffer, attribute: VertexAttribute, stride: u32) {
        vbo.bind();
        self.device().vertex_attribute(attribute, stride);
        vbo.unbind();
    }

    /// Declare every attribute of `layout`. The array must be bound.
    pub fn set_layout(&mut self, vbo: &VertexBuffer, layout: &VertexLayout) {
        vbo.bind();
        for attribute in &layout.attributes {
            self.device().vertex_attribute(*attribute, layout.stride);
        }
        vbo.unbind();
    }

    /// Capture `ebo` as this array's index buffer. The array must be bound
    /// and stay bound until the index buffer binding is recorded.
    pub fn attach_index_buffer(&mut self, ebo: &IndexBuffer) {
        ebo.bind();
    }

    /// Bind, issue an indexed draw of `index_count` indices, unbind.
    pub fn draw_indexed(&self, index_count: u32) {
        if self.is_empty() || index_count == 0 {
            return;
        }
        self.bind();
        self.device().draw_indexed(index_count);
        self.unbind();
    }

    pub fn take(&mut self) -> Self {
        Self {
            handle: self.handle.take(),
        }
    }
}
