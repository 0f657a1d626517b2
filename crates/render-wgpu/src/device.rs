use crate::mipmap::{self, TEXTURE_FORMAT};
use crate::program::PHONG_LAYOUT;
use glimmer_gpu::{
    BufferTarget, GpuDevice, NO_RESOURCE, PolygonMode, RawHandle, ResourceKind, SamplerRole,
    TextureImage, TextureKind, VertexAttribute, VertexLayout,
};
use std::cell::{Ref, RefCell};
use std::collections::{BTreeMap, HashMap};
use wgpu::util::DeviceExt;

/// What an attribute-binding object captured: the buffer its attributes
/// read from, the index buffer bound while it was bound, and the layout.
#[derive(Debug, PartialEq)]
pub(crate) struct VertexArrayRecord {
    pub vertex_buffer: RawHandle,
    pub index_buffer: RawHandle,
    pub layout: VertexLayout,
}

impl Default for VertexArrayRecord {
    fn default() -> Self {
        Self {
            vertex_buffer: NO_RESOURCE,
            index_buffer: NO_RESOURCE,
            layout: VertexLayout {
                stride: 0,
                attributes: Vec::new(),
            },
        }
    }
}

/// One indexed draw, with everything it read from the context at the time.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PendingDraw {
    pub vertex_array: RawHandle,
    pub index_count: u32,
    pub uniforms: Vec<u8>,
    pub diffuse: RawHandle,
    pub specular: RawHandle,
    pub polygon_mode: PolygonMode,
}

/// Draws recorded since the last present.
#[derive(Debug)]
pub(crate) struct Frame {
    pub clear_color: [f32; 4],
    pub draws: Vec<PendingDraw>,
}

/// The context state a GL driver would keep, plus the wgpu objects behind
/// each id. Bind-state transitions never touch the GPU.
#[derive(Debug)]
pub(crate) struct DeviceState {
    next_handle: RawHandle,
    pub buffers: HashMap<RawHandle, wgpu::Buffer>,
    pub vertex_arrays: HashMap<RawHandle, VertexArrayRecord>,
    pub textures: HashMap<RawHandle, wgpu::TextureView>,
    bound_vertex_buffer: RawHandle,
    bound_vertex_array: RawHandle,
    texture_units: BTreeMap<u32, RawHandle>,
    samplers: BTreeMap<SamplerRole, u32>,
    uniforms: Vec<u8>,
    program_active: bool,
    polygon_mode: PolygonMode,
    clear_color: [f32; 4],
    draws: Vec<PendingDraw>,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            next_handle: NO_RESOURCE,
            buffers: HashMap::new(),
            vertex_arrays: HashMap::new(),
            textures: HashMap::new(),
            bound_vertex_buffer: NO_RESOURCE,
            bound_vertex_array: NO_RESOURCE,
            texture_units: BTreeMap::new(),
            samplers: BTreeMap::new(),
            uniforms: vec![0; PHONG_LAYOUT.size()],
            program_active: false,
            polygon_mode: PolygonMode::Fill,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            draws: Vec::new(),
        }
    }
}

impl DeviceState {
    fn allocate(&mut self) -> RawHandle {
        self.next_handle += 1;
        self.next_handle
    }

    fn create_vertex_array(&mut self) -> RawHandle {
        let handle = self.allocate();
        self.vertex_arrays.insert(handle, VertexArrayRecord::default());
        handle
    }

    fn release(&mut self, kind: ResourceKind, handle: RawHandle) -> bool {
        match kind {
            ResourceKind::Buffer => self.buffers.remove(&handle).is_some(),
            ResourceKind::VertexArray => self.vertex_arrays.remove(&handle).is_some(),
            ResourceKind::Texture => self.textures.remove(&handle).is_some(),
        }
    }

    /// Binding an index buffer stores it in the bound attribute object.
    fn bind_buffer(&mut self, target: BufferTarget, handle: RawHandle) {
        match target {
            BufferTarget::Vertex => self.bound_vertex_buffer = handle,
            BufferTarget::Index => {
                let vao = self.bound_vertex_array;
                if let Some(record) = self.vertex_arrays.get_mut(&vao) {
                    record.index_buffer = handle;
                }
            }
        }
    }

    fn bind_vertex_array(&mut self, handle: RawHandle) {
        self.bound_vertex_array = handle;
    }

    /// Declare `attribute` on the bound attribute object, sourced from the
    /// bound vertex buffer. A redeclared location replaces the old one.
    fn vertex_attribute(&mut self, attribute: VertexAttribute, stride: u32) {
        let (vao, vbo) = (self.bound_vertex_array, self.bound_vertex_buffer);
        let Some(record) = self.vertex_arrays.get_mut(&vao) else {
            tracing::warn!(name = attribute.name, "attribute declared with no attribute object bound");
            return;
        };
        if record.vertex_buffer != NO_RESOURCE && record.vertex_buffer != vbo {
            tracing::warn!(vao, "attributes from several vertex buffers; using the latest");
        }
        record.vertex_buffer = vbo;
        record.layout.stride = stride;
        record
            .layout
            .attributes
            .retain(|a| a.location != attribute.location);
        record.layout.attributes.push(attribute);
    }

    fn bind_texture(&mut self, unit: u32, handle: RawHandle) {
        self.texture_units.insert(unit, handle);
    }

    fn set_sampler(&mut self, role: SamplerRole, unit: u32) {
        self.samplers.insert(role, unit);
    }

    fn write_uniform(&mut self, offset: usize, bytes: &[u8]) {
        self.uniforms[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    /// Texture bound to the unit that feeds `role`, if any.
    fn texture_for(&self, role: SamplerRole) -> RawHandle {
        self.samplers
            .get(&role)
            .and_then(|unit| self.texture_units.get(unit))
            .copied()
            .unwrap_or(NO_RESOURCE)
    }

    /// Record a draw. Dropped (false) until a program has been used.
    fn draw_indexed(&mut self, index_count: u32) -> bool {
        if !self.program_active {
            tracing::warn!("draw issued before any program was used");
            return false;
        }
        let draw = PendingDraw {
            vertex_array: self.bound_vertex_array,
            index_count,
            uniforms: self.uniforms.clone(),
            diffuse: self.texture_for(SamplerRole::new(TextureKind::Diffuse, 0)),
            specular: self.texture_for(SamplerRole::new(TextureKind::Specular, 0)),
            polygon_mode: self.polygon_mode,
        };
        self.draws.push(draw);
        true
    }

    fn take_frame(&mut self) -> Frame {
        Frame {
            clear_color: self.clear_color,
            draws: std::mem::take(&mut self.draws),
        }
    }
}

/// [`GpuDevice`] over wgpu.
///
/// wgpu has no global bind state, so this keeps the state a GL context would
/// (bound buffer, bound attribute object, texture units, program uniforms)
/// and turns every indexed draw into a [`PendingDraw`] that
/// [`crate::WgpuRenderer::present`] replays in one render pass.
pub struct WgpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
    state: RefCell<DeviceState>,
}

impl WgpuDevice {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            device,
            queue,
            state: RefCell::new(DeviceState::default()),
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Draws recorded since the last present.
    pub fn pending_draws(&self) -> usize {
        self.state.borrow().draws.len()
    }

    pub(crate) fn state(&self) -> Ref<'_, DeviceState> {
        self.state.borrow()
    }

    pub(crate) fn take_frame(&self) -> Frame {
        self.state.borrow_mut().take_frame()
    }

    pub(crate) fn write_uniform(&self, offset: usize, bytes: &[u8]) {
        self.state.borrow_mut().write_uniform(offset, bytes);
    }

    pub(crate) fn activate_program(&self) {
        self.state.borrow_mut().program_active = true;
    }

    pub(crate) fn set_sampler(&self, role: SamplerRole, unit: u32) {
        self.state.borrow_mut().set_sampler(role, unit);
    }

    fn upload_texture(&self, image: &TextureImage) -> Option<wgpu::TextureView> {
        let max = self.device.limits().max_texture_dimension_2d;
        let levels = match mipmap::mip_chain(image, max) {
            Ok(levels) => levels,
            Err(err) => {
                tracing::error!("texture not uploaded: {err}");
                return None;
            }
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("material_texture"),
            size: wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: levels.len() as u32,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        for (mip_level, level) in levels.iter().enumerate() {
            self.queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: mip_level as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                &level.pixels,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * level.width),
                    rows_per_image: Some(level.height),
                },
                wgpu::Extent3d {
                    width: level.width,
                    height: level.height,
                    depth_or_array_layers: 1,
                },
            );
        }
        Some(texture.create_view(&Default::default()))
    }
}

impl GpuDevice for WgpuDevice {
    fn create_buffer(&self, target: BufferTarget, contents: &[u8]) -> RawHandle {
        let (label, usage) = match target {
            BufferTarget::Vertex => ("vertex_buffer", wgpu::BufferUsages::VERTEX),
            BufferTarget::Index => ("index_buffer", wgpu::BufferUsages::INDEX),
        };
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage,
            });
        let mut state = self.state.borrow_mut();
        let handle = state.allocate();
        state.buffers.insert(handle, buffer);
        handle
    }

    fn create_vertex_array(&self) -> RawHandle {
        self.state.borrow_mut().create_vertex_array()
    }

    fn create_texture(&self, image: &TextureImage) -> RawHandle {
        let Some(view) = self.upload_texture(image) else {
            return NO_RESOURCE;
        };
        let mut state = self.state.borrow_mut();
        let handle = state.allocate();
        state.textures.insert(handle, view);
        handle
    }

    fn release(&self, kind: ResourceKind, handle: RawHandle) {
        if !self.state.borrow_mut().release(kind, handle) {
            tracing::warn!(handle, ?kind, "release of an unknown resource");
        }
    }

    fn bind_buffer(&self, target: BufferTarget, handle: RawHandle) {
        self.state.borrow_mut().bind_buffer(target, handle);
    }

    fn bind_vertex_array(&self, handle: RawHandle) {
        self.state.borrow_mut().bind_vertex_array(handle);
    }

    fn vertex_attribute(&self, attribute: VertexAttribute, stride: u32) {
        self.state.borrow_mut().vertex_attribute(attribute, stride);
    }

    fn bind_texture(&self, unit: u32, handle: RawHandle) {
        self.state.borrow_mut().bind_texture(unit, handle);
    }

    fn clear(&self, color: [f32; 4]) {
        self.state.borrow_mut().clear_color = color;
    }

    fn set_polygon_mode(&self, mode: PolygonMode) {
        self.state.borrow_mut().polygon_mode = mode;
    }

    fn draw_indexed(&self, index_count: u32) {
        self.state.borrow_mut().draw_indexed(index_count);
    }
}
