use crate::device::WgpuDevice;
use crate::mipmap::TEXTURE_FORMAT;
use crate::program::PHONG_LAYOUT;
use crate::shaders;
use glimmer_gpu::{AttributeFormat, PolygonMode, RawHandle, VertexLayout};
use std::collections::HashMap;
use std::num::NonZeroU64;
use wgpu::util::DeviceExt;

/// Attributes the Phong shader reads: (location, format).
const SHADER_INPUTS: [(u32, AttributeFormat); 3] = [
    (0, AttributeFormat::Float32x3),
    (1, AttributeFormat::Float32x3),
    (2, AttributeFormat::Float32x2),
];

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Whether `layout` feeds every input of the Phong shader.
pub fn supports_layout(layout: &VertexLayout) -> bool {
    SHADER_INPUTS.iter().all(|&(location, format)| {
        layout
            .attributes
            .iter()
            .any(|a| a.location == location && a.format == format)
    })
}

/// The mode a draw is rasterized with: edges only need
/// [`wgpu::Features::POLYGON_MODE_LINE`], otherwise they fall back to fill.
pub fn effective_polygon_mode(requested: PolygonMode, features: wgpu::Features) -> PolygonMode {
    match requested {
        PolygonMode::Line if !features.contains(wgpu::Features::POLYGON_MODE_LINE) => PolygonMode::Fill,
        mode => mode,
    }
}

fn wgpu_polygon_mode(mode: PolygonMode) -> wgpu::PolygonMode {
    match mode {
        PolygonMode::Fill => wgpu::PolygonMode::Fill,
        PolygonMode::Line => wgpu::PolygonMode::Line,
    }
}

fn vertex_format(format: AttributeFormat) -> wgpu::VertexFormat {
    match format {
        AttributeFormat::Float32x2 => wgpu::VertexFormat::Float32x2,
        AttributeFormat::Float32x3 => wgpu::VertexFormat::Float32x3,
        AttributeFormat::Float32x4 => wgpu::VertexFormat::Float32x4,
        AttributeFormat::Sint32x4 => wgpu::VertexFormat::Sint32x4,
    }
}

/// Replays the draws a [`WgpuDevice`] recorded into one render pass.
///
/// Each draw gets its own slice of a dynamic-offset uniform buffer. One
/// pipeline is built per distinct vertex layout and polygon mode. Draws
/// without a diffuse
/// map sample white; without a specular map, black.
pub struct WgpuRenderer {
    shader: wgpu::ShaderModule,
    pipeline_layout: wgpu::PipelineLayout,
    pipelines: HashMap<(VertexLayout, PolygonMode), wgpu::RenderPipeline>,
    line_fallback_warned: bool,
    uniform_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniform_stride: u64,
    uniform_capacity: usize,
    material_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    white: wgpu::TextureView,
    black: wgpu::TextureView,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

impl WgpuRenderer {
    pub fn new(gpu: &WgpuDevice, surface_format: wgpu::TextureFormat, width: u32, height: u32) -> Self {
        let device = gpu.device();
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("phong_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::PHONG_SHADER.into()),
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(PHONG_LAYOUT.size() as u64),
                },
                count: None,
            }],
        });

        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("material_bind_group_layout"),
            entries: &[
                texture_entry(0),
                texture_entry(1),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("phong_pipeline_layout"),
            bind_group_layouts: &[&uniform_layout, &material_layout],
            push_constant_ranges: &[],
        });

        // Repeat wrapping, trilinear filtering.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("material_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let uniform_stride = (PHONG_LAYOUT.size() as u64)
            .next_multiple_of(device.limits().min_uniform_buffer_offset_alignment as u64);
        let uniform_capacity = 16;
        let (uniform_buffer, uniform_bind_group) =
            Self::create_uniforms(device, &uniform_layout, uniform_stride, uniform_capacity);

        Self {
            white: Self::solid_texture(gpu, [255, 255, 255, 255]),
            black: Self::solid_texture(gpu, [0, 0, 0, 255]),
            depth_texture: Self::create_depth_texture(device, width, height),
            shader,
            pipeline_layout,
            pipelines: HashMap::new(),
            line_fallback_warned: false,
            uniform_layout,
            uniform_buffer,
            uniform_bind_group,
            uniform_stride,
            uniform_capacity,
            material_layout,
            sampler,
            surface_format,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Number of pipelines built so far (one per vertex layout and mode).
    pub fn pipeline_count(&self) -> usize {
        self.pipelines.len()
    }

    /// Render every draw recorded since the last call into `target`.
    /// Returns how many draws were submitted.
    pub fn present(&mut self, gpu: &WgpuDevice, target: &wgpu::TextureView) -> usize {
        let frame = gpu.take_frame();
        let device = gpu.device();
        let state = gpu.state();

        // Drop draws whose objects were released or never filled in.
        let mut draws = Vec::with_capacity(frame.draws.len());
        for draw in &frame.draws {
            let Some(vao) = state.vertex_arrays.get(&draw.vertex_array) else {
                tracing::warn!(vao = draw.vertex_array, "draw with a released attribute object");
                continue;
            };
            let (Some(vbo), Some(ibo)) = (
                state.buffers.get(&vao.vertex_buffer),
                state.buffers.get(&vao.index_buffer),
            ) else {
                tracing::warn!(vao = draw.vertex_array, "attribute object is missing a buffer");
                continue;
            };
            let mode = self.polygon_mode_for(device, draw.polygon_mode);
            if !self.ensure_pipeline(device, &vao.layout, mode) {
                continue;
            }
            draws.push((draw, (vao.layout.clone(), mode), vbo, ibo));
        }

        if draws.len() > self.uniform_capacity {
            self.uniform_capacity = draws.len().next_power_of_two();
            let (buffer, bind_group) = Self::create_uniforms(
                device,
                &self.uniform_layout,
                self.uniform_stride,
                self.uniform_capacity,
            );
            self.uniform_buffer = buffer;
            self.uniform_bind_group = bind_group;
        }
        if !draws.is_empty() {
            let stride = self.uniform_stride as usize;
            let mut bytes = vec![0u8; draws.len() * stride];
            for (i, (draw, ..)) in draws.iter().enumerate() {
                bytes[i * stride..i * stride + draw.uniforms.len()].copy_from_slice(&draw.uniforms);
            }
            gpu.queue().write_buffer(&self.uniform_buffer, 0, &bytes);
        }

        // One material bind group per distinct (diffuse, specular) pair.
        let mut material_groups = Vec::new();
        let mut group_of: HashMap<(RawHandle, RawHandle), usize> = HashMap::new();
        let mut draw_groups = Vec::with_capacity(draws.len());
        for (draw, ..) in &draws {
            let key = (draw.diffuse, draw.specular);
            let index = *group_of.entry(key).or_insert_with(|| {
                let diffuse = state.textures.get(&draw.diffuse).unwrap_or(&self.white);
                let specular = state.textures.get(&draw.specular).unwrap_or(&self.black);
                material_groups.push(device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("material_bind_group"),
                    layout: &self.material_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(diffuse),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(specular),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::Sampler(&self.sampler),
                        },
                    ],
                }));
                material_groups.len() - 1
            });
            draw_groups.push(index);
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });
        {
            let [r, g, b, a] = frame.clear_color.map(f64::from);
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            for (i, ((draw, key, vbo, ibo), group)) in draws.iter().zip(&draw_groups).enumerate() {
                let offset = (i as u64 * self.uniform_stride) as u32;
                pass.set_pipeline(&self.pipelines[key]);
                pass.set_bind_group(0, &self.uniform_bind_group, &[offset]);
                pass.set_bind_group(1, &material_groups[*group], &[]);
                pass.set_vertex_buffer(0, vbo.slice(..));
                pass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..draw.index_count, 0, 0..1);
            }
        }
        gpu.queue().submit(std::iter::once(encoder.finish()));
        draws.len()
    }

    fn polygon_mode_for(&mut self, device: &wgpu::Device, requested: PolygonMode) -> PolygonMode {
        let mode = effective_polygon_mode(requested, device.features());
        if mode != requested && !self.line_fallback_warned {
            tracing::warn!("wireframe needs POLYGON_MODE_LINE; drawing filled");
            self.line_fallback_warned = true;
        }
        mode
    }

    /// Build the pipeline for `layout` in `mode` if needed. False when the
    /// layout cannot feed the shader.
    fn ensure_pipeline(&mut self, device: &wgpu::Device, layout: &VertexLayout, mode: PolygonMode) -> bool {
        let key = (layout.clone(), mode);
        if self.pipelines.contains_key(&key) {
            return true;
        }
        if !supports_layout(layout) {
            tracing::warn!(?layout, "vertex layout does not match the shader inputs");
            return false;
        }

        let attributes: Vec<wgpu::VertexAttribute> = layout
            .attributes
            .iter()
            .map(|a| wgpu::VertexAttribute {
                format: vertex_format(a.format),
                offset: a.offset as u64,
                shader_location: a.location,
            })
            .collect();
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("phong_pipeline"),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module: &self.shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: layout.stride as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &attributes,
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &self.shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                polygon_mode: wgpu_polygon_mode(mode),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });
        tracing::debug!(stride = layout.stride, attributes = attributes.len(), ?mode, "pipeline built");
        self.pipelines.insert(key, pipeline);
        true
    }

    fn create_uniforms(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stride: u64,
        capacity: usize,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniform_buffer"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(PHONG_LAYOUT.size() as u64),
                }),
            }],
        });
        (buffer, bind_group)
    }

    fn solid_texture(gpu: &WgpuDevice, rgba: [u8; 4]) -> wgpu::TextureView {
        let texture = gpu.device().create_texture_with_data(
            gpu.queue(),
            &wgpu::TextureDescriptor {
                label: Some("fallback_texture"),
                size: wgpu::Extent3d {
                    width: 1,
                    height: 1,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: TEXTURE_FORMAT,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &rgba,
        );
        texture.create_view(&Default::default())
    }

    fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}
