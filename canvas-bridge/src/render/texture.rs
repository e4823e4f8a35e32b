use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::frame::Frame;
use super::shader::{BUILTIN_PRESENT_SHADER, validate_shader};
use crate::engine::RowOrder;
use crate::error::{PresentError, ShaderError};
use crate::framework::logging::*;
use crate::pixels::{PixelBuffer, SurfaceSize};

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct Vertex {
    position: [f32; 2],
}

/// Full-viewport quad in clip space, drawn as a triangle strip.
const QUAD: [Vertex; 4] = [
    Vertex {
        position: [-1.0, 1.0],
    },
    Vertex {
        position: [-1.0, -1.0],
    },
    Vertex {
        position: [1.0, 1.0],
    },
    Vertex {
        position: [1.0, -1.0],
    },
];

/// The GPU texture that engine snapshots are uploaded into and drawn from.
///
/// Pipeline, sampler, layouts and the uniform and vertex buffers live for the
/// whole run; only the texture and its bind group are rebuilt on resize.
pub struct PresentationTexture {
    size: SurfaceSize,
    format: wgpu::TextureFormat,
    row_order: RowOrder,
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    params_buffer: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
    pipeline: wgpu::RenderPipeline,
}

impl PresentationTexture {
    pub fn new(
        device: &wgpu::Device,
        target_format: wgpu::TextureFormat,
        size: SurfaceSize,
    ) -> Result<Self, ShaderError> {
        Self::with_shader(device, target_format, size, BUILTIN_PRESENT_SHADER)
    }

    /// Builds the texture with a custom WGSL shader. The shader must expose
    /// `vs_main`/`fs_main` and the same bindings as the built-in one.
    pub fn with_shader(
        device: &wgpu::Device,
        target_format: wgpu::TextureFormat,
        size: SurfaceSize,
        source: &str,
    ) -> Result<Self, ShaderError> {
        validate_shader(source)?;

        let format = texture_format_for(target_format);
        let bind_group_layout = create_bind_group_layout(device);
        let pipeline = create_pipeline(
            device,
            target_format,
            &bind_group_layout,
            source,
        )?;

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("canvas-bridge-present-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let params_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("canvas-bridge-present-params"),
                contents: bytemuck::cast_slice(&params_for(RowOrder::TopDown)),
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            });

        let vertex_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("canvas-bridge-present-quad"),
                contents: bytemuck::cast_slice(&QUAD),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let texture = create_texture(device, format, size);
        let bind_group = create_bind_group(
            device,
            &bind_group_layout,
            &params_buffer,
            &sampler,
            &texture,
        );

        Ok(Self {
            size,
            format,
            row_order: RowOrder::TopDown,
            texture,
            bind_group,
            bind_group_layout,
            sampler,
            params_buffer,
            vertex_buffer,
            pipeline,
        })
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Replaces the texture contents with `buffer`.
    pub fn upload(
        &mut self,
        queue: &wgpu::Queue,
        buffer: &PixelBuffer,
    ) -> Result<(), PresentError> {
        if buffer.size() != self.size {
            return Err(PresentError::SizeMismatch {
                buffer: buffer.size(),
                texture: self.size,
            });
        }

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            buffer.data(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(self.size.bytes_per_row()),
                rows_per_image: Some(self.size.height),
            },
            extent(self.size),
        );

        if buffer.row_order() != self.row_order {
            self.row_order = buffer.row_order();
            queue.write_buffer(
                &self.params_buffer,
                0,
                bytemuck::cast_slice(&params_for(self.row_order)),
            );
        }

        Ok(())
    }

    /// Clears the frame target and draws the texture over all of it.
    pub fn draw(&self, frame: &mut Frame, clear_color: wgpu::Color) {
        let target_view = frame.target_view.clone();
        let mut render_pass =
            frame
                .encoder()
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("canvas-bridge-present-pass"),
                    color_attachments: &[Some(
                        wgpu::RenderPassColorAttachment {
                            view: &target_view,
                            resolve_target: None,
                            depth_slice: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(clear_color),
                                store: wgpu::StoreOp::Store,
                            },
                        },
                    )],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.draw(0..QUAD.len() as u32, 0..1);
    }

    /// Reallocates texture storage at `size`. Contents are undefined until
    /// the next upload.
    pub fn resize(&mut self, device: &wgpu::Device, size: SurfaceSize) {
        if size == self.size {
            return;
        }

        debug!("reallocating presentation texture {} -> {}", self.size, size);

        self.texture = create_texture(device, self.format, size);
        self.bind_group = create_bind_group(
            device,
            &self.bind_group_layout,
            &self.params_buffer,
            &self.sampler,
            &self.texture,
        );
        self.size = size;
    }
}

/// Matches the texture's color space to the target so sampling followed by
/// the target's own encoding leaves the engine's bytes unchanged.
pub fn texture_format_for(
    target_format: wgpu::TextureFormat,
) -> wgpu::TextureFormat {
    if target_format.is_srgb() {
        wgpu::TextureFormat::Rgba8UnormSrgb
    } else {
        wgpu::TextureFormat::Rgba8Unorm
    }
}

fn params_for(row_order: RowOrder) -> [f32; 4] {
    let bottom_up = if row_order.is_bottom_up() { 1.0 } else { 0.0 };
    [bottom_up, 0.0, 0.0, 0.0]
}

fn extent(size: SurfaceSize) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: size.width.max(1),
        height: size.height.max(1),
        depth_or_array_layers: 1,
    }
}

fn create_texture(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    size: SurfaceSize,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("canvas-bridge-presentation-texture"),
        size: extent(size),
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    })
}

fn create_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("canvas-bridge-present-layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<[f32; 4]>() as u64,
                    ),
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(
                    wgpu::SamplerBindingType::Filtering,
                ),
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float {
                        filterable: true,
                    },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
        ],
    })
}

fn create_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    params_buffer: &wgpu::Buffer,
    sampler: &wgpu::Sampler,
    texture: &wgpu::Texture,
) -> wgpu::BindGroup {
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("canvas-bridge-present-bind-group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: params_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::TextureView(&view),
            },
        ],
    })
}

fn create_pipeline(
    device: &wgpu::Device,
    target_format: wgpu::TextureFormat,
    bind_group_layout: &wgpu::BindGroupLayout,
    source: &str,
) -> Result<wgpu::RenderPipeline, ShaderError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("canvas-bridge-present-shader"),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    let layout =
        device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("canvas-bridge-present-pipeline-layout"),
            bind_group_layouts: &[bind_group_layout],
            push_constant_ranges: &[],
        });

    let vertex_layout = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x2],
    };

    let pipeline =
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("canvas-bridge-present-pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options:
                    wgpu::PipelineCompilationOptions::default(),
                buffers: &[vertex_layout],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options:
                    wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

    match pollster::block_on(device.pop_error_scope()) {
        Some(err) => Err(ShaderError::Pipeline(err.to_string())),
        None => Ok(pipeline),
    }
}
