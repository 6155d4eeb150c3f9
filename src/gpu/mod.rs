//! wgpu renderer for the particle field.
//!
//! Draws three things from buffers the field fills on the CPU: silk lines,
//! cilia lines and hexagon sprites for the particles. Buffers are sized once
//! when a field is attached and rewritten in place every frame.

mod camera;
mod shaders;

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Vec4;
use wgpu::util::DeviceExt;
use winit::window::Window;

pub use camera::{Camera, ViewConfig};

use crate::bridge::FieldTransform;
use crate::error::GpuError;
use crate::field::ParticleField;
use crate::silk::LineVertex;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view: [[f32; 4]; 4],
    proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    point_size: f32,
    _padding: [f32; 3],
}

/// Smallest buffer we allocate, so empty fields still get valid buffers.
const MIN_BUFFER_SIZE: u64 = 16;

struct FieldBuffers {
    positions: wgpu::Buffer,
    colors: wgpu::Buffer,
    count: u32,
    silk: wgpu::Buffer,
    silk_vertices: u32,
    cilia: wgpu::Buffer,
    cilia_vertices: u32,
}

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    point_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    buffers: Option<FieldBuffers>,
    clear_color: wgpu::Color,
    point_size: f32,
}

impl GpuState {
    pub async fn new(window: Arc<Window>, view: &ViewConfig) -> Result<Self, GpuError> {
        let size = window.inner_size();
        if size.width == 0 || size.height == 0 {
            log::warn!("window has zero size at startup; using 1x1 until resized");
        }

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        // Colors are authored as plain hex, so skip the sRGB encode.
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::NoAdapter)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Uniform Buffer"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Field Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        let point_pipeline = create_point_pipeline(&device, &pipeline_layout, config.format);
        let line_pipeline = create_line_pipeline(&device, &pipeline_layout, config.format);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            point_pipeline,
            line_pipeline,
            uniform_buffer,
            uniform_bind_group,
            buffers: None,
            clear_color: to_wgpu_color(view.clear_color),
            point_size: view.point_size,
        })
    }

    /// Allocate GPU buffers sized for `field` and upload its current state.
    pub fn attach_field(&mut self, field: &ParticleField) {
        let particles = field.particles();
        let buffers = FieldBuffers {
            positions: self.create_vertex_buffer("Particle Positions", bytemuck::cast_slice(particles.positions())),
            colors: self.create_vertex_buffer("Particle Colors", bytemuck::cast_slice(particles.colors())),
            count: particles.count() as u32,
            silk: self.create_vertex_buffer("Silk Vertices", bytemuck::cast_slice(field.silk().vertices())),
            silk_vertices: field.silk().vertices().len() as u32,
            cilia: self.create_vertex_buffer("Cilia Vertices", bytemuck::cast_slice(field.cilia().vertices())),
            cilia_vertices: field.cilia().vertices().len() as u32,
        };
        log::debug!(
            "attached field: {} particles, {} silk vertices, {} cilia vertices",
            buffers.count,
            buffers.silk_vertices,
            buffers.cilia_vertices
        );
        self.buffers = Some(buffers);
    }

    /// Drop the field's buffers. Rendering continues with the background only.
    pub fn detach_field(&mut self) {
        self.buffers = None;
    }

    /// Copy the field's live buffers to the GPU.
    pub fn upload(&self, field: &ParticleField) {
        let Some(buffers) = &self.buffers else {
            return;
        };
        let particles = field.particles();
        write_if_any(&self.queue, &buffers.positions, bytemuck::cast_slice(particles.positions()));
        write_if_any(&self.queue, &buffers.colors, bytemuck::cast_slice(particles.colors()));
        write_if_any(&self.queue, &buffers.silk, bytemuck::cast_slice(field.silk().vertices()));
        write_if_any(&self.queue, &buffers.cilia, bytemuck::cast_slice(field.cilia().vertices()));
    }

    /// Reconfigure the surface. Zero-sized requests are ignored.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) -> bool {
        if new_size.width == 0 || new_size.height == 0 {
            return false;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        true
    }

    pub fn size(&self) -> winit::dpi::PhysicalSize<u32> {
        winit::dpi::PhysicalSize::new(self.config.width, self.config.height)
    }

    pub fn render(&mut self, camera: &Camera, transform: &FieldTransform) -> Result<(), wgpu::SurfaceError> {
        let uniforms = Uniforms {
            view: camera.view_matrix().to_cols_array_2d(),
            proj: camera.projection_matrix().to_cols_array_2d(),
            model: transform.model_matrix().to_cols_array_2d(),
            point_size: self.point_size,
            _padding: [0.0; 3],
        };
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(buffers) = &self.buffers {
                render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);

                render_pass.set_pipeline(&self.line_pipeline);
                if buffers.silk_vertices > 0 {
                    render_pass.set_vertex_buffer(0, buffers.silk.slice(..));
                    render_pass.draw(0..buffers.silk_vertices, 0..1);
                }
                if buffers.cilia_vertices > 0 {
                    render_pass.set_vertex_buffer(0, buffers.cilia.slice(..));
                    render_pass.draw(0..buffers.cilia_vertices, 0..1);
                }

                if buffers.count > 0 {
                    render_pass.set_pipeline(&self.point_pipeline);
                    render_pass.set_vertex_buffer(0, buffers.positions.slice(..));
                    render_pass.set_vertex_buffer(1, buffers.colors.slice(..));
                    render_pass.draw(0..6, 0..buffers.count);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn create_vertex_buffer(&self, label: &str, contents: &[u8]) -> wgpu::Buffer {
        if (contents.len() as u64) < MIN_BUFFER_SIZE {
            let mut padded = contents.to_vec();
            padded.resize(MIN_BUFFER_SIZE as usize, 0);
            return self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: &padded,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            });
        }
        self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        })
    }
}

fn write_if_any(queue: &wgpu::Queue, buffer: &wgpu::Buffer, data: &[u8]) {
    if !data.is_empty() {
        queue.write_buffer(buffer, 0, data);
    }
}

fn to_wgpu_color(color: Vec4) -> wgpu::Color {
    wgpu::Color {
        r: color.x as f64,
        g: color.y as f64,
        b: color.z as f64,
        a: color.w as f64,
    }
}

fn create_point_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Points Shader"),
        source: wgpu::ShaderSource::Wgsl(shaders::POINTS_SHADER.into()),
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Points Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &[wgpu::VertexAttribute {
                        offset: 0,
                        shader_location: 0,
                        format: wgpu::VertexFormat::Float32x3,
                    }],
                },
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &[wgpu::VertexAttribute {
                        offset: 0,
                        shader_location: 1,
                        format: wgpu::VertexFormat::Float32x4,
                    }],
                },
            ],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn create_line_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Lines Shader"),
        source: wgpu::ShaderSource::Wgsl(shaders::LINES_SHADER.into()),
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Lines Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[
                    wgpu::VertexAttribute {
                        offset: 0,
                        shader_location: 0,
                        format: wgpu::VertexFormat::Float32x3,
                    },
                    wgpu::VertexAttribute {
                        offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                        shader_location: 1,
                        format: wgpu::VertexFormat::Float32x4,
                    },
                ],
            }],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::LineList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
