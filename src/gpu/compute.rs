//! Compute tessellation: turns primitive parameters into vertex buffers

use std::rc::Rc;

use glam::Vec2;

use super::GpuError;
use super::context::Context;
use crate::consts::{DIVISIONS, WORKGROUP_SIZE};
use crate::math::round_up;
use crate::scene::{Face, PaletteColor, Shape};

/// Owns the circle and semicircle compute pipelines and runs one
/// tessellation pass per primitive when a face is created.
pub struct FaceCompute {
    context: Rc<Context>,
    bind_group_layout: wgpu::BindGroupLayout,
    circle_pipeline: wgpu::ComputePipeline,
    semicircle_pipeline: wgpu::ComputePipeline,
}

impl FaceCompute {
    pub fn new(context: Rc<Context>) -> Self {
        let device = &context.device;

        let circle_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("circle-kernel"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/circle.wgsl").into()),
        });
        let semicircle_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("semicircle-kernel"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/semicircle.wgsl").into()),
        });

        // Both kernels share one layout: props uniform in, vertices out
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tessellate-bind-group-layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("tessellate-pipeline-layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let circle_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("circle-pipeline"),
            layout: Some(&pipeline_layout),
            module: &circle_shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });
        let semicircle_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("semicircle-pipeline"),
            layout: Some(&pipeline_layout),
            module: &semicircle_shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        Self {
            context,
            bind_group_layout,
            circle_pipeline,
            semicircle_pipeline,
        }
    }

    /// Build a face at a pixel position, tessellate all four of its
    /// primitives on the GPU, and return it ready for registration with
    /// the renderer.
    ///
    /// All compute work is submitted before this returns, so the queue
    /// orders it ahead of any later render pass that reads the vertex
    /// buffers.
    pub fn create_face(
        &self,
        center_x: f32,
        center_y: f32,
        radius: f32,
        velocity: Vec2,
        now: f64,
    ) -> Result<Face, GpuError> {
        let mut face = Face::new(
            center_x,
            center_y,
            radius,
            velocity,
            PaletteColor::Vanilla,
            PaletteColor::PaynesGray,
            now,
        )?;
        self.init_primitive_buffers(&mut face)?;
        self.tessellate(&face);
        log::debug!("face created at ({center_x}, {center_y}), radius {radius}");
        Ok(face)
    }

    /// Allocate and bind the compute input/output buffers for each
    /// primitive, in face order.
    fn init_primitive_buffers(&self, face: &mut Face) -> Result<(), GpuError> {
        let device = &self.context.device;
        let queue = &self.context.queue;

        for primitive in face.primitives_mut() {
            let props_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("primitive-props"),
                size: round_up(16, std::mem::size_of_val(primitive.props()) as u64)?,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            queue.write_buffer(&props_buffer, 0, bytemuck::cast_slice(primitive.props()));

            let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("primitive-vertices"),
                size: round_up(16, primitive.vertex_byte_len() as u64)?,
                usage: wgpu::BufferUsages::STORAGE
                    | wgpu::BufferUsages::VERTEX
                    | wgpu::BufferUsages::COPY_SRC,
                mapped_at_creation: false,
            });

            let compute_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("tessellate-bind-group"),
                layout: &self.bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: props_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: vertex_buffer.as_entire_binding(),
                    },
                ],
            });

            primitive.props_buffer = Some(props_buffer);
            primitive.vertex_buffer = Some(vertex_buffer);
            primitive.compute_bind_group = Some(compute_bind_group);
        }
        Ok(())
    }

    /// Submit one compute pass per primitive. The passes are mutually
    /// independent; submission order is the only ordering that matters.
    fn tessellate(&self, face: &Face) {
        let device = &self.context.device;
        let queue = &self.context.queue;

        for primitive in face.primitives() {
            let Some(bind_group) = &primitive.compute_bind_group else {
                continue;
            };

            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("tessellate-encoder"),
            });
            {
                let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                    label: Some("tessellate-pass"),
                    timestamp_writes: None,
                });
                pass.set_pipeline(match primitive.shape {
                    Shape::Circle => &self.circle_pipeline,
                    Shape::SemiCircle { .. } => &self.semicircle_pipeline,
                });
                pass.set_bind_group(0, bind_group, &[]);
                pass.dispatch_workgroups(DIVISIONS / WORKGROUP_SIZE, 1, 1);
            }
            queue.submit(std::iter::once(encoder.finish()));
        }
    }
}
