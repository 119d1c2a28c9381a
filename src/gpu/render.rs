//! Render pipeline, per-frame draw loop, and resize debouncing

use std::rc::Rc;

use super::GpuError;
use super::context::Context;
use crate::consts::{RESIZE_DEBOUNCE_MS, VERTEX_STRIDE};
use crate::controller::Controller;
use crate::math::round_up;
use crate::scene::Face;
use crate::settings::Settings;

/// Debounce state for window resizing.
///
/// Each resize event rearms the deadline; only once the window has been
/// quiet for the full interval does normal operation resume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeState {
    Idle,
    Pending { deadline: f64 },
}

impl ResizeState {
    /// Start or extend the quiescence window from a resize event
    fn rearm(&mut self, now: f64) {
        *self = ResizeState::Pending {
            deadline: now + RESIZE_DEBOUNCE_MS,
        };
    }

    /// Advance the state for a new frame. Returns true on the frame the
    /// window expires.
    fn tick(&mut self, now: f64) -> bool {
        match *self {
            ResizeState::Pending { deadline } if now >= deadline => {
                *self = ResizeState::Idle;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ResizeState::Pending { .. })
    }
}

/// Owns the render pipeline and the registered-face list, and draws
/// every face every frame.
pub struct Renderer {
    context: Rc<Context>,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    canvas_buffer: wgpu::Buffer,
    sample_count: u32,
    msaa_texture: Option<wgpu::Texture>,
    /// Append-only for the lifetime of the canvas; faces are never
    /// despawned
    faces: Vec<Face>,
    resize: ResizeState,
    logical_size: (u32, u32),
}

impl Renderer {
    pub fn new(
        context: Rc<Context>,
        surface: wgpu::Surface<'static>,
        logical_width: u32,
        logical_height: u32,
        settings: &Settings,
    ) -> Result<Self, GpuError> {
        let device = &context.device;
        let sample_count = settings.sample_count();

        let surface_caps = surface.get_capabilities(&context.adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);
        log::info!("Using surface format: {surface_format:?}");

        let (physical_width, physical_height) =
            physical_size(logical_width, logical_height, context.scale);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: physical_width,
            height: physical_height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(device, &config);

        // Canvas physical size uniform, shared by every face's vertex stage
        let canvas_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("canvas-size"),
            size: round_up(16, 2 * std::mem::size_of::<f32>() as u64)?,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        context.queue.write_buffer(
            &canvas_buffer,
            0,
            bytemuck::cast_slice(&[physical_width as f32, physical_height as f32]),
        );

        let vertex_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("face-vertex"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/vert.wgsl").into()),
        });
        let fragment_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("face-fragment"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/frag.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("face-bind-group-layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("face-pipeline-layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("face-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_shader,
                entry_point: Some("main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: VERTEX_STRIDE as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[wgpu::VertexAttribute {
                        offset: 0,
                        shader_location: 0,
                        format: wgpu::VertexFormat::Float32x2,
                    }],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_shader,
                entry_point: Some("main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: sample_count,
                ..Default::default()
            },
            multiview_mask: None,
            cache: None,
        });

        let msaa_texture = create_msaa_texture(device, &config, sample_count);

        Ok(Self {
            context,
            surface,
            config,
            pipeline,
            bind_group_layout,
            canvas_buffer,
            sample_count,
            msaa_texture,
            faces: Vec::new(),
            resize: ResizeState::Idle,
            logical_size: (logical_width, logical_height),
        })
    }

    /// True while the resize quiescence window is open; physics and
    /// spawning are suppressed in that state
    pub fn resize_pending(&self) -> bool {
        self.resize.is_pending()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Take ownership of a freshly tessellated face: allocate its
    /// transform buffer, build its render bind groups, and add it to the
    /// draw list.
    pub fn register_face(&mut self, mut face: Face) {
        let device = &self.context.device;
        let queue = &self.context.queue;

        let transform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("face-transform"),
            size: std::mem::size_of_val(face.transform.data()) as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&transform_buffer, 0, bytemuck::cast_slice(face.transform.data()));

        for primitive in face.primitives_mut() {
            let Some(color_buffer) = self.context.palette.get(primitive.color).buffer() else {
                continue;
            };
            primitive.render_bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("face-bind-group"),
                layout: &self.bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: self.canvas_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: transform_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: color_buffer.as_entire_binding(),
                    },
                ],
            }));
        }

        face.transform_buffer = Some(transform_buffer);
        self.faces.push(face);
        log::info!("face registered ({} total)", self.faces.len());
    }

    /// A resize event: apply the new dimensions immediately and rearm
    /// the quiescence window. Consecutive events coalesce; only the last
    /// dimensions stick.
    pub fn resize_requested(&mut self, logical_width: u32, logical_height: u32, now: f64) {
        self.logical_size = (logical_width, logical_height);
        self.apply_size();
        self.resize.rearm(now);
        log::debug!("resize to {logical_width}x{logical_height} (logical)");
    }

    /// Reapply the current dimensions, e.g. after a lost surface
    pub fn reconfigure(&mut self) {
        self.apply_size();
    }

    /// Reconfigure the surface, rewrite the canvas uniform, and recreate
    /// the multisample target. Size-dependent resources are never reused
    /// across a size change.
    fn apply_size(&mut self) {
        let (physical_width, physical_height) =
            physical_size(self.logical_size.0, self.logical_size.1, self.context.scale);
        if physical_width == 0 || physical_height == 0 {
            return;
        }
        self.config.width = physical_width;
        self.config.height = physical_height;
        self.surface.configure(&self.context.device, &self.config);
        self.context.queue.write_buffer(
            &self.canvas_buffer,
            0,
            bytemuck::cast_slice(&[physical_width as f32, physical_height as f32]),
        );
        self.msaa_texture =
            create_msaa_texture(&self.context.device, &self.config, self.sample_count);
    }

    /// Draw one frame: advance the clock, settle the resize window,
    /// move every face (unless suppressed), and draw every primitive of
    /// every face in fixed order.
    pub fn frame(&mut self, controller: &mut Controller, now: f64) -> Result<(), GpuError> {
        controller.update_time(now);

        if self.resize.tick(now) {
            // Quiescence expired: restart motion clocks so the paused
            // interval is not applied as one step
            for face in &mut self.faces {
                face.rebase_clock(now);
            }
        }

        if !self.resize.is_pending() {
            let queue = &self.context.queue;
            for face in &mut self.faces {
                face.translate(now)?;
                if let Some(buffer) = &face.transform_buffer {
                    queue.write_buffer(buffer, 0, bytemuck::cast_slice(face.transform.data()));
                }
            }
        }

        let output = self.surface.get_current_texture()?;
        let surface_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let msaa_view = self
            .msaa_texture
            .as_ref()
            .map(|texture| texture.create_view(&wgpu::TextureViewDescriptor::default()));

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("frame-encoder"),
                });
        {
            let (view, resolve_target) = match &msaa_view {
                Some(msaa) => (msaa, Some(&surface_view)),
                None => (&surface_view, None),
            };
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("face-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.context.palette.moonstone.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            pass.set_pipeline(&self.pipeline);
            for face in &self.faces {
                for primitive in face.primitives() {
                    let (Some(bind_group), Some(vertex_buffer)) =
                        (&primitive.render_bind_group, &primitive.vertex_buffer)
                    else {
                        continue;
                    };
                    pass.set_bind_group(0, bind_group, &[]);
                    pass.set_vertex_buffer(0, vertex_buffer.slice(..));
                    pass.draw(0..primitive.vertex_count(), 0..1);
                }
            }
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn physical_size(logical_width: u32, logical_height: u32, scale: f64) -> (u32, u32) {
    (
        (logical_width as f64 * scale) as u32,
        (logical_height as f64 * scale) as u32,
    )
}

fn create_msaa_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    sample_count: u32,
) -> Option<wgpu::Texture> {
    if sample_count <= 1 {
        return None;
    }
    Some(device.create_texture(&wgpu::TextureDescriptor {
        label: Some("msaa-target"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format: config.format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_state_starts_idle() {
        let state = ResizeState::Idle;
        assert!(!state.is_pending());
    }

    #[test]
    fn test_rearm_opens_quiescence_window() {
        let mut state = ResizeState::Idle;
        state.rearm(1000.0);
        assert_eq!(
            state,
            ResizeState::Pending {
                deadline: 1000.0 + RESIZE_DEBOUNCE_MS
            }
        );
        assert!(state.is_pending());
    }

    #[test]
    fn test_tick_before_deadline_stays_pending() {
        let mut state = ResizeState::Idle;
        state.rearm(1000.0);
        assert!(!state.tick(1100.0));
        assert!(state.is_pending());
    }

    #[test]
    fn test_tick_after_deadline_clears_once() {
        let mut state = ResizeState::Idle;
        state.rearm(1000.0);
        assert!(state.tick(1000.0 + RESIZE_DEBOUNCE_MS));
        assert!(!state.is_pending());
        // Only the expiring frame reports the transition
        assert!(!state.tick(2000.0));
    }

    #[test]
    fn test_repeated_events_coalesce() {
        let mut state = ResizeState::Idle;
        state.rearm(1000.0);
        state.rearm(1200.0);
        // The first deadline has passed but the window was extended
        assert!(!state.tick(1300.0));
        assert!(state.is_pending());
        assert!(state.tick(1200.0 + RESIZE_DEBOUNCE_MS));
    }

    #[test]
    fn test_physical_size_scales_logical() {
        assert_eq!(physical_size(800, 600, 1.0), (800, 600));
        assert_eq!(physical_size(800, 600, 2.0), (1600, 1200));
        assert_eq!(physical_size(100, 100, 1.5), (150, 150));
    }
}
