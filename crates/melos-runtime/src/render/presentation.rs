//! GPU presentation: retained offscreen texture plus a surface blit.
//!
//! Canvas calls accumulate as colored quads; `commit_frame` rasterizes
//! them into a fixed-resolution offscreen texture, and `present` blits
//! that texture to the window surface. Committing and presenting are
//! independent, which is what makes redraw-on-demand cheap: most ticks
//! only run the blit.

use std::sync::Arc;

use anyhow::anyhow;
use tracing::{debug, info, warn};
use wgpu::util::DeviceExt;
use winit::window::Fullscreen;

use crate::canvas::{Canvas, Color, Rect, Vec2};
use crate::input::{Key, KeyAction};
use crate::present::{FrameInput, Presentation};
use crate::render::text;
use crate::RuntimeError;

// ---------------------------------------------------------------------------
// Vertex
// ---------------------------------------------------------------------------

/// A single vertex with 2D position (offscreen pixels) and RGBA color.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck_derive::Pod, bytemuck_derive::Zeroable)]
struct Vertex {
    position: [f32; 2],
    color: [f32; 4],
}

impl Vertex {
    /// Vertex buffer layout for the shape shader.
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Quad budget for one committed frame; excess quads are dropped with a
/// diagnostic.
const MAX_QUADS: usize = 8192;
const VERTICES_PER_QUAD: usize = 6;
const MAX_VERTICES: usize = MAX_QUADS * VERTICES_PER_QUAD;

/// Projection from offscreen pixel space (top-left origin, y-down) to clip
/// space, column-major.
fn pixel_projection(width: f32, height: f32) -> [f32; 16] {
    let sx = 2.0 / width;
    let sy = -2.0 / height;
    [
        sx, 0.0, 0.0, 0.0, //
        0.0, sy, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        -1.0, 1.0, 0.0, 1.0, //
    ]
}

// ---------------------------------------------------------------------------
// GpuPresentation
// ---------------------------------------------------------------------------

/// Windowed [`Presentation`] backed by wgpu.
///
/// Created by [`run_windowed`](crate::render::run_windowed) once the window
/// exists; the winit driver feeds input in through the `push_*` methods and
/// the runtime pulls it out via `poll_input`.
pub struct GpuPresentation {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    shape_pipeline: wgpu::RenderPipeline,
    blit_pipeline: wgpu::RenderPipeline,
    blit_bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    projection_bind_group: wgpu::BindGroup,
    offscreen_view: wgpu::TextureView,
    window: Arc<winit::window::Window>,

    // CPU side of the current (uncommitted) frame.
    vertices: Vec<Vertex>,
    clear_color: Color,
    overflow_reported: bool,

    // Input gathered by the winit driver since the last poll.
    pressed: Vec<Key>,
    modifier_down: bool,
    close_requested: bool,
}

impl GpuPresentation {
    /// Initialize wgpu against `window` with a fixed offscreen resolution.
    ///
    /// Async because adapter/device selection is; the windowed driver calls
    /// it through `pollster::block_on`.
    pub async fn new(
        window: Arc<winit::window::Window>,
        offscreen_width: u32,
        offscreen_height: u32,
    ) -> Result<Self, anyhow::Error> {
        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow!("no suitable GPU adapter found"))?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("melos_presentation"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        // The retained frame: drawn into on redraw ticks, sampled by the
        // blit every tick.
        let offscreen = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("melos_offscreen"),
            size: wgpu::Extent3d {
                width: offscreen_width.max(1),
                height: offscreen_height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let offscreen_view = offscreen.create_view(&wgpu::TextureViewDescriptor::default());

        // Shape pipeline: colored quads in offscreen pixel space.
        let shape_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("melos_shape_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shape.wgsl").into()),
        });

        let projection = pixel_projection(offscreen_width as f32, offscreen_height as f32);
        let projection_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("melos_projection"),
            contents: bytemuck::cast_slice(&projection),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let projection_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("melos_projection_layout"),
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
        let projection_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("melos_projection_bind_group"),
            layout: &projection_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: projection_buffer.as_entire_binding(),
            }],
        });

        let shape_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("melos_shape_pipeline_layout"),
            bind_group_layouts: &[&projection_layout],
            push_constant_ranges: &[],
        });
        let shape_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("melos_shape_pipeline"),
            layout: Some(&shape_layout),
            vertex: wgpu::VertexState {
                module: &shape_shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shape_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: wgpu::TextureFormat::Rgba8UnormSrgb,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
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

        // Blit pipeline: fullscreen triangle sampling the offscreen frame.
        let blit_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("melos_blit_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("blit.wgsl").into()),
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("melos_blit_sampler"),
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let blit_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("melos_blit_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let blit_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("melos_blit_bind_group"),
            layout: &blit_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&offscreen_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });
        let blit_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("melos_blit_pipeline_layout"),
                bind_group_layouts: &[&blit_layout],
                push_constant_ranges: &[],
            });
        let blit_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("melos_blit_pipeline"),
            layout: Some(&blit_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &blit_shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &blit_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("melos_shape_vertices"),
            size: (MAX_VERTICES * std::mem::size_of::<Vertex>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        info!(
            offscreen_width,
            offscreen_height, "GPU presentation initialized"
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            shape_pipeline,
            blit_pipeline,
            blit_bind_group,
            vertex_buffer,
            projection_bind_group,
            offscreen_view,
            window,
            vertices: Vec::new(),
            clear_color: Color::BLANK,
            overflow_reported: false,
            pressed: Vec::new(),
            modifier_down: false,
            close_requested: false,
        })
    }

    pub fn window(&self) -> &winit::window::Window {
        &self.window
    }

    /// Reconfigure the surface for a new window size. The offscreen
    /// resolution is fixed; the blit stretches.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    // Input feed, called by the winit driver.

    pub(crate) fn push_key(&mut self, key: Key) {
        self.pressed.push(key);
    }

    pub(crate) fn set_modifier(&mut self, down: bool) {
        self.modifier_down = down;
    }

    pub(crate) fn push_close_request(&mut self) {
        self.close_requested = true;
    }

    fn push_quad(&mut self, rect: Rect, color: Color) {
        if self.vertices.len() + VERTICES_PER_QUAD > MAX_VERTICES {
            if !self.overflow_reported {
                warn!(max_quads = MAX_QUADS, "frame quad budget exceeded; dropping");
                self.overflow_reported = true;
            }
            return;
        }
        let (x0, y0) = (rect.x, rect.y);
        let (x1, y1) = (rect.x + rect.width, rect.y + rect.height);
        let c = color.to_array();
        for position in [
            [x0, y0],
            [x1, y0],
            [x1, y1],
            [x0, y0],
            [x1, y1],
            [x0, y1],
        ] {
            self.vertices.push(Vertex { position, color: c });
        }
    }
}

impl Canvas for GpuPresentation {
    fn clear(&mut self, color: Color) {
        self.vertices.clear();
        self.clear_color = color;
        self.overflow_reported = false;
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.push_quad(rect, color);
    }

    fn rect_lines(&mut self, rect: Rect, thickness: f32, color: Color) {
        let t = thickness;
        self.push_quad(Rect::new(rect.x, rect.y, rect.width, t), color);
        self.push_quad(
            Rect::new(rect.x, rect.y + rect.height - t, rect.width, t),
            color,
        );
        self.push_quad(Rect::new(rect.x, rect.y + t, t, rect.height - 2.0 * t), color);
        self.push_quad(
            Rect::new(rect.x + rect.width - t, rect.y + t, t, rect.height - 2.0 * t),
            color,
        );
    }

    fn line(&mut self, from: Vec2, to: Vec2, thickness: f32, color: Color) {
        let (dx, dy) = (to.x - from.x, to.y - from.y);
        let len = (dx * dx + dy * dy).sqrt();
        if len <= f32::EPSILON {
            return;
        }
        // Perpendicular offset of half the thickness on each side.
        let (nx, ny) = (-dy / len * thickness / 2.0, dx / len * thickness / 2.0);
        let c = color.to_array();
        let corners = [
            [from.x + nx, from.y + ny],
            [to.x + nx, to.y + ny],
            [to.x - nx, to.y - ny],
            [from.x - nx, from.y - ny],
        ];
        if self.vertices.len() + VERTICES_PER_QUAD > MAX_VERTICES {
            return;
        }
        for index in [0, 1, 2, 0, 2, 3] {
            self.vertices.push(Vertex {
                position: corners[index],
                color: c,
            });
        }
    }

    fn text(&mut self, text: &str, origin: Vec2, size: f32, color: Color) {
        let mut quads = Vec::new();
        text::layout(text, origin, size, &mut |rect| quads.push(rect));
        for rect in quads {
            self.push_quad(rect, color);
        }
    }
}

impl Presentation for GpuPresentation {
    fn poll_input(&mut self) -> FrameInput {
        FrameInput {
            pressed: std::mem::take(&mut self.pressed),
            modifier_down: self.modifier_down,
            close_requested: std::mem::take(&mut self.close_requested),
        }
    }

    fn canvas(&mut self) -> &mut dyn Canvas {
        self
    }

    fn commit_frame(&mut self) -> Result<(), RuntimeError> {
        if !self.vertices.is_empty() {
            self.queue
                .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&self.vertices));
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("melos_commit_encoder"),
            });
        {
            let clear = self.clear_color;
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("melos_offscreen_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.offscreen_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: f64::from(clear.r),
                            g: f64::from(clear.g),
                            b: f64::from(clear.b),
                            a: f64::from(clear.a),
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if !self.vertices.is_empty() {
                pass.set_pipeline(&self.shape_pipeline);
                pass.set_bind_group(0, &self.projection_bind_group, &[]);
                pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                pass.draw(0..self.vertices.len() as u32, 0..1);
            }
        }
        self.queue.submit(std::iter::once(encoder.finish()));

        debug!(quads = self.vertices.len() / VERTICES_PER_QUAD, "frame committed");
        self.vertices.clear();
        Ok(())
    }

    fn present(&mut self) -> Result<(), RuntimeError> {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("surface lost; reconfiguring");
                let size = self.window.inner_size();
                self.resize(size);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("surface acquire timed out; skipping frame");
                return Ok(());
            }
            Err(err @ wgpu::SurfaceError::OutOfMemory) => {
                return Err(RuntimeError::Presentation(err.into()));
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("melos_present_encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("melos_blit_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.blit_pipeline);
            pass.set_bind_group(0, &self.blit_bind_group, &[]);
            pass.draw(0..3, 0..1);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn apply_action(&mut self, action: KeyAction) {
        match action {
            KeyAction::ToggleFullscreen => {
                let next = match self.window.fullscreen() {
                    Some(_) => None,
                    None => Some(Fullscreen::Borderless(None)),
                };
                debug!(fullscreen = next.is_some(), "fullscreen toggled");
                self.window.set_fullscreen(next);
            }
            KeyAction::ToggleBorderless => {
                let decorated = self.window.is_decorated();
                debug!(decorated = !decorated, "decorations toggled");
                self.window.set_decorations(!decorated);
            }
            // The runtime consumes quit before routing here.
            KeyAction::ForceQuit => {}
        }
    }

    fn close(&mut self) {
        info!("GPU presentation closed");
    }
}
