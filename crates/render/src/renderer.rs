//! Frame orchestration: surface and device setup, clearing, draw
//! dispatch and presentation.
//!
//! A tick drives the renderer through `clear` → one `render` call per
//! shader program → `present`. `clear` acquires the swapchain texture
//! and wipes color and depth; each `render` records one pass that
//! loads the existing attachments, so successive calls layer in call
//! order (the background pass is issued after the scene pass and wins
//! only where the depth buffer is still empty). There is no automatic
//! depth-based sorting of drawables.

use std::sync::Arc;

use winit::window::Window;

use crate::camera::Camera;
use crate::error::RenderError;
use crate::mesh::GpuMesh;
use crate::shader::{LinkedProgram, UniformSlot};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

struct Frame {
    output: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    encoder: wgpu::CommandEncoder,
}

pub struct Renderer {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    clear_color: wgpu::Color,
    geo_color: Option<[f32; 4]>,
    frame: Option<Frame>,
}

impl Renderer {
    /// Initialise wgpu against the window. Every failure here means
    /// the host cannot provide the required graphics context, which
    /// is fatal at startup; there is no fallback rendering path.
    pub fn new(window: Arc<Window>) -> Result<Self, RenderError> {
        let instance = wgpu::Instance::default();
        let target = unsafe { wgpu::SurfaceTargetUnsafe::from_window(&*window) }
            .map_err(|e| unsupported(format!("window handle unavailable: {e}")))?;
        let surface = unsafe { instance.create_surface_unsafe(target) }
            .map_err(|e| unsupported(format!("surface creation failed: {e}")))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| unsupported("no compatible graphics adapter".into()))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Renderer Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
            },
            None,
        ))
        .map_err(|e| unsupported(format!("device request failed: {e}")))?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let format = *surface_caps
            .formats
            .first()
            .ok_or_else(|| unsupported("surface reports no formats".into()))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            desired_maximum_frame_latency: 2,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let depth_view = create_depth_view(&device, config.width, config.height);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            depth_view,
            clear_color: wgpu::Color::BLACK,
            geo_color: None,
            frame: None,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Resize the backing surface and depth buffer. Zero-sized frames
    /// (minimized window) are ignored.
    pub fn set_size(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, width, height);
    }

    pub fn set_clear_color(&mut self, r: f64, g: f64, b: f64, a: f64) {
        self.clear_color = wgpu::Color { r, g, b, a };
    }

    /// Store the flat geometry color override (byte RGBA). Forwarded
    /// at draw time to any program declaring the GeoColor slot, so
    /// the panel can recolor the scene without rebuilding meshes.
    pub fn set_geo_color(&mut self, r: u8, g: u8, b: u8, a: u8) {
        self.geo_color = Some([
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            f32::from(a) / 255.0,
        ]);
    }

    /// Begin the frame: acquire the swapchain texture and clear color
    /// and depth.
    pub fn clear(&mut self) -> Result<(), RenderError> {
        self.ensure_frame()?;
        let Self {
            frame,
            depth_view,
            clear_color,
            ..
        } = self;
        if let Some(frame) = frame.as_mut() {
            let _pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("clear pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(*clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }
        Ok(())
    }

    /// Draw `drawables` through `program` in list order: upload the
    /// camera matrices and staged uniforms, then one indexed draw per
    /// mesh using its draw mode.
    pub fn render(
        &mut self,
        camera: &Camera,
        program: &mut LinkedProgram,
        drawables: &[&GpuMesh],
    ) -> Result<(), RenderError> {
        self.ensure_frame()?;

        if let Some(color) = self.geo_color {
            if program.declares(UniformSlot::GeoColor) {
                program.set_geo_color(color);
            }
        }
        program.flush_uniforms(&self.queue, camera.view(), camera.projection());

        if !program.texture_ready() {
            return Ok(());
        }

        let Self {
            frame, depth_view, ..
        } = self;
        let Some(frame) = frame.as_mut() else {
            return Ok(());
        };

        let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(program.label()),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &frame.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        rpass.set_bind_group(0, program.uniform_bind_group(), &[]);
        if let Some(group) = program.texture_bind_group() {
            rpass.set_bind_group(1, group, &[]);
        }
        for mesh in drawables {
            rpass.set_pipeline(program.pipeline(mesh.mode()));
            rpass.set_vertex_buffer(0, mesh.vertex_buffer().slice(..));
            rpass.set_index_buffer(mesh.index_buffer().slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..mesh.index_count(), 0, 0..1);
        }

        Ok(())
    }

    /// Submit the recorded frame and present it. A no-op when nothing
    /// was recorded this tick.
    pub fn present(&mut self) -> Result<(), RenderError> {
        let Some(frame) = self.frame.take() else {
            return Ok(());
        };
        self.queue.submit(Some(frame.encoder.finish()));
        frame.output.present();
        Ok(())
    }

    fn ensure_frame(&mut self) -> Result<(), RenderError> {
        if self.frame.is_some() {
            return Ok(());
        }
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });
        self.frame = Some(Frame {
            output,
            view,
            encoder,
        });
        Ok(())
    }
}

fn unsupported(reason: String) -> RenderError {
    RenderError::UnsupportedContext { reason }
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
