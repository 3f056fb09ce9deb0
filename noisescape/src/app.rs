//! Application loop: composes the camera, shader programs, renderer
//! and control state into the per-tick flow
//! `camera.update` → control diff → uniform pushes → draw calls.
//!
//! The scene is an FBM-shaded icosphere in front of a full-screen
//! animated background. The icosphere is drawn first with the
//! `primary` program; the background quad is issued in a second
//! render call with its own program, painted only where the depth
//! buffer is still empty. Key bindings stand in for the control
//! panel:
//!
//! - `0`..`8`   tessellation level
//! - `←`/`→`    noise frequency
//! - `↓`/`↑`    noise intensity
//! - `C`        cycle the geometry color
//! - `R`        reload the scene geometry
//! - `L`        wireframe on/off
//! - `B`        swap the sphere for the cube

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec3;
use notify::RecommendedWatcher;
use tracing::{error, info, warn};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::EventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowBuilder};

use geometry::{cube, icosphere, square};
use render::{
    Camera, CompiledProgram, GpuMesh, LinkedProgram, ProgramDesc, RenderError, Renderer,
    ShaderStage, Texture, UniformSlot,
};

use crate::controls::ControlPanel;
use crate::shaders;
use crate::texload::{self, DecodedImage};
use crate::watcher;

const FPS_LOG_INTERVAL: u32 = 120;

#[derive(Parser, Debug)]
#[command(name = "noisescape", about = "Procedural noise-shaded scene viewer")]
pub struct Options {
    /// Initial window width in pixels.
    #[arg(long, default_value_t = 900)]
    pub width: u32,

    /// Initial window height in pixels.
    #[arg(long, default_value_t = 600)]
    pub height: u32,

    /// Initial icosphere tessellation level.
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(0..=8))]
    pub tessellation: u32,

    /// Rebuild geometry only on an explicit scene reload instead of
    /// live on every tessellation change.
    #[arg(long)]
    pub no_live_retess: bool,

    /// Surface texture sampled by the primary program.
    #[arg(long, default_value = "textures/surface.png")]
    pub texture: PathBuf,

    /// Watch the shader directory and hot-reload WGSL sources.
    #[arg(long)]
    pub watch_shaders: bool,

    /// Compile the shader pairs and generate the scene geometry
    /// without opening a window, then exit.
    #[arg(long)]
    pub headless_check: bool,
}

pub fn run(options: Options) -> Result<()> {
    tracing_subscriber::fmt::init();

    if options.headless_check {
        return headless_check(&options);
    }

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("noisescape")
            .with_inner_size(PhysicalSize::new(options.width, options.height))
            .build(&event_loop)
            .context("failed to create window")?,
    );

    let mut state = State::new(window, &options)?;

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent {
            ref event,
            window_id,
        } if window_id == state.window().id() => {
            if !state.input(event) {
                match event {
                    WindowEvent::CloseRequested => elwt.exit(),
                    WindowEvent::Resized(size) => state.resize(*size),
                    WindowEvent::RedrawRequested => match state.tick() {
                        Ok(()) => {}
                        Err(e) if e.surface_needs_reconfigure() => {
                            let size = state.window().inner_size();
                            state.resize(size);
                        }
                        Err(e) if e.surface_out_of_memory() => {
                            error!("surface out of memory, exiting");
                            elwt.exit();
                        }
                        Err(e) => error!("frame error: {e}"),
                    },
                    _ => {}
                }
            }
        }
        Event::AboutToWait => state.window().request_redraw(),
        _ => {}
    })?;
    Ok(())
}

/// Exercise the startup path without a window: shader compilation
/// plus geometry generation. Used by CI and `--headless-check`.
fn headless_check(options: &Options) -> Result<()> {
    compile_primary(shaders::PRIMARY_VERTEX, shaders::PRIMARY_FRAGMENT)?;
    compile_background(shaders::BACKGROUND_VERTEX, shaders::BACKGROUND_FRAGMENT)?;
    let sphere = icosphere::generate(Vec3::ZERO, 1.0, options.tessellation);
    info!(
        tessellation = options.tessellation,
        vertices = sphere.vertices.len(),
        triangles = sphere.indices.len() / 3,
        "headless check passed"
    );
    Ok(())
}

fn compile_primary(vert: &str, frag: &str) -> Result<CompiledProgram, RenderError> {
    CompiledProgram::compile(
        ProgramDesc {
            label: "primary".into(),
            slots: vec![
                UniformSlot::Time,
                UniformSlot::Resolution,
                UniformSlot::Frequency,
                UniformSlot::Intensity,
                UniformSlot::GeoColor,
            ],
            samples_texture: true,
            depth_write: true,
        },
        &[ShaderStage::vertex(vert), ShaderStage::fragment(frag)],
    )
}

fn compile_background(vert: &str, frag: &str) -> Result<CompiledProgram, RenderError> {
    CompiledProgram::compile(
        ProgramDesc {
            label: "background".into(),
            slots: vec![UniformSlot::Time, UniformSlot::Resolution],
            samples_texture: false,
            depth_write: false,
        },
        &[ShaderStage::vertex(vert), ShaderStage::fragment(frag)],
    )
}

struct SceneMeshes {
    sphere: GpuMesh,
    sphere_wire: GpuMesh,
    cube: GpuMesh,
    quad: GpuMesh,
}

impl SceneMeshes {
    fn build(renderer: &Renderer, tessellation: u32) -> Self {
        let sphere_mesh = icosphere::generate(Vec3::ZERO, 1.0, tessellation);
        let sphere = GpuMesh::upload(renderer.device(), "icosphere", &sphere_mesh);
        let sphere_wire = GpuMesh::upload(renderer.device(), "icosphere wire", &sphere_mesh.edges());
        let cube = GpuMesh::upload(renderer.device(), "cube", &cube::generate(Vec3::ZERO));
        let quad = GpuMesh::upload(
            renderer.device(),
            "background quad",
            &square::generate(Vec3::ZERO),
        );
        Self {
            sphere,
            sphere_wire,
            cube,
            quad,
        }
    }
}

struct State {
    renderer: Renderer,
    camera: Camera,
    primary: LinkedProgram,
    background: LinkedProgram,
    controls: ControlPanel,
    meshes: SceneMeshes,
    texture: Texture,
    texture_rx: Option<Receiver<DecodedImage>>,
    shaders_changed: Arc<AtomicBool>,
    shader_dir: Option<PathBuf>,
    _watcher: Option<RecommendedWatcher>,
    live_retess: bool,
    wireframe: bool,
    show_cube: bool,
    time: f32,
    frames_since_log: u32,
    last_log: Instant,
}

impl State {
    fn new(window: Arc<Window>, options: &Options) -> Result<Self> {
        let mut renderer = Renderer::new(window)?;
        renderer.set_clear_color(0.2, 0.2, 0.2, 1.0);

        let (width, height) = renderer.size();
        let camera = Camera::new(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::ZERO,
            width as f32 / height as f32,
        );

        let mut primary = compile_primary(shaders::PRIMARY_VERTEX, shaders::PRIMARY_FRAGMENT)?
            .link(renderer.device(), renderer.surface_format())?;
        let background =
            compile_background(shaders::BACKGROUND_VERTEX, shaders::BACKGROUND_FRAGMENT)?
                .link(renderer.device(), renderer.surface_format())?;

        let texture = Texture::placeholder(renderer.device(), renderer.queue());
        primary.bind_texture(renderer.device(), &texture);
        let texture_rx = Some(texload::spawn(options.texture.clone()));

        let meshes = SceneMeshes::build(&renderer, options.tessellation);
        let controls = ControlPanel::new(options.tessellation);

        let shaders_changed = Arc::new(AtomicBool::new(false));
        let shader_dir = find_shader_dir();
        let _watcher = if options.watch_shaders {
            match &shader_dir {
                Some(dir) => match watcher::start(dir, shaders_changed.clone()) {
                    Ok(w) => Some(w),
                    Err(e) => {
                        warn!("shader watcher disabled: {e}");
                        None
                    }
                },
                None => {
                    warn!("shader watcher disabled: no shader directory found");
                    None
                }
            }
        } else {
            None
        };

        Ok(Self {
            renderer,
            camera,
            primary,
            background,
            controls,
            meshes,
            texture,
            texture_rx,
            shaders_changed,
            shader_dir,
            _watcher,
            live_retess: !options.no_live_retess,
            wireframe: false,
            show_cube: false,
            time: 0.0,
            frames_since_log: 0,
            last_log: Instant::now(),
        })
    }

    fn window(&self) -> &Window {
        self.renderer.window()
    }

    /// Resize protocol: surface first, then the camera's aspect ratio
    /// and projection, so the next tick draws with a consistent state.
    fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.renderer.set_size(size.width, size.height);
        self.camera
            .set_aspect_ratio(size.width as f32 / size.height as f32);
        self.camera.update_projection_matrix();
    }

    /// Keyboard stand-in for the control panel. Returns true when the
    /// event was consumed.
    fn input(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => self.handle_key(*code),
            _ => false,
        }
    }

    fn handle_key(&mut self, code: KeyCode) -> bool {
        if let Some(level) = digit_level(code) {
            self.controls.set_tessellation(level);
            return true;
        }
        match code {
            KeyCode::ArrowUp => self.controls.adjust_intensity(0.2),
            KeyCode::ArrowDown => self.controls.adjust_intensity(-0.2),
            KeyCode::ArrowRight => self.controls.adjust_frequency(1.0),
            KeyCode::ArrowLeft => self.controls.adjust_frequency(-1.0),
            KeyCode::KeyC => self.controls.cycle_color(),
            KeyCode::KeyR => self.controls.request_load_scene(),
            KeyCode::KeyL => self.wireframe = !self.wireframe,
            KeyCode::KeyB => self.show_cube = !self.show_cube,
            _ => return false,
        }
        true
    }

    fn tick(&mut self) -> Result<(), RenderError> {
        self.camera.update();
        self.drain_texture();
        if self.shaders_changed.swap(false, Ordering::Relaxed) {
            self.reload_shaders();
        }

        let snap = self.controls.snapshot();
        if snap.load_scene || (snap.tessellation_changed && self.live_retess) {
            info!(tessellation = snap.tessellation, "rebuilding scene geometry");
            self.meshes = SceneMeshes::build(&self.renderer, snap.tessellation);
        }
        if snap.color_changed {
            let [r, g, b, a] = snap.color;
            self.renderer.set_geo_color(r, g, b, a);
        }
        if snap.frequency_changed {
            self.primary.set_frequency(snap.frequency);
        }
        if snap.intensity_changed {
            self.primary.set_intensity(snap.intensity);
        }

        self.time += 1.0;
        let (width, height) = self.renderer.size();
        self.primary.set_time(self.time);
        self.primary.set_resolution(width as f32, height as f32);
        self.background.set_time(self.time);
        self.background.set_resolution(width as f32, height as f32);

        self.renderer.clear()?;
        let scene = if self.wireframe {
            &self.meshes.sphere_wire
        } else if self.show_cube {
            &self.meshes.cube
        } else {
            &self.meshes.sphere
        };
        self.renderer.render(&self.camera, &mut self.primary, &[scene])?;
        self.renderer
            .render(&self.camera, &mut self.background, &[&self.meshes.quad])?;
        self.renderer.present()?;

        self.frames_since_log += 1;
        if self.frames_since_log == FPS_LOG_INTERVAL {
            let elapsed = self.last_log.elapsed().as_secs_f32();
            info!("render loop at {:.1} fps", FPS_LOG_INTERVAL as f32 / elapsed);
            self.frames_since_log = 0;
            self.last_log = Instant::now();
        }
        Ok(())
    }

    /// Swap decoded pixels into the texture handle once the decode
    /// thread delivers them, then rebind on the sampling program.
    fn drain_texture(&mut self) {
        match self.texture_rx.as_ref().map(|rx| rx.try_recv()) {
            Some(Ok(img)) => {
                self.texture.write_pixels(
                    self.renderer.device(),
                    self.renderer.queue(),
                    img.width,
                    img.height,
                    &img.pixels,
                );
                self.primary.bind_texture(self.renderer.device(), &self.texture);
                self.texture_rx = None;
            }
            Some(Err(TryRecvError::Disconnected)) => self.texture_rx = None,
            _ => {}
        }
    }

    /// Recompile both programs from the on-disk sources. Failures
    /// keep the previous programs bound.
    fn reload_shaders(&mut self) {
        let Some(dir) = self.shader_dir.clone() else {
            return;
        };
        match self.try_reload(&dir) {
            Ok(()) => info!("shader programs reloaded"),
            Err(e) => error!("shader reload failed, keeping previous programs: {e:#}"),
        }
    }

    fn try_reload(&mut self, dir: &Path) -> Result<()> {
        let read = |name: &str| {
            std::fs::read_to_string(dir.join(name))
                .with_context(|| format!("failed to read {name}"))
        };
        let primary = compile_primary(
            &read(shaders::PRIMARY_VERTEX_FILE)?,
            &read(shaders::PRIMARY_FRAGMENT_FILE)?,
        )?
        .link(self.renderer.device(), self.renderer.surface_format())?;
        let background = compile_background(
            &read(shaders::BACKGROUND_VERTEX_FILE)?,
            &read(shaders::BACKGROUND_FRAGMENT_FILE)?,
        )?
        .link(self.renderer.device(), self.renderer.surface_format())?;

        self.primary = primary;
        self.background = background;
        self.primary.bind_texture(self.renderer.device(), &self.texture);
        // Fresh programs start from default uniforms; re-push the
        // current control values (time/resolution follow every tick,
        // the geometry color is re-forwarded by the renderer).
        self.primary.set_frequency(self.controls.frequency());
        self.primary.set_intensity(self.controls.intensity());
        Ok(())
    }
}

fn digit_level(code: KeyCode) -> Option<u32> {
    match code {
        KeyCode::Digit0 => Some(0),
        KeyCode::Digit1 => Some(1),
        KeyCode::Digit2 => Some(2),
        KeyCode::Digit3 => Some(3),
        KeyCode::Digit4 => Some(4),
        KeyCode::Digit5 => Some(5),
        KeyCode::Digit6 => Some(6),
        KeyCode::Digit7 => Some(7),
        KeyCode::Digit8 => Some(8),
        _ => None,
    }
}

/// The shader directory depends on where the binary was launched
/// from: the workspace root (`cargo run`) or the crate directory.
fn find_shader_dir() -> Option<PathBuf> {
    ["noisescape/shaders", "shaders"]
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Options::command().debug_assert();
    }

    #[test]
    fn cli_defaults() {
        let options = Options::parse_from(["noisescape"]);
        assert_eq!(options.width, 900);
        assert_eq!(options.height, 600);
        assert_eq!(options.tessellation, 5);
        assert!(!options.no_live_retess);
        assert!(!options.watch_shaders);
        assert!(!options.headless_check);
    }

    #[test]
    fn cli_rejects_out_of_range_tessellation() {
        assert!(Options::try_parse_from(["noisescape", "--tessellation", "9"]).is_err());
        assert!(Options::try_parse_from(["noisescape", "--tessellation", "8"]).is_ok());
    }

    #[test]
    fn digit_keys_map_to_levels() {
        assert_eq!(digit_level(KeyCode::Digit0), Some(0));
        assert_eq!(digit_level(KeyCode::Digit8), Some(8));
        assert_eq!(digit_level(KeyCode::KeyC), None);
    }
}
