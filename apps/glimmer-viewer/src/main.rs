use anyhow::{Context, Result};
use clap::Parser;
use glimmer_assets::{FileImageDecoder, FileImporter, Model};
use glimmer_gpu::{GpuDevice, TextureKind};
use gilrs::{Axis, Gilrs};
use glimmer_input::{GamepadAxes, InputState, Key};
use glimmer_render::{Driver, FrameOutcome, ViewerConfig};
use glimmer_render_wgpu::{PhongProgram, WgpuDevice, WgpuRenderer};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

#[derive(Parser)]
#[command(name = "glimmer-viewer", about = "Free-look viewer for OBJ and glTF models")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Model file to load (.obj, .gltf, .glb). Without it a textured cube is shown.
    #[arg(long)]
    model: Option<PathBuf>,

    /// Diffuse map for the cube
    #[arg(long)]
    diffuse: Option<PathBuf>,

    /// Specular map for the cube
    #[arg(long)]
    specular: Option<PathBuf>,

    /// JSON viewer configuration
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Pixels of touchpad scroll treated as one wheel line.
const PIXELS_PER_LINE: f64 = 20.0;

fn map_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::KeyW => Some(Key::W),
        KeyCode::KeyA => Some(Key::A),
        KeyCode::KeyS => Some(Key::S),
        KeyCode::KeyD => Some(Key::D),
        KeyCode::KeyE => Some(Key::E),
        KeyCode::Escape => Some(Key::Escape),
        _ => None,
    }
}

/// Sticks of the first connected gamepad, or rest when none is.
fn poll_gamepad(gilrs: &mut Gilrs) -> GamepadAxes {
    // Drain events so gilrs updates its cached axis state.
    while gilrs.next_event().is_some() {}
    gilrs
        .gamepads()
        .find(|(_, pad)| pad.is_connected())
        .map(|(_, pad)| GamepadAxes {
            left_x: pad.value(Axis::LeftStickX),
            left_y: pad.value(Axis::LeftStickY),
            right_x: pad.value(Axis::RightStickX),
            right_y: pad.value(Axis::RightStickY),
        })
        .unwrap_or_default()
}

/// Everything that exists only while the window does.
struct Gpu {
    // Models drop before the device they release into.
    models: Vec<Model>,
    program: PhongProgram,
    renderer: WgpuRenderer,
    device: Rc<WgpuDevice>,
    config: wgpu::SurfaceConfiguration,
    surface: wgpu::Surface<'static>,
    window: Arc<Window>,
}

struct ViewerApp {
    cli: Cli,
    settings: ViewerConfig,
    driver: Driver,
    input: InputState,
    gilrs: Option<Gilrs>,
    started: Instant,
    gpu: Option<Gpu>,
    fatal: Option<anyhow::Error>,
}

impl ViewerApp {
    fn new(cli: Cli, settings: ViewerConfig) -> Self {
        Self {
            driver: Driver::new(&settings),
            cli,
            settings,
            input: InputState::new(),
            gilrs: match Gilrs::new() {
                Ok(gilrs) => Some(gilrs),
                Err(err) => {
                    tracing::warn!("gamepad input unavailable: {err}");
                    None
                }
            },
            started: Instant::now(),
            gpu: None,
            fatal: None,
        }
    }

    fn init_gpu(&self, event_loop: &ActiveEventLoop) -> Result<Gpu> {
        let attrs = Window::default_attributes()
            .with_title(self.settings.window.title.clone())
            .with_inner_size(PhysicalSize::new(
                self.settings.window.width,
                self.settings.window.height,
            ));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;

        let required_features = adapter.features() & wgpu::Features::POLYGON_MODE_LINE;
        if required_features.is_empty() {
            tracing::warn!("adapter lacks POLYGON_MODE_LINE; wireframe (E) will draw filled");
        }
        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("glimmer_device"),
                required_features,
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("failed to create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
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

        let device = Rc::new(WgpuDevice::new(device, queue));
        let renderer = WgpuRenderer::new(&device, surface_format, config.width, config.height);
        let program = PhongProgram::new(&device);
        let models = vec![self.load_model(&device)];

        if let Err(err) = window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
        {
            tracing::warn!("cursor grab unavailable: {err}");
        }
        window.set_cursor_visible(false);

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            format = ?surface_format,
            "GPU initialized"
        );

        Ok(Gpu {
            models,
            program,
            renderer,
            device,
            config,
            surface,
            window,
        })
    }

    fn load_model(&self, device: &Rc<WgpuDevice>) -> Model {
        let shared: Rc<dyn GpuDevice> = device.clone();
        let decoder = FileImageDecoder::default();
        let model = match &self.cli.model {
            Some(path) => Model::load(&shared, path, &FileImporter, &decoder),
            None => {
                let textures: Vec<_> = [
                    (TextureKind::Diffuse, &self.cli.diffuse),
                    (TextureKind::Specular, &self.cli.specular),
                ]
                .into_iter()
                .filter_map(|(kind, path)| path.clone().map(|path| (kind, path)))
                .collect();
                Model::cube(&shared, &textures, &decoder)
            }
        };
        if model.is_empty() {
            tracing::warn!("nothing to draw; showing an empty scene");
        }
        model
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.driver.set_viewport(size.width, size.height);
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        gpu.config.width = size.width.max(1);
        gpu.config.height = size.height.max(1);
        gpu.surface.configure(gpu.device.device(), &gpu.config);
        gpu.renderer
            .resize(gpu.device.device(), gpu.config.width, gpu.config.height);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(gpu.device.device(), &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        if let Some(gilrs) = self.gilrs.as_mut() {
            self.input.set_gamepad(poll_gamepad(gilrs));
        }
        let now = self.started.elapsed().as_secs_f64();
        let actions = self.input.drain_actions();
        let outcome = self.driver.frame(
            now,
            &actions,
            gpu.device.as_ref(),
            &mut gpu.program,
            &gpu.models,
        );
        match outcome {
            FrameOutcome::Exit => {
                event_loop.exit();
                return;
            }
            FrameOutcome::Continue(stats) => tracing::trace!(%stats, "frame"),
        }

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        gpu.renderer.present(&gpu.device, &view);
        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match self.init_gpu(event_loop) {
            Ok(gpu) => {
                self.driver.set_viewport(gpu.config.width, gpu.config.height);
                self.gpu = Some(gpu);
            }
            Err(err) => {
                tracing::error!("startup failed: {err:#}");
                self.fatal = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.input.request_close(),
            WindowEvent::Resized(new_size) => self.resize(new_size),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                if let Some(key) = map_key(code) {
                    self.input.key(key, state == ElementState::Pressed);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(position) => (position.y / PIXELS_PER_LINE) as f32,
                };
                self.input.scrolled(lines);
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.input.pointer_moved(delta.0 as f32, delta.1 as f32);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let settings = match &cli.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    tracing::info!("glimmer-viewer starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp::new(cli, settings);
    event_loop.run_app(&mut app)?;

    match app.fatal.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_and_toggle_keys_map() {
        assert_eq!(map_key(KeyCode::KeyW), Some(Key::W));
        assert_eq!(map_key(KeyCode::KeyE), Some(Key::E));
        assert_eq!(map_key(KeyCode::Escape), Some(Key::Escape));
        assert_eq!(map_key(KeyCode::KeyQ), None);
    }
}
