use anyhow::{Context, Result};
use clap::Parser;
use orbitview_camera::{ButtonMask, OrbitCamera};
use orbitview_render::{Clock, FrameDriver, Projection, SystemClock};
use orbitview_render_wgpu::{GpuFrame, MeshRenderer};
use orbitview_scene::{InstanceMesh, quads_to_triangles, unit_cube};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "orbitview-desktop", about = "Interactive orbit mesh viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Start with instance geometry in wireframe
    #[arg(long)]
    wireframe: bool,
}

/// Everything that only exists once the GPU surface is up.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: MeshRenderer,
}

struct ViewerApp {
    driver: FrameDriver,
    buttons: ButtonMask,
    clock: SystemClock,
    gpu: Option<Gpu>,
}

impl ViewerApp {
    fn new(cli: &Cli) -> Self {
        let mut driver = FrameDriver::new(OrbitCamera::default(), Projection::default());
        driver.wireframe = cli.wireframe;
        Self {
            driver,
            buttons: ButtonMask::NONE,
            clock: SystemClock::new(),
            gpu: None,
        }
    }

    /// Brings up surface, device and renderer. Any failure here is
    /// fatal: the viewer shuts down instead of rendering degraded.
    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<Gpu> {
        let attrs = Window::default_attributes()
            .with_title("orbitview")
            .with_inner_size(PhysicalSize::new(960u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no capable graphics adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("orbitview_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        // surface size is read once here and fixes the viewport
        let size = window.inner_size();
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
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        self.driver
            .set_aspect(config.width as f32 / config.height.max(1) as f32);

        let mut renderer = MeshRenderer::new(&device, surface_format, config.width, config.height)
            .context("shader compilation failed")?;
        renderer.add_scenery(&device, &unit_cube());
        renderer.add_instance(&device, &demo_plate(9));

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            width = config.width,
            height = config.height,
            "GPU initialized"
        );

        Ok(Gpu {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
        })
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, key: KeyCode) {
        match key {
            KeyCode::Space => self.driver.camera.reset(),
            KeyCode::KeyW => self.driver.wireframe = !self.driver.wireframe,
            KeyCode::KeyA => self.driver.effect_anim = self.driver.effect_anim.cycle(),
            KeyCode::Escape => event_loop.exit(),
            _ => {}
        }
    }

    fn redraw(&mut self) {
        let Some(gpu) = &self.gpu else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let now_ms = self.clock.now_ms();
        let mut sink = GpuFrame {
            renderer: &gpu.renderer,
            device: &gpu.device,
            queue: &gpu.queue,
            view: &view,
        };
        self.driver.tick(now_ms, &mut sink);

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
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => {
                tracing::error!("initialization failed: {e:#}");
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
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(new_size) => {
                // viewport semantics are fixed at startup; this only keeps
                // the swapchain and depth target valid
                if let Some(gpu) = &mut self.gpu {
                    gpu.config.width = new_size.width.max(1);
                    gpu.config.height = new_size.height.max(1);
                    gpu.surface.configure(&gpu.device, &gpu.config);
                    gpu.renderer
                        .resize(&gpu.device, gpu.config.width, gpu.config.height);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => self.handle_key(event_loop, key),
            WindowEvent::MouseInput { button, state, .. } => {
                let bit = match button {
                    MouseButton::Left => ButtonMask::ROTATE,
                    MouseButton::Right => ButtonMask::PAN,
                    _ => return,
                };
                self.buttons = if state == ElementState::Pressed {
                    self.buttons.with(bit)
                } else {
                    self.buttons.without(bit)
                };
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 20.0,
                };
                self.driver.camera.wheel_scrolled(delta_y);
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: winit::event::DeviceEvent,
    ) {
        if let winit::event::DeviceEvent::MouseMotion { delta } = event {
            self.driver
                .camera
                .pointer_moved(delta.0 as f32, delta.1 as f32, self.buttons);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

/// Demo instance geometry: an n x n plate whose effect channel pushes
/// the nodes radially outward.
fn demo_plate(n: usize) -> InstanceMesh {
    let mut vertices = Vec::with_capacity(n * n * 3);
    let mut effects = Vec::with_capacity(n * n * 2);
    for j in 0..n {
        for i in 0..n {
            let x = i as f32 / (n - 1) as f32 - 0.5;
            let y = j as f32 / (n - 1) as f32 - 0.5;
            vertices.extend_from_slice(&[x * 2.0, y * 2.0, 0.9]);
            effects.extend_from_slice(&[x * 0.4, y * 0.4]);
        }
    }

    let mut quads = Vec::new();
    for j in 0..n - 1 {
        for i in 0..n - 1 {
            let a = (j * n + i) as u32;
            quads.extend_from_slice(&[a, a + 1, a + 1 + n as u32, a + n as u32]);
        }
    }

    let mut line_indices = Vec::with_capacity(quads.len() * 2);
    for quad in quads.chunks_exact(4) {
        for k in 0..4 {
            line_indices.push(quad[k]);
            line_indices.push(quad[(k + 1) % 4]);
        }
    }

    InstanceMesh::new(vertices, effects, quads_to_triangles(&quads), line_indices)
        .expect("demo plate is well-formed")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("orbitview-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp::new(&cli);
    event_loop.run_app(&mut app)?;

    Ok(())
}
