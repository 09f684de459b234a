use anyhow::{Context, Result, anyhow};
use clap::Parser;
use egui::Context as EguiContext;
use fpview_assets::{AssetError, PngTextureLoader, TextureSet, load_batch};
use fpview_frame::{FrameController, Phase};
use fpview_input::{InputEvent, KeyMap};
use fpview_render_wgpu::WgpuRenderer;
use fpview_scene::SceneConfig;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

#[derive(Parser)]
#[command(name = "fpview-desktop", about = "First-person tile-grid viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene file (YAML); the built-in scene when omitted
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Directory texture paths are resolved against
    #[arg(long, default_value = "./assets")]
    assets: PathBuf,
}

/// Events posted back to the event loop from other threads.
enum AppEvent {
    TexturesLoaded(Result<TextureSet, AssetError>),
}

/// Viewer state independent of the GPU.
struct AppState {
    controller: FrameController,
    keymap: KeyMap,
    pointer_captured: bool,
    show_overlay: bool,
    last_frame: Instant,
}

impl AppState {
    fn new(controller: FrameController) -> Self {
        let keymap = controller.keymap();
        Self {
            controller,
            keymap,
            pointer_captured: false,
            show_overlay: false,
            last_frame: Instant::now(),
        }
    }

    fn update(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32().min(0.1);
        self.last_frame = now;
        self.controller.handle(InputEvent::Tick {
            elapsed_ms: dt * 1000.0,
        });
    }

    fn handle_key(&mut self, code: KeyCode, pressed: bool) {
        let raw = format!("{code:?}");
        if let Some(event) = InputEvent::from_code(&self.keymap, &raw, pressed) {
            self.controller.handle(event);
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        let loading = self.controller.phase() == Phase::Loading;
        if !self.show_overlay && !loading {
            return;
        }

        egui::Window::new("fpview")
            .default_pos([12.0, 12.0])
            .resizable(false)
            .show(ctx, |ui| {
                match self.controller.phase() {
                    Phase::Loading => {
                        ui.label("Loading textures...");
                    }
                    Phase::Ready => {
                        ui.label(format!(
                            "Objects: {}",
                            self.controller.catalog().map_or(0, |c| c.len())
                        ));
                    }
                }
                if let Some(error) = self.controller.load_error() {
                    ui.colored_label(egui::Color32::LIGHT_RED, error.to_string());
                }

                let pose = self.controller.pose();
                ui.separator();
                ui.label(format!(
                    "Position: ({:.2}, {:.2})",
                    pose.position.x, pose.position.y
                ));
                ui.label(format!("Facing: {:.1} deg", pose.facing.to_degrees()));
                ui.label(format!("Ticks: {}", self.controller.ticks()));
                ui.separator();
                ui.small("Click: capture mouse | Esc: release | F1: overlay | WASD/arrows: move");
            });
    }
}

struct GpuApp {
    state: AppState,
    assets: PathBuf,
    proxy: EventLoopProxy<AppEvent>,
    load_started: bool,
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    device: Option<wgpu::Device>,
    queue: Option<wgpu::Queue>,
    config: Option<wgpu::SurfaceConfiguration>,
    renderer: Option<WgpuRenderer>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
}

impl GpuApp {
    fn new(controller: FrameController, assets: PathBuf, proxy: EventLoopProxy<AppEvent>) -> Self {
        Self {
            state: AppState::new(controller),
            assets,
            proxy,
            load_started: false,
            window: None,
            surface: None,
            device: None,
            queue: None,
            config: None,
            renderer: None,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
        }
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("fpview")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
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
        .ok_or_else(|| anyhow!("no suitable GPU adapter"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("fpview_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow!("surface reports no formats"))?;

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
        self.state.controller.resize(config.width, config.height);

        let mut renderer = WgpuRenderer::new(&device, surface_format, config.width, config.height);
        if let Some(textures) = self.state.controller.textures() {
            renderer.upload_textures(&device, &queue, textures);
        }

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        self.window = Some(window);
        self.surface = Some(surface);
        self.device = Some(device);
        self.queue = Some(queue);
        self.config = Some(config);
        self.renderer = Some(renderer);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);
        Ok(())
    }

    /// Decode textures off the event loop; the result comes back as a user event.
    fn start_texture_load(&mut self) {
        if self.load_started {
            return;
        }
        self.load_started = true;

        let requests = self.state.controller.texture_requests();
        let loader = PngTextureLoader::new(self.assets.clone());
        let proxy = self.proxy.clone();
        tracing::info!(count = requests.len(), root = %self.assets.display(), "loading textures");

        std::thread::spawn(move || {
            let result = load_batch(&loader, &requests);
            if proxy.send_event(AppEvent::TexturesLoaded(result)).is_err() {
                tracing::warn!("event loop closed before textures finished loading");
            }
        });
    }

    fn set_pointer_captured(&mut self, captured: bool) {
        let Some(window) = &self.window else {
            return;
        };
        if captured {
            let grabbed = window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
            if let Err(e) = grabbed {
                tracing::warn!("pointer capture unavailable: {e}");
                return;
            }
        } else if let Err(e) = window.set_cursor_grab(CursorGrabMode::None) {
            tracing::warn!("pointer release failed: {e}");
        }
        window.set_cursor_visible(!captured);
        self.state.pointer_captured = captured;
        tracing::debug!(captured, "pointer capture changed");
    }

    fn redraw(&mut self) {
        self.state.update();

        let (Some(window), Some(surface), Some(device), Some(queue), Some(config)) = (
            &self.window,
            &self.surface,
            &self.device,
            &self.queue,
            &self.config,
        ) else {
            return;
        };

        let output = match surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                surface.configure(device, config);
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

        if let Some(renderer) = &self.renderer {
            renderer.render(device, queue, &view, &self.state.controller.draw_calls());
        }

        if let (Some(egui_winit), Some(egui_renderer)) =
            (self.egui_winit.as_mut(), self.egui_renderer.as_mut())
        {
            let raw_input = egui_winit.take_egui_input(window);
            let full_output = self.egui_ctx.run(raw_input, |ctx| {
                self.state.draw_ui(ctx);
            });
            egui_winit.handle_platform_output(window, full_output.platform_output);

            let paint_jobs = self
                .egui_ctx
                .tessellate(full_output.shapes, full_output.pixels_per_point);
            let screen_descriptor = egui_wgpu::ScreenDescriptor {
                size_in_pixels: [config.width, config.height],
                pixels_per_point: full_output.pixels_per_point,
            };

            for (id, image_delta) in &full_output.textures_delta.set {
                egui_renderer.update_texture(device, queue, *id, image_delta);
            }
            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
            egui_renderer.update_buffers(device, queue, &mut encoder, &paint_jobs, &screen_descriptor);
            {
                let mut pass = encoder
                    .begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("egui_pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view: &view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Load,
                                store: wgpu::StoreOp::Store,
                            },
                        })],
                        depth_stencil_attachment: None,
                        ..Default::default()
                    })
                    .forget_lifetime();
                egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
            }
            queue.submit(std::iter::once(encoder.finish()));
            for id in &full_output.textures_delta.free {
                egui_renderer.free_texture(id);
            }
        }

        output.present();
        window.request_redraw();
    }
}

impl ApplicationHandler<AppEvent> for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_gpu(event_loop) {
            tracing::error!("failed to initialize graphics: {e:#}");
            event_loop.exit();
            return;
        }
        self.start_texture_load();
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: AppEvent) {
        match event {
            AppEvent::TexturesLoaded(result) => {
                self.state.controller.on_textures(result);
                if let (Some(textures), Some(renderer), Some(device), Some(queue)) = (
                    self.state.controller.textures(),
                    self.renderer.as_mut(),
                    &self.device,
                    &self.queue,
                ) {
                    if !renderer.has_textures() {
                        renderer.upload_textures(device, queue, textures);
                    }
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(egui_winit), Some(window)) = (&mut self.egui_winit, &self.window) {
            let response = egui_winit.on_window_event(window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let (Some(surface), Some(device), Some(config)) =
                    (&self.surface, &self.device, &mut self.config)
                {
                    config.width = new_size.width.max(1);
                    config.height = new_size.height.max(1);
                    surface.configure(device, config);
                    self.state.controller.resize(config.width, config.height);
                    if let Some(renderer) = &mut self.renderer {
                        renderer.resize(device, config.width, config.height);
                    }
                }
            }
            WindowEvent::Focused(false) => {
                self.state.controller.release_all();
                self.set_pointer_captured(false);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: key_state,
                        repeat,
                        ..
                    },
                ..
            } => {
                let pressed = key_state == ElementState::Pressed;
                match code {
                    KeyCode::Escape if pressed => self.set_pointer_captured(false),
                    KeyCode::F1 if pressed && !repeat => {
                        self.state.show_overlay = !self.state.show_overlay;
                    }
                    _ if !repeat => self.state.handle_key(code, pressed),
                    _ => {}
                }
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: ElementState::Pressed,
                ..
            } => {
                if !self.state.pointer_captured {
                    self.set_pointer_captured(true);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
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
            if self.state.pointer_captured {
                self.state.controller.handle(InputEvent::MouseMove {
                    dx: delta.0 as f32,
                });
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("fpview-desktop starting");

    let scene = match &cli.scene {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::builtin()?,
    };
    let controller = FrameController::new(scene, 1280, 720)?;

    let event_loop = EventLoop::<AppEvent>::with_user_event().build()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(controller, cli.assets, event_loop.create_proxy());
    event_loop.run_app(&mut app)?;

    Ok(())
}
