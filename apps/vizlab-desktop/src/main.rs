use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use vizlab_common::Color;
use vizlab_demos::{Demo, DemoOptions, demo_names, launch};
use vizlab_panel::{Control, ControlPanel};
use vizlab_render::SceneInspector;
use vizlab_render_wgpu::{OrbitCamera, WgpuRenderer};
use vizlab_scene::Scene;
use vizlab_textviz::WordVizConfig;
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "vizlab-desktop", about = "Interactive 3D demo viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Demo to open
    #[arg(short, long, default_value = "assignment2")]
    demo: String,

    /// Word-viz YAML file for the word-occurrence demo
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Marker placement seed
    #[arg(short, long)]
    seed: Option<u64>,
}

/// A panel edit made in the UI, applied after the panel is drawn.
enum Edit {
    Slider(String, f32),
    Toggle(String, bool),
    Text(String, String),
    Color(String, Color),
    Press(String),
}

fn draw_panel(ui: &mut egui::Ui, panel: &ControlPanel) -> Vec<Edit> {
    let mut edits = Vec::new();
    for folder in panel.folders().iter().filter(|f| f.visible) {
        egui::CollapsingHeader::new(&folder.title)
            .default_open(true)
            .show(ui, |ui| {
                for entry in &folder.controls {
                    let key = entry.key.clone();
                    match &entry.control {
                        Control::Slider { value, min, max, step } => {
                            let mut v = *value;
                            let slider = egui::Slider::new(&mut v, *min..=*max)
                                .step_by(*step as f64)
                                .text(&entry.label);
                            if ui.add(slider).changed() {
                                edits.push(Edit::Slider(key, v));
                            }
                        }
                        Control::Toggle(on) => {
                            let mut v = *on;
                            if ui.checkbox(&mut v, &entry.label).changed() {
                                edits.push(Edit::Toggle(key, v));
                            }
                        }
                        Control::Text(text) => {
                            ui.label(&entry.label);
                            let mut v = text.clone();
                            if ui.text_edit_multiline(&mut v).changed() {
                                edits.push(Edit::Text(key, v));
                            }
                        }
                        Control::Color(color) => {
                            ui.horizontal(|ui| {
                                let mut rgb = color.to_array();
                                if ui.color_edit_button_rgb(&mut rgb).changed() {
                                    edits.push(Edit::Color(key, Color::rgb(rgb[0], rgb[1], rgb[2])));
                                }
                                ui.label(&entry.label);
                            });
                        }
                        Control::Button => {
                            if ui.button(&entry.label).clicked() {
                                edits.push(Edit::Press(key));
                            }
                        }
                    }
                }
            });
    }
    edits
}

/// Application state.
struct AppState {
    demo: Box<dyn Demo>,
    scene: Scene,
    orbit: OrbitCamera,
    options: DemoOptions,
    started: Instant,
    // Input state
    dragging: bool,
    cursor: Option<PhysicalPosition<f64>>,
    viewport: PhysicalSize<u32>,
    title_dirty: bool,
}

impl AppState {
    fn new(name: &str, options: DemoOptions) -> Result<Self> {
        let (demo, scene) = launch(name, &options)?;
        let orbit = OrbitCamera::from_camera(&scene.camera);
        Ok(Self {
            demo,
            scene,
            orbit,
            options,
            started: Instant::now(),
            dragging: false,
            cursor: None,
            viewport: PhysicalSize::new(1280, 720),
            title_dirty: true,
        })
    }

    fn switch_demo(&mut self, name: &str) {
        match launch(name, &self.options) {
            Ok((demo, scene)) => {
                self.orbit = OrbitCamera::from_camera(&scene.camera);
                self.demo = demo;
                self.scene = scene;
                self.started = Instant::now();
                self.title_dirty = true;
                tracing::info!(demo = name, "switched demo");
            }
            Err(e) => tracing::error!("failed to switch demo: {e}"),
        }
    }

    fn aspect(&self) -> f32 {
        self.viewport.width as f32 / self.viewport.height.max(1) as f32
    }

    fn update(&mut self) {
        let elapsed = self.started.elapsed().as_secs_f32();
        if self.demo.orbit_controls() {
            self.orbit.update(&mut self.scene.camera);
        }
        self.demo.update(&mut self.scene, elapsed);
    }

    /// Discard the scene's event log once the frame's summary is drawn.
    fn finish_frame(&mut self) -> usize {
        let drained = self.scene.drain_events().len();
        if drained > 0 {
            tracing::trace!(events = drained, "drained scene events");
        }
        drained
    }

    fn cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        if let Some(last) = self.cursor.filter(|_| self.dragging && self.demo.orbit_controls()) {
            self.orbit.rotate(
                (position.x - last.x) as f32,
                (position.y - last.y) as f32,
                self.viewport.height as f32,
            );
        }
        self.cursor = Some(position);
    }

    fn scrolled(&mut self, delta: MouseScrollDelta) {
        if !self.demo.orbit_controls() {
            return;
        }
        let lines = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(p) => p.y as f32 / 50.0,
        };
        self.orbit.zoom(lines);
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        let summary = SceneInspector::summary(&self.scene);
        let mut switch_to = None;

        egui::SidePanel::left("controls")
            .default_width(280.0)
            .show(ctx, |ui| {
                ui.heading(self.demo.title());
                egui::ComboBox::from_label("Demo")
                    .selected_text(self.demo.name())
                    .show_ui(ui, |ui| {
                        for name in demo_names() {
                            if ui.selectable_label(*name == self.demo.name(), *name).clicked() {
                                switch_to = Some(*name);
                            }
                        }
                    });
                ui.label(format!(
                    "Nodes: {}  Visible: {}  Groups: {}",
                    summary.nodes, summary.visible_nodes, summary.groups
                ));
                let cam = self.scene.camera.position;
                ui.label(format!("Camera: ({:.1}, {:.1}, {:.1})", cam.x, cam.y, cam.z));
                ui.separator();

                let edits = draw_panel(ui, self.demo.panel());
                let panel = self.demo.panel_mut();
                for edit in edits {
                    match edit {
                        Edit::Slider(key, v) => {
                            panel.set_slider(&key, v);
                        }
                        Edit::Toggle(key, v) => {
                            panel.set_toggle(&key, v);
                        }
                        Edit::Text(key, v) => {
                            panel.set_text(&key, &v);
                        }
                        Edit::Color(key, v) => {
                            panel.set_color(&key, v);
                        }
                        Edit::Press(key) => {
                            panel.press(&key);
                        }
                    }
                }

                ui.separator();
                ui.small("Drag to orbit, scroll to zoom");
            });

        self.finish_frame();
        if let Some(name) = switch_to.filter(|name| *name != self.demo.name()) {
            self.switch_demo(name);
        }
    }
}

struct GpuApp {
    state: AppState,
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
    fn new(state: AppState) -> Self {
        Self {
            state,
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
            .with_title(self.state.demo.title())
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone()).context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("find adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("vizlab_device"),
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
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        self.state.viewport = size;

        let renderer = WgpuRenderer::new(&device, surface_format, size.width, size.height);

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!("GPU initialized with {} backend", adapter.get_info().backend.to_str());

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

    fn redraw(&mut self) {
        self.state.update();

        let (Some(window), Some(surface), Some(device), Some(queue), Some(config)) =
            (&self.window, &self.surface, &self.device, &self.queue, &self.config)
        else {
            return;
        };
        let (Some(egui_winit), Some(egui_renderer)) = (&mut self.egui_winit, &mut self.egui_renderer) else {
            return;
        };

        if self.state.title_dirty {
            window.set_title(self.state.demo.title());
            self.state.title_dirty = false;
        }

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

        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        if let Some(renderer) = &mut self.renderer {
            renderer.render(device, queue, &view, &self.state.scene, self.state.aspect());
        }

        let raw_input = egui_winit.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.state.draw_ui(ctx);
        });
        egui_winit.handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self.egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
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

        output.present();
        window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_gpu(event_loop) {
            tracing::error!("failed to initialize GPU: {e:#}");
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
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
                if let (Some(surface), Some(device), Some(config)) = (&self.surface, &self.device, &mut self.config) {
                    config.width = new_size.width.max(1);
                    config.height = new_size.height.max(1);
                    surface.configure(device, config);
                    self.state.viewport = PhysicalSize::new(config.width, config.height);
                    if let Some(renderer) = &mut self.renderer {
                        renderer.resize(device, config.width, config.height);
                    }
                }
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: btn_state,
                ..
            } => {
                self.state.dragging = btn_state == ElementState::Pressed;
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.state.cursor_moved(position);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.state.scrolled(delta);
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
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

    tracing::info!("vizlab-desktop starting");

    let word_viz = cli
        .config
        .map(|path| WordVizConfig::load(&path).with_context(|| format!("loading {}", path.display())))
        .transpose()?;
    let state = AppState::new(&cli.demo, DemoOptions { seed: cli.seed, word_viz })?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(state);
    event_loop.run_app(&mut app)?;

    Ok(())
}
