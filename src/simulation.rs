//! Simulation builder and runner.
//!
//! [`Simulation`] opens a window, loads the portraits on a background thread
//! and, once they arrive, builds a [`ParticleField`] and drives it every
//! frame:
//!
//! 1. fold window events into [`Input`];
//! 2. turn wheel and pointer into progress, group transform, pointer and
//!    avoidance region through the bridge;
//! 3. [`ParticleField::step`];
//! 4. upload and render.
//!
//! Until the portraits load (or if they fail to), the window shows the
//! background color only.
//!
//! ```ignore
//! Simulation::new()
//!     .with_portrait("portrait-a.png")
//!     .with_portrait("portrait-b.png")
//!     .with_seed(7)
//!     .run()?;
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use image::RgbaImage;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::bridge::{
    interaction_enabled, pointer_to_local, rect_to_avoidance, FieldTransform, ScrollBridge,
};
use crate::config::FieldConfig;
use crate::error::{FieldError, SampleError};
use crate::field::{FrameInputs, ParticleField};
use crate::gpu::{Camera, GpuState};
use crate::input::Input;
use crate::mount::{LoadStatus, Mount, PendingLoad};
use crate::sampler::load_portrait;
use crate::time::Time;

type PortraitLoad = PendingLoad<Result<Vec<RgbaImage>, SampleError>>;

/// Builder for a windowed particle portrait.
pub struct Simulation {
    portraits: Vec<PathBuf>,
    config: FieldConfig,
    config_file: Option<PathBuf>,
    seed: Option<u64>,
    title: String,
}

impl Simulation {
    pub fn new() -> Self {
        Self {
            portraits: Vec::new(),
            config: FieldConfig::default(),
            config_file: None,
            seed: None,
            title: "silkfield".to_string(),
        }
    }

    /// Add a target state. The first portrait is the one the field forms into.
    pub fn with_portrait(mut self, path: impl Into<PathBuf>) -> Self {
        self.portraits.push(path.into());
        self
    }

    pub fn with_config(mut self, config: FieldConfig) -> Self {
        self.config = config;
        self
    }

    /// Read the configuration from a JSON file when the simulation starts.
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Fix the seed, overriding any seed in the configuration.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Open the window and run until it is closed.
    pub fn run(self) -> Result<(), FieldError> {
        if self.portraits.is_empty() {
            return Err(FieldError::NoPortrait);
        }

        let mut config = match &self.config_file {
            Some(path) => FieldConfig::from_file(path)?,
            None => self.config,
        };
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(self.portraits, config, self.title);
        event_loop.run_app(&mut app)?;

        match app.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

struct App {
    title: String,
    portraits: Vec<PathBuf>,
    config: FieldConfig,
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    camera: Camera,
    input: Input,
    time: Time,
    bridge: ScrollBridge,
    transform: FieldTransform,
    mount: Mount,
    load: Option<PortraitLoad>,
    field: Option<ParticleField>,
    /// Clock time at which the field was built; the intro starts here.
    field_epoch: f32,
    error: Option<FieldError>,
}

impl App {
    fn new(portraits: Vec<PathBuf>, config: FieldConfig, title: String) -> Self {
        Self {
            title,
            portraits,
            camera: Camera::new(&config.view),
            bridge: ScrollBridge::new(config.timeline.clone()),
            config,
            window: None,
            gpu_state: None,
            input: Input::new(),
            time: Time::new(),
            transform: FieldTransform::default(),
            mount: Mount::new(),
            load: None,
            field: None,
            field_epoch: 0.0,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: FieldError) {
        log::error!("{}", error);
        self.error = Some(error);
        self.teardown();
        event_loop.exit();
    }

    fn start_load(&mut self) {
        let paths = self.portraits.clone();
        let load = PendingLoad::spawn(self.mount.liveness(), move || {
            paths
                .iter()
                .map(|path| {
                    let image = load_portrait(path)?;
                    log::info!("loaded portrait {} ({}x{})", path.display(), image.width(), image.height());
                    Ok(image)
                })
                .collect::<Result<Vec<_>, SampleError>>()
        });
        match load {
            Ok(load) => self.load = Some(load),
            Err(e) => log::error!("failed to start portrait loader: {}", e),
        }
    }

    fn poll_load(&mut self) {
        let Some(load) = &mut self.load else {
            return;
        };
        match load.poll() {
            LoadStatus::Pending => {}
            LoadStatus::Ready(Ok(images)) => {
                let field = ParticleField::from_images(&images, &self.config);
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.attach_field(&field);
                }
                self.field = Some(field);
                self.field_epoch = self.time.elapsed();
                self.load = None;
            }
            LoadStatus::Ready(Err(e)) => {
                log::error!("failed to load portrait: {}", e);
                self.load = None;
            }
            LoadStatus::Discarded | LoadStatus::Closed => self.load = None,
        }
    }

    fn teardown(&mut self) {
        if self.mount.teardown() {
            self.field = None;
            if let Some(gpu_state) = &mut self.gpu_state {
                gpu_state.detach_field();
            }
        }
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        if !self.mount.is_alive() {
            return;
        }
        if self.input.escape_pressed() {
            self.teardown();
            event_loop.exit();
            return;
        }

        self.poll_load();

        let (elapsed, delta) = self.time.update();
        let field_time = elapsed - self.field_epoch;

        self.bridge.scroll_by(self.input.wheel_lines());
        self.camera.orbit(self.input.drag_delta());
        self.camera.update(delta);

        let (progress, transform) = self.bridge.advance(field_time, delta);
        self.transform = transform;

        if let Some(field) = &mut self.field {
            let viewport = self.input.window_size();
            let interaction = &self.config.interaction;

            let pointer = if interaction_enabled(self.input.logical_width(), interaction.min_viewport_width)
                && !self.input.is_touch()
            {
                self.input
                    .cursor_ndc()
                    .and_then(|ndc| pointer_to_local(&self.camera, &self.transform, ndc))
            } else {
                None
            };

            let avoidance = self.config.avoidance.as_ref().and_then(|zone| {
                let rect = zone.rect(viewport, self.input.scale_factor() as f32);
                rect_to_avoidance(&self.camera, &self.transform, &rect, viewport)
            });

            let inputs = FrameInputs::new(progress, field_time, delta)
                .with_pointer(pointer)
                .with_avoidance(avoidance);
            field.step(&inputs);

            if let Some(gpu_state) = &self.gpu_state {
                gpu_state.upload(field);
            }
        }

        if let Some(gpu_state) = &mut self.gpu_state {
            match gpu_state.render(&self.camera, &self.transform) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    let size = gpu_state.size();
                    gpu_state.resize(size);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("GPU out of memory");
                    self.teardown();
                    event_loop.exit();
                    return;
                }
                Err(e) => log::warn!("render error: {:?}", e),
            }
        }

        self.input.begin_frame();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };

        let size = window.inner_size();
        self.input.set_window_size(size.width, size.height);
        self.input.set_scale_factor(window.scale_factor());
        self.camera.set_viewport(size.width, size.height);

        match pollster::block_on(GpuState::new(window.clone(), &self.config.view)) {
            Ok(gpu_state) => self.gpu_state = Some(gpu_state),
            Err(e) => return self.fail(event_loop, e.into()),
        }
        self.window = Some(window);

        self.start_load();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.teardown();
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                self.input.handle_event(&event);
                if let Some(gpu_state) = &mut self.gpu_state {
                    if gpu_state.resize(physical_size) {
                        self.camera.set_viewport(physical_size.width, physical_size.height);
                        log::debug!("resized to {}x{}", physical_size.width, physical_size.height);
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                self.frame(event_loop);
                if self.mount.is_alive() {
                    if let Some(window) = &self.window {
                        window.request_redraw();
                    }
                }
            }
            _ => self.input.handle_event(&event),
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.teardown();
    }
}
