use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId},
};

use sdf_render::camera::CameraController;
use sdf_render::cli::Cli;
use sdf_render::core::{Event, EventQueue, FrameClock, InputTranslator, Key};
use sdf_render::dof::DepthOfFieldSampler;
use sdf_render::frame::FpsCounter;
use sdf_render::logging::{self, LoggingConfig};
use sdf_render::overlay::HudStats;
use sdf_render::renderer::SdfRenderer;
use sdf_render::settings::Settings;
use sdf_render::types::SampleUniform;

struct App {
    settings: Settings,
    show_overlay: bool,
    window: Option<Arc<Window>>,
    renderer: Option<SdfRenderer>,
    queue: EventQueue,
    translator: InputTranslator,
    controller: CameraController,
    sampler: DepthOfFieldSampler,
    clock: FrameClock,
    fps: FpsCounter,
    samples: Vec<SampleUniform>,
    close_requested: bool,
}

impl App {
    fn new(settings: Settings, show_overlay: bool) -> Self {
        let queue = EventQueue::new();
        Self {
            controller: settings.camera_controller(),
            sampler: settings.sampler(),
            settings,
            show_overlay,
            window: None,
            renderer: None,
            translator: InputTranslator::new(queue.clone()),
            queue,
            clock: FrameClock::new(),
            fps: FpsCounter::default(),
            samples: Vec::new(),
            close_requested: false,
        }
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(renderer)) = (&self.window, &mut self.renderer) else {
            return;
        };

        let frame = self.clock.tick();
        if let Some(fps) = self.fps.record(frame.delta) {
            log::debug!("FPS: {fps:.1}");
        }

        self.controller.update(&self.queue, frame.delta);
        let state = self.controller.state();
        let aspect = renderer.aspect();

        self.samples.clear();
        self.samples.extend(
            self.sampler
                .generate(state, self.controller.samples() as usize)
                .enumerate()
                .map(|(index, pose)| SampleUniform::new(&pose, index, frame.time as f32, aspect)),
        );

        let stats = HudStats {
            fps: self.fps.fps(),
            samples: self.controller.samples(),
            focal_length: state.focal_length,
            origin: state.origin,
        };

        match renderer.render(window, &self.samples, &stats) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost, reconfiguring");
                renderer.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of GPU memory, exiting");
                event_loop.exit();
            }
            Err(e) => log::warn!("Render error: {e}"),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title("SDF Render")
                .with_inner_size(winit::dpi::LogicalSize::new(
                    self.settings.window_width,
                    self.settings.window_height,
                )),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let renderer = match pollster::block_on(SdfRenderer::new(window.clone(), self.show_overlay)) {
            Ok(r) => r,
            Err(e) => {
                log::error!("Failed to initialize renderer: {e:#}");
                event_loop.exit();
                return;
            }
        };

        log::info!("Window created");
        self.window = Some(window);
        self.renderer = Some(renderer);
        // Setup time must not show up as the first frame delta
        self.clock.reset();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Let egui handle the event first
        if let (Some(renderer), Some(window)) = (&mut self.renderer, &self.window) {
            if renderer.handle_event(window, &event) {
                if let WindowEvent::CursorMoved { position, .. } = event {
                    self.translator.track_cursor(position);
                }
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => self.close_requested = true,
            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size);
                }
            }
            WindowEvent::RedrawRequested => {
                if self.close_requested {
                    log::info!("Closing");
                    event_loop.exit();
                } else {
                    self.frame(event_loop);
                }
            }
            event => {
                let Some(window) = &self.window else {
                    return;
                };
                let translated = self.translator.handle(window.as_ref(), &event);
                if let Some(Event::KeyDown { key: Key::Escape, .. }) = translated {
                    self.close_requested = true;
                }
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
    logging::init(LoggingConfig {
        env_filter: None,
        log_file: cli.log_file.clone(),
    })?;

    let settings = Settings::from_cli(&cli)?;
    log::debug!("Settings: {settings:?}");

    let event_loop = EventLoop::new()?;
    let mut app = App::new(settings, !cli.no_ui);

    log::info!("SDF Render - Controls: WASD, Space/Shift, Q/E focus, R samples, drag to look, Escape to quit");
    event_loop.run_app(&mut app)?;

    Ok(())
}
