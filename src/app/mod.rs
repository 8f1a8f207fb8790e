//! Windowed application shell.
//!
//! Wraps the winit event loop behind a small builder ([`App`]) and a
//! handler trait ([`AppHandler`]) so demos only supply a frame source and
//! input handling. One frame fully completes (resize, rasterize, render,
//! present) before the next begins; redraws are driven continuously.

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::errors::Result;
use crate::renderer::{Renderer, RenderSettings};
use crate::source::FrameSource;
use crate::utils::Timer;

const DEFAULT_WIDTH: u32 = 1280;
const DEFAULT_HEIGHT: u32 = 720;

/// One-shot startup notification (a boot sound, a greeting line). Played
/// exactly once, right after the renderer comes up.
pub trait Chime {
    fn play(&mut self);
}

/// Silent default.
impl Chime for () {
    fn play(&mut self) {}
}

/// Application callbacks. `init` builds the handler once the renderer and
/// window exist; `frame_source` supplies the per-frame pixels.
pub trait AppHandler: Sized + 'static {
    fn init(renderer: &mut Renderer, window: &Window) -> Self;

    /// Returns true when the event was consumed.
    fn on_event(&mut self, _renderer: &mut Renderer, _event: &WindowEvent) -> bool {
        false
    }

    /// Per-frame update before rasterization.
    fn update(&mut self, _renderer: &mut Renderer, _dt: f32) {}

    fn frame_source(&mut self) -> &mut dyn FrameSource;
}

/// Event loop builder.
pub struct App {
    title: String,
    settings: RenderSettings,
    chime: Option<Box<dyn Chime>>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: "phosphor".to_string(),
            settings: RenderSettings::default(),
            chime: None,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: RenderSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn with_chime(mut self, chime: Box<dyn Chime>) -> Self {
        self.chime = Some(chime);
        self
    }

    /// Runs the event loop until the window closes. Blocks the calling
    /// thread.
    pub fn run<H: AppHandler>(self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut runner = AppRunner::<H> {
            title: self.title,
            settings: self.settings,
            chime: self.chime,
            timer: Timer::new(),
            state: None,
        };
        event_loop.run_app(&mut runner)?;
        Ok(())
    }
}

struct RunningApp<H> {
    window: Arc<Window>,
    renderer: Renderer,
    handler: H,
}

struct AppRunner<H> {
    title: String,
    settings: RenderSettings,
    chime: Option<Box<dyn Chime>>,
    timer: Timer,
    state: Option<RunningApp<H>>,
}

impl<H: AppHandler> ApplicationHandler for AppRunner<H> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(&self.title)
            .with_inner_size(LogicalSize::new(DEFAULT_WIDTH, DEFAULT_HEIGHT));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Window creation failed: {e}");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        let renderer = pollster::block_on(Renderer::new(
            window.clone(),
            &self.settings,
            size.width,
            size.height,
        ));
        let mut renderer = match renderer {
            Ok(renderer) => renderer,
            Err(e) => {
                log::error!("Renderer initialization failed: {e}");
                event_loop.exit();
                return;
            }
        };

        let handler = H::init(&mut renderer, &window);
        if let Some(chime) = self.chime.as_mut() {
            chime.play();
        }

        window.request_redraw();
        self.state = Some(RunningApp {
            window,
            renderer,
            handler,
        });
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        if state.handler.on_event(&mut state.renderer, &event) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                state.renderer.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                // The surface tracks the live window size, not stale resize
                // events.
                let size = state.window.inner_size();
                state.renderer.resize(size.width, size.height);

                self.timer.tick();
                let frame = self.timer.frame_state();
                state.handler.update(&mut state.renderer, frame.dt);

                let (width, height) = state.renderer.size();
                let source = state.handler.frame_source().rasterize(width, height, &frame);
                if let Err(e) = state.renderer.render(&source, frame.time) {
                    log::error!("Frame failed: {e}");
                    event_loop.exit();
                    return;
                }
                state.window.request_redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }
}
