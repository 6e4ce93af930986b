//! Standalone picking window backed by winit.
//!
//! ```no_run
//! # use picker::viewer::Viewer;
//! Viewer::builder().build().run().unwrap();
//! ```

use std::{sync::Arc, time::Duration};

use web_time::Instant;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{ElementState, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::{
    engine::PickingEngine,
    error::PickerError,
    gpu::render_context::RenderContext,
    input::{InputEvent, MouseButton},
    options::Options,
    scene::SceneAssets,
};

/// How often the FPS figure in the title is refreshed.
const TITLE_REFRESH: Duration = Duration::from_millis(500);

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Viewer`].
pub struct ViewerBuilder {
    options: Option<Options>,
}

impl ViewerBuilder {
    fn new() -> Self {
        Self { options: None }
    }

    /// Override the default options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = Some(options);
        self
    }

    /// Consume the builder and produce a [`Viewer`].
    #[must_use]
    pub fn build(self) -> Viewer {
        Viewer {
            options: self.options.unwrap_or_default(),
        }
    }
}

// ── Viewer ───────────────────────────────────────────────────────────────

/// A window showing the rotating instance grid with hover picking.
///
/// Construct via [`Viewer::builder`], then call [`run`](Self::run) to
/// enter the event loop.
pub struct Viewer {
    options: Options,
}

impl Viewer {
    /// Start a new builder.
    #[must_use]
    pub fn builder() -> ViewerBuilder {
        ViewerBuilder::new()
    }

    /// Open the window and run the event loop. Blocks until the window is
    /// closed.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::Viewer`] if the event loop fails, or the
    /// error that prevented the engine from starting.
    pub fn run(self) -> Result<(), PickerError> {
        let event_loop =
            EventLoop::new().map_err(|e| PickerError::Viewer(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = ViewerApp {
            window: None,
            engine: None,
            options: Some(self.options),
            last_title_update: Instant::now(),
            startup_error: None,
        };

        event_loop
            .run_app(&mut app)
            .map_err(|e| PickerError::Viewer(e.to_string()))?;
        app.startup_error.map_or(Ok(()), Err)
    }
}

// ── Winit app ────────────────────────────────────────────────────────────

struct ViewerApp {
    window: Option<Arc<Window>>,
    engine: Option<PickingEngine>,
    options: Option<Options>,
    last_title_update: Instant,
    startup_error: Option<PickerError>,
}

fn framebuffer_size(inner: PhysicalSize<u32>) -> (u32, u32) {
    (inner.width.max(1), inner.height.max(1))
}

fn window_size(window: &Window) -> (f32, f32) {
    let logical: LogicalSize<f32> =
        window.inner_size().to_logical(window.scale_factor());
    (logical.width, logical.height)
}

impl ViewerApp {
    fn start(
        &mut self,
        event_loop: &ActiveEventLoop,
        options: Options,
    ) -> Result<(), PickerError> {
        let attrs = Window::default_attributes()
            .with_title(&options.window.title)
            .with_inner_size(LogicalSize::new(
                options.window.width,
                options.window.height,
            ));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .map_err(|e| PickerError::Viewer(e.to_string()))?,
        );

        let assets = SceneAssets::load(&options.scene)?;
        let context = pollster::block_on(RenderContext::new(
            window.clone(),
            framebuffer_size(window.inner_size()),
        ))?;
        let mut engine = PickingEngine::new(context, &assets, options)?;
        let (width, height) = window_size(&window);
        engine.handle_event(&InputEvent::WindowResized { width, height });

        window.request_redraw();
        self.window = Some(window);
        self.engine = Some(engine);
        Ok(())
    }

    fn redraw(&mut self) {
        let (Some(window), Some(engine)) = (&self.window, &mut self.engine)
        else {
            return;
        };
        match engine.frame() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                let (width, height) = framebuffer_size(window.inner_size());
                engine.resize(width, height);
            }
            Err(e) => log::error!("render error: {e:?}"),
        }

        let now = Instant::now();
        if now.duration_since(self.last_title_update) >= TITLE_REFRESH {
            window.set_title(&format!(
                "{} - {:.0} FPS",
                engine.options().window.title,
                engine.fps()
            ));
            self.last_title_update = now;
        }
        window.request_redraw();
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(options) = self.options.take() else {
            return;
        };
        if let Err(e) = self.start(event_loop, options) {
            log::error!("failed to start viewer: {e}");
            self.startup_error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        if matches!(event, WindowEvent::CloseRequested) {
            event_loop.exit();
            return;
        }
        if matches!(event, WindowEvent::RedrawRequested) {
            self.redraw();
            return;
        }

        let (Some(window), Some(engine)) = (&self.window, &mut self.engine)
        else {
            return;
        };

        match event {
            WindowEvent::Resized(size) => {
                let (width, height) = framebuffer_size(size);
                engine.handle_event(&InputEvent::FramebufferResized {
                    width,
                    height,
                });
                let (width, height) = window_size(window);
                engine.handle_event(&InputEvent::WindowResized {
                    width,
                    height,
                });
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let (width, height) = window_size(window);
                engine.handle_event(&InputEvent::WindowResized {
                    width,
                    height,
                });
            }

            WindowEvent::MouseInput { button, state, .. } => {
                engine.handle_event(&InputEvent::MouseButton {
                    button: MouseButton::from(button),
                    pressed: state == ElementState::Pressed,
                });
            }

            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f32>(window.scale_factor());
                engine.handle_event(&InputEvent::CursorMoved {
                    x: logical.x,
                    y: logical.y,
                });
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.01,
                };
                engine.handle_event(&InputEvent::Scroll { delta });
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.repeat {
                    return;
                }
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                if code == KeyCode::Escape {
                    event_loop.exit();
                    return;
                }
                engine.handle_event(&InputEvent::KeyChanged {
                    key: format!("{code:?}"),
                    pressed: event.state == ElementState::Pressed,
                });
            }

            _ => (),
        }
    }
}
