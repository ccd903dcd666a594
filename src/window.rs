//! Render driver: the winit application that owns the window, the renderer
//! and the simulation context.
//!
//! Every redraw ticks the clock, steps the field, uploads positions if they
//! changed, draws, and requests the next redraw. Input events arrive between
//! redraws on the same thread.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::error::SimulationError;
use crate::gpu::PointRenderer;
use crate::input::{Input, InputEvent};
use crate::simulation::SimContext;

/// Open a window and run `ctx` until the window closes or its frame limit is
/// reached.
pub fn run(ctx: SimContext) -> Result<(), SimulationError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(ctx);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct App {
    window: Option<Arc<Window>>,
    renderer: Option<PointRenderer>,
    ctx: SimContext,
    input: Input,
    /// First fatal error; stops the loop and is returned from [`run`].
    error: Option<SimulationError>,
}

impl App {
    fn new(ctx: SimContext) -> Self {
        Self {
            window: None,
            renderer: None,
            ctx,
            input: Input::new(),
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: SimulationError) {
        log::error!("{err}");
        self.error = Some(err);
        event_loop.exit();
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), SimulationError> {
        let window_attrs = Window::default_attributes()
            .with_title(format!("particle-field - {}", self.ctx.field.name()))
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let size = window.inner_size();
        self.input.set_window_size(size.width, size.height);
        self.ctx.camera.resize(size.width, size.height);
        log::info!("Created {}x{} window", size.width, size.height);

        let renderer = pollster::block_on(PointRenderer::new(window.clone(), &self.ctx))?;
        self.window = Some(window);
        self.renderer = Some(renderer);
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        self.ctx.advance();

        let result = match &mut self.renderer {
            Some(renderer) => {
                renderer.upload(self.ctx.field.store_mut());
                renderer.render(&self.ctx)
            }
            None => Ok(()),
        };

        match result {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.reconfigure();
                }
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                self.fail(event_loop, SimulationError::OutOfMemory);
                return;
            }
            Err(e) => log::warn!("Render error: {e:?}"),
        }

        let frame = self.ctx.clock.frame();
        if frame % 600 == 0 {
            log::debug!("frame {frame}, {:.1} fps", self.ctx.clock.fps());
        }

        if self.ctx.finished() {
            log::info!("Reached frame limit ({frame}), exiting");
            event_loop.exit();
            return;
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(err) = self.init(event_loop) {
                self.fail(event_loop, err);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let WindowEvent::RedrawRequested = event {
            self.redraw(event_loop);
            return;
        }

        let Some(input_event) = self.input.translate(&event) else {
            return;
        };

        match input_event {
            InputEvent::Exit => event_loop.exit(),
            InputEvent::Resized { width, height } => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(winit::dpi::PhysicalSize::new(width, height));
                }
                self.ctx.handle(&input_event);
            }
            _ => {
                self.ctx.handle(&input_event);
            }
        }
    }
}
