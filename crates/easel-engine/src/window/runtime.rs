use anyhow::{Context, Result};
use ouroboros::self_referencing;
use std::time::{Duration, Instant};

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App as CoreApp, AppControl, EventCtx, FrameCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::input::translate::translate_window_event;
use crate::input::{DragTracker, GestureInput, InputEvent, InputState};
use crate::time::IntervalTimer;

/// How often `App::on_poll` runs while the app reports pending work.
const POLL_INTERVAL: Duration = Duration::from_millis(16);

/// When the runtime asks the app for a new frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RedrawPolicy {
    /// Only after input, resize, or an explicit `request_redraw`.
    OnDemand,
    /// Additionally on a fixed period through `App::on_tick`.
    Interval(Duration),
}

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub redraw: RedrawPolicy,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "easel".to_string(),
            initial_size: LogicalSize::new(800.0, 600.0),
            redraw: RedrawPolicy::OnDemand,
        }
    }
}

/// Runtime context passed to the application.
#[derive(Default)]
pub struct RuntimeCtx {
    exit_requested: bool,
}

impl RuntimeCtx {
    pub fn exit(&mut self) {
        self.exit_requested = true;
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        if let Some(err) = state.startup_error {
            return Err(err);
        }
        Ok(())
    }
}

#[self_referencing]
struct WindowEntry {
    input_state: InputState,
    drag: DragTracker,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    entry: Option<WindowEntry>,
    timer: Option<IntervalTimer>,
    exit_requested: bool,
    startup_error: Option<anyhow::Error>,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            entry: None,
            timer: None,
            exit_requested: false,
            startup_error: None,
        }
    }

    fn create_window_entry(&self, event_loop: &ActiveEventLoop) -> Result<WindowEntry> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();

        WindowEntryTryBuilder {
            input_state: InputState::default(),
            drag: DragTracker::default(),
            window,
            gpu_builder: |w| {
                pollster::block_on(Gpu::new(w, gpu_init))
                    .context("GPU initialization failed for window")
            },
        }
        .try_build()
    }

    /// Runs one app callback with an [`EventCtx`]; returns `true` if it asked to exit.
    fn dispatch<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&mut A, &mut EventCtx<'_, '_>) -> AppControl,
    {
        let (app, entry) = (&mut self.app, &mut self.entry);
        let Some(entry) = entry.as_mut() else {
            return false;
        };

        let exit = entry.with_mut(|fields| {
            let mut runtime = RuntimeCtx::default();
            let mut ctx = EventCtx {
                window: WindowCtx {
                    id: fields.window.id(),
                    window: fields.window,
                },
                gpu: fields.gpu,
                input: fields.input_state,
                runtime: &mut runtime,
            };

            let control = f(app, &mut ctx);
            control == AppControl::Exit || runtime.exit_requested
        });

        if exit {
            self.exit_requested = true;
        }
        exit
    }

    fn draw_frame(&mut self) {
        let (app, entry) = (&mut self.app, &mut self.entry);
        let Some(entry) = entry.as_mut() else {
            return;
        };

        let exit = entry.with_mut(|fields| {
            let mut runtime = RuntimeCtx::default();
            let mut ctx = FrameCtx {
                window: WindowCtx {
                    id: fields.window.id(),
                    window: fields.window,
                },
                gpu: fields.gpu,
                input: fields.input_state,
                runtime: &mut runtime,
            };

            let control = app.on_frame(&mut ctx);
            control == AppControl::Exit || runtime.exit_requested
        });

        if exit {
            self.exit_requested = true;
        }
    }

    fn handle_input(&mut self, event: &WindowEvent) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };

        let translated: Option<(InputEvent, Option<GestureInput>)> = entry.with_mut(|fields| {
            let ev = translate_window_event(fields.window, fields.input_state, event)?;
            fields.input_state.apply_event(&ev);
            let gesture = fields.drag.process(&ev);
            Some((ev, gesture))
        });

        let Some((ev, gesture)) = translated else {
            return;
        };

        if self.dispatch(|app, ctx| app.on_input(ctx, &ev)) {
            return;
        }
        if let Some(g) = gesture {
            self.dispatch(|app, ctx| app.on_gesture(ctx, g));
        }
    }

    fn resize_surface(&mut self) {
        if let Some(entry) = self.entry.as_mut() {
            let size = entry.with_window(|w| w.inner_size());
            entry.with_gpu_mut(|gpu| gpu.resize(size));
            entry.with_window(|w| w.request_redraw());
        }
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }

        match self.create_window_entry(event_loop) {
            Ok(entry) => self.entry = Some(entry),
            Err(e) => {
                log::error!("failed to create window: {e:#}");
                self.startup_error = Some(e);
                self.exit_requested = true;
                event_loop.exit();
                return;
            }
        }

        if let RedrawPolicy::Interval(period) = self.config.redraw {
            self.timer = Some(IntervalTimer::new(period, Instant::now()));
        }

        self.dispatch(|app, ctx| app.on_start(ctx));
        if self.exit_requested {
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let now = Instant::now();

        let ticked = self.timer.as_mut().is_some_and(|t| t.poll(now));
        if ticked {
            self.dispatch(|app, ctx| app.on_tick(ctx));
        }

        if self.app.needs_poll() {
            self.dispatch(|app, ctx| app.on_poll(ctx));
        }

        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let mut wake = self.timer.as_ref().map(IntervalTimer::deadline);
        if self.app.needs_poll() {
            let poll_at = now + POLL_INTERVAL;
            wake = Some(wake.map_or(poll_at, |w| w.min(poll_at)));
        }

        event_loop.set_control_flow(match wake {
            Some(at) => ControlFlow::WaitUntil(at),
            None => ControlFlow::Wait,
        });
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        self.handle_input(&event);

        match &event {
            WindowEvent::CloseRequested => {
                self.entry = None;
                self.exit_requested = true;
            }

            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                self.resize_surface();
            }

            WindowEvent::RedrawRequested => self.draw_frame(),

            _ => {}
        }

        if self.exit_requested {
            event_loop.exit();
        }
    }
}
