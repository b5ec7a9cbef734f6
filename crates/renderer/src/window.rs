use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use canvas::{FrameUniforms, Handled, Point, PointerEvent, Sketch, Startup, Viewport};
use tracing::{debug, error, info, trace, warn};
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event::{Event, Touch, TouchPhase, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoopBuilder, EventLoopProxy, EventLoopWindowTarget};
use winit::monitor::MonitorHandle;
use winit::window::{Window, WindowBuilder, WindowId};

use crate::compile::check_program;
use crate::gpu::{GpuState, ShaderPipeline};
use crate::loader::{self, LoadEvent, ProgramSources, SourceImage};
use crate::placement::CanvasPlacement;
use crate::runtime::{time_source_for_policy, BoxedTimeSource, FrameScheduler};
use crate::types::{RendererConfig, SurfaceAlpha, FALLBACK_VIEWPORT_WIDTH};

/// Stage one of startup: the window exists and the image is on the GPU.
///
/// `gpu` is declared first so the surface drops before the window it points at.
struct CanvasWindow {
    gpu: GpuState,
    window: Arc<Window>,
    /// Last size asked of the window system, so a compositor that refuses it
    /// is not asked again on every resize.
    requested: Option<PhysicalSize<u32>>,
}

type SketchStartup = Startup<CanvasWindow, ShaderPipeline>;

pub(crate) fn run(config: RendererConfig) -> Result<()> {
    let event_loop = EventLoopBuilder::<LoadEvent>::with_user_event()
        .build()
        .map_err(|err| anyhow!("failed to create event loop: {err}"))?;
    let proxy = event_loop.create_proxy();

    let mut app = SketchApp::new(config, proxy);
    app.start()?;

    let run_result = event_loop.run(|event, elwt| app.handle_event(event, elwt));

    if let Some(err) = app.failure.take() {
        return Err(err);
    }
    run_result.map_err(|err| anyhow!("window event loop error: {err}"))
}

struct SketchApp {
    config: RendererConfig,
    proxy: EventLoopProxy<LoadEvent>,
    startup: SketchStartup,
    sketch: Option<Sketch>,
    time_source: BoxedTimeSource,
    scheduler: FrameScheduler,
    touches: TouchTracker,
    touch_seen: bool,
    failure: Option<anyhow::Error>,
}

impl SketchApp {
    fn new(config: RendererConfig, proxy: EventLoopProxy<LoadEvent>) -> Self {
        let time_source = time_source_for_policy(&config.policy, Instant::now());
        let scheduler = FrameScheduler::new(config.policy.clone());
        Self {
            config,
            proxy,
            startup: SketchStartup::new(),
            sketch: None,
            time_source,
            scheduler,
            touches: TouchTracker::default(),
            touch_seen: false,
            failure: None,
        }
    }

    fn start(&self) -> Result<()> {
        info!(path = %self.config.image.display(), "loading image");
        loader::spawn_image_load(self.proxy.clone(), self.config.image.clone())
    }

    fn handle_event(&mut self, event: Event<LoadEvent>, elwt: &EventLoopWindowTarget<LoadEvent>) {
        match event {
            Event::UserEvent(LoadEvent::Image(result)) => {
                if let Err(err) = result.and_then(|image| self.open_canvas(image, elwt)) {
                    self.abort(err, elwt);
                }
            }
            Event::UserEvent(LoadEvent::Program(result)) => {
                if let Err(err) = result.and_then(|sources| self.install_program(sources)) {
                    self.abort(err, elwt);
                }
            }
            Event::WindowEvent { window_id, event } if Some(window_id) == self.window_id() => {
                self.handle_window_event(event, elwt);
            }
            Event::AboutToWait => self.schedule(elwt),
            _ => {}
        }
    }

    fn handle_window_event(&mut self, event: WindowEvent, elwt: &EventLoopWindowTarget<LoadEvent>) {
        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                elwt.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(canvas_window) = self.startup.image_mut() {
                    canvas_window.gpu.resize(new_size);
                }
                self.refresh_viewport();
                self.enforce_canvas_size();
            }
            WindowEvent::ScaleFactorChanged {
                scale_factor,
                mut inner_size_writer,
            } => {
                if let Some(sketch) = self.sketch.as_ref() {
                    let canvas = sketch.canvas();
                    let desired: PhysicalSize<u32> =
                        LogicalSize::new(canvas.width, canvas.height).to_physical(scale_factor);
                    if let Err(err) = inner_size_writer.request_inner_size(desired) {
                        debug!(%err, ?desired, "window system refused the scaled canvas size");
                    }
                }
                self.refresh_viewport();
            }
            WindowEvent::Moved(_) => {
                self.refresh_viewport();
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(point) = self.to_canvas(position) {
                    self.pointer(PointerEvent::CursorMoved(point));
                }
            }
            WindowEvent::Touch(touch) => {
                self.handle_touch(touch);
            }
            WindowEvent::RedrawRequested => {
                self.redraw(elwt);
            }
            _ => {}
        }
    }

    fn window_id(&self) -> Option<WindowId> {
        self.startup.image().map(|canvas_window| canvas_window.window.id())
    }

    /// Sizes the canvas for the current viewport, opens the window and
    /// uploads the image, then starts loading the program.
    fn open_canvas(
        &mut self,
        image: SourceImage,
        elwt: &EventLoopWindowTarget<LoadEvent>,
    ) -> Result<()> {
        info!(
            path = %image.path.display(),
            width = image.size.width(),
            height = image.size.height(),
            "image loaded"
        );

        let monitor = elwt
            .primary_monitor()
            .or_else(|| elwt.available_monitors().next());
        let viewport = Viewport::new(self.viewport_width(monitor), self.has_touch());
        let sketch = Sketch::new(image.size, viewport, self.config.layout, self.config.input);
        let canvas = sketch.canvas();

        let window = WindowBuilder::new()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(canvas.width, canvas.height))
            .with_resizable(false)
            .with_transparent(self.config.surface_alpha == SurfaceAlpha::Transparent)
            .build(elwt)
            .map_err(|err| anyhow!("failed to create sketch window: {err}"))?;
        let window = Arc::new(window);

        let gpu = GpuState::new(
            window.as_ref(),
            window.inner_size(),
            self.config.surface_alpha,
            &image,
        )
        .context("failed to initialise GPU for the sketch window")?;

        self.startup.image_loaded(CanvasWindow {
            gpu,
            window,
            requested: None,
        })?;
        self.sketch = Some(sketch);

        info!(
            vertex = %self.config.vertex_shader.display(),
            fragment = %self.config.fragment_shader.display(),
            "loading shader program"
        );
        loader::spawn_program_load(
            self.proxy.clone(),
            self.config.vertex_shader.clone(),
            self.config.fragment_shader.clone(),
        )
    }

    fn install_program(&mut self, sources: ProgramSources) -> Result<()> {
        let program = check_program(&sources.vertex, &sources.fragment).with_context(|| {
            format!(
                "failed to compile {} and {}",
                sources.vertex_path.display(),
                sources.fragment_path.display()
            )
        })?;

        let canvas_window = self
            .startup
            .image()
            .ok_or_else(|| anyhow!("shader program arrived before the image"))?;
        let pipeline = canvas_window.gpu.build_pipeline(&program)?;
        let window = canvas_window.window.clone();

        self.startup.program_ready(pipeline)?;
        self.scheduler.invalidate();
        window.request_redraw();
        Ok(())
    }

    /// Loading failed: record it, stop the loop and let `run` report it.
    fn abort(&mut self, err: anyhow::Error, elwt: &EventLoopWindowTarget<LoadEvent>) {
        let reason = format!("{err:#}");
        error!(error = %reason, phase = %self.startup.phase(), "sketch failed to start");
        if let Err(transition) = self.startup.fail(reason) {
            error!(%transition, "startup could not record the failure");
        }
        self.failure = Some(err);
        elwt.exit();
    }

    fn has_touch(&self) -> bool {
        self.config.touch.has_touch(self.touch_seen)
    }

    fn viewport_width(&self, monitor: Option<MonitorHandle>) -> f64 {
        if let Some(width) = self.config.viewport_width {
            return width;
        }
        match monitor {
            Some(monitor) => {
                let logical = monitor.size().to_logical::<f64>(monitor.scale_factor());
                logical.width
            }
            None => {
                warn!(
                    fallback = FALLBACK_VIEWPORT_WIDTH,
                    "could not determine monitor width; assuming a desktop viewport"
                );
                FALLBACK_VIEWPORT_WIDTH
            }
        }
    }

    /// Re-runs device classification after a viewport event.
    fn refresh_viewport(&mut self) {
        let Some(canvas_window) = self.startup.image() else {
            return;
        };
        let monitor = canvas_window.window.current_monitor();
        let viewport = Viewport::new(self.viewport_width(monitor), self.has_touch());
        let Some(sketch) = self.sketch.as_mut() else {
            return;
        };
        if sketch.viewport() == viewport {
            trace!(?viewport, "viewport unchanged");
        } else if sketch.viewport_changed(viewport) {
            if let Some(canvas_window) = self.startup.image_mut() {
                canvas_window.requested = None;
            }
            self.enforce_canvas_size();
        }
        self.scheduler.invalidate();
    }

    /// Asks the window system for the computed canvas size when the window
    /// does not have it.
    fn enforce_canvas_size(&mut self) {
        let (Some(sketch), Some(canvas_window)) = (self.sketch.as_ref(), self.startup.image_mut())
        else {
            return;
        };
        let canvas = sketch.canvas();
        let window = &canvas_window.window;
        let desired: PhysicalSize<u32> =
            LogicalSize::new(canvas.width, canvas.height).to_physical(window.scale_factor());
        let actual = window.inner_size();
        if !size_drifted(actual, desired) {
            return;
        }
        if canvas_window.requested == Some(desired) {
            trace!(?actual, ?desired, "window system kept its own size");
            return;
        }

        debug!(?actual, ?desired, "requesting canvas size");
        canvas_window.requested = Some(desired);
        if let Some(applied) = window.request_inner_size(desired) {
            canvas_window.gpu.resize(applied);
        }
    }

    /// Where the canvas sits inside the current surface.
    fn placement(&self) -> Option<CanvasPlacement> {
        let sketch = self.sketch.as_ref()?;
        let canvas_window = self.startup.image()?;
        Some(CanvasPlacement::new(
            canvas_window.gpu.size(),
            sketch.canvas(),
            canvas_window.window.scale_factor(),
        ))
    }

    fn to_canvas(&self, position: PhysicalPosition<f64>) -> Option<Point> {
        self.placement().map(|placement| placement.to_canvas(position))
    }

    fn pointer(&mut self, event: PointerEvent) {
        if let Some(sketch) = self.sketch.as_mut() {
            let Handled = sketch.pointer_event(event);
            self.scheduler.invalidate();
        }
    }

    fn handle_touch(&mut self, touch: Touch) {
        if !self.touch_seen {
            let before = self.has_touch();
            self.touch_seen = true;
            if self.has_touch() != before {
                info!("touch input detected; reclassifying device");
                self.refresh_viewport();
            }
        }
        let Some(point) = self.to_canvas(touch.location) else {
            return;
        };
        if let Some(event) = self.touches.translate(touch.id, touch.phase, point) {
            self.pointer(event);
        }
    }

    fn redraw(&mut self, elwt: &EventLoopWindowTarget<LoadEvent>) {
        let Some(placement) = self.placement() else {
            return;
        };
        let Some(sketch) = self.sketch.as_ref() else {
            return;
        };
        let (canvas_window, pipeline) = match self.startup.ready_mut() {
            Ok(stages) => stages,
            Err(err) => {
                trace!(%err, "skipping redraw");
                return;
            }
        };

        let sample = self.time_source.sample();
        let frame = FrameUniforms::capture(sketch, sample.millis);
        trace!(frame = sample.frame_index, millis = sample.millis, "redraw");
        if placement.is_inset(canvas_window.gpu.size()) {
            trace!(?placement, "canvas inset in a larger surface");
        }
        match canvas_window.gpu.render(pipeline, &frame, &placement) {
            Ok(()) => self.scheduler.mark_rendered(Instant::now()),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                canvas_window.gpu.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("surface out of memory; exiting");
                elwt.exit();
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("surface timeout; retrying next frame");
            }
            Err(other) => {
                warn!(error = ?other, "surface error; retrying next frame");
            }
        }
    }

    fn schedule(&mut self, elwt: &EventLoopWindowTarget<LoadEvent>) {
        let Ok((canvas_window, _)) = self.startup.ready_mut() else {
            elwt.set_control_flow(ControlFlow::Wait);
            return;
        };
        let now = Instant::now();
        if self.scheduler.ready_for_frame(now) {
            canvas_window.window.request_redraw();
            elwt.set_control_flow(ControlFlow::Wait);
        } else if let Some(deadline) = self.scheduler.next_deadline() {
            elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
        } else {
            elwt.set_control_flow(ControlFlow::Wait);
        }
    }
}

/// Follows the first finger down, like `touches[0]`, and ignores the rest.
#[derive(Debug, Default)]
struct TouchTracker {
    active: Option<u64>,
}

impl TouchTracker {
    fn translate(&mut self, id: u64, phase: TouchPhase, point: Point) -> Option<PointerEvent> {
        match phase {
            TouchPhase::Started if self.active.is_none() => {
                self.active = Some(id);
                Some(PointerEvent::TouchStarted(point))
            }
            TouchPhase::Moved if self.active == Some(id) => Some(PointerEvent::TouchMoved(point)),
            TouchPhase::Ended | TouchPhase::Cancelled if self.active == Some(id) => {
                self.active = None;
                Some(PointerEvent::TouchEnded)
            }
            _ => None,
        }
    }
}

/// More than a pixel off on either axis.
fn size_drifted(actual: PhysicalSize<u32>, desired: PhysicalSize<u32>) -> bool {
    actual.width.abs_diff(desired.width) > 1 || actual.height.abs_diff(desired.height) > 1
}
