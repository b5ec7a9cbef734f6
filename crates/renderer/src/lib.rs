//! Native host for the reefer sketch.
//!
//! A `winit` window stands in for the browser canvas and the monitor it sits
//! on stands in for the viewport. Startup runs in two asynchronous stages:
//! the image is decoded on a worker thread, the window is opened at the
//! canvas size derived from it, then the WebGL-style shader pair is read,
//! wrapped into GLSL 450 and compiled through naga into a `wgpu` pipeline.
//! From then on every redraw captures [`canvas::FrameUniforms`], clears the
//! surface to transparent black and draws one rect over the whole canvas.
//!
//! - `compile` rewrites the shader pair and validates it with naga.
//! - `gpu` owns the device, surface, image texture and pipeline.
//! - `loader` decodes the image and reads shader text off the event loop.
//! - `placement` fits the canvas inside whatever surface the window gets.
//! - `runtime` provides the `millis` clock and frame pacing.
//! - `window` is the event loop that ties it all to `canvas`.

mod compile;
mod gpu;
mod loader;
mod placement;
mod runtime;
mod types;
mod window;

use anyhow::Result;

pub use compile::{check_program, validate_stage, wrap_program, ProgramError, Stage, WrappedProgram};
pub use loader::{load_image, load_program_sources, probe_image_size, ProgramSources, SourceImage};
pub use runtime::{
    time_source_for_policy, BoxedTimeSource, FixedTimeSource, FrameScheduler, RenderPolicy,
    SystemTimeSource, TimeSample, TimeSource,
};
pub use types::{RendererConfig, SurfaceAlpha, TouchCapability, FALLBACK_VIEWPORT_WIDTH};

/// Entry point used by the binary.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Runs the sketch until its window closes.
    ///
    /// Returns the load or compile error when startup fails; there is no
    /// retry.
    pub fn run(&mut self) -> Result<()> {
        tracing::info!(
            title = %self.config.title,
            input = ?self.config.input,
            touch = ?self.config.touch,
            policy = ?self.config.policy,
            "starting sketch"
        );
        window::run(self.config.clone())
    }
}
