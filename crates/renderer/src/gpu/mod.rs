//! GPU side of the sketch.
//!
//! - `context` owns wgpu instance/device/surface wiring and reconfigures the
//!   swapchain when the canvas is resized.
//! - `texture` uploads the sketch image and its sampler.
//! - `pipeline` builds the rect vertex buffer, the bind group layouts and
//!   the single fill-only render pipeline.
//! - `uniforms` mirrors the uniform block declared by the wrapped GLSL.
//! - `state` glues everything together and exposes the `GpuState` API used
//!   by `window`. Each frame clears the whole surface and draws into the
//!   canvas placement's viewport.

mod context;
mod pipeline;
mod state;
mod texture;
mod uniforms;

pub(crate) use pipeline::ShaderPipeline;
pub(crate) use state::GpuState;
