//! Host-independent core of the sketch.
//!
//! - `device` decides between the mobile and desktop layouts and derives the
//!   canvas size from the image's aspect ratio.
//! - `geometry` holds pixel-space types and pointer normalisation.
//! - `pointer` is the sticky pointer state machine with its two input
//!   policies.
//! - `startup` sequences image load and program compilation.
//! - `sketch` ties layout and input together and captures per-frame uniforms.
//!
//! Nothing here touches the GPU or the windowing system; `renderer` drives
//! these types from its event loop.

mod device;
mod geometry;
mod pointer;
mod sketch;
mod startup;

pub use device::{
    classify_device, DeviceClass, LayoutRules, Viewport, DEFAULT_DESKTOP_WIDTH,
    DEFAULT_MOBILE_BREAKPOINT, DEFAULT_MOBILE_WIDTH,
};
pub use geometry::{normalize_axis, CanvasSize, GeometryError, ImageSize, Point};
pub use pointer::{Handled, InputPolicy, PointerEvent, PointerState};
pub use sketch::{FrameUniforms, Sketch};
pub use startup::{Startup, StartupError, StartupPhase};
