use std::path::PathBuf;

use canvas::{InputPolicy, LayoutRules};

use crate::runtime::RenderPolicy;

/// Used when neither the config nor the platform can tell us the width of
/// the monitor.
pub const FALLBACK_VIEWPORT_WIDTH: f64 = 1280.0;

/// Where the touch-capability half of the device signal comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TouchCapability {
    /// No touch until the first touch event arrives, then touch for good.
    #[default]
    Detect,
    Always,
    Never,
}

impl TouchCapability {
    /// Resolves the touch half of the device signal given whether a touch
    /// event has arrived yet.
    pub fn has_touch(self, touch_seen: bool) -> bool {
        match self {
            TouchCapability::Always => true,
            TouchCapability::Never => false,
            TouchCapability::Detect => touch_seen,
        }
    }
}

/// Declares how the compositor should treat the swapchain alpha channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceAlpha {
    /// Cleared pixels show as black.
    #[default]
    Opaque,
    /// Cleared pixels let the desktop show through where supported.
    Transparent,
}

/// Immutable configuration passed to the renderer at start-up.
///
/// `RendererConfig` mirrors the merged CLI flags and config file: which
/// assets to load, how the canvas is laid out and how input is read.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Window title.
    pub title: String,
    /// Image bound to `uTexture`.
    pub image: PathBuf,
    /// WebGL-style vertex shader.
    pub vertex_shader: PathBuf,
    /// WebGL-style fragment shader.
    pub fragment_shader: PathBuf,
    pub layout: LayoutRules,
    pub input: InputPolicy,
    pub touch: TouchCapability,
    /// Viewport width to classify against instead of the monitor's.
    pub viewport_width: Option<f64>,
    pub surface_alpha: SurfaceAlpha,
    /// Clock and pacing behaviour.
    pub policy: RenderPolicy,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            title: "Coming soon".to_string(),
            image: PathBuf::from("assets/images/coming-soon.png"),
            vertex_shader: PathBuf::from("assets/scripts/reefer.vert"),
            fragment_shader: PathBuf::from("assets/scripts/reefer.frag"),
            layout: LayoutRules::default(),
            input: InputPolicy::default(),
            touch: TouchCapability::default(),
            viewport_width: None,
            surface_alpha: SurfaceAlpha::default(),
            policy: RenderPolicy::default(),
        }
    }
}
