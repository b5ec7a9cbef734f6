use std::fmt;

use crate::geometry::{CanvasSize, ImageSize};

pub const DEFAULT_MOBILE_BREAKPOINT: f64 = 768.0;
pub const DEFAULT_MOBILE_WIDTH: f64 = 300.0;
pub const DEFAULT_DESKTOP_WIDTH: f64 = 500.0;

/// Coarse device bucket that drives canvas width and pointer reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Mobile,
    Desktop,
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceClass::Mobile => f.write_str("mobile"),
            DeviceClass::Desktop => f.write_str("desktop"),
        }
    }
}

/// What the host reports about the space the canvas lives in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Logical width of the viewport in pixels.
    pub width: f64,
    /// Whether the host accepts touch input.
    pub has_touch: bool,
}

impl Viewport {
    pub const fn new(width: f64, has_touch: bool) -> Self {
        Self { width, has_touch }
    }
}

/// Breakpoint and the two fixed canvas widths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutRules {
    pub mobile_breakpoint: f64,
    pub mobile_width: f64,
    pub desktop_width: f64,
}

impl Default for LayoutRules {
    fn default() -> Self {
        Self {
            mobile_breakpoint: DEFAULT_MOBILE_BREAKPOINT,
            mobile_width: DEFAULT_MOBILE_WIDTH,
            desktop_width: DEFAULT_DESKTOP_WIDTH,
        }
    }
}

impl LayoutRules {
    /// Mobile when the viewport is at or below the breakpoint, or touch-capable.
    pub fn classify(&self, viewport: Viewport) -> DeviceClass {
        if viewport.width <= self.mobile_breakpoint || viewport.has_touch {
            DeviceClass::Mobile
        } else {
            DeviceClass::Desktop
        }
    }

    pub fn canvas_width(&self, class: DeviceClass) -> f64 {
        match class {
            DeviceClass::Mobile => self.mobile_width,
            DeviceClass::Desktop => self.desktop_width,
        }
    }

    pub fn canvas_size(&self, class: DeviceClass, image: ImageSize) -> CanvasSize {
        CanvasSize::for_image(self.canvas_width(class), image)
    }
}

/// Classifies with the stock 768px breakpoint.
pub fn classify_device(viewport_width: f64, has_touch: bool) -> DeviceClass {
    LayoutRules::default().classify(Viewport::new(viewport_width, has_touch))
}
