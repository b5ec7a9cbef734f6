use canvas::{CanvasSize, Point};
use winit::dpi::{PhysicalPosition, PhysicalSize};

/// Where the canvas is drawn inside the window surface, in physical pixels.
///
/// The canvas keeps its computed size and sits centred when the window
/// system hands us a larger surface. A smaller surface shrinks it uniformly,
/// so the drawn area always has the image's aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CanvasPlacement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    canvas: CanvasSize,
}

impl CanvasPlacement {
    pub fn new(surface: PhysicalSize<u32>, canvas: CanvasSize, scale_factor: f64) -> Self {
        let surface_width = f64::from(surface.width.max(1));
        let surface_height = f64::from(surface.height.max(1));
        let desired_width = canvas.width * scale_factor;
        let desired_height = canvas.height * scale_factor;
        if desired_width <= 0.0 || desired_height <= 0.0 {
            return Self::covering(surface_width, surface_height, canvas);
        }

        let shrink = (surface_width / desired_width)
            .min(surface_height / desired_height)
            .min(1.0);
        let width = desired_width * shrink;
        let height = desired_height * shrink;
        Self {
            x: ((surface_width - width) / 2.0).floor() as f32,
            y: ((surface_height - height) / 2.0).floor() as f32,
            width: width as f32,
            height: height as f32,
            canvas,
        }
    }

    fn covering(width: f64, height: f64, canvas: CanvasSize) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            canvas,
        }
    }

    /// Maps a surface position onto canvas coordinates. Positions outside
    /// the drawn area land outside the canvas and are clamped later.
    pub fn to_canvas(&self, position: PhysicalPosition<f64>) -> Point {
        let x = (position.x - f64::from(self.x)) / f64::from(self.width) * self.canvas.width;
        let y = (position.y - f64::from(self.y)) / f64::from(self.height) * self.canvas.height;
        Point::new(x, y)
    }

    /// Framebuffer position of the canvas's bottom-left corner.
    pub fn frag_origin(&self) -> [f32; 2] {
        [self.x, self.y + self.height]
    }

    /// Whether the surface shows more than the canvas.
    pub fn is_inset(&self, surface: PhysicalSize<u32>) -> bool {
        self.x > 0.0
            || self.y > 0.0
            || (self.width as u32) < surface.width
            || (self.height as u32) < surface.height
    }
}
