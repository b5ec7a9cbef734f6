//! Pixel-space primitives shared by layout, input and uniform capture.
//!
//! All canvas measurements are logical pixels. Image sizes are the native
//! pixel dimensions of the decoded bitmap.

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GeometryError {
    #[error("image dimensions must be non-zero (got {width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}

/// Native dimensions of the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    width: u32,
    height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Result<Self, GeometryError> {
        if width == 0 || height == 0 {
            return Err(GeometryError::EmptyImage { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    pub fn as_uniform(&self) -> [f32; 2] {
        [self.width as f32, self.height as f32]
    }
}

/// A position in canvas space, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Logical size of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    /// Sizes a canvas of the given width so it keeps the image's proportions.
    pub fn for_image(width: f64, image: ImageSize) -> Self {
        Self {
            width,
            height: width / image.aspect_ratio(),
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn as_uniform(&self) -> [f32; 2] {
        [self.width as f32, self.height as f32]
    }

    /// Maps a canvas position into `[-1, 1]` on both axes.
    pub fn normalize(&self, point: Point) -> [f32; 2] {
        [
            normalize_axis(point.x, self.width) as f32,
            normalize_axis(point.y, self.height) as f32,
        ]
    }
}

/// `(raw / dimension) * 2 - 1`, with `raw` clamped into `[0, dimension]`.
///
/// Positions outside the canvas (a cursor that left the window) pin to the
/// nearest edge. A degenerate dimension maps to the centre.
pub fn normalize_axis(raw: f64, dimension: f64) -> f64 {
    if dimension <= 0.0 || raw.is_nan() {
        return 0.0;
    }
    let clamped = raw.clamp(0.0, dimension);
    (clamped / dimension) * 2.0 - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_images() {
        assert_eq!(
            ImageSize::new(0, 10),
            Err(GeometryError::EmptyImage {
                width: 0,
                height: 10
            })
        );
        assert!(ImageSize::new(10, 0).is_err());
    }

    #[test]
    fn canvas_keeps_image_proportions() {
        let image = ImageSize::new(800, 400).unwrap();
        let canvas = CanvasSize::for_image(500.0, image);
        assert_eq!(canvas.height, 250.0);

        let tall = ImageSize::new(300, 900).unwrap();
        let canvas = CanvasSize::for_image(300.0, tall);
        assert_eq!(canvas.height, 900.0);
    }

    #[test]
    fn normalize_hits_both_edges_and_centre() {
        assert_eq!(normalize_axis(0.0, 500.0), -1.0);
        assert_eq!(normalize_axis(500.0, 500.0), 1.0);
        assert_eq!(normalize_axis(250.0, 500.0), 0.0);
        assert_eq!(normalize_axis(125.0, 500.0), -0.5);
    }

    #[test]
    fn normalize_clamps_positions_outside_canvas() {
        assert_eq!(normalize_axis(-40.0, 300.0), -1.0);
        assert_eq!(normalize_axis(900.0, 300.0), 1.0);
        assert_eq!(normalize_axis(f64::NAN, 300.0), 0.0);
        assert_eq!(normalize_axis(10.0, 0.0), 0.0);
    }

    #[test]
    fn normalize_matches_closed_form() {
        let canvas = CanvasSize {
            width: 300.0,
            height: 150.0,
        };
        for (x, y) in [(0.0, 0.0), (30.0, 15.0), (299.0, 1.0), (150.0, 149.5)] {
            let [nx, ny] = canvas.normalize(Point::new(x, y));
            assert!((f64::from(nx) - (2.0 * x / 300.0 - 1.0)).abs() < 1e-6);
            assert!((f64::from(ny) - (2.0 * y / 150.0 - 1.0)).abs() < 1e-6);
        }
    }
}
