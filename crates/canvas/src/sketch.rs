use crate::device::{DeviceClass, LayoutRules, Viewport};
use crate::geometry::{CanvasSize, ImageSize};
use crate::pointer::{Handled, InputPolicy, PointerEvent, PointerState};

/// Everything the sketch remembers between frames.
///
/// Fields only change through the transition methods below; the renderer
/// reads the result via [`FrameUniforms::capture`].
#[derive(Debug, Clone, PartialEq)]
pub struct Sketch {
    rules: LayoutRules,
    image: ImageSize,
    viewport: Viewport,
    device: DeviceClass,
    canvas: CanvasSize,
    pointer: PointerState,
}

impl Sketch {
    /// Sizes the canvas for the viewport and parks the pointer at its centre.
    pub fn new(
        image: ImageSize,
        viewport: Viewport,
        rules: LayoutRules,
        policy: InputPolicy,
    ) -> Self {
        let device = rules.classify(viewport);
        let canvas = rules.canvas_size(device, image);
        tracing::info!(
            %device,
            viewport_width = viewport.width,
            has_touch = viewport.has_touch,
            width = canvas.width,
            height = canvas.height,
            "canvas sized"
        );
        Self {
            rules,
            image,
            viewport,
            device,
            canvas,
            pointer: PointerState::new(policy, canvas.center()),
        }
    }

    pub fn image(&self) -> ImageSize {
        self.image
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn device(&self) -> DeviceClass {
        self.device
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    /// Reclassifies the device and re-derives the canvas.
    ///
    /// Returns `true` when the canvas size changed and the surface needs a
    /// resize. The pointer keeps its raw position.
    pub fn viewport_changed(&mut self, viewport: Viewport) -> bool {
        self.viewport = viewport;
        let device = self.rules.classify(viewport);
        let canvas = self.rules.canvas_size(device, self.image);
        if device != self.device {
            tracing::info!(
                from = %self.device,
                to = %device,
                viewport_width = viewport.width,
                has_touch = viewport.has_touch,
                "device class changed"
            );
        }
        self.device = device;
        let changed = canvas != self.canvas;
        if changed {
            tracing::debug!(
                width = canvas.width,
                height = canvas.height,
                "canvas resized"
            );
        }
        self.canvas = canvas;
        changed
    }

    pub fn pointer_event(&mut self, event: PointerEvent) -> Handled {
        self.pointer.apply(event)
    }
}

/// Values pushed into the shader for one frame.
///
/// `uTexture` is not part of the snapshot: the image sampler is bound once
/// and stays bound for the life of the program.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    /// `millis`: elapsed milliseconds since the sketch started.
    pub millis: f32,
    /// `uMouse`: pointer in `[-1, 1]` per axis.
    pub mouse: [f32; 2],
    /// `uResolution`: canvas size in logical pixels.
    pub resolution: [f32; 2],
    /// `uImageResolution`: native image size.
    pub image_resolution: [f32; 2],
}

impl FrameUniforms {
    pub fn capture(sketch: &Sketch, elapsed_ms: f32) -> Self {
        let canvas = sketch.canvas();
        let position = sketch.pointer().read(sketch.device());
        Self {
            millis: elapsed_ms,
            mouse: canvas.normalize(position),
            resolution: canvas.as_uniform(),
            image_resolution: sketch.image().as_uniform(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn desktop_sketch(policy: InputPolicy) -> Sketch {
        Sketch::new(
            ImageSize::new(800, 400).unwrap(),
            Viewport::new(1200.0, false),
            LayoutRules::default(),
            policy,
        )
    }

    #[test]
    fn fresh_sketch_points_at_centre() {
        let sketch = desktop_sketch(InputPolicy::Direct);
        let uniforms = FrameUniforms::capture(&sketch, 0.0);
        assert_eq!(uniforms.mouse, [0.0, 0.0]);
        assert_eq!(uniforms.resolution, [500.0, 250.0]);
        assert_eq!(uniforms.image_resolution, [800.0, 400.0]);
    }

    #[test]
    fn viewport_change_reports_resize_only_when_needed() {
        let mut sketch = desktop_sketch(InputPolicy::Direct);
        assert!(!sketch.viewport_changed(Viewport::new(1600.0, false)));
        assert!(sketch.viewport_changed(Viewport::new(700.0, false)));
        assert_eq!(sketch.device(), DeviceClass::Mobile);
        assert!(!sketch.viewport_changed(Viewport::new(2000.0, true)));
        assert_eq!(sketch.viewport(), Viewport::new(2000.0, true));
    }

    #[test]
    fn pointer_keeps_raw_position_across_resize() {
        let mut sketch = desktop_sketch(InputPolicy::Direct);
        let _ = sketch.pointer_event(PointerEvent::CursorMoved(Point::new(150.0, 75.0)));
        sketch.viewport_changed(Viewport::new(400.0, false));
        assert_eq!(sketch.pointer().sticky(), Point::new(150.0, 75.0));
        let uniforms = FrameUniforms::capture(&sketch, 1.0);
        assert_eq!(uniforms.mouse, [0.0, 0.0]);
    }

    #[test]
    fn capture_is_pure() {
        let mut sketch = desktop_sketch(InputPolicy::DragGated);
        let _ = sketch.pointer_event(PointerEvent::CursorMoved(Point::new(400.0, 50.0)));
        let first = FrameUniforms::capture(&sketch, 1234.5);
        let second = FrameUniforms::capture(&sketch, 1234.5);
        assert_eq!(first, second);
    }
}
