use bytemuck::{Pod, Zeroable};
use canvas::FrameUniforms;

/// CPU mirror of the `ReeferParams` block in the wrapped GLSL header.
#[repr(C, align(16))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SketchUniforms {
    pub resolution: [f32; 2],
    pub image_resolution: [f32; 2],
    pub mouse: [f32; 2],
    /// Framebuffer position of the canvas's bottom-left corner, used to
    /// remap `gl_FragCoord`.
    pub frag_origin: [f32; 2],
    pub millis: f32,
    pub _padding: [f32; 3],
}

unsafe impl Zeroable for SketchUniforms {}
unsafe impl Pod for SketchUniforms {}

impl SketchUniforms {
    pub fn new(frame: &FrameUniforms, frag_origin: [f32; 2]) -> Self {
        Self {
            resolution: frame.resolution,
            image_resolution: frame.image_resolution,
            mouse: frame.mouse,
            frag_origin,
            millis: frame.millis,
            _padding: [0.0; 3],
        }
    }
}
