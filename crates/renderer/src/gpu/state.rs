use std::time::{Duration, Instant};

use anyhow::Result;
use canvas::FrameUniforms;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use tracing::debug;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::compile::WrappedProgram;
use crate::loader::SourceImage;
use crate::placement::CanvasPlacement;
use crate::types::SurfaceAlpha;

use super::context::GpuContext;
use super::pipeline::{PipelineLayouts, ShaderPipeline, RECT_VERTICES};
use super::texture::ImageTexture;
use super::uniforms::SketchUniforms;

/// Surface, image and uniform resources for one sketch window.
///
/// Exists from the moment the image is on the GPU; the program is built
/// later and handed back in on every [`GpuState::render`].
pub(crate) struct GpuState {
    context: GpuContext,
    layouts: PipelineLayouts,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    image_bind_group: wgpu::BindGroup,
    _image: ImageTexture,
    frame_count: u64,
    frames_since_last_update: u32,
    last_fps_update: Instant,
}

impl GpuState {
    pub(crate) fn new<T>(
        target: &T,
        size: PhysicalSize<u32>,
        surface_alpha: SurfaceAlpha,
        image: &SourceImage,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(target, size, surface_alpha)?;
        let layouts = PipelineLayouts::new(&context.device);

        let uniforms = <SketchUniforms as bytemuck::Zeroable>::zeroed();
        let uniform_buffer = context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("sketch uniforms"),
                contents: bytemuck::bytes_of(&uniforms),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let uniform_bind_group = context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("uniform bind group"),
                layout: &layouts.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });

        let texture = ImageTexture::new(
            &context.device,
            &context.queue,
            image,
            context.max_texture_dimension,
        );
        let image_bind_group = layouts.image_bind_group(&context.device, &texture);

        Ok(Self {
            context,
            layouts,
            uniform_buffer,
            uniform_bind_group,
            image_bind_group,
            _image: texture,
            frame_count: 0,
            frames_since_last_update: 0,
            last_fps_update: Instant::now(),
        })
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.context.resize(new_size);
    }

    pub(crate) fn reconfigure(&mut self) {
        self.context.reconfigure();
    }

    pub(crate) fn build_pipeline(&self, program: &WrappedProgram) -> Result<ShaderPipeline> {
        ShaderPipeline::new(
            &self.context.device,
            &self.layouts,
            self.context.surface_format,
            program,
        )
    }

    /// Writes the frame's uniforms, clears the whole surface, and draws the
    /// canvas rect into `placement`.
    pub(crate) fn render(
        &mut self,
        pipeline: &ShaderPipeline,
        frame: &FrameUniforms,
        placement: &CanvasPlacement,
    ) -> Result<(), wgpu::SurfaceError> {
        let output = self.context.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let uniforms = SketchUniforms::new(frame, placement.frag_origin());
        self.context
            .queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("sketch frame"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sketch pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_viewport(
                placement.x,
                placement.y,
                placement.width,
                placement.height,
                0.0,
                1.0,
            );
            render_pass.set_pipeline(&pipeline.pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.set_bind_group(1, &self.image_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.layouts.rect_buffer.slice(..));
            render_pass.draw(0..RECT_VERTICES.len() as u32, 0..1);
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        self.record_frame(frame);
        Ok(())
    }

    fn record_frame(&mut self, frame: &FrameUniforms) {
        self.frame_count += 1;
        self.frames_since_last_update += 1;
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.last_fps_update);
        if elapsed >= Duration::from_secs(1) {
            let fps = self.frames_since_last_update as f32 / elapsed.as_secs_f32();
            debug!(
                fps = fps.round(),
                frame_count = self.frame_count,
                millis = frame.millis,
                mouse_x = frame.mouse[0],
                mouse_y = frame.mouse[1],
                "render stats"
            );
            self.frames_since_last_update = 0;
            self.last_fps_update = now;
        }
    }
}
