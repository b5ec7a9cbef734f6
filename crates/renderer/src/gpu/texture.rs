use std::borrow::Cow;

use image::imageops::FilterType;
use wgpu::util::{DeviceExt, TextureDataOrder};

use crate::loader::SourceImage;

/// The sketch image bound as `uTexture`.
pub(crate) struct ImageTexture {
    pub _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl ImageTexture {
    /// Uploads the image rows top first, without flipping. Images larger than
    /// the device allows are downscaled; `uImageResolution` still reports the
    /// native size.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &SourceImage,
        max_dimension: u32,
    ) -> Self {
        let pixels = fit_within(&image.rgba, max_dimension);
        if let Cow::Owned(scaled) = &pixels {
            tracing::warn!(
                path = %image.path.display(),
                native_width = image.rgba.width(),
                native_height = image.rgba.height(),
                width = scaled.width(),
                height = scaled.height(),
                "image exceeds GPU texture limit; uploading a downscaled copy"
            );
        }

        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some("sketch image"),
                size: wgpu::Extent3d {
                    width: pixels.width(),
                    height: pixels.height(),
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            TextureDataOrder::LayerMajor,
            pixels.as_raw(),
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("sketch image sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            _texture: texture,
            view,
            sampler,
        }
    }
}

/// Returns the image untouched when it fits, otherwise a copy scaled down
/// with its aspect ratio kept.
fn fit_within(image: &image::RgbaImage, max_dimension: u32) -> Cow<'_, image::RgbaImage> {
    let (width, height) = image.dimensions();
    let longest = width.max(height);
    if longest <= max_dimension || max_dimension == 0 {
        return Cow::Borrowed(image);
    }
    let scale = f64::from(max_dimension) / f64::from(longest);
    let scaled_width = ((f64::from(width) * scale).round() as u32).clamp(1, max_dimension);
    let scaled_height = ((f64::from(height) * scale).round() as u32).clamp(1, max_dimension);
    Cow::Owned(image::imageops::resize(
        image,
        scaled_width,
        scaled_height,
        FilterType::Triangle,
    ))
}
