//! Sampled 2D textures.

use crate::error::{EngineError, EngineResult};

/// An RGBA8 texture with its default view and a nearest/clamp sampler.
pub struct Texture {
    raw: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    width: u32,
    height: u32,
}

impl Texture {
    /// Uploads tightly packed RGBA8 rows (first row at the top).
    ///
    /// Sampling uses nearest filtering and clamps to the edge on both axes.
    /// Sizes beyond the device's 2D limit are rejected before any GPU call.
    pub fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> EngineResult<Self> {
        check_upload(
            width,
            height,
            pixels.len(),
            device.limits().max_texture_dimension_2d,
        )?;

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let raw = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &raw,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = raw.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        log::debug!("texture `{label}` uploaded ({width}x{height})");

        Ok(Self {
            raw,
            view,
            sampler,
            width,
            height,
        })
    }

    #[inline]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    #[inline]
    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Releases GPU memory now instead of when the last handle drops.
    pub fn dispose(self) {
        self.raw.destroy();
    }
}

fn check_upload(width: u32, height: u32, len: usize, max_dimension: u32) -> EngineResult<()> {
    let expected = width as usize * height as usize * 4;
    if width == 0 || height == 0 || len != expected {
        return Err(EngineError::TextureSize { expected, got: len });
    }
    if width > max_dimension || height > max_dimension {
        return Err(EngineError::TextureLimit {
            width,
            height,
            max: max_dimension,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: u32 = 8192;

    #[test]
    fn packed_rgba_within_limit_is_accepted() {
        assert!(check_upload(640, 480, 640 * 480 * 4, MAX).is_ok());
        assert!(check_upload(MAX, 1, MAX as usize * 4, MAX).is_ok());
    }

    #[test]
    fn short_or_empty_data_is_a_size_error() {
        assert!(matches!(
            check_upload(2, 2, 15, MAX),
            Err(EngineError::TextureSize { expected: 16, got: 15 })
        ));
        assert!(matches!(
            check_upload(0, 4, 0, MAX),
            Err(EngineError::TextureSize { .. })
        ));
    }

    #[test]
    fn oversized_image_is_rejected_before_upload() {
        let wide = MAX + 1;
        match check_upload(wide, 1, wide as usize * 4, MAX) {
            Err(EngineError::TextureLimit { width, height, max }) => {
                assert_eq!((width, height, max), (wide, 1, MAX));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            check_upload(1, wide, wide as usize * 4, MAX),
            Err(EngineError::TextureLimit { .. })
        ));
    }
}
