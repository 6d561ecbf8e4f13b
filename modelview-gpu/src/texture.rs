//! Image textures with CPU-generated mipmaps

use std::path::{Path, PathBuf};

use image::{imageops, DynamicImage, RgbaImage};
use modelview_core::{Error, Result, TextureKind};

use crate::GpuContext;

/// Format used for every image texture
pub const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Color of the stand-in used when an image cannot be decoded
const PLACEHOLDER_COLOR: [u8; 4] = [255, 0, 255, 255];

/// A 2D texture loaded from an image file
pub struct Texture {
    pub path: PathBuf,
    pub kind: TextureKind,
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    /// True when this is a stand-in for an image that failed to load
    pub placeholder: bool,
}

impl Texture {
    /// Decode `path` and upload it with a full mip chain
    pub fn from_path(ctx: &GpuContext, path: &Path, kind: TextureKind) -> Result<Self> {
        let decoded = image::open(path)
            .map_err(|e| Error::Texture(format!("{}: {e}", path.display())))?;
        check_dimensions(
            decoded.width(),
            decoded.height(),
            ctx.device.limits().max_texture_dimension_2d,
        )
        .map_err(|e| Error::Texture(format!("{}: {e}", path.display())))?;

        // Three channels as stored on disk; wgpu needs four for upload
        let rgb = decoded.to_rgb8();
        let rgba = DynamicImage::ImageRgb8(rgb).to_rgba8();

        let (texture, view) = upload_rgba(ctx, &path.display().to_string(), &rgba);
        Ok(Self {
            path: path.to_path_buf(),
            kind,
            texture,
            view,
            placeholder: false,
        })
    }

    /// A 1x1 stand-in that keeps the slot of an image that failed to load
    pub fn placeholder(ctx: &GpuContext, path: &Path, kind: TextureKind) -> Self {
        let pixel = RgbaImage::from_pixel(1, 1, image::Rgba(PLACEHOLDER_COLOR));
        let (texture, view) = upload_rgba(ctx, "placeholder texture", &pixel);
        Self {
            path: path.to_path_buf(),
            kind,
            texture,
            view,
            placeholder: true,
        }
    }

    /// Load `path`, substituting a placeholder when decoding fails
    pub fn load_or_placeholder(ctx: &GpuContext, path: &Path, kind: TextureKind) -> Self {
        match Self::from_path(ctx, path, kind) {
            Ok(texture) => texture,
            Err(e) => {
                log::warn!("failed to load texture: {e}");
                Self::placeholder(ctx, path, kind)
            }
        }
    }

    /// Release the GPU image now rather than at drop
    pub fn destroy(&self) {
        self.texture.destroy();
    }
}

/// Reject images the device cannot hold in a single 2D texture
fn check_dimensions(width: u32, height: u32, max: u32) -> std::result::Result<(), String> {
    if width == 0 || height == 0 {
        return Err(format!("image is empty ({width}x{height})"));
    }
    if width > max || height > max {
        return Err(format!("image is {width}x{height}, the device limit is {max}"));
    }
    Ok(())
}

/// Upload `image` and every level of its mip chain
pub(crate) fn upload_rgba(
    ctx: &GpuContext,
    label: &str,
    image: &RgbaImage,
) -> (wgpu::Texture, wgpu::TextureView) {
    let levels = build_mip_chain(image);
    let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: image.width(),
            height: image.height(),
            depth_or_array_layers: 1,
        },
        mip_level_count: levels.len() as u32,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TEXTURE_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    for (level, pixels) in levels.iter().enumerate() {
        ctx.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: level as u32,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels.as_raw(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * pixels.width()),
                rows_per_image: Some(pixels.height()),
            },
            wgpu::Extent3d {
                width: pixels.width(),
                height: pixels.height(),
                depth_or_array_layers: 1,
            },
        );
    }

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

/// Sampler shared by all material textures: repeat wrapping, linear
/// magnification, nearest minification blended linearly between mip levels.
pub fn create_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("material sampler"),
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Nearest,
        mipmap_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}

/// Number of levels in a full mip chain down to 1x1
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// The image followed by successive half-size reductions down to 1x1
pub fn build_mip_chain(image: &RgbaImage) -> Vec<RgbaImage> {
    let count = mip_level_count(image.width(), image.height()) as usize;
    let mut levels = Vec::with_capacity(count);
    levels.push(image.clone());

    while levels.len() < count {
        let Some(previous) = levels.last() else { break };
        let width = (previous.width() / 2).max(1);
        let height = (previous.height() / 2).max(1);
        let next = imageops::resize(previous, width, height, imageops::FilterType::Triangle);
        levels.push(next);
    }
    levels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mip_level_count() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(0, 0), 1);
        assert_eq!(mip_level_count(2, 2), 2);
        assert_eq!(mip_level_count(256, 256), 9);
        assert_eq!(mip_level_count(300, 20), 9);
        assert_eq!(mip_level_count(1, 1024), 11);
    }

    #[test]
    fn test_check_dimensions() {
        assert!(check_dimensions(1, 1, 8192).is_ok());
        assert!(check_dimensions(8192, 8192, 8192).is_ok());

        let err = check_dimensions(16392, 1, 16384).unwrap_err();
        assert!(err.contains("16392x1"), "{err}");
        assert!(check_dimensions(1, 8193, 8192).is_err());
        assert!(check_dimensions(0, 4, 8192).is_err());
    }

    #[test]
    fn test_mip_chain_halves_down_to_one_pixel() {
        let image = RgbaImage::from_pixel(12, 5, image::Rgba([10, 20, 30, 255]));
        let chain = build_mip_chain(&image);

        let sizes: Vec<(u32, u32)> = chain.iter().map(|level| level.dimensions()).collect();
        assert_eq!(sizes, vec![(12, 5), (6, 2), (3, 1), (1, 1)]);

        // A flat color stays flat at every level
        for level in &chain {
            assert!(level.pixels().all(|p| p.0 == [10, 20, 30, 255]));
        }
    }
}
