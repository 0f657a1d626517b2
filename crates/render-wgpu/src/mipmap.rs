use glimmer_gpu::{PixelFormat, TextureImage};
use image::imageops::{self, FilterType};
use image::{GrayImage, RgbImage, RgbaImage};

/// Every texture is uploaded in this format.
pub const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// One level of a mip chain, tightly packed RGBA8.
#[derive(Debug, Clone, PartialEq)]
pub struct MipLevel {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MipError {
    #[error("texture {width}x{height} exceeds the device limit of {max} texels per side")]
    TooLarge { width: u32, height: u32, max: u32 },
    #[error("texture {width}x{height} has a zero side or {bytes} bytes of pixel data that do not match")]
    BadData { width: u32, height: u32, bytes: usize },
}

/// Expand `image` to RGBA and build the full chain down to 1x1.
///
/// Single-channel images become grey (`r, r, r, 1`), so a one-channel
/// specular map scales all three colour channels. Images with a side longer
/// than `max_dimension` are rejected before any pixel is touched.
pub fn mip_chain(image: &TextureImage, max_dimension: u32) -> Result<Vec<MipLevel>, MipError> {
    let (w, h) = (image.width, image.height);
    if w > max_dimension || h > max_dimension {
        return Err(MipError::TooLarge {
            width: w,
            height: h,
            max: max_dimension,
        });
    }
    let bad_data = || MipError::BadData {
        width: w,
        height: h,
        bytes: image.pixels.len(),
    };
    if w == 0 || h == 0 {
        return Err(bad_data());
    }
    let base = match image.format {
        PixelFormat::R8 => {
            let gray = GrayImage::from_raw(w, h, image.pixels.clone()).ok_or_else(bad_data)?;
            image::DynamicImage::ImageLuma8(gray).into_rgba8()
        }
        PixelFormat::Rgb8 => {
            let rgb = RgbImage::from_raw(w, h, image.pixels.clone()).ok_or_else(bad_data)?;
            image::DynamicImage::ImageRgb8(rgb).into_rgba8()
        }
        PixelFormat::Rgba8 => {
            RgbaImage::from_raw(w, h, image.pixels.clone()).ok_or_else(bad_data)?
        }
    };

    let count = image.mip_level_count() as usize;
    let mut levels = Vec::with_capacity(count);
    let mut current = base;
    for level in 0..count {
        if level > 0 {
            let (next_w, next_h) = ((current.width() / 2).max(1), (current.height() / 2).max(1));
            current = imageops::resize(&current, next_w, next_h, FilterType::Triangle);
        }
        levels.push(MipLevel {
            width: current.width(),
            height: current.height(),
            pixels: current.as_raw().clone(),
        });
    }
    Ok(levels)
}
