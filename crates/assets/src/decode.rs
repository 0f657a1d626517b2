use glimmer_gpu::{PixelFormat, TextureImage};
use std::path::{Path, PathBuf};

/// Raw decoded pixels, before a GPU format has been chosen.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// Pick the upload format from the channel count.
    pub fn into_texture_image(self, path: &Path) -> Result<TextureImage, DecodeError> {
        let format =
            PixelFormat::from_channels(self.channels).ok_or_else(|| DecodeError::UnsupportedChannels {
                path: path.to_path_buf(),
                channels: self.channels,
            })?;
        Ok(TextureImage {
            width: self.width,
            height: self.height,
            format,
            pixels: self.pixels,
        })
    }
}

/// Errors from image decoding.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("failed to decode {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("unsupported channel count {channels} in {path}")]
    UnsupportedChannels { path: PathBuf, channels: u8 },
}

/// The image-decode capability.
pub trait ImageDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedImage, DecodeError>;
}

/// Decodes image files from disk with the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileImageDecoder {
    /// Flip rows so the first row is the bottom of the image.
    pub flip_vertically: bool,
}

impl ImageDecoder for FileImageDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedImage, DecodeError> {
        let mut image = image::open(path).map_err(|source| DecodeError::Image {
            path: path.to_path_buf(),
            source,
        })?;
        if self.flip_vertically {
            image = image.flipv();
        }

        let (width, height) = (image.width(), image.height());
        let channels = image.color().channel_count();
        // Keep the channel count but normalise to 8 bits per channel.
        let pixels = match channels {
            1 => image.into_luma8().into_raw(),
            2 => image.into_luma_alpha8().into_raw(),
            3 => image.into_rgb8().into_raw(),
            _ => image.into_rgba8().into_raw(),
        };

        Ok(DecodedImage {
            width,
            height,
            channels,
            pixels,
        })
    }
}
