use crate::errors::{HistogramError, Result};
use serde::{Deserialize, Serialize};

/// Number of intensity levels per channel.
pub const BUCKET_COUNT: usize = 256;

/// Number of color channels tracked by the histogram.
pub const CHANNEL_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    pub const ALL: [Channel; CHANNEL_COUNT] = [Channel::Red, Channel::Green, Channel::Blue];

    /// Position of the channel inside an RGB triple.
    pub fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Channel::Red => "red",
            Channel::Green => "green",
            Channel::Blue => "blue",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Decoded RGB8 image, row-major, three bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wraps packed RGB8 data. The data length must match the dimensions;
    /// zero-sized buffers are allowed here and rejected by the sampler.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * CHANNEL_COUNT;
        if data.len() != expected {
            return Err(HistogramError::invalid_image(format!(
                "expected {} bytes for {}x{} RGB, got {}",
                expected,
                width,
                height,
                data.len()
            )));
        }
        Ok(Self { width, height, data })
    }

    pub fn from_pixels(width: u32, height: u32, pixels: &[[u8; 3]]) -> Result<Self> {
        let data = pixels.iter().flat_map(|p| p.iter().copied()).collect();
        Self::new(width, height, data)
    }

    /// Builds a buffer from wider-range channel values, rejecting anything above 255.
    pub fn from_wide(width: u32, height: u32, values: &[u16]) -> Result<Self> {
        let data = values
            .iter()
            .enumerate()
            .map(|(index, &value)| {
                u8::try_from(value).map_err(|_| HistogramError::ValueOutOfRange { index, value })
            })
            .collect::<Result<Vec<u8>>>()?;
        Self::new(width, height, data)
    }

    /// Builds a buffer from wider-range channel values, clamping anything above 255.
    pub fn from_wide_clamped(width: u32, height: u32, values: &[u16]) -> Result<Self> {
        let data = values.iter().map(|&v| v.min(u8::MAX as u16) as u8).collect();
        Self::new(width, height, data)
    }

    pub fn from_image(image: &image::DynamicImage) -> Self {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();
        Self {
            width,
            height,
            data: rgb.into_raw(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Packed RGB bytes for rows `start_row..end_row`.
    pub(crate) fn rows(&self, start_row: u32, end_row: u32) -> &[u8] {
        let stride = self.width as usize * CHANNEL_COUNT;
        &self.data[start_row as usize * stride..end_row as usize * stride]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_mismatch_is_invalid_image() {
        let err = PixelBuffer::new(2, 2, vec![0; 11]).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_IMAGE");
    }

    #[test]
    fn test_from_wide_rejects_out_of_range() {
        let err = PixelBuffer::from_wide(1, 1, &[10, 256, 3]).unwrap_err();
        match err {
            HistogramError::ValueOutOfRange { index, value } => {
                assert_eq!(index, 1);
                assert_eq!(value, 256);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_from_wide_clamped() {
        let buffer = PixelBuffer::from_wide_clamped(1, 1, &[10, 4095, 255]).unwrap();
        assert_eq!(buffer.as_raw(), &[10, 255, 255]);
    }

    #[test]
    fn test_from_image_drops_alpha() {
        let img = image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            2,
            1,
            image::Rgba([1, 2, 3, 4]),
        ));
        let buffer = PixelBuffer::from_image(&img);
        assert_eq!(buffer.as_raw(), &[1, 2, 3, 1, 2, 3]);
        assert_eq!(buffer.pixel_count(), 2);
    }
}
