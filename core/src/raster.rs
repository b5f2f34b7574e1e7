//! Decoded raster images as handed to the pipeline

use crate::error::{ConvertError, Result};

/// Channel sample storage
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    U8(Vec<u8>),
    U16(Vec<u16>),
}

impl Samples {
    pub fn len(&self) -> usize {
        match self {
            Samples::U8(data) => data.len(),
            Samples::U16(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Largest value a sample of this depth can hold
    pub fn max_value(&self) -> f32 {
        match self {
            Samples::U8(_) => u8::MAX as f32,
            Samples::U16(_) => u16::MAX as f32,
        }
    }

    #[inline]
    pub(crate) fn get(&self, index: usize) -> f32 {
        match self {
            Samples::U8(data) => data[index] as f32,
            Samples::U16(data) => data[index] as f32,
        }
    }
}

/// Immutable, row-major, interleaved raster image.
///
/// Channels are interpreted as gray (1), RGB (3) or RGBA (4). Other counts can
/// be constructed but are rejected by the height field extractor.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    channels: u8,
    samples: Samples,
}

impl RasterImage {
    /// Build an image, checking that the buffer matches the dimensions
    pub fn new(width: u32, height: u32, channels: u8, samples: Samples) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(channels as usize))
            .ok_or_else(|| {
                ConvertError::InvalidImage(format!(
                    "{}x{} image with {} channel(s) is too large to address",
                    width, height, channels
                ))
            })?;
        if samples.len() != expected {
            return Err(ConvertError::InvalidImage(format!(
                "{}x{} image with {} channel(s) needs {} samples, got {}",
                width,
                height,
                channels,
                expected,
                samples.len()
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            samples,
        })
    }

    pub fn from_u8(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Result<Self> {
        Self::new(width, height, channels, Samples::U8(data))
    }

    pub fn from_u16(width: u32, height: u32, channels: u8, data: Vec<u16>) -> Result<Self> {
        Self::new(width, height, channels, Samples::U16(data))
    }

    /// Single-channel 8-bit image
    pub fn gray(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        Self::from_u8(width, height, 1, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn samples(&self) -> &Samples {
        &self.samples
    }

    /// Samples for one row (all channels interleaved)
    pub(crate) fn row_range(&self, row: usize) -> std::ops::Range<usize> {
        let stride = self.width as usize * self.channels as usize;
        row * stride..(row + 1) * stride
    }
}
