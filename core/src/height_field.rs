//! Height field extraction: raster image -> normalized luminance grid

use rayon::prelude::*;

use crate::config::LuminanceWeights;
use crate::error::{ConvertError, Result};
use crate::raster::RasterImage;

/// Row-major grid of samples in `[0, 1]`, one per source pixel
#[derive(Debug, Clone, PartialEq)]
pub struct HeightField {
    width: u32,
    height: u32,
    samples: Vec<f32>,
}

impl HeightField {
    /// Build a field directly from samples (clamped to `[0, 1]`)
    pub fn from_samples(width: u32, height: u32, samples: Vec<f32>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if samples.len() != expected {
            return Err(ConvertError::InvalidHeightField(format!(
                "{}x{} field needs {} samples, got {}",
                width,
                height,
                expected,
                samples.len()
            )));
        }
        let samples = samples
            .into_iter()
            .map(|s| if s.is_nan() { 0.0 } else { s.clamp(0.0, 1.0) })
            .collect();
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn sample(&self, row: u32, col: u32) -> f32 {
        self.samples[row as usize * self.width as usize + col as usize]
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}

/// Convert a raster image into a height field of identical dimensions.
///
/// Single-channel images pass straight through. RGB(A) pixels are weighted
/// with `weights` (alpha is ignored). Every sample is divided by the maximum
/// value representable at the image's bit depth.
pub fn extract_height_field(image: &RasterImage, weights: &LuminanceWeights) -> Result<HeightField> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(ConvertError::InvalidImage(format!(
            "image must be at least 1x1, got {}x{}",
            width, height
        )));
    }

    let channels = image.channels() as usize;
    if !matches!(channels, 1 | 3 | 4) {
        return Err(ConvertError::InvalidImage(format!(
            "unsupported channel count {} (expected 1, 3 or 4)",
            channels
        )));
    }

    if channels != 1 {
        weights.validate()?;
    }

    let [wr, wg, wb] = weights.normalized();
    let samples = image.samples();
    let max = samples.max_value();

    let mut field = vec![0.0f32; width as usize * height as usize];
    field
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(row, out)| {
            let base = image.row_range(row).start;
            for (col, value) in out.iter_mut().enumerate() {
                let px = base + col * channels;
                let luma = if channels == 1 {
                    samples.get(px)
                } else {
                    wr * samples.get(px) + wg * samples.get(px + 1) + wb * samples.get(px + 2)
                };
                let normalized = luma / max;
                *value = if normalized.is_nan() { 0.0 } else { normalized.clamp(0.0, 1.0) };
            }
        });

    tracing::debug!("Extracted {}x{} height field", width, height);

    Ok(HeightField {
        width,
        height,
        samples: field,
    })
}
