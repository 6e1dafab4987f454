use std::borrow::Cow;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, instrument, trace};

use crate::config::RegionConfig;
use crate::error::{Error, Result};
use crate::models::SubtitleRegion;

/// Intensity samples of a frame in row-major order.
struct Samples<'a> {
    data: Cow<'a, [u8]>,
    row_len: usize,
}

impl<'a> Samples<'a> {
    fn of(frame: &'a DynamicImage) -> Self {
        let width = frame.width() as usize;
        match frame {
            DynamicImage::ImageLuma8(gray) => Self {
                data: Cow::Borrowed(gray.as_raw().as_slice()),
                row_len: width,
            },
            DynamicImage::ImageRgb8(rgb) => Self {
                data: Cow::Borrowed(rgb.as_raw().as_slice()),
                row_len: width * 3,
            },
            // Alpha does not carry intensity; everything else is reduced to RGB.
            other if other.color().has_color() => Self {
                data: Cow::Owned(other.to_rgb8().into_raw()),
                row_len: width * 3,
            },
            other => Self {
                data: Cow::Owned(other.to_luma8().into_raw()),
                row_len: width,
            },
        }
    }

    /// Mean and population standard deviation of rows `start..end`.
    fn band_stats(&self, start: usize, end: usize) -> (f64, f64) {
        let band = &self.data[start * self.row_len..end * self.row_len];
        let n = band.len() as f64;
        let (sum, sum_sq) = band.iter().fold((0u64, 0u64), |(s, sq), &v| {
            let v = v as u64;
            (s + v, sq + v * v)
        });
        let mean = sum as f64 / n;
        let variance = (sum_sq as f64 / n - mean * mean).max(0.0);
        (mean, variance.sqrt())
    }
}

/// Find the first row of the subtitle band.
///
/// The frame is scanned top-down in bands of `band_height` rows. The first
/// band that is darker than `mean_threshold` on average and has a standard
/// deviation above `stddev_threshold` marks the start. Only bands that fit
/// entirely above the last row are examined; a trailing partial band is never
/// scanned. When no band qualifies, `top` is the offset where the scan
/// stopped, which callers read as "no subtitle".
#[instrument(skip_all, fields(width = frame.width(), height = frame.height()))]
pub fn locate(frame: &DynamicImage, config: &RegionConfig) -> Result<SubtitleRegion> {
    let (width, height) = frame.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::EmptyFrame { width, height });
    }

    let d = config.band_height.max(1) as usize;
    let h = height as usize;
    let samples = Samples::of(frame);

    let mut index = 0usize;
    while (index + 1) * d < h {
        let (mean, stddev) = samples.band_stats(index * d, (index + 1) * d);
        trace!(band = index, mean, stddev, "Scanned band");
        if mean < config.mean_threshold && stddev > config.stddev_threshold {
            break;
        }
        index += 1;
    }

    let top = (index * d) as u32;
    debug!(top, "Located subtitle region");
    Ok(SubtitleRegion { width, height, top })
}

/// Crop a frame down to the located subtitle band.
pub fn crop_to_region(frame: &DynamicImage, region: &SubtitleRegion) -> DynamicImage {
    let top = region.top.min(frame.height());
    frame.crop_imm(0, top, frame.width(), frame.height() - top)
}
