use image::{DynamicImage, GrayImage};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use imageproc::filter::gaussian_blur_f32;

use crate::config::PreprocessConfig;

/// Reduce a box crop to a clean two-level image for recognition.
///
/// Pixels brighter than `binary_threshold` become background (black) and the
/// rest text (white); Otsu thresholding then settles the levels, before and
/// after the optional blur.
pub fn binarize(img: &DynamicImage, config: &PreprocessConfig) -> GrayImage {
    let gray = img.to_luma8();
    let inverted = threshold(&gray, config.binary_threshold, ThresholdType::BinaryInverted);
    let binary = otsu(&inverted);
    if config.blur_sigma > 0.0 {
        otsu(&gaussian_blur_f32(&binary, config.blur_sigma))
    } else {
        otsu(&binary)
    }
}

fn otsu(img: &GrayImage) -> GrayImage {
    threshold(img, otsu_level(img), ThresholdType::Binary)
}
