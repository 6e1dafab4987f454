use crate::pipeline::{PipelineData, PipelineStep, PipelineContext, BoundingBox, MetadataValue};
use crate::config::{LineConfig, PreprocessConfig};
use crate::correction::CorrectionDictionary;
use crate::detection::{geometry, lines, preprocessing, region};
use crate::detection::ocr::{TextDetector, TextRecognizer};
use crate::models::{LineRecord, RecognizedBox, Rect, SubtitleRegion};
use anyhow::Result;
use image::DynamicImage;
use std::sync::Arc;
use tracing::debug;

/// Wrap a located subtitle band as the input item for the box steps.
pub fn band_item(frame: &DynamicImage, found: &SubtitleRegion) -> PipelineData {
    let band = region::crop_to_region(frame, found);
    // Offsets are relative to the original frame.
    let bbox = BoundingBox {
        x: 0,
        y: found.top,
        width: band.width(),
        height: band.height(),
    };
    PipelineData::from_region(band, Arc::new(frame.clone()), bbox)
        .with_metadata("region_top", MetadataValue::Int(found.top as i64))
}

/// Detect words in a band and split it into one item per box, in reading order
pub struct WordDetectionStep {
    pub detector: Arc<dyn TextDetector>,
    pub config: LineConfig,
}

impl PipelineStep for WordDetectionStep {
    fn process(&self, data: Vec<PipelineData>, context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();

        for item in data {
            let y_offset = item.bbox.as_ref().map(|b| b.y).unwrap_or(0) as f32;
            let quads: Vec<_> = self
                .detector
                .detect(&item.image)?
                .iter()
                .map(|q| q.offset_y(y_offset))
                .collect();
            let records = lines::cluster(&quads, &self.config);

            if context.verbose {
                println!("  Found {} boxes", records.len());
            }

            let (frame_w, frame_h) = (item.original.width(), item.original.height());
            let margin = self.config.crop_margin as i32;

            for (order, record) in records.iter().enumerate() {
                let Some((x, y, width, height)) =
                    geometry::clamp_to_image(&record.rect.expand(margin), frame_w, frame_h)
                else {
                    debug!(index = record.index, "Box lies outside the frame");
                    continue;
                };

                let cropped = item.original.crop_imm(x, y, width, height);
                let new_item = PipelineData::from_region(
                    cropped,
                    item.original.clone(),
                    BoundingBox { x, y, width, height },
                )
                .with_metadata("index", MetadataValue::Int(record.index as i64))
                .with_metadata("order", MetadataValue::Int(order as i64))
                .with_metadata("center", MetadataValue::Int(record.center as i64))
                .with_metadata("left", MetadataValue::Int(record.left() as i64))
                .with_metadata("top", MetadataValue::Int(record.top() as i64))
                .with_metadata("right", MetadataValue::Int(record.right() as i64))
                .with_metadata("bottom", MetadataValue::Int(record.bottom() as i64));

                result.push(new_item);
            }
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        "Word Detection"
    }
}

/// Binarize box crops ahead of recognition
pub struct BinarizeStep {
    pub config: PreprocessConfig,
}

impl PipelineStep for BinarizeStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        Ok(data
            .into_iter()
            .map(|mut item| {
                item.image = DynamicImage::ImageLuma8(preprocessing::binarize(&item.image, &self.config));
                item
            })
            .collect())
    }

    fn name(&self) -> &str {
        "Binarize"
    }
}

/// Run text recognition on each box crop
pub struct RecognitionStep {
    pub recognizer: Arc<dyn TextRecognizer>,
}

impl PipelineStep for RecognitionStep {
    fn process(&self, data: Vec<PipelineData>, context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let total = data.len();
        let mut result = Vec::with_capacity(total);

        for (i, item) in data.into_iter().enumerate() {
            if context.verbose && total > 5 {
                println!("  Processing item {} of {}...", i + 1, total);
            }

            let text = self.recognizer.recognize(&item.image)?;
            result.push(item.with_metadata("ocr_text", MetadataValue::String(text)));
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        "OCR Recognition"
    }
}

/// Apply the correction dictionary to recognized text
pub struct CorrectionStep {
    pub dictionary: Arc<CorrectionDictionary>,
}

impl PipelineStep for CorrectionStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        Ok(data
            .into_iter()
            .map(|item| {
                let text = item.get_string("ocr_text").unwrap_or_default();
                let corrected = self.dictionary.correct(text);
                item.with_metadata("corrected_text", MetadataValue::String(corrected))
            })
            .collect())
    }

    fn name(&self) -> &str {
        "Text Correction"
    }
}

/// Read a box item back as a recognized box.
/// Uses "corrected_text" when present, otherwise "ocr_text". Items that did
/// not come out of [`WordDetectionStep`] give `None`.
pub fn recognized_box(item: &PipelineData) -> Option<RecognizedBox> {
    let int = |key: &str| item.get_int(key).map(|v| v as i32);
    let record = LineRecord {
        index: item.get_int("index")? as usize,
        rect: Rect::new(int("left")?, int("top")?, int("right")?, int("bottom")?),
        center: int("center")?,
    };
    let text = item
        .get_string("corrected_text")
        .or(item.get_string("ocr_text"))
        .unwrap_or_default()
        .to_string();
    Some(RecognizedBox { record, text })
}
