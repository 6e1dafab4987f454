use image::DynamicImage;
use ocrs::{ImageSource, OcrEngine, OcrEngineParams};
use rten::Model;
use tracing::{debug, info, instrument};

use crate::config::ModelConfig;
use crate::error::{Error, Result};
use crate::models::{Point, Quad};

/// Finds text boxes in a frame.
pub trait TextDetector: Send + Sync {
    fn detect(&self, frame: &DynamicImage) -> Result<Vec<Quad>>;
}

/// Reads the text inside a cropped box.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image: &DynamicImage) -> Result<String>;
}

/// Detection and recognition backed by the `ocrs` engine.
pub struct OcrsEngine {
    engine: OcrEngine,
}

impl OcrsEngine {
    /// Load detection and recognition models from the configured directory.
    #[instrument(skip_all)]
    pub fn load(config: &ModelConfig) -> Result<Self> {
        let dir = config.model_dir().ok_or_else(|| Error::ModelNotFound {
            path: config.detection.clone().into(),
        })?;
        let detection_model_path = dir.join(&config.detection);
        let recognition_model_path = dir.join(&config.recognition);

        for path in [&detection_model_path, &recognition_model_path] {
            if !path.exists() {
                return Err(Error::ModelNotFound { path: path.clone() });
            }
        }

        debug!(path = %detection_model_path.display(), "Loading detection model");
        let detection_model = Model::load_file(&detection_model_path).map_err(Error::engine)?;
        debug!(path = %recognition_model_path.display(), "Loading recognition model");
        let recognition_model = Model::load_file(&recognition_model_path).map_err(Error::engine)?;

        let engine = OcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(Error::engine)?;
        info!("OCR engine initialized");

        Ok(Self { engine })
    }

    fn prepare(&self, image: &DynamicImage) -> Result<ocrs::OcrInput> {
        let rgb = image.to_rgb8();
        let source = ImageSource::from_bytes(rgb.as_raw(), rgb.dimensions()).map_err(Error::engine)?;
        self.engine.prepare_input(source).map_err(Error::engine)
    }
}

impl TextDetector for OcrsEngine {
    fn detect(&self, frame: &DynamicImage) -> Result<Vec<Quad>> {
        let input = self.prepare(frame)?;
        let words = self.engine.detect_words(&input).map_err(Error::engine)?;
        debug!(words = words.len(), "Detected words");
        Ok(words
            .iter()
            .map(|word| Quad::new(word.corners().map(|p| Point::new(p.x, p.y))))
            .collect())
    }
}

impl TextRecognizer for OcrsEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<String> {
        let input = self.prepare(image)?;
        let text = self.engine.get_text(&input).map_err(Error::engine)?;
        Ok(text.trim().to_string())
    }
}
