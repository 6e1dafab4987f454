pub mod geometry;
pub mod lines;
pub mod ocr;
pub mod preprocessing;
pub mod region;
pub mod steps;

use std::path::PathBuf;
use std::sync::Arc;

use image::DynamicImage;
use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::config::Config;
use crate::correction::CorrectionDictionary;
use crate::error::{Error, Result};
use crate::models::{FrameText, RecognizedBox};
use crate::pipeline::Pipeline;
use self::ocr::{TextDetector, TextRecognizer};

/// Per-frame orchestrator: region, boxes, reading order, text, correction.
pub struct SubtitleOcr {
    pub config: Config,
    detector: Arc<dyn TextDetector>,
    recognizer: Arc<dyn TextRecognizer>,
    dictionary: Option<Arc<CorrectionDictionary>>,
    verbose: bool,
}

impl SubtitleOcr {
    pub fn new(
        config: Config,
        detector: Arc<dyn TextDetector>,
        recognizer: Arc<dyn TextRecognizer>,
    ) -> Self {
        Self {
            config,
            detector,
            recognizer,
            dictionary: None,
            verbose: false,
        }
    }

    pub fn with_dictionary(mut self, dictionary: Arc<CorrectionDictionary>) -> Self {
        self.dictionary = Some(dictionary);
        self
    }

    /// Print each pipeline step as it runs.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Run the full pass over one frame.
    pub fn process(&self, frame: &DynamicImage) -> Result<FrameText> {
        self.run(frame, self.pipeline())
    }

    /// Like [`process`](Self::process), also saving every step's images under
    /// `output_dir`, which must be empty or missing.
    pub fn process_with_debug(&self, frame: &DynamicImage, output_dir: PathBuf) -> Result<FrameText> {
        let pipeline = self
            .pipeline()
            .with_debug(output_dir)
            .map_err(Error::from_pipeline)?;
        self.run(frame, pipeline)
    }

    /// Process independent frames in parallel, keeping their order.
    pub fn process_frames(&self, frames: &[DynamicImage]) -> Result<Vec<FrameText>> {
        frames.par_iter().map(|frame| self.process(frame)).collect()
    }

    fn pipeline(&self) -> Pipeline {
        build_standard_pipeline(
            &self.config,
            self.detector.clone(),
            self.recognizer.clone(),
            self.dictionary.clone(),
            self.verbose,
        )
    }

    #[instrument(skip_all, fields(width = frame.width(), height = frame.height()))]
    fn run(&self, frame: &DynamicImage, pipeline: Pipeline) -> Result<FrameText> {
        let region = region::locate(frame, &self.config.region)?;
        if region.is_empty(self.config.region.band_height) {
            debug!(top = region.top, "No subtitle band found");
            return Ok(FrameText {
                region,
                boxes: Vec::new(),
                text: String::new(),
            });
        }

        let items = pipeline
            .run(vec![steps::band_item(frame, &region)])
            .map_err(Error::from_pipeline)?;
        let boxes: Vec<_> = items.iter().filter_map(steps::recognized_box).collect();

        let text = join_lines(&boxes);
        debug!(boxes = boxes.len(), lines = text.lines().count(), "Recognized frame");
        Ok(FrameText {
            region,
            boxes,
            text,
        })
    }
}

/// Join box texts: boxes on the same line with spaces, lines with newlines.
pub fn join_lines(boxes: &[RecognizedBox]) -> String {
    lines::group_lines(boxes, |b| b.record.center)
        .into_iter()
        .map(|line| {
            line.iter()
                .map(|b| b.text.as_str())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the standard step pipeline over a subtitle band item
/// ([`steps::band_item`]): word detection, binarization when enabled,
/// recognition and, when a dictionary is given, correction.
pub fn build_standard_pipeline(
    config: &Config,
    detector: Arc<dyn TextDetector>,
    recognizer: Arc<dyn TextRecognizer>,
    dictionary: Option<Arc<CorrectionDictionary>>,
    verbose: bool,
) -> Pipeline {
    use self::steps::*;

    let mut pipeline = Pipeline::new()
        .with_verbose(verbose)
        .add_step(Arc::new(WordDetectionStep {
            detector,
            config: config.lines.clone(),
        }));

    if config.preprocess.binarize {
        pipeline = pipeline.add_step(Arc::new(BinarizeStep {
            config: config.preprocess.clone(),
        }));
    }
    pipeline = pipeline.add_step(Arc::new(RecognitionStep { recognizer }));

    if let Some(dictionary) = dictionary {
        pipeline = pipeline.add_step(Arc::new(CorrectionStep { dictionary }));
    }
    pipeline
}
