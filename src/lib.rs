pub mod config;
pub mod correction;
pub mod detection;
pub mod error;
pub mod export;
pub mod models;
pub mod pipeline;
pub mod render;

pub use config::{Config, Overrides};
pub use correction::{CorrectionDictionary, correct};
pub use detection::SubtitleOcr;
pub use detection::ocr::{OcrsEngine, TextDetector, TextRecognizer};
pub use error::{Error, Result};
pub use models::{FrameText, LineRecord, Point, Quad, Rect, RecognizedBox, SubtitleRegion};
pub use pipeline::{
    BoundingBox, DebugConfig, MetadataValue, Pipeline, PipelineContext, PipelineData, PipelineStep,
};
