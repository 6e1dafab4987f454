mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from subocr for tests
pub use subocr::{
    Config, CorrectionDictionary, FrameText, LineRecord, Point, Quad, Rect, SubtitleOcr,
    SubtitleRegion, TextDetector, TextRecognizer,
};
