use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::{DynamicImage, GrayImage, Luma};
use subocr::{Point, Quad, TextDetector, TextRecognizer};

pub const FRAME_WIDTH: u32 = 200;
pub const FRAME_HEIGHT: u32 = 100;

/// A word painted into a test frame: its rect in frame coordinates and the
/// gray level it is filled with.
#[derive(Debug, Clone)]
pub struct PaintedWord {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub level: u8,
    pub text: &'static str,
}

impl PaintedWord {
    pub fn quad(&self) -> Quad {
        let (l, t, r, b) = (self.left as f32, self.top as f32, self.right as f32, self.bottom as f32);
        Quad::new([Point::new(l, t), Point::new(r, t), Point::new(r, b), Point::new(l, b)])
    }
}

/// Words in detection order. "world" comes first but sits to the right of
/// "Hello" on the same line; "teh" is alone on a second line.
pub fn subtitle_words() -> Vec<PaintedWord> {
    vec![
        PaintedWord { left: 80, top: 62, right: 130, bottom: 78, level: 40, text: "world" },
        PaintedWord { left: 10, top: 64, right: 60, bottom: 80, level: 20, text: "Hello" },
        PaintedWord { left: 10, top: 84, right: 70, bottom: 98, level: 60, text: "teh" },
    ]
}

/// White frame with the given words painted in.
pub fn frame_with(words: &[PaintedWord]) -> DynamicImage {
    let img = GrayImage::from_fn(FRAME_WIDTH, FRAME_HEIGHT, |x, y| {
        words
            .iter()
            .find(|w| (w.left..w.right).contains(&x) && (w.top..w.bottom).contains(&y))
            .map(|w| Luma([w.level]))
            .unwrap_or(Luma([255]))
    });
    DynamicImage::ImageLuma8(img)
}

pub fn blank_frame() -> DynamicImage {
    frame_with(&[])
}

/// Detector that knows where the words are in the full frame and reports
/// them relative to whatever band it is handed (bands are always cut from
/// the bottom of the frame).
pub struct FakeDetector {
    pub words: Vec<PaintedWord>,
    pub calls: AtomicUsize,
}

impl FakeDetector {
    pub fn new(words: Vec<PaintedWord>) -> Self {
        Self { words, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextDetector for FakeDetector {
    fn detect(&self, frame: &DynamicImage) -> subocr::Result<Vec<Quad>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let offset = (FRAME_HEIGHT - frame.height()) as f32;
        Ok(self.words.iter().map(|w| w.quad().offset_y(-offset)).collect())
    }
}

/// Recognizer that identifies a crop by the gray level at its center.
pub struct FakeRecognizer {
    pub by_level: HashMap<u8, &'static str>,
}

impl FakeRecognizer {
    pub fn new(words: &[PaintedWord]) -> Self {
        Self {
            by_level: words.iter().map(|w| (w.level, w.text)).collect(),
        }
    }
}

impl TextRecognizer for FakeRecognizer {
    fn recognize(&self, image: &DynamicImage) -> subocr::Result<String> {
        let gray = image.to_luma8();
        let level = gray.get_pixel(gray.width() / 2, gray.height() / 2)[0];
        Ok(self.by_level.get(&level).copied().unwrap_or("?").to_string())
    }
}

pub fn typo_dictionary() -> subocr::CorrectionDictionary {
    subocr::CorrectionDictionary::from_entries([("teh", "the")])
}
