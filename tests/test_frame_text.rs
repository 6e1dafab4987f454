mod common;

use std::sync::Arc;

use common::*;

fn ocr_for(words: Vec<PaintedWord>) -> (SubtitleOcr, Arc<FakeDetector>) {
    let recognizer = Arc::new(FakeRecognizer::new(&words));
    let detector = Arc::new(FakeDetector::new(words));
    let ocr = SubtitleOcr::new(Config::default(), detector.clone(), recognizer)
        .with_dictionary(Arc::new(typo_dictionary()));
    (ocr, detector)
}

#[test]
fn reads_subtitle_in_reading_order() {
    let words = subtitle_words();
    let frame = frame_with(&words);
    let (ocr, _) = ocr_for(words);

    let result = ocr.process(&frame).unwrap();

    assert_eq!(result.region, SubtitleRegion { width: 200, height: 100, top: 60 });
    assert_eq!(result.text, "Hello world\nthe");

    let order: Vec<_> = result.boxes.iter().map(|b| b.record.index).collect();
    assert_eq!(order, vec![1, 0, 2]);
}

#[test]
fn boxes_are_reported_in_frame_coordinates() {
    let words = subtitle_words();
    let frame = frame_with(&words);
    let (ocr, _) = ocr_for(words);

    let result = ocr.process(&frame).unwrap();
    let hello = &result.boxes[0];
    assert_eq!(hello.text, "Hello");
    assert_eq!(hello.record.rect, Rect::new(10, 64, 60, 80));
    // "Hello" snapped onto the center of "world", which was detected first.
    assert_eq!(hello.record.center, 70);
}

#[test]
fn per_box_text_is_corrected() {
    let words = subtitle_words();
    let frame = frame_with(&words);
    let (ocr, _) = ocr_for(words);

    let result = ocr.process(&frame).unwrap();
    assert_eq!(result.boxes[2].text, "the");
}

#[test]
fn without_dictionary_text_is_raw() {
    let words = subtitle_words();
    let frame = frame_with(&words);
    let recognizer = Arc::new(FakeRecognizer::new(&words));
    let ocr = SubtitleOcr::new(Config::default(), Arc::new(FakeDetector::new(words)), recognizer);

    assert_eq!(ocr.process(&frame).unwrap().text, "Hello world\nteh");
}

#[test]
fn blank_frame_has_no_subtitle_and_skips_detection() {
    let (ocr, detector) = ocr_for(subtitle_words());

    let result = ocr.process(&blank_frame()).unwrap();

    assert!(result.region.is_empty(5));
    assert!(result.boxes.is_empty());
    assert_eq!(result.text, "");
    assert_eq!(detector.calls(), 0);
}

#[test]
fn frames_are_processed_independently_in_order() {
    let words = subtitle_words();
    let frames = vec![frame_with(&words), blank_frame(), frame_with(&words)];
    let (ocr, detector) = ocr_for(words);

    let results = ocr.process_frames(&frames).unwrap();

    let texts: Vec<_> = results.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["Hello world\nthe", "", "Hello world\nthe"]);
    assert_eq!(detector.calls(), 2);
}

#[test]
fn empty_frame_is_an_error() {
    let (ocr, _) = ocr_for(subtitle_words());
    let frame = image::DynamicImage::ImageLuma8(image::GrayImage::new(0, 0));
    assert!(matches!(ocr.process(&frame), Err(subocr::Error::EmptyFrame { .. })));
}

#[test]
fn wider_snap_tolerance_merges_lines() {
    // Every center lands within 30px of "world", so all boxes share a line and
    // "teh" keeps its place after "Hello" (same left, later detection).
    let words = subtitle_words();
    let frame = frame_with(&words);
    let recognizer = Arc::new(FakeRecognizer::new(&words));
    let mut config = Config::default();
    config.lines.snap_tolerance = 30;
    let ocr = SubtitleOcr::new(config, Arc::new(FakeDetector::new(words)), recognizer)
        .with_dictionary(Arc::new(typo_dictionary()));

    assert_eq!(ocr.process(&frame).unwrap().text, "Hello the world");
}

/// Detector that always fails the way a broken model would.
struct BrokenDetector;

impl TextDetector for BrokenDetector {
    fn detect(&self, _frame: &image::DynamicImage) -> subocr::Result<Vec<Quad>> {
        Err(subocr::Error::Engine {
            message: "model crashed".to_string(),
        })
    }
}

#[test]
fn detector_errors_keep_their_type() {
    let words = subtitle_words();
    let frame = frame_with(&words);
    let ocr = SubtitleOcr::new(
        Config::default(),
        Arc::new(BrokenDetector),
        Arc::new(FakeRecognizer::new(&words)),
    );

    let err = ocr.process(&frame).unwrap_err();
    assert!(matches!(err, subocr::Error::Engine { message } if message == "model crashed"));
}
