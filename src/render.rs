//! Geometry for drawing corrected text back over a frame.
//!
//! Font loading and glyph rasterization live behind [`TextPainter`]; this
//! module decides where the text goes and clears the area under it.

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect as DrawRect;

use crate::models::{LineRecord, Rect};

/// Padding around the background rectangle.
const BACKGROUND_PADDING: i32 = 2;

/// Extra pixels between consecutive lines of text.
const LINE_SPACING: i32 = 4;

/// Measures rendered text.
pub trait GlyphMetrics {
    /// Width in pixels of `text` drawn at `font_size`.
    fn text_width(&self, text: &str, font_size: u32) -> u32;
}

/// Rasterizes text onto an image.
pub trait TextPainter: GlyphMetrics {
    fn draw_text(&self, image: &mut RgbaImage, x: i32, y: i32, font_size: u32, text: &str);
}

/// Where and how large to draw a block of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayLayout {
    /// Top-left corner of the first line of text.
    pub origin: (i32, i32),
    pub font_size: u32,
    /// Area cleared before drawing.
    pub background: Rect,
}

impl OverlayLayout {
    /// Plan an overlay for `text` over the boxes of one subtitle.
    ///
    /// The font size follows the height of the first box; the background
    /// spans from the first box to the bottom of the last one and is as wide
    /// as the longest line. Returns `None` without records.
    pub fn plan(records: &[LineRecord], text: &str, metrics: &dyn GlyphMetrics) -> Option<Self> {
        let first = records.first()?;
        let last = records.last()?;

        let font_size = (first.rect.height() - 2).max(1) as u32;
        let longest = text
            .split('\n')
            .fold("", |longest, line| {
                if line.chars().count() > longest.chars().count() {
                    line
                } else {
                    longest
                }
            });
        let max_width = metrics.text_width(longest, font_size) as i32;

        let (left, top) = (first.left(), first.top());
        Some(Self {
            origin: (left, top),
            font_size,
            background: Rect::new(
                left - BACKGROUND_PADDING,
                top - BACKGROUND_PADDING,
                left + max_width + BACKGROUND_PADDING,
                last.bottom() + BACKGROUND_PADDING,
            ),
        })
    }
}

/// Fill the layout's background rectangle with white, including its right
/// and bottom edges.
pub fn paint_background(image: &mut RgbaImage, layout: &OverlayLayout) {
    let bg = &layout.background;
    let (width, height) = (bg.width().max(0) as u32 + 1, bg.height().max(0) as u32 + 1);
    draw_filled_rect_mut(
        image,
        DrawRect::at(bg.left, bg.top).of_size(width, height),
        Rgba([255, 255, 255, 255]),
    );
}

/// Clear the background and draw `text` line by line, each line
/// `font_size + 4` pixels below the previous one.
pub fn draw_overlay(image: &mut RgbaImage, layout: &OverlayLayout, text: &str, painter: &dyn TextPainter) {
    paint_background(image, layout);
    let (x, mut y) = layout.origin;
    for line in text.split('\n') {
        painter.draw_text(image, x, y, layout.font_size, line);
        y += layout.font_size as i32 + LINE_SPACING;
    }
}
