//! Reading order for detected boxes.
//!
//! Boxes are first reduced to axis-aligned rectangles, then their vertical
//! centers are snapped into lines and the result is sorted top-to-bottom,
//! left-to-right.

use tracing::{debug, trace};

use crate::config::LineConfig;
use crate::detection::geometry::to_rect;
use crate::models::{LineRecord, Quad};

/// Snap each center onto its predecessor's when they differ by less than
/// `tolerance`.
///
/// This is a greedy forward pass: a box compares against the previous box's
/// already-snapped center, so a chain of close neighbours collapses onto the
/// first member even when the two ends are further apart than `tolerance`.
pub fn snap_centers(centers: &[i32], tolerance: i32) -> Vec<i32> {
    let mut snapped: Vec<i32> = Vec::with_capacity(centers.len());
    for &center in centers {
        let value = match snapped.last() {
            Some(&prev) if prev - tolerance < center && center < prev + tolerance => prev,
            _ => center,
        };
        snapped.push(value);
    }
    snapped
}

/// Order detected boxes for reading.
///
/// Each record keeps the box's position in `boxes` as its `index` so callers
/// can pair it back with recognized text.
pub fn cluster(boxes: &[Quad], config: &LineConfig) -> Vec<LineRecord> {
    let rects: Vec<_> = boxes.iter().map(to_rect).collect();
    let centers: Vec<i32> = rects.iter().map(|r| r.vertical_center()).collect();
    let snapped = snap_centers(&centers, config.snap_tolerance);

    let mut records: Vec<LineRecord> = rects
        .into_iter()
        .zip(snapped)
        .enumerate()
        .map(|(index, (rect, center))| LineRecord {
            index,
            rect,
            center,
        })
        .collect();

    // Stable: equal (center, left) keeps detection order.
    records.sort_by_key(|r| (r.center, r.rect.left));

    for record in &records {
        trace!(
            index = record.index,
            center = record.center,
            left = record.rect.left,
            "Ordered box"
        );
    }
    debug!(boxes = records.len(), "Clustered boxes into lines");
    records
}

/// Split items already in reading order into visual lines: runs that share a
/// snapped center.
pub fn group_lines<T>(items: &[T], center: impl Fn(&T) -> i32) -> Vec<&[T]> {
    items.chunk_by(|a, b| center(a) == center(b)).collect()
}
