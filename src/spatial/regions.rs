//! Sprite region extraction from alpha connectivity
//!
//! Opaque pixels are grouped into 4-connected components by flood fill and each
//! component is reported as its tight bounding rectangle. Rectangles are
//! bounding boxes, not masks, so they may contain transparent holes.

use crate::spatial::buffer::{PixelBuffer, Point, Rect};
use bitvec::prelude::*;
use log::debug;
use std::collections::HashSet;

/// 4-connected neighbour offsets visited by the flood fill
pub const NEIGHBOR_OFFSETS: [(i32, i32); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];

/// Per-pixel record of which pixels fall inside an emitted rectangle
///
/// Gives constant-time "already covered" checks; membership is identical to
/// scanning every emitted rectangle.
struct CoverageMap {
    bits: BitVec,
    width: usize,
}

impl CoverageMap {
    fn new(width: usize, height: usize) -> Self {
        Self {
            bits: bitvec![0; width * height],
            width,
        }
    }

    fn is_covered(&self, point: Point) -> bool {
        self.bit_index(point)
            .and_then(|index| self.bits.get(index).as_deref().copied())
            .unwrap_or(false)
    }

    fn cover(&mut self, rect: Rect) {
        for point in rect.points() {
            if let Some(index) = self.bit_index(point) {
                self.bits.set(index, true);
            }
        }
    }

    fn bit_index(&self, point: Point) -> Option<usize> {
        let x = usize::try_from(point.x).ok()?;
        let y = usize::try_from(point.y).ok()?;
        let index = y * self.width + x;
        (x < self.width && index < self.bits.len()).then_some(index)
    }
}

/// Finds the bounding rectangles of opaque sprite regions
#[derive(Clone, Copy, Debug, Default)]
pub struct RegionExtractor;

impl RegionExtractor {
    /// Create an extractor
    pub const fn new() -> Self {
        Self
    }

    /// Extract pairwise disjoint rectangles covering every opaque pixel
    ///
    /// Pixels are seeded in raster order. A seed that already lies inside an
    /// emitted rectangle is skipped. When a new component's bounding box would
    /// overlap an earlier rectangle the two are merged into their union, so the
    /// result never contains overlapping rectangles.
    pub fn extract(&self, buffer: &PixelBuffer) -> Vec<Rect> {
        let mut coverage = CoverageMap::new(buffer.width(), buffer.height());
        let mut regions: Vec<Rect> = Vec::new();
        let mut merges = 0usize;

        for (point, color) in buffer.enumerate() {
            if color.is_transparent() || coverage.is_covered(point) {
                continue;
            }

            let mut region = flood_fill(buffer, point);
            while let Some(position) = regions.iter().position(|r| r.intersects(&region)) {
                let absorbed = regions.remove(position);
                region = region.union(&absorbed);
                merges += 1;
            }

            coverage.cover(region);
            regions.push(region);
        }

        debug!(
            "extracted {} region(s) from {}x{} buffer ({merges} merge(s))",
            regions.len(),
            buffer.width(),
            buffer.height()
        );
        regions
    }
}

/// Tight bounding box of the 4-connected opaque component containing `seed`
pub fn flood_fill(buffer: &PixelBuffer, seed: Point) -> Rect {
    let mut open = vec![seed];
    let mut closed = HashSet::from([seed]);

    while let Some(current) = open.pop() {
        for (dx, dy) in NEIGHBOR_OFFSETS {
            let next = current.offset(dx, dy);
            if buffer.alpha(next.x, next.y) != 0 && closed.insert(next) {
                open.push(next);
            }
        }
    }

    let mut min = seed;
    let mut max = seed;
    for point in &closed {
        min.x = min.x.min(point.x);
        min.y = min.y.min(point.y);
        max.x = max.x.max(point.x);
        max.y = max.y.max(point.y);
    }
    Rect::from_corners(min, max)
}
