//! Diagnostic renderings of synthesis traces and extracted regions

use crate::algorithm::synthesizer::Synthesis;
use crate::io::error::Result;
use crate::spatial::buffer::{Color, PixelBuffer, Rect};

/// Grey intensity for a probability, clamped to `[0, 1]`
pub fn probability_to_grey(probability: f64) -> u8 {
    (probability.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Remap every pixel to a grey proportional to the probability it was drawn with
///
/// Pixels written by the fallback policy render black.
///
/// # Errors
///
/// Returns `InvalidBuffer` if the synthesis trace is empty
pub fn probability_map(synthesis: &Synthesis) -> Result<PixelBuffer> {
    let (height, width) = synthesis.probabilities.dim();
    let mut map = PixelBuffer::new(width, height)?;
    for ((row, col), &probability) in synthesis.probabilities.indexed_iter() {
        map.set(
            col as i32,
            row as i32,
            Color::grey(probability_to_grey(probability)),
        );
    }
    Ok(map)
}

/// Copy of `buffer` with a one-pixel outline drawn along each region's edge
pub fn region_overlay(buffer: &PixelBuffer, regions: &[Rect], outline: Color) -> PixelBuffer {
    let mut overlay = buffer.clone();
    for region in regions {
        for point in region.points() {
            let on_edge = point.x == region.x
                || point.y == region.y
                || point.x == region.right() - 1
                || point.y == region.bottom() - 1;
            if on_edge {
                overlay.set(point.x, point.y, outline);
            }
        }
    }
    overlay
}
