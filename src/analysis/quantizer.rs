//! Channel quantization onto a small ordered set of levels
//!
//! A channel value maps to the index of the first threshold at or above it, so
//! `n` thresholds give an alphabet of `n + 1` levels. Level 0 dequantizes to 0
//! rather than to the first threshold; every other level dequantizes to its
//! threshold, and the level past the last threshold to 255.

use crate::io::configuration::{DEFAULT_GREYSCALE, DEFAULT_THRESHOLDS, MAX_QUANTIZATION_LEVELS};
use crate::io::error::{Result, invalid_parameter};
use crate::spatial::buffer::Color;
use std::fmt;

/// Quantized summary of one pixel as seen by a context
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Atom {
    /// Outside the current region, or not generated yet
    Outside,
    /// Fully transparent pixel
    Empty,
    /// Single luma level (greyscale mode)
    Grey(u8),
    /// Per-channel levels (color mode)
    Rgb([u8; 3]),
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outside => write!(f, "_"),
            Self::Empty => write!(f, "."),
            Self::Grey(level) => write!(f, "{level}"),
            Self::Rgb([r, g, b]) => write!(f, "({r}{g}{b})"),
        }
    }
}

/// Maps channel values to discrete levels and back
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorQuantizer {
    thresholds: Vec<u8>,
    greyscale: bool,
}

impl Default for ColorQuantizer {
    fn default() -> Self {
        Self {
            thresholds: DEFAULT_THRESHOLDS.to_vec(),
            greyscale: DEFAULT_GREYSCALE,
        }
    }
}

impl ColorQuantizer {
    /// Create a quantizer from strictly ascending thresholds
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the thresholds are empty, not strictly
    /// ascending, or produce more levels than an atom can hold
    pub fn new(thresholds: Vec<u8>, greyscale: bool) -> Result<Self> {
        if thresholds.is_empty() {
            return Err(invalid_parameter(
                "thresholds",
                &"[]",
                &"at least one threshold is required",
            ));
        }
        if thresholds.len() >= MAX_QUANTIZATION_LEVELS {
            return Err(invalid_parameter(
                "thresholds",
                &thresholds.len(),
                &format!("at most {} thresholds", MAX_QUANTIZATION_LEVELS - 1),
            ));
        }
        if thresholds.windows(2).any(|pair| pair.first() >= pair.last()) {
            return Err(invalid_parameter(
                "thresholds",
                &format!("{thresholds:?}"),
                &"thresholds must be strictly ascending",
            ));
        }
        Ok(Self {
            thresholds,
            greyscale,
        })
    }

    /// Configured thresholds
    pub fn thresholds(&self) -> &[u8] {
        &self.thresholds
    }

    /// Whether colors collapse to a single luma channel
    pub const fn is_greyscale(&self) -> bool {
        self.greyscale
    }

    /// Size of the level alphabet
    pub const fn levels(&self) -> usize {
        self.thresholds.len() + 1
    }

    /// Level of a channel value
    pub fn quantize(&self, value: u8) -> u8 {
        self.thresholds
            .iter()
            .position(|&threshold| threshold >= value)
            .unwrap_or(self.thresholds.len()) as u8
    }

    /// Representative channel value of a level
    pub fn dequantize(&self, level: u8) -> u8 {
        if level == 0 {
            return 0;
        }
        self.thresholds
            .get(usize::from(level))
            .copied()
            .unwrap_or(u8::MAX)
    }

    /// Quantized atom for a pixel color
    pub fn atom(&self, color: Color) -> Atom {
        if color.is_transparent() {
            Atom::Empty
        } else if self.greyscale {
            Atom::Grey(self.quantize(color.luma()))
        } else {
            Atom::Rgb([
                self.quantize(color.red()),
                self.quantize(color.green()),
                self.quantize(color.blue()),
            ])
        }
    }

    /// Snap a color to the representative of its quantized level
    ///
    /// Alpha passes through unchanged; fully transparent colors become
    /// [`Color::TRANSPARENT`].
    pub fn filter(&self, color: Color) -> Color {
        match self.atom(color) {
            Atom::Grey(level) => {
                let value = self.dequantize(level);
                Color::rgba(value, value, value, color.alpha())
            }
            Atom::Rgb([r, g, b]) => Color::rgba(
                self.dequantize(r),
                self.dequantize(g),
                self.dequantize(b),
                color.alpha(),
            ),
            Atom::Empty | Atom::Outside => Color::TRANSPARENT,
        }
    }
}
