//! Model constants and runtime configuration defaults

use crate::algorithm::synthesizer::FallbackPolicy;
use crate::analysis::context::ContextEncoder;
use crate::io::error::{Result, invalid_parameter};

/// Ascending channel thresholds; four thresholds give five levels
pub const DEFAULT_THRESHOLDS: [u8; 4] = [0x40, 0x80, 0xB0, 0xFF];

/// Collapse RGB to a single luma channel before quantization
pub const DEFAULT_GREYSCALE: bool = true;

/// Causal neighbourhood reach (order 1 is up-left, up, left)
pub const DEFAULT_ORDER: usize = 1;

/// Positional zones per axis of a region (0 disables bucketing)
pub const DEFAULT_POSITION_BUCKETS: usize = 4;

/// Additive smoothing bias applied to every observed count
pub const DEFAULT_SMOOTHING_BIAS: f64 = 3.0;

/// Number of synthesis passes (1 disables refinement)
pub const DEFAULT_PASSES: usize = 1;

/// Fixed seed for reproducible generation
pub const DEFAULT_SEED: u64 = 42;

/// Generated sprite width in pixels
pub const DEFAULT_OUTPUT_WIDTH: usize = 160;

/// Generated sprite height in pixels
pub const DEFAULT_OUTPUT_HEIGHT: usize = 40;

/// Nearest-neighbour magnification applied to exported images
pub const DEFAULT_EXPORT_SCALE: usize = 1;

// Atom levels are stored in a u8
/// Maximum number of quantization levels
pub const MAX_QUANTIZATION_LEVELS: usize = 251;

// Neighbourhood size grows as (2k + 1)^2
/// Maximum causal order
pub const MAX_CAUSAL_ORDER: usize = 8;

/// Maximum positional zones per axis
pub const MAX_POSITION_BUCKETS: usize = 64;

/// Maximum synthesis passes
pub const MAX_PASSES: usize = 64;

/// Maximum export magnification
pub const MAX_EXPORT_SCALE: usize = 64;

/// Allowed distance of a finalized distribution's sum from one
pub const NORMALIZATION_TOLERANCE: f64 = 1e-4;

// Output settings
/// Suffix added to generated image filenames
pub const OUTPUT_SUFFIX: &str = "_generated";
/// Suffix added to probability map filenames
pub const PROBABILITY_SUFFIX: &str = "_probability";
/// Suffix of the directory receiving region crops
pub const CROPS_SUFFIX: &str = "_crops";
/// Suffix added to region overlay filenames
pub const OVERLAY_SUFFIX: &str = "_regions";
/// Outline color of region overlays
pub const OVERLAY_COLOR: [u8; 4] = [0xFF, 0x00, 0xFF, 0xFF];

// Progress bar display settings
/// Threshold for switching to batch progress mode
pub const MAX_INDIVIDUAL_PROGRESS_BARS: usize = 5;

/// Every tunable of extraction, training and synthesis in one value
///
/// Threaded into component constructors; nothing reads configuration from
/// global state.
#[derive(Clone, Debug, PartialEq)]
pub struct SynthesisConfig {
    /// Ascending quantization thresholds
    pub thresholds: Vec<u8>,
    /// Quantize luma instead of separate channels
    pub greyscale: bool,
    /// Causal order used when `offsets` is `None`
    pub order: usize,
    /// Explicit causal offsets overriding `order`
    pub offsets: Option<Vec<(i32, i32)>>,
    /// Positional zones per axis, 0 to disable
    pub position_buckets: usize,
    /// Additive smoothing bias
    pub smoothing_bias: f64,
    /// Synthesis passes
    pub passes: usize,
    /// Policy for contexts never seen in training
    pub fallback: FallbackPolicy,
    /// Seed of the random source
    pub seed: u64,
    /// Output width in pixels
    pub width: usize,
    /// Output height in pixels
    pub height: usize,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            thresholds: DEFAULT_THRESHOLDS.to_vec(),
            greyscale: DEFAULT_GREYSCALE,
            order: DEFAULT_ORDER,
            offsets: None,
            position_buckets: DEFAULT_POSITION_BUCKETS,
            smoothing_bias: DEFAULT_SMOOTHING_BIAS,
            passes: DEFAULT_PASSES,
            fallback: FallbackPolicy::default(),
            seed: DEFAULT_SEED,
            width: DEFAULT_OUTPUT_WIDTH,
            height: DEFAULT_OUTPUT_HEIGHT,
        }
    }
}

impl SynthesisConfig {
    /// Check every option before any work starts
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` naming the first option that is out of range
    pub fn validate(&self) -> Result<()> {
        ContextEncoder::from_config(self)?;

        if !self.smoothing_bias.is_finite() || self.smoothing_bias < 0.0 {
            return Err(invalid_parameter(
                "smoothing_bias",
                &self.smoothing_bias,
                &"bias must be finite and non-negative",
            ));
        }
        if self.passes == 0 || self.passes > MAX_PASSES {
            return Err(invalid_parameter(
                "passes",
                &self.passes,
                &format!("passes must be between 1 and {MAX_PASSES}"),
            ));
        }
        if self.width == 0 || self.height == 0 {
            return Err(invalid_parameter(
                "dimensions",
                &format!("{}x{}", self.width, self.height),
                &"output dimensions must be positive",
            ));
        }
        Ok(())
    }
}
