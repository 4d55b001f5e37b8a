/// Context counts, smoothing and sampling
pub mod model;
/// Raster-order generation and multi-pass refinement
pub mod synthesizer;
