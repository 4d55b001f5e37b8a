//! Turning training pixels into model observations

/// Causal neighbourhoods and context keys
pub mod context;
/// Channel quantization
pub mod quantizer;
/// Training driver over extracted regions
pub mod training;
