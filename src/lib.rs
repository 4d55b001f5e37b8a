//! Sprite-sheet region extraction and causal Markov texture synthesis
//!
//! Opaque sprites are located in a sheet by flood fill, their pixels train a
//! Markov chain conditioned on quantized causal neighbourhoods, and new
//! sprite-like buffers are sampled from that chain in raster order.

#![forbid(unsafe_code)]

/// Markov model and raster-order synthesis
pub mod algorithm;
/// Quantization, context encoding and training
pub mod analysis;
/// Input/output operations, configuration and error handling
pub mod io;
/// Mathematical utilities for smoothing and sampling
pub mod math;
/// Pixel buffers, geometry and region extraction
pub mod spatial;

pub use io::error::{Result, SpriteError};
