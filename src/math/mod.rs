//! Mathematical utilities for the model

/// Smoothing, normalization checks and inverse-CDF sampling
pub mod probability;
