//! Spatial data structures and region extraction
//!
//! This module contains spatial-related functionality including:
//! - Pixel buffers and integer geometry
//! - Flood-fill extraction of opaque sprite regions

/// Pixel buffer, colors, points and rectangles
pub mod buffer;
/// Connected-component extraction of opaque regions
pub mod regions;

pub use buffer::{Color, PixelBuffer, Point, Rect};
pub use regions::RegionExtractor;
