/// Command-line parsing and batch driver
pub mod cli;
/// Constants and runtime configuration
pub mod configuration;
/// Error types and path context
pub mod error;
/// PNG loading and export
pub mod image;
/// Progress display for batch training
pub mod progress;
/// Probability maps and region overlays
pub mod visualization;
