//! Error types and path context for extraction, training and synthesis

use std::fmt;
use std::path::{Path, PathBuf};

/// Main error type for all sprite operations
#[derive(Debug)]
pub enum SpriteError {
    /// Failed to load a training image from the filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Buffer dimensions or pixel data are unusable
    InvalidBuffer {
        /// Requested width
        width: usize,
        /// Requested height
        height: usize,
        /// Description of what is wrong with the buffer
        reason: String,
    },

    /// Generation requested from a model without a single trained context
    NoTrainingData,

    /// Sampling requested for a context never observed during training
    UnknownContext {
        /// Rendered context key
        context: String,
    },

    /// A finalized distribution does not sum to one
    ///
    /// Indicates a smoothing or aggregation defect, not bad input.
    DegenerateDistribution {
        /// Rendered context key
        context: String,
        /// Actual probability sum
        total: f64,
    },

    /// Probabilities requested before `finalize`, or after further training
    ModelNotFinalized,

    /// Parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Failed to save an image to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl fmt::Display for SpriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::InvalidBuffer {
                width,
                height,
                reason,
            } => {
                write!(f, "Invalid {width}x{height} buffer: {reason}")
            }
            Self::NoTrainingData => {
                write!(f, "No training data: the model has no trained contexts")
            }
            Self::UnknownContext { context } => {
                write!(f, "Context '{context}' was never observed during training")
            }
            Self::DegenerateDistribution { context, total } => {
                write!(
                    f,
                    "Distribution of context '{context}' sums to {total} instead of 1"
                )
            }
            Self::ModelNotFinalized => {
                write!(f, "Model probabilities are missing or stale; call finalize")
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for SpriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for sprite results
pub type Result<T> = std::result::Result<T, SpriteError>;

/// Placeholder path used by `From` conversions until a real path is attached
pub const UNKNOWN_PATH: &str = "<unknown>";

/// Attaches the real path to I/O errors converted without one
pub trait WithPath<T> {
    /// Replace an unknown path in the error with `path`
    ///
    /// # Errors
    ///
    /// Propagates the original error with the path applied
    fn with_path(self, path: &Path) -> Result<T>;
}

impl<T, E> WithPath<T> for std::result::Result<T, E>
where
    E: Into<SpriteError>,
{
    fn with_path(self, path: &Path) -> Result<T> {
        self.map_err(|e| {
            let mut error = e.into();
            // Only errors produced through `From` carry the placeholder
            if let SpriteError::ImageLoad { path: target, .. }
            | SpriteError::ImageExport { path: target, .. }
            | SpriteError::FileSystem { path: target, .. } = &mut error
                && target.as_os_str() == UNKNOWN_PATH
            {
                *target = path.to_path_buf();
            }
            error
        })
    }
}

impl From<image::ImageError> for SpriteError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageLoad {
            path: PathBuf::from(UNKNOWN_PATH),
            source: err,
        }
    }
}

impl From<std::io::Error> for SpriteError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from(UNKNOWN_PATH),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> SpriteError {
    SpriteError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create an invalid buffer error
pub fn invalid_buffer(width: usize, height: usize, reason: &impl ToString) -> SpriteError {
    SpriteError::InvalidBuffer {
        width,
        height,
        reason: reason.to_string(),
    }
}
