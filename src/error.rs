//! Error types for glassbox operations.

use std::fmt;

/// Error type shared by every fallible operation in the crate.
#[derive(Debug, Clone, PartialEq)]
pub enum GlassboxError {
    /// Malformed input: empty rows, mismatched lengths, out-of-range
    /// parameters.
    InvalidInput {
        message: String,
    },

    /// The target has zero variance while the residuals are nonzero, so
    /// the coefficient of determination is undefined.
    DegenerateInput {
        message: String,
    },

    /// A selection asked for a depth the sweep never tried.
    DepthNotFound {
        depth: usize,
    },
}

impl fmt::Display for GlassboxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlassboxError::InvalidInput { message } => {
                write!(f, "Invalid input: {message}")
            }
            GlassboxError::DegenerateInput { message } => {
                write!(f, "Degenerate input: {message}")
            }
            GlassboxError::DepthNotFound { depth } => {
                write!(f, "Depth {depth} is not present in the sweep result")
            }
        }
    }
}

impl std::error::Error for GlassboxError {}

impl GlassboxError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn degenerate_input(message: impl Into<String>) -> Self {
        Self::DegenerateInput {
            message: message.into(),
        }
    }
}
