//! Error types for prior box generation.

use thiserror::Error;

/// Errors raised while generating prior boxes.
///
/// Generation is pure arithmetic, so the only failure is an input that would make
/// it divide by zero.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PriorError {
    /// Error indicating an input that cannot be used to compute priors.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// A message describing the invalid input.
        message: String,
    },
}

impl PriorError {
    /// Creates an `InvalidArgument` error from anything printable.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        PriorError::InvalidArgument {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PriorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_message() {
        let err = PriorError::invalid_argument("image_size must be > 0, got 0");
        assert_eq!(
            err.to_string(),
            "invalid argument: image_size must be > 0, got 0"
        );
        assert!(matches!(err, PriorError::InvalidArgument { .. }));
    }
}
