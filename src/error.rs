//! Error types for the checked kernel API and dispatch configuration.

use std::fmt;

use crate::simd::Backend;

/// Result type for simd-kernels operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for simd-kernels operations.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Operand slices have different lengths
    LengthMismatch {
        /// Length of the first operand (or destination)
        expected: usize,
        /// Length of the offending operand
        actual: usize,
    },
    /// Backend name could not be parsed
    UnknownBackend(String),
    /// Requested backend is not supported on this target/CPU
    BackendUnavailable(Backend),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::LengthMismatch { expected, actual } => {
                write!(
                    f,
                    "Operand length mismatch: expected {}, got {}",
                    expected, actual
                )
            }
            Error::UnknownBackend(name) => {
                write!(
                    f,
                    "Unknown backend: {:?} (expected auto, scalar, sse, avx or neon)",
                    name
                )
            }
            Error::BackendUnavailable(backend) => {
                write!(f, "Backend not available on this target: {}", backend)
            }
        }
    }
}

impl std::error::Error for Error {}

/// Fail with [`Error::LengthMismatch`] unless `actual == expected`.
#[inline]
pub(crate) fn check_len(expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::LengthMismatch { expected, actual })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let errors = [
            (
                Error::LengthMismatch {
                    expected: 16,
                    actual: 15,
                },
                "Operand length mismatch: expected 16, got 15",
            ),
            (
                Error::UnknownBackend("sse9".into()),
                "Unknown backend: \"sse9\" (expected auto, scalar, sse, avx or neon)",
            ),
            (
                Error::BackendUnavailable(Backend::Neon),
                "Backend not available on this target: neon",
            ),
        ];

        for (error, expected_msg) in errors {
            assert_eq!(error.to_string(), expected_msg);
        }
    }

    #[test]
    fn test_error_is_error_trait() {
        let error: &dyn std::error::Error = &Error::BackendUnavailable(Backend::Avx);
        let _ = error.to_string();
    }

    #[test]
    fn test_check_len() {
        assert!(check_len(4, 4).is_ok());
        assert_eq!(
            check_len(4, 3),
            Err(Error::LengthMismatch {
                expected: 4,
                actual: 3
            })
        );
    }
}
