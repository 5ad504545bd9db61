//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during encoding or decoding.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Failed to encode a value to CBOR.
    #[error("encoding failed: {message}")]
    EncodingFailed {
        /// Description of the encoding error.
        message: String,
    },

    /// Failed to decode CBOR bytes.
    #[error("decoding failed: {message}")]
    DecodingFailed {
        /// Description of the decoding error.
        message: String,
    },

    /// I/O error while streaming to or from a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    /// Creates an encoding failed error.
    pub fn encoding_failed(message: impl Into<String>) -> Self {
        Self::EncodingFailed {
            message: message.into(),
        }
    }

    /// Creates a decoding failed error.
    pub fn decoding_failed(message: impl Into<String>) -> Self {
        Self::DecodingFailed {
            message: message.into(),
        }
    }

    /// Returns true if this error represents a decode failure rather
    /// than an I/O problem.
    #[must_use]
    pub fn is_decode_error(&self) -> bool {
        matches!(self, Self::DecodingFailed { .. })
    }
}

impl<E: std::fmt::Debug> From<ciborium::ser::Error<E>> for CodecError {
    fn from(err: ciborium::ser::Error<E>) -> Self {
        Self::encoding_failed(format!("{err:?}"))
    }
}

impl<E: std::fmt::Debug> From<ciborium::de::Error<E>> for CodecError {
    fn from(err: ciborium::de::Error<E>) -> Self {
        Self::decoding_failed(format!("{err:?}"))
    }
}
