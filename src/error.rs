//! Error types and result utilities for streamer construction and decoding.

use thiserror::Error;

/// Convenience type alias for results that may contain an [`AudioStreamError`].
pub type AudioStreamResult<T> = Result<T, AudioStreamError>;

/// Errors raised while building streamers, before any audio is pulled.
///
/// Nothing in this type ever travels through [`Streamer::stream`](crate::Streamer::stream).
/// Failures that happen once streaming has begun are expressed as early
/// exhaustion instead.
#[derive(Error, Debug)]
pub enum AudioStreamError {
    /// Error that occurs when invalid parameters are provided to a constructor.
    ///
    /// This includes cases like a zero sample rate or a zero buffer length.
    #[error("Invalid parameter error: {0}")]
    InvalidParameter(String),

    /// A decoder rejected its input before producing a streamer.
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}

impl AudioStreamError {
    /// Create an invalid parameter error
    pub fn invalid_parameter(details: impl Into<String>) -> Self {
        Self::InvalidParameter(details.into())
    }
}

/// Structural failures detected by a decoder adapter while reading headers.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The container or header is malformed.
    #[error("Malformed input: {details}")]
    Format {
        /// What the decoder found wrong.
        details: String,
    },

    /// The input is well formed but uses an encoding this adapter cannot play.
    #[error("Unsupported encoding: {details}")]
    Unsupported {
        /// The unsupported property.
        details: String,
    },

    /// The underlying reader failed before the header was complete.
    #[error("I/O error while decoding: {0}")]
    Io(#[from] std::io::Error),
}

impl DecodeError {
    /// Create a malformed input error
    pub fn format(details: impl Into<String>) -> Self {
        Self::Format {
            details: details.into(),
        }
    }

    /// Create an unsupported encoding error
    pub fn unsupported(details: impl Into<String>) -> Self {
        Self::Unsupported {
            details: details.into(),
        }
    }
}

#[cfg(feature = "wav")]
impl From<hound::Error> for DecodeError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(io) => Self::Io(io),
            hound::Error::FormatError(msg) => Self::format(msg),
            hound::Error::Unsupported => Self::unsupported("unsupported WAV sample format"),
            other => Self::format(other.to_string()),
        }
    }
}
