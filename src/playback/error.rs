//! Error types for audio playback operations.

use crate::AudioStreamError;

/// Playback-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    /// Streamer or parameter error raised while setting up playback
    #[error("Audio stream error: {0}")]
    Audio(#[from] AudioStreamError),

    /// The backend could not be opened at the requested parameters
    #[error("Device unavailable: {details}")]
    DeviceUnavailable {
        /// Why the output could not be opened
        details: String,
    },

    /// Device not found or unavailable
    #[error("Device not found: {device_name}")]
    DeviceNotFound {
        /// Name that was asked for
        device_name: String,
    },

    /// A control operation was issued after the sink was closed
    #[error("Output sink is closed")]
    SinkClosed,

    /// A waited-on streamer was removed from the mix before it finished
    #[error("Streamer was stopped before it finished")]
    Stopped,

    /// Sink configuration issues
    #[error("Invalid sink configuration: {0}")]
    InvalidConfig(String),

    /// Backend-specific errors (CPAL, etc.)
    #[error("Backend error: {backend} - {details}")]
    Backend {
        /// Backend that reported the failure
        backend: &'static str,
        /// Backend-provided message
        details: String,
    },
}

impl PlaybackError {
    /// Create a device unavailable error
    pub fn device_unavailable(details: impl Into<String>) -> Self {
        Self::DeviceUnavailable {
            details: details.into(),
        }
    }

    /// Create a device not found error
    pub fn device_not_found(device_name: impl Into<String>) -> Self {
        Self::DeviceNotFound {
            device_name: device_name.into(),
        }
    }

    /// Create a backend error
    pub fn backend(backend: &'static str, details: impl Into<String>) -> Self {
        Self::Backend {
            backend,
            details: details.into(),
        }
    }

    /// Check if this error indicates a device problem
    pub fn is_device_error(&self) -> bool {
        matches!(
            self,
            Self::DeviceUnavailable { .. } | Self::DeviceNotFound { .. } | Self::Backend { .. }
        )
    }

    /// Check if this error comes from using a sink after [`close`](crate::OutputSink::close)
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::SinkClosed)
    }
}

/// Result type for playback operations
pub type PlaybackResult<T> = Result<T, PlaybackError>;

/// Convert CPAL errors to PlaybackError
#[cfg(feature = "playback")]
impl From<cpal::BuildStreamError> for PlaybackError {
    fn from(err: cpal::BuildStreamError) -> Self {
        match err {
            cpal::BuildStreamError::DeviceNotAvailable => {
                Self::device_unavailable("output device is no longer available")
            }
            cpal::BuildStreamError::StreamConfigNotSupported => {
                Self::device_unavailable("device does not support the requested stream config")
            }
            other => Self::backend("cpal", format!("Failed to build stream: {}", other)),
        }
    }
}

#[cfg(feature = "playback")]
impl From<cpal::PlayStreamError> for PlaybackError {
    fn from(err: cpal::PlayStreamError) -> Self {
        Self::backend("cpal", format!("Failed to play stream: {}", err))
    }
}

#[cfg(feature = "playback")]
impl From<cpal::DevicesError> for PlaybackError {
    fn from(err: cpal::DevicesError) -> Self {
        Self::backend("cpal", format!("Failed to enumerate devices: {}", err))
    }
}
