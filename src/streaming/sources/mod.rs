//! Streamers that originate audio: signal generators and decoder adapters.

pub mod generator;
#[cfg(feature = "wav")]
pub mod wav;

// Re-export main source types
pub use generator::{Generator, GeneratorConfig, SignalType};
#[cfg(feature = "wav")]
pub use wav::WavStreamer;
