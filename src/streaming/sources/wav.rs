//! PCM WAV decoder adapter.
//!
//! Header problems are reported by [`decode`]. Anything that goes wrong after
//! that (a truncated data chunk, a failing reader) ends the stream early and
//! is kept for inspection through [`WavStreamer::err`].

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use hound::{SampleFormat, WavReader};

use crate::error::DecodeError;
use crate::repr::{Format, Frame, SampleRate};
use crate::streaming::traits::Streamer;
use crate::{LEFT, RIGHT};

#[derive(Debug, Clone, Copy)]
enum Encoding {
    Int { scale: f64 },
    Float,
}

/// A streamer over the PCM data of a WAV file.
///
/// Mono files play on both channels; files with more than two channels keep
/// only the first two.
pub struct WavStreamer<R: Read> {
    reader: WavReader<R>,
    format: Format,
    encoding: Encoding,
    len: usize,
    pos: usize,
    done: bool,
    err: Option<DecodeError>,
}

/// Read the WAV header from `reader` and return a streamer over its samples.
///
/// # Errors
/// Returns a [`DecodeError`] if the header is malformed or describes a sample
/// encoding that cannot be played.
pub fn decode<R: Read>(reader: R) -> Result<(WavStreamer<R>, Format), DecodeError> {
    let reader = WavReader::new(reader)?;
    let spec = reader.spec();

    if spec.channels == 0 {
        return Err(DecodeError::format("WAV header declares zero channels"));
    }
    let encoding = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => Encoding::Float,
        (SampleFormat::Int, bits @ 1..=32) => Encoding::Int {
            scale: (1u64 << (bits - 1)) as f64,
        },
        (format, bits) => {
            return Err(DecodeError::unsupported(format!(
                "{bits}-bit {format:?} samples"
            )));
        }
    };

    let format = Format::new(
        SampleRate(spec.sample_rate),
        spec.channels,
        spec.bits_per_sample,
    );
    let len = reader.duration() as usize;
    tracing::debug!(?format, frames = len, "decoded WAV header");

    let streamer = WavStreamer {
        reader,
        format,
        encoding,
        len,
        pos: 0,
        done: false,
        err: None,
    };
    Ok((streamer, format))
}

/// Open the WAV file at `path` and decode its header.
///
/// # Errors
/// Returns [`DecodeError::Io`] if the file cannot be opened, otherwise the
/// same errors as [`decode`].
pub fn open<P: AsRef<Path>>(
    path: P,
) -> Result<(WavStreamer<BufReader<File>>, Format), DecodeError> {
    let file = File::open(path.as_ref())?;
    decode(BufReader::new(file))
}

impl<R: Read> WavStreamer<R> {
    /// Format of the source data.
    pub fn format(&self) -> Format {
        self.format
    }

    /// Total number of frames declared by the header.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the header declares no frames.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Frames delivered so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The error that ended the stream early, if any.
    pub fn err(&self) -> Option<&DecodeError> {
        self.err.as_ref()
    }

    fn next_sample(&mut self) -> Option<Result<f64, hound::Error>> {
        match self.encoding {
            Encoding::Int { scale } => self
                .reader
                .samples::<i32>()
                .next()
                .map(|s| s.map(|v| v as f64 / scale)),
            Encoding::Float => self
                .reader
                .samples::<f32>()
                .next()
                .map(|s| s.map(f64::from)),
        }
    }

    fn read_frame(&mut self) -> Result<Option<Frame>, hound::Error> {
        let channels = self.format.num_channels as usize;
        let mut values = [0.0; 2];
        for ch in 0..channels {
            let Some(sample) = self.next_sample().transpose()? else {
                return Ok(None);
            };
            if ch < 2 {
                values[ch] = sample;
            }
        }
        if channels == 1 {
            values[RIGHT] = values[LEFT];
        }
        Ok(Some(Frame::from(values)))
    }
}

impl<R: Read + Send> Streamer for WavStreamer<R> {
    fn stream(&mut self, frames: &mut [Frame]) -> (usize, bool) {
        if self.done {
            return (0, false);
        }

        let mut produced = 0;
        while produced < frames.len() && self.pos < self.len {
            match self.read_frame() {
                Ok(Some(frame)) => {
                    frames[produced] = frame;
                    produced += 1;
                    self.pos += 1;
                }
                Ok(None) => {
                    tracing::warn!(
                        position = self.pos,
                        expected = self.len,
                        "WAV data ended before the length in its header"
                    );
                    self.done = true;
                    break;
                }
                Err(err) => {
                    tracing::warn!(
                        position = self.pos,
                        error = %err,
                        "WAV read failed, ending stream"
                    );
                    self.err = Some(err.into());
                    self.done = true;
                    break;
                }
            }
        }

        if produced == 0 && (self.done || self.pos >= self.len) {
            self.done = true;
            return (0, false);
        }
        (produced, true)
    }
}
