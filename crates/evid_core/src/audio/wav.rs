//! WAV reading and writing via hound.
//!
//! The cleaner works on interleaved `f32` samples regardless of the
//! on-disk sample format. Writing preserves the source spec so a
//! re-encoded file round-trips bit depth and repeated runs stay
//! byte-stable.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use thiserror::Error;

/// Errors from WAV decode/encode.
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("failed to read WAV {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: hound::Error,
    },

    #[error("failed to write WAV {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: hound::Error,
    },

    #[error("unsupported WAV format: {0}")]
    Unsupported(String),
}

/// Result type for audio operations.
pub type AudioResult<T> = Result<T, AudioError>;

/// Decoded audio: interleaved `f32` samples plus the source spec.
#[derive(Debug, Clone, PartialEq)]
pub struct WavBuffer {
    /// Interleaved samples, normalized to [-1.0, 1.0].
    pub samples: Vec<f32>,
    /// Spec of the source file, reused on write.
    pub spec: WavSpec,
}

impl WavBuffer {
    /// Number of channels.
    pub fn channels(&self) -> usize {
        self.spec.channels as usize
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.spec.sample_rate
    }

    /// Number of interleaved frames (samples per channel).
    pub fn frames(&self) -> usize {
        if self.spec.channels == 0 {
            0
        } else {
            self.samples.len() / self.spec.channels as usize
        }
    }
}

/// Read a whole WAV file into memory.
///
/// Supports 16/24/32-bit integer and 32-bit float PCM.
pub fn read_wav(path: &Path) -> AudioResult<WavBuffer> {
    let read_err = |source| AudioError::Read {
        path: path.display().to_string(),
        source,
    };

    let mut reader = WavReader::open(path).map_err(read_err)?;
    let spec = reader.spec();

    let samples: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(read_err)?,
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / 32768.0))
            .collect::<Result<_, _>>()
            .map_err(read_err)?,
        (SampleFormat::Int, 24) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 8_388_608.0))
            .collect::<Result<_, _>>()
            .map_err(read_err)?,
        (SampleFormat::Int, 32) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 2_147_483_648.0))
            .collect::<Result<_, _>>()
            .map_err(read_err)?,
        (format, bits) => {
            return Err(AudioError::Unsupported(format!(
                "{:?} {} bits per sample",
                format, bits
            )))
        }
    };

    Ok(WavBuffer { samples, spec })
}

/// Write a buffer back to disk, preserving the source spec.
pub fn write_wav(path: &Path, buffer: &WavBuffer) -> AudioResult<()> {
    let write_err = |source| AudioError::Write {
        path: path.display().to_string(),
        source,
    };

    let spec = buffer.spec;
    let mut writer = WavWriter::create(path, spec).map_err(write_err)?;

    match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => {
            for &sample in &buffer.samples {
                writer.write_sample(sample).map_err(write_err)?;
            }
        }
        (SampleFormat::Int, 16) => {
            for &sample in &buffer.samples {
                writer
                    .write_sample(quantize(sample, 32768.0) as i16)
                    .map_err(write_err)?;
            }
        }
        (SampleFormat::Int, 24) => {
            for &sample in &buffer.samples {
                writer
                    .write_sample(quantize(sample, 8_388_608.0) as i32)
                    .map_err(write_err)?;
            }
        }
        (SampleFormat::Int, 32) => {
            for &sample in &buffer.samples {
                writer
                    .write_sample(quantize(sample, 2_147_483_648.0) as i32)
                    .map_err(write_err)?;
            }
        }
        (format, bits) => {
            return Err(AudioError::Unsupported(format!(
                "{:?} {} bits per sample",
                format, bits
            )))
        }
    }

    writer.finalize().map_err(write_err)?;
    Ok(())
}

/// Scale a normalized sample to integer range with clamping.
fn quantize(sample: f32, amplitude: f64) -> i64 {
    let scaled = (sample as f64 * amplitude).round();
    let max = amplitude - 1.0;
    let min = -amplitude;
    scaled.clamp(min, max) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn int16_spec() -> WavSpec {
        WavSpec {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        }
    }

    #[test]
    fn int16_round_trip_is_exact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tone.wav");

        let buffer = WavBuffer {
            samples: vec![0.0, 0.25, -0.25, 0.5, -0.5],
            spec: int16_spec(),
        };
        write_wav(&path, &buffer).unwrap();

        let read_back = read_wav(&path).unwrap();
        assert_eq!(read_back.spec, buffer.spec);
        assert_eq!(read_back.samples, buffer.samples);
    }

    #[test]
    fn write_is_byte_stable() {
        let dir = tempdir().unwrap();
        let path_a = dir.path().join("a.wav");
        let path_b = dir.path().join("b.wav");

        let buffer = WavBuffer {
            samples: (0..4410)
                .map(|i| (i as f32 * 0.013).sin() * 0.4)
                .collect(),
            spec: int16_spec(),
        };

        write_wav(&path_a, &buffer).unwrap();
        write_wav(&path_b, &buffer).unwrap();

        assert_eq!(fs::read(&path_a).unwrap(), fs::read(&path_b).unwrap());
    }

    #[test]
    fn out_of_range_samples_clamp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hot.wav");

        let buffer = WavBuffer {
            samples: vec![1.5, -1.5],
            spec: int16_spec(),
        };
        write_wav(&path, &buffer).unwrap();

        let read_back = read_wav(&path).unwrap();
        assert_eq!(read_back.samples[0], 32767.0 / 32768.0);
        assert_eq!(read_back.samples[1], -1.0);
    }

    #[test]
    fn float_spec_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("float.wav");

        let buffer = WavBuffer {
            samples: vec![0.1, -0.2, 0.3, -0.4],
            spec: WavSpec {
                channels: 2,
                sample_rate: 48000,
                bits_per_sample: 32,
                sample_format: SampleFormat::Float,
            },
        };
        write_wav(&path, &buffer).unwrap();

        let read_back = read_wav(&path).unwrap();
        assert_eq!(read_back.samples, buffer.samples);
        assert_eq!(read_back.frames(), 2);
        assert_eq!(read_back.channels(), 2);
    }

    #[test]
    fn missing_file_is_read_error() {
        let result = read_wav(Path::new("/nonexistent/audio.wav"));
        assert!(matches!(result, Err(AudioError::Read { .. })));
    }
}
