//! Stream descriptor probing
//!
//! Reads the header of a WAV container and checks it against the channel
//! policy of the job that wants to consume it.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use hound::WavReader;
use serde::Serialize;

use crate::engine::convert::BitDepth;
use crate::error::{ChannelPolicy, ConvertError, Result};

/// Most channels a multitrack container may hold
pub const MULTITRACK_CHANNELS: u16 = 12;

/// Shape of an audio stream as declared by its container header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreamDescriptor {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Interleaved channel count
    pub channels: u16,
    /// Sample encoding
    pub bit_depth: BitDepth,
    /// Frames (samples per channel) in the stream
    pub total_frames: u64,
}

impl StreamDescriptor {
    /// Build a descriptor from an open reader's header
    pub fn from_reader<R: std::io::Read>(reader: &WavReader<R>, path: &Path) -> Result<Self> {
        let spec = reader.spec();
        let bit_depth = BitDepth::from_spec(&spec).ok_or_else(|| ConvertError::UnsupportedFormat {
            path: path.display().to_string(),
            reason: format!(
                "{}-bit {:?} samples",
                spec.bits_per_sample, spec.sample_format
            ),
        })?;

        if spec.channels == 0 || spec.sample_rate == 0 {
            return Err(ConvertError::UnsupportedFormat {
                path: path.display().to_string(),
                reason: format!(
                    "header declares {} channels at {} Hz",
                    spec.channels, spec.sample_rate
                ),
            });
        }

        Ok(StreamDescriptor {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            bit_depth,
            // hound reports the per-channel length
            total_frames: reader.duration() as u64,
        })
    }

    /// Number of stereo tracks this stream holds
    pub fn track_count(&self) -> usize {
        self.channels as usize / 2
    }

    pub fn duration_secs(&self) -> f64 {
        self.total_frames as f64 / self.sample_rate as f64
    }

    /// Check this stream can be split into stereo tracks
    pub fn ensure_multitrack(&self, path: &Path) -> Result<()> {
        let ok = self.channels >= 2 && self.channels <= MULTITRACK_CHANNELS && self.channels % 2 == 0;
        if !ok {
            return Err(ConvertError::ChannelMismatch {
                path: path.display().to_string(),
                expected: ChannelPolicy::EvenUpToTwelve,
                found: self.channels,
            });
        }
        Ok(())
    }

    /// Check this stream is a stereo import source
    pub fn ensure_stereo(&self, path: &Path) -> Result<()> {
        if self.channels != 2 {
            return Err(ConvertError::ChannelMismatch {
                path: path.display().to_string(),
                expected: ChannelPolicy::Stereo,
                found: self.channels,
            });
        }
        Ok(())
    }
}

/// Open a container just long enough to read its descriptor
pub fn probe(path: &Path) -> Result<StreamDescriptor> {
    let reader = open_reader(path)?;
    StreamDescriptor::from_reader(&reader, path)
}

/// Open a WAV container for reading
pub(crate) fn open_reader(path: &Path) -> Result<WavReader<BufReader<File>>> {
    WavReader::open(path).map_err(|e| ConvertError::InvalidFile {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{SampleFormat, WavSpec, WavWriter};
    use tempfile::tempdir;

    fn write_silence(path: &Path, channels: u16, bits: u16, format: SampleFormat, frames: usize) {
        let spec = WavSpec {
            channels,
            sample_rate: 44100,
            bits_per_sample: bits,
            sample_format: format,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for _ in 0..frames * channels as usize {
            match format {
                SampleFormat::Float => writer.write_sample(0.0f32).unwrap(),
                SampleFormat::Int => writer.write_sample(0i32).unwrap(),
            }
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_probe_reads_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("six.wav");
        write_silence(&path, 6, 24, SampleFormat::Int, 1000);

        let desc = probe(&path).unwrap();
        assert_eq!(desc.channels, 6);
        assert_eq!(desc.sample_rate, 44100);
        assert_eq!(desc.bit_depth, BitDepth::Int24);
        assert_eq!(desc.total_frames, 1000);
        assert_eq!(desc.track_count(), 3);
    }

    #[test]
    fn test_probe_float_source() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("float.wav");
        write_silence(&path, 2, 32, SampleFormat::Float, 10);

        let desc = probe(&path).unwrap();
        assert_eq!(desc.bit_depth, BitDepth::Float32);
        assert!(desc.ensure_stereo(&path).is_ok());
    }

    #[test]
    fn test_probe_rejects_8bit() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("eight.wav");
        write_silence(&path, 2, 8, SampleFormat::Int, 10);

        let err = probe(&path).unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
    }

    #[test]
    fn test_probe_missing_file() {
        let err = probe(Path::new("/nonexistent/path/rec.wav")).unwrap_err();
        match err {
            ConvertError::InvalidFile { path, .. } => assert!(path.contains("nonexistent")),
            other => panic!("Expected InvalidFile error, got: {:?}", other),
        }
    }

    #[test]
    fn test_probe_garbage_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("garbage.wav");
        std::fs::write(&path, b"definitely not a riff header").unwrap();

        assert_eq!(probe(&path).unwrap_err().error_code(), "INVALID_FILE");
    }

    #[test]
    fn test_multitrack_policy() {
        let path = Path::new("x.wav");
        let desc = |channels| StreamDescriptor {
            sample_rate: 48000,
            channels,
            bit_depth: BitDepth::Int16,
            total_frames: 0,
        };

        for ok in [2, 4, 6, 8, 10, 12] {
            assert!(desc(ok).ensure_multitrack(path).is_ok(), "{} channels", ok);
        }
        for bad in [1, 3, 11, 13, 14] {
            match desc(bad).ensure_multitrack(path).unwrap_err() {
                ConvertError::ChannelMismatch { found, expected, .. } => {
                    assert_eq!(found, bad);
                    assert_eq!(expected, ChannelPolicy::EvenUpToTwelve);
                }
                other => panic!("Expected ChannelMismatch, got: {:?}", other),
            }
        }
    }

    #[test]
    fn test_stereo_policy() {
        let path = Path::new("x.wav");
        let mut desc = StreamDescriptor {
            sample_rate: 48000,
            channels: 2,
            bit_depth: BitDepth::Int16,
            total_frames: 0,
        };
        assert!(desc.ensure_stereo(path).is_ok());
        desc.channels = 1;
        assert_eq!(desc.ensure_stereo(path).unwrap_err().error_code(), "CHANNEL_MISMATCH");
    }
}
