//! WAV container adapters
//!
//! Wraps hound readers and writers as pipeline sources and sinks. Sample
//! format conversion happens here, at the container boundary. Handles are
//! released when the adapter is dropped, whichever path the job takes.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use hound::{WavReader, WavSpec, WavWriter};
use log::debug;

use crate::engine::chunk::Chunk;
use crate::engine::convert::{decode_fixed, encode_fixed, BitDepth};
use crate::engine::pipeline::{FrameSink, FrameSource};
use crate::engine::probe::{open_reader, StreamDescriptor};
use crate::error::{ConvertError, Result};

/// A WAV file opened for chunked reading
pub struct WavSource {
    path: PathBuf,
    reader: WavReader<BufReader<File>>,
    descriptor: StreamDescriptor,
    /// Fixed-point staging buffer, grown once to the chunk size
    raw: Vec<i32>,
}

impl WavSource {
    /// Open a file and read its descriptor
    pub fn open(path: &Path) -> Result<Self> {
        let reader = open_reader(path)?;
        let descriptor = StreamDescriptor::from_reader(&reader, path)?;
        debug!(
            "opened {}: {} ch, {}, {} Hz, {} frames",
            path.display(),
            descriptor.channels,
            descriptor.bit_depth,
            descriptor.sample_rate,
            descriptor.total_frames
        );

        Ok(Self {
            path: path.to_path_buf(),
            reader,
            descriptor,
            raw: Vec::new(),
        })
    }

    pub fn descriptor(&self) -> &StreamDescriptor {
        &self.descriptor
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameSource for WavSource {
    fn label(&self) -> String {
        self.path.display().to_string()
    }

    fn channels(&self) -> usize {
        self.descriptor.channels as usize
    }

    fn total_frames(&self) -> u64 {
        self.descriptor.total_frames
    }

    fn read_chunk(&mut self, chunk: &mut Chunk) -> Result<usize> {
        let path = &self.path;
        let depth = self.descriptor.bit_depth;
        let channels = self.descriptor.channels as usize;
        let out = chunk.samples_mut();
        let mut read = 0;

        if depth.is_float() {
            for (dst, sample) in out.iter_mut().zip(self.reader.samples::<f32>()) {
                *dst = sample.map_err(|e| ConvertError::read(path.display().to_string(), e))?;
                read += 1;
            }
        } else {
            if self.raw.len() < out.len() {
                self.raw.resize(out.len(), 0);
            }
            for (dst, sample) in self.raw[..out.len()]
                .iter_mut()
                .zip(self.reader.samples::<i32>())
            {
                *dst = sample.map_err(|e| ConvertError::read(path.display().to_string(), e))?;
                read += 1;
            }
            decode_fixed(&self.raw[..read], depth, &mut out[..read]);
        }

        Ok(read / channels)
    }
}

/// A WAV file being written chunk by chunk
pub struct WavSink {
    path: PathBuf,
    writer: WavWriter<BufWriter<File>>,
    channels: u16,
    depth: BitDepth,
    /// Fixed-point staging buffer, grown once to the chunk size
    raw: Vec<i32>,
    frames_written: u64,
}

impl WavSink {
    /// Create (or truncate) a WAV file with the given shape
    pub fn create(path: &Path, channels: u16, sample_rate: u32, depth: BitDepth) -> Result<Self> {
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: depth.bits(),
            sample_format: depth.sample_format(),
        };
        let writer = WavWriter::create(path, spec)
            .map_err(|e| ConvertError::write(path.display().to_string(), e))?;
        debug!(
            "created {}: {} ch, {}, {} Hz",
            path.display(),
            channels,
            depth,
            sample_rate
        );

        Ok(Self {
            path: path.to_path_buf(),
            writer,
            channels,
            depth,
            raw: Vec::new(),
            frames_written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Flush the header and close the file, returning the frames written
    pub fn finalize(self) -> Result<u64> {
        let frames = self.frames_written;
        let path = self.path;
        self.writer
            .finalize()
            .map_err(|e| ConvertError::write(path.display().to_string(), e))?;
        Ok(frames)
    }
}

impl FrameSink for WavSink {
    fn label(&self) -> String {
        self.path.display().to_string()
    }

    fn channels(&self) -> usize {
        self.channels as usize
    }

    fn write_chunk(&mut self, chunk: &Chunk) -> Result<()> {
        let path = &self.path;
        let samples = chunk.samples();

        if self.depth.is_float() {
            for &sample in samples {
                self.writer
                    .write_sample(sample)
                    .map_err(|e| ConvertError::write(path.display().to_string(), e))?;
            }
        } else {
            if self.raw.len() < samples.len() {
                self.raw.resize(samples.len(), 0);
            }
            let raw = &mut self.raw[..samples.len()];
            encode_fixed(samples, self.depth, raw);
            for &value in raw.iter() {
                self.writer
                    .write_sample(value)
                    .map_err(|e| ConvertError::write(path.display().to_string(), e))?;
            }
        }

        self.frames_written += chunk.frame_count() as u64;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sink_then_source() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pair.wav");

        let mut chunk = Chunk::new(2, 4);
        chunk.reset(0, 3);
        chunk
            .samples_mut()
            .copy_from_slice(&[0.5, -0.5, 0.25, -0.25, 0.0, -1.0]);

        let mut sink = WavSink::create(&path, 2, 44100, BitDepth::Int16).unwrap();
        sink.write_chunk(&chunk).unwrap();
        assert_eq!(sink.finalize().unwrap(), 3);

        let mut source = WavSource::open(&path).unwrap();
        assert_eq!(source.descriptor().total_frames, 3);
        assert_eq!(source.descriptor().bit_depth, BitDepth::Int16);

        let mut back = Chunk::new(2, 4);
        back.reset(0, 3);
        assert_eq!(source.read_chunk(&mut back).unwrap(), 3);
        assert_eq!(back.samples(), chunk.samples());

        // Nothing left
        back.reset(3, 1);
        assert_eq!(source.read_chunk(&mut back).unwrap(), 0);
    }

    #[test]
    fn test_sink_clamps_out_of_range() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hot.wav");

        let mut chunk = Chunk::new(2, 1);
        chunk.reset(0, 1);
        chunk.samples_mut().copy_from_slice(&[1.7, -3.0]);

        let mut sink = WavSink::create(&path, 2, 48000, BitDepth::Int24).unwrap();
        sink.write_chunk(&chunk).unwrap();
        sink.finalize().unwrap();

        let mut reader = WavReader::open(&path).unwrap();
        let values: Vec<i32> = reader.samples::<i32>().map(|s| s.unwrap()).collect();
        assert_eq!(values, vec![8_388_607, -8_388_608]);
    }

    #[test]
    fn test_float_source() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("float.wav");

        let mut chunk = Chunk::new(2, 2);
        chunk.reset(0, 2);
        chunk.samples_mut().copy_from_slice(&[0.1, 0.2, 0.3, 0.4]);
        let mut sink = WavSink::create(&path, 2, 48000, BitDepth::Float32).unwrap();
        sink.write_chunk(&chunk).unwrap();
        sink.finalize().unwrap();

        let mut source = WavSource::open(&path).unwrap();
        let mut back = Chunk::new(2, 2);
        back.reset(0, 2);
        assert_eq!(source.read_chunk(&mut back).unwrap(), 2);
        assert_eq!(back.samples(), &[0.1, 0.2, 0.3, 0.4]);
    }
}
