//! Chunk pipeline
//!
//! Drives the bounded-memory read -> remap -> write loop. Sources and sinks
//! convert to and from float at their own boundary, so everything the loop
//! touches is interleaved f32 held in chunks allocated once per run.
//!
//! Every iteration advances `frames_processed` by
//! `min(CHUNK_FRAMES, remaining)` until it reaches the job's total.

use log::debug;

use crate::engine::chunk::{Chunk, CHUNK_FRAMES};
use crate::engine::remap::{merge_tracks, split_tracks};
use crate::error::{ChannelPolicy, ConvertError, Result};

/// A stream the pipeline pulls float frames from
pub trait FrameSource {
    /// Name used in error messages
    fn label(&self) -> String;

    fn channels(&self) -> usize;

    fn total_frames(&self) -> u64;

    /// Fill the valid frames of `chunk` with the next frames of the stream
    ///
    /// Returns the number of frames actually read, which is less than
    /// `chunk.frame_count()` only if the stream ended early.
    fn read_chunk(&mut self, chunk: &mut Chunk) -> Result<usize>;
}

/// A stream the pipeline pushes float frames to
pub trait FrameSink {
    /// Name used in error messages
    fn label(&self) -> String;

    fn channels(&self) -> usize;

    /// Append the valid frames of `chunk`
    fn write_chunk(&mut self, chunk: &Chunk) -> Result<()>;
}

/// Counters describing a finished pipeline run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Loop iterations performed
    pub iterations: usize,
    /// Frames moved from the sources to the sinks
    pub frames_processed: u64,
}

impl PipelineStats {
    /// Frames the next iteration handles
    fn next_window(&self, total: u64) -> usize {
        (total - self.frames_processed).min(CHUNK_FRAMES as u64) as usize
    }

    fn advance(&mut self, frames: usize) {
        self.frames_processed += frames as u64;
        self.iterations += 1;
    }
}

/// Read a full window, treating an early end of stream as a read failure
fn read_window<S: FrameSource>(source: &mut S, chunk: &mut Chunk) -> Result<()> {
    let want = chunk.frame_count();
    let got = source.read_chunk(chunk)?;
    if got != want {
        return Err(ConvertError::ReadFailure {
            path: source.label(),
            reason: format!(
                "stream ended at frame {} (expected {} more frames)",
                chunk.frame_offset() + got as u64,
                want - got
            ),
            source: None,
        });
    }
    Ok(())
}

/// Split a multitrack source into one stereo sink per channel pair
///
/// `sinks[t]` receives channels `2t` and `2t + 1` of the source.
pub fn split<S, K>(source: &mut S, sinks: &mut [K]) -> Result<PipelineStats>
where
    S: FrameSource,
    K: FrameSink,
{
    if sinks.len() * 2 > source.channels() {
        return Err(ConvertError::ChannelMismatch {
            path: source.label(),
            expected: ChannelPolicy::EvenUpToTwelve,
            found: source.channels() as u16,
        });
    }

    let total = source.total_frames();
    let mut input = Chunk::new(source.channels(), CHUNK_FRAMES);
    let mut tracks = vec![Chunk::new(2, CHUNK_FRAMES); sinks.len()];
    let mut stats = PipelineStats::default();

    while stats.frames_processed < total {
        let window = stats.next_window(total);
        input.reset(stats.frames_processed, window);
        read_window(source, &mut input)?;

        split_tracks(&input, &mut tracks);
        for (sink, track) in sinks.iter_mut().zip(&tracks) {
            sink.write_chunk(track)?;
        }

        stats.advance(window);
    }

    debug!(
        "split {}: {} frames in {} chunks to {} tracks",
        source.label(),
        stats.frames_processed,
        stats.iterations,
        sinks.len()
    );
    Ok(stats)
}

/// Merge stereo sources into one multitrack sink
///
/// Runs for as many frames as the longest source. Shorter sources are
/// padded with silence, as are channel pairs with no source at all.
pub fn merge<S, K>(sources: &mut [S], sink: &mut K) -> Result<PipelineStats>
where
    S: FrameSource,
    K: FrameSink,
{
    for source in sources.iter() {
        if source.channels() != 2 {
            return Err(ConvertError::ChannelMismatch {
                path: source.label(),
                expected: ChannelPolicy::Stereo,
                found: source.channels() as u16,
            });
        }
    }
    if sources.len() * 2 > sink.channels() {
        return Err(ConvertError::TooManyFiles {
            count: sources.len(),
            max: sink.channels() / 2,
        });
    }

    let total = sources.iter().map(|s| s.total_frames()).max().unwrap_or(0);
    let mut inputs = vec![Chunk::new(2, CHUNK_FRAMES); sources.len()];
    let mut output = Chunk::new(sink.channels(), CHUNK_FRAMES);
    let mut stats = PipelineStats::default();

    while stats.frames_processed < total {
        let window = stats.next_window(total);
        for (source, input) in sources.iter_mut().zip(inputs.iter_mut()) {
            let available = source
                .total_frames()
                .saturating_sub(stats.frames_processed)
                .min(window as u64) as usize;
            input.reset(stats.frames_processed, available);
            if available > 0 {
                read_window(source, input)?;
            }
        }

        output.reset(stats.frames_processed, window);
        merge_tracks(&inputs, &mut output);
        sink.write_chunk(&output)?;

        stats.advance(window);
    }

    debug!(
        "merged {} sources into {}: {} frames in {} chunks",
        sources.len(),
        sink.label(),
        stats.frames_processed,
        stats.iterations
    );
    Ok(stats)
}
