//! Chunk buffers
//!
//! A chunk is a bounded window of interleaved float frames. Each pipeline
//! run allocates its chunks once and reuses them on every iteration, so the
//! hot loop never allocates.

/// Frames processed per pipeline iteration
pub const CHUNK_FRAMES: usize = 8192;

/// Fixed-capacity window of interleaved 32-bit float audio
#[derive(Clone, Debug)]
pub struct Chunk {
    /// Interleaved sample storage, sized for the full capacity
    samples: Vec<f32>,
    /// Channels per frame
    channels: usize,
    /// Frames this chunk can hold
    capacity: usize,
    /// Position of the first frame within the whole stream
    frame_offset: u64,
    /// Frames currently valid
    frame_count: usize,
}

impl Chunk {
    /// Allocate a silent chunk
    pub fn new(channels: usize, capacity: usize) -> Self {
        Self {
            samples: vec![0.0; channels * capacity],
            channels,
            capacity,
            frame_offset: 0,
            frame_count: 0,
        }
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn frame_offset(&self) -> u64 {
        self.frame_offset
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Re-target the chunk at a new window
    ///
    /// # Panics
    /// Panics if `frame_count` exceeds the capacity.
    pub fn reset(&mut self, frame_offset: u64, frame_count: usize) {
        assert!(
            frame_count <= self.capacity,
            "chunk of {} frames cannot hold {}",
            self.capacity,
            frame_count
        );
        self.frame_offset = frame_offset;
        self.frame_count = frame_count;
    }

    /// Valid interleaved samples
    pub fn samples(&self) -> &[f32] {
        &self.samples[..self.frame_count * self.channels]
    }

    /// Valid interleaved samples, mutable
    pub fn samples_mut(&mut self) -> &mut [f32] {
        let len = self.frame_count * self.channels;
        &mut self.samples[..len]
    }

    /// One frame's samples
    pub fn frame(&self, index: usize) -> &[f32] {
        let start = index * self.channels;
        &self.samples()[start..start + self.channels]
    }

    /// One frame's samples, mutable
    pub fn frame_mut(&mut self, index: usize) -> &mut [f32] {
        let channels = self.channels;
        let start = index * channels;
        &mut self.samples_mut()[start..start + channels]
    }

    /// Zero the valid frames from `from` onward
    pub fn silence_from(&mut self, from: usize) {
        let start = from.min(self.frame_count) * self.channels;
        self.samples_mut()[start..].fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_chunk_is_empty() {
        let chunk = Chunk::new(12, CHUNK_FRAMES);
        assert_eq!(chunk.capacity(), CHUNK_FRAMES);
        assert_eq!(chunk.frame_count(), 0);
        assert!(chunk.samples().is_empty());
    }

    #[test]
    fn test_frame_views() {
        let mut chunk = Chunk::new(2, 4);
        chunk.reset(100, 3);
        chunk.frame_mut(1).copy_from_slice(&[0.25, -0.25]);

        assert_eq!(chunk.frame_offset(), 100);
        assert_eq!(chunk.samples(), &[0.0, 0.0, 0.25, -0.25, 0.0, 0.0]);
        assert_eq!(chunk.frame(1), &[0.25, -0.25]);
    }

    #[test]
    fn test_silence_from() {
        let mut chunk = Chunk::new(2, 3);
        chunk.reset(0, 3);
        chunk.samples_mut().fill(1.0);
        chunk.silence_from(1);
        assert_eq!(chunk.samples(), &[1.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    #[should_panic]
    fn test_reset_beyond_capacity_panics() {
        let mut chunk = Chunk::new(2, 4);
        chunk.reset(0, 5);
    }

    #[test]
    #[should_panic]
    fn test_frame_out_of_bounds_panics() {
        let mut chunk = Chunk::new(2, 4);
        chunk.reset(0, 2);
        let _ = chunk.frame(2);
    }
}
