//! Streaming Conversion Engine
//!
//! Core conversion engine including:
//! - Stream descriptor probing and channel policy
//! - Fixed-point <-> float sample conversion
//! - Channel remapping between multitrack frames and stereo tracks
//! - The bounded-memory chunk pipeline
//! - Export/import job coordination

pub mod chunk;
pub mod convert;
pub mod job;
pub mod pipeline;
pub mod probe;
pub mod remap;
pub mod wav;

pub use chunk::{Chunk, CHUNK_FRAMES};
pub use convert::BitDepth;
pub use job::{
    export, import, track_file_name, ConversionJob, ConversionResult, JobMode, EXPORT_BIT_DEPTH,
    IMPORT_BIT_DEPTH, MAX_TRACKS,
};
pub use pipeline::{FrameSink, FrameSource, PipelineStats};
pub use probe::{probe, StreamDescriptor, MULTITRACK_CHANNELS};
pub use remap::TrackMapping;
pub use wav::{WavSink, WavSource};
