//! tp7 - Multitrack WAV conversion
//!
//! Converts between a single interleaved multitrack WAV file (2-12 channels,
//! holding 1-6 stereo tracks) and a set of individual stereo WAV files.
//!
//! # Architecture
//!
//! Conversions stream through fixed-size chunks so memory use does not grow
//! with file length:
//! - Probe: reads and validates the container header
//! - Pipeline: read -> float -> remap -> fixed point -> write, one chunk at a time
//! - Jobs: the `export` and `import` entry points

pub mod cli;
pub mod engine;
pub mod error;

pub use engine::{export, import, ConversionJob, ConversionResult};
pub use error::{ConvertError, Result};
