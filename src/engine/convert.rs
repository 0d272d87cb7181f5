//! Sample format conversion
//!
//! Converts between fixed-point PCM and the 32-bit float representation
//! used for all arithmetic inside the pipeline. Conversion only happens at
//! the read boundary (container -> float) and the write boundary
//! (float -> container).

use std::fmt;

use hound::{SampleFormat, WavSpec};
use serde::Serialize;

/// Sample encodings a container may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BitDepth {
    /// 16-bit signed integer PCM
    Int16,
    /// 24-bit signed integer PCM
    Int24,
    /// 32-bit signed integer PCM
    Int32,
    /// 32-bit IEEE float
    Float32,
}

impl BitDepth {
    /// Map a WAV header onto a supported encoding
    pub fn from_spec(spec: &WavSpec) -> Option<Self> {
        match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Int, 16) => Some(BitDepth::Int16),
            (SampleFormat::Int, 24) => Some(BitDepth::Int24),
            (SampleFormat::Int, 32) => Some(BitDepth::Int32),
            (SampleFormat::Float, 32) => Some(BitDepth::Float32),
            _ => None,
        }
    }

    pub fn bits(self) -> u16 {
        match self {
            BitDepth::Int16 => 16,
            BitDepth::Int24 => 24,
            BitDepth::Int32 | BitDepth::Float32 => 32,
        }
    }

    pub fn sample_format(self) -> SampleFormat {
        match self {
            BitDepth::Float32 => SampleFormat::Float,
            _ => SampleFormat::Int,
        }
    }

    pub fn is_float(self) -> bool {
        self == BitDepth::Float32
    }

    /// Full-scale magnitude of a fixed-point encoding (2^(bits-1))
    ///
    /// Float samples are already normalized, so their scale is 1.
    pub fn full_scale(self) -> f64 {
        match self {
            BitDepth::Int16 => 32_768.0,
            BitDepth::Int24 => 8_388_608.0,
            BitDepth::Int32 => 2_147_483_648.0,
            BitDepth::Float32 => 1.0,
        }
    }

    /// Largest representable fixed-point value
    fn max_value(self) -> f64 {
        self.full_scale() - 1.0
    }

    /// Smallest representable fixed-point value
    fn min_value(self) -> f64 {
        -self.full_scale()
    }
}

impl fmt::Display for BitDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitDepth::Float32 => write!(f, "32-bit float"),
            other => write!(f, "{}-bit", other.bits()),
        }
    }
}

/// Convert one fixed-point sample to float in [-1.0, 1.0)
#[inline]
pub fn fixed_to_float(value: i32, depth: BitDepth) -> f32 {
    (value as f64 / depth.full_scale()) as f32
}

/// Convert one float sample to fixed point
///
/// Rounds to the nearest integer and clamps to the representable range, so
/// out-of-range input saturates instead of wrapping.
#[inline]
pub fn float_to_fixed(sample: f32, depth: BitDepth) -> i32 {
    let scaled = (sample as f64 * depth.full_scale()).round();
    if scaled.is_nan() {
        return 0;
    }
    scaled.clamp(depth.min_value(), depth.max_value()) as i32
}

/// Decode a run of fixed-point samples into float
pub fn decode_fixed(raw: &[i32], depth: BitDepth, out: &mut [f32]) {
    debug_assert_eq!(raw.len(), out.len());
    for (dst, &src) in out.iter_mut().zip(raw) {
        *dst = fixed_to_float(src, depth);
    }
}

/// Encode a run of float samples into fixed point
pub fn encode_fixed(samples: &[f32], depth: BitDepth, out: &mut [i32]) {
    debug_assert_eq!(samples.len(), out.len());
    for (dst, &src) in out.iter_mut().zip(samples) {
        *dst = float_to_fixed(src, depth);
    }
}
