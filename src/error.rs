//! Error handling for tp7
//!
//! Every failure a conversion can hit maps onto one of the kinds below.
//! Errors carry the offending path and, where available, the underlying
//! I/O or decoder error.

use std::fmt;

use thiserror::Error;

/// Result type alias for tp7 operations
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Boxed underlying cause for read/write failures
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Channel layout a job expected to find in a source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelPolicy {
    /// An even channel count between 2 and 12 (multitrack export source)
    EvenUpToTwelve,
    /// Exactly two channels (import source)
    Stereo,
}

impl fmt::Display for ChannelPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelPolicy::EvenUpToTwelve => write!(f, "an even count between 2 and 12"),
            ChannelPolicy::Stereo => write!(f, "2"),
        }
    }
}

/// Main error type for conversion jobs
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Invalid audio file: {path}")]
    InvalidFile {
        path: String,
        #[source]
        source: hound::Error,
    },

    #[error("Unsupported audio format in {path}: {reason}")]
    UnsupportedFormat { path: String, reason: String },

    #[error("Channel mismatch in {path}: expected {expected} channels, found {found}")]
    ChannelMismatch {
        path: String,
        expected: ChannelPolicy,
        found: u16,
    },

    #[error("Too many input files: {count} given, at most {max} supported")]
    TooManyFiles { count: usize, max: usize },

    #[error("No input files given")]
    NoSources,

    #[error("Read failed on {path}: {reason}")]
    ReadFailure {
        path: String,
        reason: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Write failed on {path}: {reason}")]
    WriteFailure {
        path: String,
        reason: String,
        #[source]
        source: Option<BoxedSource>,
    },
}

impl ConvertError {
    /// Read failure caused by a decoder error
    pub fn read(path: impl Into<String>, source: hound::Error) -> Self {
        ConvertError::ReadFailure {
            path: path.into(),
            reason: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Write failure caused by an encoder error
    pub fn write(path: impl Into<String>, source: hound::Error) -> Self {
        ConvertError::WriteFailure {
            path: path.into(),
            reason: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Write failure caused by a filesystem error
    pub fn write_io(path: impl Into<String>, source: std::io::Error) -> Self {
        ConvertError::WriteFailure {
            path: path.into(),
            reason: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            ConvertError::InvalidFile { .. } => "INVALID_FILE",
            ConvertError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            ConvertError::ChannelMismatch { .. } => "CHANNEL_MISMATCH",
            ConvertError::TooManyFiles { .. } => "TOO_MANY_FILES",
            ConvertError::NoSources => "NO_SOURCES",
            ConvertError::ReadFailure { .. } => "READ_FAILURE",
            ConvertError::WriteFailure { .. } => "WRITE_FAILURE",
        }
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            ConvertError::InvalidFile { .. } => vec![
                "Check the file path is correct",
                "Make sure the file is a WAV file",
                "The file may be corrupted - try re-exporting it from the source",
            ],
            ConvertError::UnsupportedFormat { .. } => vec![
                "Supported sample formats: 16-bit, 24-bit and 32-bit integer PCM, 32-bit float",
                "All imported tracks must share the sample rate of the first track",
            ],
            ConvertError::ChannelMismatch {
                expected: ChannelPolicy::Stereo,
                ..
            } => vec!["Import only accepts stereo files - convert mono or surround files first"],
            ConvertError::ChannelMismatch { .. } => vec![
                "Export expects a multitrack recording with 2 to 12 channels",
                "This doesn't appear to be a multitrack file",
            ],
            ConvertError::TooManyFiles { .. } => vec!["A multitrack file holds at most 6 stereo tracks"],
            ConvertError::NoSources => vec!["Pass at least one stereo WAV file to import"],
            ConvertError::ReadFailure { .. } => vec![
                "The file may be truncated - check that it plays in another application",
            ],
            ConvertError::WriteFailure { .. } => vec![
                "Check that the destination is writable",
                "Free up disk space",
            ],
        }
    }

    /// Get a user-friendly message for this error
    pub fn friendly_message(&self) -> String {
        match self {
            ConvertError::InvalidFile { path, .. } => {
                format!("Couldn't open '{}' as a WAV file.", path)
            }
            ConvertError::ChannelMismatch {
                path,
                expected,
                found,
            } => format!(
                "'{}' has {} channels; expected {}.",
                path, found, expected
            ),
            ConvertError::TooManyFiles { count, max } => format!(
                "{} files were given, but only {} stereo tracks fit in a multitrack file.",
                count, max
            ),
            _ => self.to_string(),
        }
    }
}
