//! Conversion jobs
//!
//! The two public operations: export (multitrack -> stereo tracks) and
//! import (stereo tracks -> 12-channel multitrack). A job owns every handle
//! it opens; all of them are closed before the call returns, on success and
//! on failure alike.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Serialize;

use crate::engine::convert::BitDepth;
use crate::engine::pipeline;
use crate::engine::probe::{StreamDescriptor, MULTITRACK_CHANNELS};
use crate::engine::wav::{WavSink, WavSource};
use crate::error::{ConvertError, Result};

/// Stereo tracks a multitrack file holds at most
pub const MAX_TRACKS: usize = 6;

/// Encoding of exported stereo tracks
pub const EXPORT_BIT_DEPTH: BitDepth = BitDepth::Int16;

/// Encoding of imported multitrack files
pub const IMPORT_BIT_DEPTH: BitDepth = BitDepth::Int24;

/// File name of an exported track (1-based)
pub fn track_file_name(track: usize) -> String {
    format!("track_{:02}.wav", track)
}

/// Direction of a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobMode {
    /// Split one multitrack file into stereo tracks
    Export,
    /// Combine stereo tracks into one multitrack file
    Import,
}

/// Outcome of a successful conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionResult {
    pub mode: JobMode,
    /// Stereo tracks written (export) or read (import)
    pub tracks_written: usize,
    /// Frames written to each destination file
    pub frames_written: u64,
    /// Pipeline iterations performed
    pub chunks_processed: usize,
    /// Sample rate shared by every destination
    pub sample_rate: u32,
    /// Multitrack side of the conversion: the source on export, the
    /// destination on import
    pub multitrack: StreamDescriptor,
    /// Files written, in track order
    pub outputs: Vec<PathBuf>,
}

/// A single conversion request
///
/// Constructed per invocation and consumed by [`ConversionJob::run`].
#[derive(Debug, Clone)]
pub struct ConversionJob {
    mode: JobMode,
    sources: Vec<PathBuf>,
    destination: PathBuf,
}

impl ConversionJob {
    /// Export `source` into stereo tracks inside `destination_dir`
    pub fn export(source: impl Into<PathBuf>, destination_dir: impl Into<PathBuf>) -> Self {
        Self {
            mode: JobMode::Export,
            sources: vec![source.into()],
            destination: destination_dir.into(),
        }
    }

    /// Import 1 to 6 stereo `sources` into the multitrack file `destination`
    pub fn import<P: Into<PathBuf>>(
        sources: impl IntoIterator<Item = P>,
        destination: impl Into<PathBuf>,
    ) -> Result<Self> {
        let sources: Vec<PathBuf> = sources.into_iter().map(Into::into).collect();
        if sources.is_empty() {
            return Err(ConvertError::NoSources);
        }
        if sources.len() > MAX_TRACKS {
            return Err(ConvertError::TooManyFiles {
                count: sources.len(),
                max: MAX_TRACKS,
            });
        }

        Ok(Self {
            mode: JobMode::Import,
            sources,
            destination: destination.into(),
        })
    }

    pub fn mode(&self) -> JobMode {
        self.mode
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Run the job to completion or to its first error
    pub fn run(self) -> Result<ConversionResult> {
        match self.mode {
            JobMode::Export => run_export(&self.sources[0], &self.destination),
            JobMode::Import => run_import(&self.sources, &self.destination),
        }
    }
}

/// Split a multitrack file into `track_NN.wav` files in `destination_dir`
pub fn export(source: &Path, destination_dir: &Path) -> Result<ConversionResult> {
    ConversionJob::export(source, destination_dir).run()
}

/// Combine stereo files into one 12-channel multitrack file
pub fn import<P: AsRef<Path>>(sources: &[P], destination: &Path) -> Result<ConversionResult> {
    ConversionJob::import(sources.iter().map(|p| p.as_ref().to_path_buf()), destination)?.run()
}

fn run_export(source_path: &Path, destination_dir: &Path) -> Result<ConversionResult> {
    let mut source = WavSource::open(source_path)?;
    let descriptor = *source.descriptor();
    descriptor.ensure_multitrack(source_path)?;

    let tracks = descriptor.track_count();
    info!(
        "exporting {} ({} tracks, {} frames) to {}",
        source_path.display(),
        tracks,
        descriptor.total_frames,
        destination_dir.display()
    );

    let track_paths: Vec<PathBuf> = (1..=tracks)
        .map(|track| destination_dir.join(track_file_name(track)))
        .collect();
    for path in &track_paths {
        ensure_not_source(path, &[source_path])?;
    }

    fs::create_dir_all(destination_dir)
        .map_err(|e| ConvertError::write_io(destination_dir.display().to_string(), e))?;

    let mut created = CreatedFiles::default();
    let mut sinks = Vec::with_capacity(tracks);
    for path in &track_paths {
        sinks.push(WavSink::create(
            path,
            2,
            descriptor.sample_rate,
            EXPORT_BIT_DEPTH,
        )?);
        created.push(path);
    }

    let stats = pipeline::split(&mut source, &mut sinks)?;
    drop(source);

    let mut outputs = Vec::with_capacity(tracks);
    for sink in sinks {
        outputs.push(sink.path().to_path_buf());
        sink.finalize()?;
    }
    created.commit();

    info!("exported {} tracks", tracks);
    Ok(ConversionResult {
        mode: JobMode::Export,
        tracks_written: tracks,
        frames_written: stats.frames_processed,
        chunks_processed: stats.iterations,
        sample_rate: descriptor.sample_rate,
        multitrack: descriptor,
        outputs,
    })
}

fn run_import(source_paths: &[PathBuf], destination: &Path) -> Result<ConversionResult> {
    let mut sources = Vec::with_capacity(source_paths.len());
    for path in source_paths {
        let source = WavSource::open(path)?;
        source.descriptor().ensure_stereo(path)?;
        sources.push(source);
    }

    let reference_rate = sources[0].descriptor().sample_rate;
    for source in &sources[1..] {
        let rate = source.descriptor().sample_rate;
        if rate != reference_rate {
            return Err(ConvertError::UnsupportedFormat {
                path: source.path().display().to_string(),
                reason: format!(
                    "sample rate {} Hz does not match {} Hz of {}",
                    rate,
                    reference_rate,
                    sources[0].path().display()
                ),
            });
        }
    }

    let max_frames = sources
        .iter()
        .map(|s| s.descriptor().total_frames)
        .max()
        .unwrap_or(0);
    for (i, source) in sources.iter().enumerate() {
        let frames = source.descriptor().total_frames;
        if frames < max_frames {
            warn!(
                "track {}: padding {} frames with silence",
                i + 1,
                max_frames - frames
            );
        }
    }
    info!(
        "importing {} tracks ({} frames at {} Hz) into {}",
        sources.len(),
        max_frames,
        reference_rate,
        destination.display()
    );

    let source_refs: Vec<&Path> = source_paths.iter().map(PathBuf::as_path).collect();
    ensure_not_source(destination, &source_refs)?;

    let mut created = CreatedFiles::default();
    let mut sink = WavSink::create(
        destination,
        MULTITRACK_CHANNELS,
        reference_rate,
        IMPORT_BIT_DEPTH,
    )?;
    created.push(destination);

    let stats = pipeline::merge(&mut sources, &mut sink)?;
    drop(sources);
    let frames_written = sink.finalize()?;
    created.commit();

    info!("wrote {} frames to {}", frames_written, destination.display());
    Ok(ConversionResult {
        mode: JobMode::Import,
        tracks_written: source_paths.len(),
        frames_written,
        chunks_processed: stats.iterations,
        sample_rate: reference_rate,
        multitrack: StreamDescriptor {
            sample_rate: reference_rate,
            channels: MULTITRACK_CHANNELS,
            bit_depth: IMPORT_BIT_DEPTH,
            total_frames: frames_written,
        },
        outputs: vec![destination.to_path_buf()],
    })
}

/// Refuse a destination that resolves to one of the job's sources
///
/// Opening the destination would truncate the source mid-read. Checked
/// before any destination is opened. A destination that does not exist yet
/// cannot collide.
fn ensure_not_source(destination: &Path, sources: &[&Path]) -> Result<()> {
    let Ok(target) = fs::canonicalize(destination) else {
        return Ok(());
    };
    for source in sources {
        if fs::canonicalize(source).map_or(false, |s| s == target) {
            return Err(ConvertError::WriteFailure {
                path: destination.display().to_string(),
                reason: format!("destination is the source file {}", source.display()),
                source: None,
            });
        }
    }
    Ok(())
}

/// Destination files created by a running job
///
/// Removed on drop unless the job commits, so a failed job leaves behind no
/// files of its own. Paths are registered only once their writer exists.
/// Writers must be dropped before this guard.
#[derive(Debug, Default)]
struct CreatedFiles {
    paths: Vec<PathBuf>,
    committed: bool,
}

impl CreatedFiles {
    fn push(&mut self, path: &Path) {
        self.paths.push(path.to_path_buf());
    }

    fn commit(&mut self) {
        self.committed = true;
    }
}

impl Drop for CreatedFiles {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        for path in &self.paths {
            if let Err(e) = fs::remove_file(path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("could not remove {}: {}", path.display(), e);
                }
            }
        }
    }
}
