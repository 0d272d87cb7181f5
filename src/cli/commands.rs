//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use log::{info, warn};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::cli::ReportOptions;
use crate::engine::{self, ConversionResult, JobMode};
use crate::error::{ConvertError, Result};

/// Export a multitrack file to stereo tracks.
pub fn export(input: &Path, output: Option<&Path>, report: ReportOptions) -> Result<()> {
    let output_dir = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_export_dir(input));

    if !report.json {
        println!("Input file: {}", input.display());
        println!("Output directory: {}", output_dir.display());
    }

    let result = engine::export(input, &output_dir)?;
    print_result(&result, report)
}

/// Import stereo files into a multitrack file.
pub fn import(inputs: &[PathBuf], output: &Path, report: ReportOptions) -> Result<()> {
    let files = expand_inputs(inputs);
    info!("Found {} valid input file(s)", files.len());

    if !report.json {
        for (i, file) in files.iter().enumerate() {
            println!("Track {}: {}", i + 1, file.display());
        }
    }

    let result = engine::import(&files, output)?;
    print_result(&result, report)
}

/// Directory an export lands in when none is given: `<stem>_tracks` next to the input.
pub fn default_export_dir(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "multitrack".to_string());
    let parent = input.parent().unwrap_or_else(|| Path::new(""));
    parent.join(format!("{}_tracks", stem))
}

/// Resolve import arguments to a list of files.
///
/// Directories expand to the `.wav` files directly inside them, sorted by
/// name. Paths that do not exist are skipped with a warning.
pub fn expand_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(input)
                .min_depth(1)
                .max_depth(1)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file())
                .map(|entry| entry.into_path())
                .filter(|path| is_wav(path))
                .collect();
            found.sort();
            if found.is_empty() {
                warn!("No WAV files in '{}', skipping.", input.display());
            }
            files.extend(found);
        } else if input.exists() {
            files.push(input.clone());
        } else {
            warn!("File '{}' not found, skipping.", input.display());
        }
    }

    files
}

fn is_wav(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("wav"))
        .unwrap_or(false)
}

/// Calculate SHA-256 checksum of a file
pub fn file_checksum(path: &Path) -> Result<String> {
    let read_err = |e: std::io::Error| ConvertError::ReadFailure {
        path: path.display().to_string(),
        reason: e.to_string(),
        source: Some(Box::new(e)),
    };

    let mut file = File::open(path).map_err(read_err)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = file.read(&mut buffer).map_err(read_err)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

fn print_result(result: &ConversionResult, report: ReportOptions) -> Result<()> {
    let checksums = if report.checksums {
        result
            .outputs
            .iter()
            .map(|path| file_checksum(path))
            .collect::<Result<Vec<_>>>()?
    } else {
        Vec::new()
    };

    if report.json {
        let mut value = serde_json::to_value(result).map_err(|e| ConvertError::WriteFailure {
            path: "<stdout>".to_string(),
            reason: e.to_string(),
            source: Some(Box::new(e)),
        })?;
        if report.checksums {
            value["checksums"] = serde_json::json!(checksums);
        }
        println!("{}", value);
        return Ok(());
    }

    let desc = &result.multitrack;
    println!(
        "Multitrack format: {} channels, {}, {} Hz, {:.2} seconds",
        desc.channels,
        desc.bit_depth,
        desc.sample_rate,
        desc.duration_secs()
    );

    match result.mode {
        JobMode::Export => println!(
            "\nSuccessfully exported {} stereo tracks ({} frames)",
            result.tracks_written, result.frames_written
        ),
        JobMode::Import => println!(
            "\nSuccessfully created multitrack file with {} active tracks ({} frames)",
            result.tracks_written, result.frames_written
        ),
    }

    for (i, path) in result.outputs.iter().enumerate() {
        match checksums.get(i) {
            Some(sum) => println!("  {}  {}", sum, path.display()),
            None => println!("  {}", path.display()),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_export_dir() {
        assert_eq!(
            default_export_dir(Path::new("/music/take1.WAV")),
            PathBuf::from("/music/take1_tracks")
        );
        assert_eq!(
            default_export_dir(Path::new("take1.wav")),
            PathBuf::from("take1_tracks")
        );
    }

    #[test]
    fn test_expand_inputs() {
        let dir = tempdir().unwrap();
        let stems = dir.path().join("stems");
        std::fs::create_dir(&stems).unwrap();
        std::fs::write(stems.join("b.wav"), b"").unwrap();
        std::fs::write(stems.join("a.WAV"), b"").unwrap();
        std::fs::write(stems.join("notes.txt"), b"").unwrap();
        let single = dir.path().join("single.wav");
        std::fs::write(&single, b"").unwrap();

        let files = expand_inputs(&[
            single.clone(),
            dir.path().join("missing.wav"),
            stems.clone(),
        ]);

        assert_eq!(files, vec![single, stems.join("a.WAV"), stems.join("b.wav")]);
    }

    #[test]
    fn test_file_checksum() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("abc.bin");
        std::fs::write(&path, b"abc").unwrap();

        assert_eq!(
            file_checksum(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
