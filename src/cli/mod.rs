//! CLI Module
//!
//! Command-line interface for converting between multitrack and stereo WAV files.

pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// TP-7 Utility - convert between multitrack recordings and individual WAV files
#[derive(Parser, Debug)]
#[command(name = "tp7-util")]
#[command(version, about, long_about = None)]
#[command(after_help = "Examples:
  tp7-util export recording.WAV
  tp7-util export recording.WAV -o ./tracks/
  tp7-util import track1.wav track2.wav track3.wav -o multitrack.WAV
  tp7-util import ./stems/ -o multitrack.WAV")]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub report: ReportOptions,

    #[command(subcommand)]
    pub command: Commands,
}

/// How results are reported
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    /// Print the result as JSON instead of a summary
    #[arg(long, global = true)]
    pub json: bool,

    /// Print a SHA-256 checksum for every written file
    #[arg(long, global = true)]
    pub checksums: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export a multitrack file to individual stereo files
    #[command(name = "export")]
    Export {
        /// Multitrack WAV file
        input: PathBuf,

        /// Output directory (default: <input>_tracks/ next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import stereo files into a 12-channel multitrack file
    #[command(name = "import")]
    Import {
        /// Stereo WAV files, or directories of them (max 6 files)
        #[arg(required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,

        /// Output multitrack WAV file
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_export_default_output() {
        let cli = Cli::try_parse_from(["tp7-util", "export", "rec.wav"]).unwrap();
        match cli.command {
            Commands::Export { input, output } => {
                assert_eq!(input, PathBuf::from("rec.wav"));
                assert!(output.is_none());
            }
            other => panic!("Expected export, got: {:?}", other),
        }
        assert!(!cli.report.json);
    }

    #[test]
    fn test_parse_import() {
        let cli = Cli::try_parse_from([
            "tp7-util", "import", "a.wav", "b.wav", "-o", "multi.wav", "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Import { inputs, output } => {
                assert_eq!(inputs.len(), 2);
                assert_eq!(output, PathBuf::from("multi.wav"));
            }
            other => panic!("Expected import, got: {:?}", other),
        }
        assert!(cli.report.json);
    }

    #[test]
    fn test_import_requires_output() {
        assert!(Cli::try_parse_from(["tp7-util", "import", "a.wav"]).is_err());
        assert!(Cli::try_parse_from(["tp7-util", "import", "-o", "x.wav"]).is_err());
    }
}
