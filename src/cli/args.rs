//! Command line argument parsing for the labelbench CLI using clap.

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// labelbench - KNN and Naive Bayes multi-label text classification benchmark
#[derive(Parser, Debug, Clone)]
#[command(name = "labelbench")]
#[command(about = "Benchmark KNN and Naive Bayes multi-label classifiers over TF-IDF features")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct LabelBenchArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl LabelBenchArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Train and evaluate both classifiers on every feature space
    Run(RunArgs),

    /// Write vocabulary.csv and dataset.csv without classifying
    Export(ExportArgs),
}

/// Arguments for a benchmark run
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Corpus file (JSON Lines)
    #[arg(value_name = "CORPUS")]
    pub corpus: PathBuf,

    /// Configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Directory for the output artifacts
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Neighbor counts for KNN (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub k: Vec<usize>,

    /// Feature space cardinalities (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub cardinalities: Vec<usize>,

    /// Score KNN test documents in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Skip writing artifacts, only print the summary
    #[arg(long)]
    pub no_artifacts: bool,
}

/// Arguments for exporting the vocabulary and dataset
#[derive(Parser, Debug, Clone)]
pub struct ExportArgs {
    /// Corpus file (JSON Lines)
    #[arg(value_name = "CORPUS")]
    pub corpus: PathBuf,

    /// Configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Directory for the output artifacts
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_command() {
        let args = LabelBenchArgs::try_parse_from([
            "labelbench",
            "run",
            "reuters.jsonl",
            "--config",
            "bench.json",
            "-k",
            "3,5,7",
            "--cardinalities",
            "50,100",
            "--parallel",
        ])
        .unwrap();

        if let Command::Run(run_args) = args.command {
            assert_eq!(run_args.corpus, PathBuf::from("reuters.jsonl"));
            assert_eq!(run_args.config, Some(PathBuf::from("bench.json")));
            assert_eq!(run_args.k, vec![3, 5, 7]);
            assert_eq!(run_args.cardinalities, vec![50, 100]);
            assert!(run_args.parallel);
            assert!(!run_args.no_artifacts);
            assert_eq!(run_args.output_dir, None);
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn test_export_command() {
        let args = LabelBenchArgs::try_parse_from([
            "labelbench",
            "export",
            "reuters.jsonl",
            "--output-dir",
            "/tmp/out",
        ])
        .unwrap();

        if let Command::Export(export_args) = args.command {
            assert_eq!(export_args.corpus, PathBuf::from("reuters.jsonl"));
            assert_eq!(export_args.output_dir, Some(PathBuf::from("/tmp/out")));
        } else {
            panic!("Expected Export command");
        }
    }

    #[test]
    fn test_verbosity_levels() {
        let args = LabelBenchArgs::try_parse_from(["labelbench", "run", "c.jsonl"]).unwrap();
        assert_eq!(args.verbosity(), 1);

        let args = LabelBenchArgs::try_parse_from(["labelbench", "-vv", "run", "c.jsonl"]).unwrap();
        assert_eq!(args.verbosity(), 2);

        let args =
            LabelBenchArgs::try_parse_from(["labelbench", "--quiet", "run", "c.jsonl"]).unwrap();
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn test_output_format() {
        let args =
            LabelBenchArgs::try_parse_from(["labelbench", "--format", "json", "run", "c.jsonl"])
                .unwrap();
        assert!(matches!(args.output_format, OutputFormat::Json));
    }
}
