//! Command implementations for the labelbench CLI.

use std::path::Path;

use crate::analysis::TextAnalyzer;
use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::ExperimentConfig;
use crate::corpus::Corpus;
use crate::error::Result;
use crate::experiment::Experiment;
use crate::report::ReportWriter;

/// Execute a CLI command.
pub fn execute_command(args: LabelBenchArgs) -> Result<()> {
    match &args.command {
        Command::Run(run_args) => run_benchmark(run_args.clone(), &args),
        Command::Export(export_args) => export_dataset(export_args.clone(), &args),
    }
}

/// Load the configuration file, or the defaults when none is given.
fn load_config(path: Option<&Path>) -> Result<ExperimentConfig> {
    match path {
        Some(path) => ExperimentConfig::from_file(path),
        None => Ok(ExperimentConfig::default()),
    }
}

/// Command line values take precedence over the configuration file.
fn apply_run_overrides(mut config: ExperimentConfig, args: &RunArgs) -> Result<ExperimentConfig> {
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    if !args.k.is_empty() {
        config.knn.k_values = args.k.clone();
    }
    if !args.cardinalities.is_empty() {
        config.cardinalities = args.cardinalities.clone();
    }
    if args.parallel {
        config.knn.parallel = true;
    }
    config.validate()?;
    Ok(config)
}

fn load_corpus(
    path: &Path,
    config: &ExperimentConfig,
    cli_args: &LabelBenchArgs,
) -> Result<Corpus> {
    if cli_args.verbosity() > 1 {
        println!("Loading corpus from: {}", path.display());
    }
    let analyzer = TextAnalyzer::new(config.analysis.clone());
    Corpus::load_jsonl(path, &analyzer, &config.corpus)
}

/// Train, predict and evaluate on every feature space.
fn run_benchmark(args: RunArgs, cli_args: &LabelBenchArgs) -> Result<()> {
    let config = apply_run_overrides(load_config(args.config.as_deref())?, &args)?;
    let corpus = load_corpus(&args.corpus, &config, cli_args)?;

    let experiment = Experiment::new(config.clone())?;
    let summary = experiment.run(&corpus)?;

    if !args.no_artifacts {
        let writer = ReportWriter::new(&config.output_dir);
        writer.write_vocabulary(&corpus.vocabulary(config.corpus.min_df))?;
        writer.write_dataset(&corpus)?;
        let written = writer.write_run_artifacts(&corpus, &summary)?;
        if cli_args.verbosity() > 1 {
            println!(
                "Wrote {} artifacts to {}",
                written.len() + 2,
                config.output_dir.display()
            );
        }
    }

    output_summary(&summary, cli_args)
}

/// Write the vocabulary and dataset files only.
fn export_dataset(args: ExportArgs, cli_args: &LabelBenchArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    let corpus = load_corpus(&args.corpus, &config, cli_args)?;
    let vocabulary = corpus.vocabulary(config.corpus.min_df);

    let writer = ReportWriter::new(&config.output_dir);
    let vocabulary_path = writer.write_vocabulary(&vocabulary)?;
    let dataset_path = writer.write_dataset(&corpus)?;

    let result = ExportResult {
        vocabulary_path: vocabulary_path.display().to_string(),
        dataset_path: dataset_path.display().to_string(),
        documents: corpus.train.len() + corpus.test.len(),
        vocabulary_size: vocabulary.len(),
    };
    output_result("Export completed", &result, cli_args)
}
