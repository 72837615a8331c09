//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::cli::args::{LabelBenchArgs, OutputFormat};
use crate::error::Result;
use crate::experiment::{ClassifierOutcome, ExperimentSummary};

/// Result structure for a dataset export.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportResult {
    pub vocabulary_path: String,
    pub dataset_path: String,
    pub documents: usize,
    pub vocabulary_size: usize,
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &LabelBenchArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_generic_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output the benchmark summary in the specified format.
pub fn output_summary(summary: &ExperimentSummary, args: &LabelBenchArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 0 {
                print!("{}", format_summary_table(summary));
            }
            Ok(())
        }
        OutputFormat::Json => output_json(summary, args),
    }
}

/// One row per classifier setting, grouped by feature space.
pub fn format_summary_table(summary: &ExperimentSummary) -> String {
    let mut lines = vec![
        "Benchmark Results:".to_string(),
        "══════════════════".to_string(),
        format!(
            "Documents: {} train / {} test, vocabulary: {} terms, classes: {}",
            summary.train_documents,
            summary.test_documents,
            summary.vocabulary_size,
            summary.classes
        ),
    ];

    for run in &summary.runs {
        lines.push(String::new());
        lines.push(format!(
            "Cardinality {} ({} features)",
            run.cardinality, run.features
        ));
        lines.push("─────────────────────────────────────────────────────".to_string());
        lines.push(format!(
            "{:<18} {:>10} {:>12} {:>12}",
            "classifier", "accuracy", "build (s)", "predict (s)"
        ));
        for outcome in run.knn.iter().chain(std::iter::once(&run.naive_bayes)) {
            lines.push(format_outcome_row(outcome));
        }
    }

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn format_outcome_row(outcome: &ClassifierOutcome) -> String {
    let name = match outcome.k {
        Some(k) => format!("{} k={}", outcome.classifier, k),
        None => outcome.classifier.clone(),
    };
    format!(
        "{:<18} {:>10.4} {:>12.6} {:>12.6}",
        name, outcome.accuracy, outcome.build_seconds, outcome.predict_seconds
    )
}

/// Output generic data in human format.
fn output_generic_human<T: Serialize>(
    message: &str,
    result: &T,
    args: &LabelBenchArgs,
) -> Result<()> {
    if args.verbosity() == 0 {
        return Ok(());
    }
    println!("{message}");
    println!();

    match serde_json::to_value(result)? {
        serde_json::Value::Object(obj) => {
            for (key, val) in &obj {
                println!("{key}: {}", format_value(val));
            }
        }
        value => println!("{}", format_value(&value)),
    }
    Ok(())
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &LabelBenchArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

/// Format a JSON value for human display.
fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Null => "null".to_string(),
        serde_json::Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            format!("[{}]", items.join(", "))
        }
        serde_json::Value::Object(_) => value.to_string(),
    }
}
