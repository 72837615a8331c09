//! Output artifacts.
//!
//! Every file is written to a temporary file in the output directory and
//! renamed into place, so a failed run never leaves a truncated artifact.

use std::fmt::Write as _;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use tempfile::NamedTempFile;

use crate::corpus::{Corpus, LabelSet, Vocabulary};
use crate::error::{LabelBenchError, Result};
use crate::experiment::{ClassifierOutcome, ExperimentSummary};

pub const VOCABULARY_FILE: &str = "vocabulary.csv";
pub const DATASET_FILE: &str = "dataset.csv";
pub const TERMINATION_FILE: &str = "termination.txt";
pub const SUMMARY_FILE: &str = "summary.json";

/// Render a label set as `[a, b]`.
pub fn format_labels(labels: &LabelSet) -> String {
    let joined: Vec<&str> = labels.iter().map(String::as_str).collect();
    format!("[{}]", joined.join(", "))
}

/// File name of the prediction report of one outcome.
pub fn predictions_file_name(outcome: &ClassifierOutcome, cardinality: usize) -> String {
    match outcome.k {
        Some(k) => format!("predictions_{}_k{}_{}.txt", outcome.classifier, k, cardinality),
        None => format!("predictions_{}_{}.txt", outcome.classifier, cardinality),
    }
}

fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut file = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(file.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Writes the artifacts of a run into one directory.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new<P: Into<PathBuf>>(output_dir: P) -> Self {
        ReportWriter {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// `Term,Index`, one row per vocabulary term in order.
    pub fn write_vocabulary(&self, vocabulary: &Vocabulary) -> Result<PathBuf> {
        let path = self.output_dir.join(VOCABULARY_FILE);
        write_atomic(&path, |out| {
            let mut writer = csv::Writer::from_writer(out);
            writer.write_record(["Term", "Index"])?;
            for (index, term, _) in vocabulary.iter() {
                writer.write_record([term, index.to_string().as_str()])?;
            }
            writer.flush()?;
            Ok(())
        })?;
        log::info!("wrote {}", path.display());
        Ok(path)
    }

    /// Labels and `(term,frequency)` pairs of every document, by id.
    pub fn write_dataset(&self, corpus: &Corpus) -> Result<PathBuf> {
        let path = self.output_dir.join(DATASET_FILE);
        write_atomic(&path, |out| {
            let mut writer = WriterBuilder::new().flexible(true).from_writer(out);
            writer.write_record(["document_id - (term,frequency) - [class labels]"])?;
            for document in corpus.documents() {
                writer.write_record([format!("document {}", document.id)])?;
                writer.write_record(["class labels:"])?;
                writer.write_record(&document.labels)?;
                writer.write_record(["term frequencies:"])?;
                writer.write_record(
                    document
                        .term_frequencies
                        .iter()
                        .map(|(term, count)| format!("({},{})", term, count)),
                )?;
            }
            writer.flush()?;
            Ok(())
        })?;
        log::info!("wrote {}", path.display());
        Ok(path)
    }

    /// `<truth> -> <predicted>`, one line per test document.
    pub fn write_predictions(
        &self,
        file_name: &str,
        truth: &[LabelSet],
        predicted: &[LabelSet],
    ) -> Result<PathBuf> {
        if truth.len() != predicted.len() {
            return Err(LabelBenchError::shape_mismatch(format!(
                "{} predictions for {} ground-truth label sets",
                predicted.len(),
                truth.len()
            )));
        }
        let path = self.output_dir.join(file_name);
        write_atomic(&path, |out| {
            writeln!(out, "True labels -> Predicted labels")?;
            for (t, p) in truth.iter().zip(predicted) {
                writeln!(out, "{} -> {}", format_labels(t), format_labels(p))?;
            }
            Ok(())
        })?;
        log::debug!("wrote {}", path.display());
        Ok(path)
    }

    /// Accuracy and costs of every run.
    pub fn write_termination(&self, summary: &ExperimentSummary) -> Result<PathBuf> {
        let path = self.output_dir.join(TERMINATION_FILE);
        let text = termination_message(summary);
        write_atomic(&path, |out| {
            out.write_all(text.as_bytes())?;
            Ok(())
        })?;
        log::info!("wrote {}", path.display());
        Ok(path)
    }

    /// The summary as pretty-printed JSON.
    pub fn write_summary_json(&self, summary: &ExperimentSummary) -> Result<PathBuf> {
        let path = self.output_dir.join(SUMMARY_FILE);
        write_atomic(&path, |out| {
            serde_json::to_writer_pretty(&mut *out, summary)?;
            writeln!(out)?;
            Ok(())
        })?;
        Ok(path)
    }

    /// Prediction reports for every outcome, the termination message and
    /// the JSON summary.
    pub fn write_run_artifacts(
        &self,
        corpus: &Corpus,
        summary: &ExperimentSummary,
    ) -> Result<Vec<PathBuf>> {
        let truth = corpus.test_labels();
        let mut written = Vec::new();
        for run in &summary.runs {
            for outcome in run.knn.iter().chain(std::iter::once(&run.naive_bayes)) {
                let name = predictions_file_name(outcome, run.cardinality);
                written.push(self.write_predictions(&name, &truth, &outcome.predictions)?);
            }
        }
        written.push(self.write_termination(summary)?);
        written.push(self.write_summary_json(summary)?);
        Ok(written)
    }
}

/// Human-readable summary of all runs.
pub fn termination_message(summary: &ExperimentSummary) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "========== Benchmark summary ==========");
    let _ = writeln!(text, "Generated at {}", summary.generated_at.to_rfc3339());
    let _ = writeln!(
        text,
        "Training documents: {}, test documents: {}, vocabulary: {} terms, classes: {}",
        summary.train_documents, summary.test_documents, summary.vocabulary_size, summary.classes
    );
    for run in &summary.runs {
        let _ = writeln!(text);
        let _ = writeln!(
            text,
            "Feature space cardinality {} ({} columns):",
            run.cardinality, run.features
        );
        for outcome in run.knn.iter().chain(std::iter::once(&run.naive_bayes)) {
            let name = match outcome.k {
                Some(k) => format!("{} (k = {})", outcome.classifier, k),
                None => outcome.classifier.clone(),
            };
            let _ = writeln!(
                text,
                "  {}: accuracy {:.4}, offline cost {:.6} s, online cost {:.6} s",
                name, outcome.accuracy, outcome.build_seconds, outcome.predict_seconds
            );
        }
    }
    text
}
