//! Integration tests for the files a benchmark run writes.

use std::fs;

use labelbench::config::ExperimentConfig;
use labelbench::corpus::{Corpus, Document, LabelSet};
use labelbench::error::Result;
use labelbench::experiment::Experiment;
use labelbench::report::*;
use tempfile::TempDir;

fn corpus() -> Corpus {
    Corpus::new(
        vec![
            Document::new(0, vec![("oil", 3), ("barrel", 1)], vec!["crude"]),
            Document::new(1, vec![("wheat", 2), ("corn", 1)], vec!["grain"]),
            Document::new(3, vec![("wheat", 1), ("export", 2)], vec!["grain", "trade"]),
        ],
        vec![
            Document::new(2, vec![("oil", 2)], vec!["crude"]),
            Document::new(4, vec![("corn", 1)], vec!["grain"]),
        ],
    )
}

fn file_names(dir: &TempDir) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir.path())? {
        names.push(entry?.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

#[test]
fn test_vocabulary_csv() -> Result<()> {
    let dir = TempDir::new()?;
    let writer = ReportWriter::new(dir.path());
    let path = writer.write_vocabulary(&corpus().vocabulary(1))?;

    let content = fs::read_to_string(path)?;
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        vec!["Term,Index", "wheat,0", "oil,1", "barrel,2", "corn,3", "export,4"]
    );

    Ok(())
}

#[test]
fn test_dataset_csv_lists_documents_by_id() -> Result<()> {
    let dir = TempDir::new()?;
    let writer = ReportWriter::new(dir.path());
    let content = fs::read_to_string(writer.write_dataset(&corpus())?)?;

    let ids: Vec<&str> = content
        .lines()
        .filter(|line| line.starts_with("document "))
        .collect();
    assert_eq!(
        ids,
        vec!["document 0", "document 1", "document 2", "document 3", "document 4"]
    );
    assert!(content.contains("grain,trade"));
    assert!(content.contains("\"(oil,3)\",\"(barrel,1)\""));

    Ok(())
}

#[test]
fn test_run_artifacts() -> Result<()> {
    let dir = TempDir::new()?;
    let mut config = ExperimentConfig {
        cardinalities: vec![3, 125],
        ..ExperimentConfig::default()
    };
    config.knn.k_values = vec![1, 2];

    let corpus = corpus();
    let summary = Experiment::new(config)?.run(&corpus)?;
    let writer = ReportWriter::new(dir.path());
    let written = writer.write_run_artifacts(&corpus, &summary)?;

    // two k values and one Naive Bayes model per cardinality, plus the summaries
    assert_eq!(written.len(), 2 * 3 + 2);
    assert_eq!(
        file_names(&dir)?,
        vec![
            "predictions_knn_k1_125.txt",
            "predictions_knn_k1_3.txt",
            "predictions_knn_k2_125.txt",
            "predictions_knn_k2_3.txt",
            "predictions_naive_bayes_125.txt",
            "predictions_naive_bayes_3.txt",
            SUMMARY_FILE,
            TERMINATION_FILE,
        ]
    );

    let predictions = fs::read_to_string(dir.path().join("predictions_knn_k1_125.txt"))?;
    let lines: Vec<&str> = predictions.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "True labels -> Predicted labels");
    assert_eq!(lines[1], "[crude] -> [crude]");
    assert_eq!(lines[2], "[grain] -> [grain]");

    let termination = fs::read_to_string(dir.path().join(TERMINATION_FILE))?;
    assert_eq!(termination, termination_message(&summary));
    assert!(termination.contains("Feature space cardinality 125"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join(SUMMARY_FILE))?)?;
    assert_eq!(json["train_documents"], 3);
    assert_eq!(json["runs"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["runs"][1]["knn"][0]["k"], 1);
    assert!(json["runs"][0]["knn"][0].get("predictions").is_none());

    Ok(())
}

#[test]
fn test_rewrite_replaces_previous_file() -> Result<()> {
    let dir = TempDir::new()?;
    let writer = ReportWriter::new(dir.path().join("nested"));
    let truth: Vec<LabelSet> = vec![["crude".to_string()].into_iter().collect()];

    writer.write_predictions("p.txt", &truth, &truth)?;
    let path = writer.write_predictions("p.txt", &truth, &[LabelSet::new()])?;

    let content = fs::read_to_string(path)?;
    assert!(content.ends_with("[crude] -> []\n"));
    assert_eq!(fs::read_dir(writer.output_dir())?.count(), 1);

    Ok(())
}
