//! Configuration for a benchmark run.
//!
//! Every field has a default, so a JSON config file only needs the keys it
//! overrides:
//!
//! ```json
//! { "cardinalities": [50, 100], "knn": { "k_values": [3, 5] } }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{LabelBenchError, Result};

/// Top-level configuration for an experiment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Feature space cardinalities, one run per entry, in run order.
    pub cardinalities: Vec<usize>,
    /// Text analysis settings.
    pub analysis: AnalysisConfig,
    /// Corpus and vocabulary settings.
    pub corpus: CorpusConfig,
    /// KNN classifier settings.
    pub knn: KnnConfig,
    /// Naive Bayes classifier settings.
    pub naive_bayes: NaiveBayesConfig,
    /// Directory receiving the output artifacts.
    pub output_dir: PathBuf,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            cardinalities: vec![125, 270],
            analysis: AnalysisConfig::default(),
            corpus: CorpusConfig::default(),
            knn: KnnConfig::default(),
            naive_bayes: NaiveBayesConfig::default(),
            output_dir: PathBuf::from("output"),
        }
    }
}

impl ExperimentConfig {
    /// Load a configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ExperimentConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.cardinalities.is_empty() {
            return Err(LabelBenchError::invalid_parameter(
                "at least one feature space cardinality is required",
            ));
        }
        if self.cardinalities.contains(&0) {
            return Err(LabelBenchError::invalid_parameter(
                "feature space cardinality must be positive",
            ));
        }
        if let Some(cardinality) = first_duplicate(&self.cardinalities) {
            return Err(LabelBenchError::invalid_parameter(format!(
                "feature space cardinality {} is listed more than once",
                cardinality
            )));
        }
        if self.knn.k_values.is_empty() || self.knn.k_values.contains(&0) {
            return Err(LabelBenchError::invalid_parameter(
                "knn.k_values must be a non-empty list of positive integers",
            ));
        }
        if let Some(k) = first_duplicate(&self.knn.k_values) {
            return Err(LabelBenchError::invalid_parameter(format!(
                "knn.k_values lists k = {} more than once",
                k
            )));
        }
        if !(0.0..=1.0).contains(&self.naive_bayes.posterior_threshold) {
            return Err(LabelBenchError::invalid_parameter(format!(
                "naive_bayes.posterior_threshold must be within [0, 1], got {}",
                self.naive_bayes.posterior_threshold
            )));
        }
        if !self.naive_bayes.alpha.is_finite() || self.naive_bayes.alpha < 0.0 {
            return Err(LabelBenchError::invalid_parameter(format!(
                "naive_bayes.alpha must be a non-negative number, got {}",
                self.naive_bayes.alpha
            )));
        }
        if !(0.0..1.0).contains(&self.corpus.test_ratio) {
            return Err(LabelBenchError::invalid_parameter(format!(
                "corpus.test_ratio must be within [0, 1), got {}",
                self.corpus.test_ratio
            )));
        }
        Ok(())
    }
}

/// Run artifacts are named after cardinality and k, so both lists must be
/// free of repeats.
fn first_duplicate(values: &[usize]) -> Option<usize> {
    let mut seen = AHashSet::with_capacity(values.len());
    values.iter().copied().find(|value| !seen.insert(*value))
}

/// Tokenization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Tokens with fewer characters are dropped.
    pub min_token_length: usize,
    /// Drop the built-in English stop words.
    pub stop_words: bool,
    /// Drop purely numeric tokens.
    pub drop_numeric: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_token_length: 2,
            stop_words: true,
            drop_numeric: true,
        }
    }
}

/// Corpus split and vocabulary extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Terms appearing in fewer training documents are left out of the
    /// vocabulary.
    pub min_df: usize,
    /// Share of documents without an explicit split that go to the test set.
    pub test_ratio: f64,
    /// Seed for the split of documents without an explicit split.
    pub seed: u64,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            min_df: 1,
            test_ratio: 0.3,
            seed: 42,
        }
    }
}

/// How the labels of the k nearest neighbors become a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelVote {
    /// Every label carried by at least one neighbor.
    Union,
    /// Labels carried by more than half of the neighbors, falling back to
    /// the best similarity-weighted label.
    Majority,
}

/// KNN classifier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnnConfig {
    /// Neighbor counts to evaluate, each one a separate predict pass.
    pub k_values: Vec<usize>,
    /// Label aggregation policy.
    pub vote: LabelVote,
    /// Score test documents on the rayon thread pool.
    pub parallel: bool,
}

impl Default for KnnConfig {
    fn default() -> Self {
        Self {
            k_values: vec![5],
            vote: LabelVote::Union,
            parallel: false,
        }
    }
}

/// Naive Bayes classifier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NaiveBayesConfig {
    /// Additive smoothing constant. Values below `1e-9` are raised to it.
    pub alpha: f64,
    /// Number of classes to predict; 0 selects by posterior threshold.
    pub top_k: usize,
    /// Minimum normalised posterior for a class when `top_k` is 0.
    pub posterior_threshold: f64,
}

impl Default for NaiveBayesConfig {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            top_k: 0,
            posterior_threshold: 0.2,
        }
    }
}
