//! # labelbench
//!
//! Multi-label text classification benchmark.
//!
//! ## Features
//!
//! - JSON Lines corpus loading with Unicode word tokenization
//! - TF-IDF feature spaces of configurable cardinality
//! - K-nearest-neighbors classification by cosine similarity
//! - Multinomial Naive Bayes with a posterior threshold or top-k rule
//! - Multi-label accuracy with timed build and predict phases
//! - CSV, text and JSON reports

pub mod analysis;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod error;
pub mod evaluation;
pub mod experiment;
pub mod feature;
pub mod report;

pub mod prelude {
    pub use crate::analysis::TextAnalyzer;
    pub use crate::classifier::{Classifier, KnnClassifier, NaiveBayesClassifier};
    pub use crate::config::ExperimentConfig;
    pub use crate::corpus::{Corpus, Document, LabelSet, Vocabulary};
    pub use crate::error::{LabelBenchError, Result};
    pub use crate::experiment::{Experiment, ExperimentSummary};
    pub use crate::report::ReportWriter;
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
