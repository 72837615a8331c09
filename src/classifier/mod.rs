//! Multi-label classifiers over TF-IDF features.
//!
//! # Architecture
//!
//! - `Classifier` trait: the fit/predict capability shared by all variants
//! - `KnnClassifier`: lazy learner ranking training documents by cosine
//!   similarity
//! - `NaiveBayesClassifier`: multinomial model scored in log space
//!
//! Both return one [`LabelSet`] per test document, in input order.

mod knn;
mod naive_bayes;

pub use knn::{KnnClassifier, Neighbor, cosine_similarity};
pub use naive_bayes::{MIN_ALPHA, NaiveBayesClassifier};

use crate::corpus::{ClassFrequencies, Document, LabelSet};
use crate::error::{LabelBenchError, Result};
use crate::feature::FeatureMatrix;

/// Training input: documents, their feature rows and the label table.
#[derive(Debug, Clone, Copy)]
pub struct TrainingData<'a> {
    pub documents: &'a [Document],
    pub features: &'a FeatureMatrix,
    pub class_frequencies: &'a ClassFrequencies,
}

/// Documents to classify with their feature rows.
#[derive(Debug, Clone, Copy)]
pub struct TestData<'a> {
    pub documents: &'a [Document],
    pub features: &'a FeatureMatrix,
}

impl TrainingData<'_> {
    pub(crate) fn check_shape(&self) -> Result<()> {
        check_rows(self.documents.len(), self.features)
    }
}

impl TestData<'_> {
    pub(crate) fn check_shape(&self) -> Result<()> {
        check_rows(self.documents.len(), self.features)
    }
}

fn check_rows(documents: usize, features: &FeatureMatrix) -> Result<()> {
    if documents != features.len() {
        return Err(LabelBenchError::shape_mismatch(format!(
            "{} documents but {} feature rows",
            documents,
            features.len()
        )));
    }
    Ok(())
}

/// Classifier trait.
///
/// `fit` is the offline step and `predict` the online step; the experiment
/// runner times them separately.
pub trait Classifier {
    /// Name used in logs and report file names.
    fn name(&self) -> &str;

    /// Learn from the training data. Refitting replaces the previous model.
    fn fit(&mut self, training: &TrainingData<'_>) -> Result<()>;

    /// Predict one label set per test document, in input order.
    ///
    /// Fails with `InvalidOperation` before `fit`.
    fn predict(&self, test: &TestData<'_>) -> Result<Vec<LabelSet>>;
}
