//! Timed benchmark runs, one per feature space cardinality.
//!
//! Feature construction is not timed. Build time brackets `fit`, predict
//! time brackets `predict`; accuracy is computed afterwards.

use std::time::Instant;

use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;

use crate::classifier::{Classifier, KnnClassifier, NaiveBayesClassifier, TestData, TrainingData};
use crate::config::ExperimentConfig;
use crate::corpus::{Corpus, LabelSet, Vocabulary};
use crate::error::{LabelBenchError, Result};
use crate::evaluation::accuracy;
use crate::feature::{FeatureMatrix, FeatureSpace, derive_feature_spaces};

/// Result of evaluating one classifier setting.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifierOutcome {
    /// Classifier name, as reported by [`Classifier::name`].
    pub classifier: String,
    /// Neighbor count for KNN.
    pub k: Option<usize>,
    pub accuracy: f64,
    /// Offline cost in seconds.
    pub build_seconds: f64,
    /// Online cost in seconds.
    pub predict_seconds: f64,
    /// One label set per test document.
    #[serde(skip)]
    pub predictions: Vec<LabelSet>,
}

/// Outcomes of both classifiers on one feature space.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Requested cardinality.
    pub cardinality: usize,
    /// Actual number of columns, lower when the vocabulary is smaller.
    pub features: usize,
    /// One outcome per configured k, in configuration order.
    pub knn: Vec<ClassifierOutcome>,
    pub naive_bayes: ClassifierOutcome,
}

impl RunReport {
    /// The KNN outcome of the last configured k.
    pub fn final_knn(&self) -> Option<&ClassifierOutcome> {
        self.knn.last()
    }
}

/// Everything a benchmark produced, in run order.
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentSummary {
    pub generated_at: DateTime<Utc>,
    pub train_documents: usize,
    pub test_documents: usize,
    pub vocabulary_size: usize,
    pub classes: usize,
    pub runs: Vec<RunReport>,
}

impl ExperimentSummary {
    /// The run for `cardinality`, if one was made.
    pub fn run(&self, cardinality: usize) -> Option<&RunReport> {
        self.runs.iter().find(|r| r.cardinality == cardinality)
    }
}

/// Benchmark driver.
#[derive(Debug, Clone)]
pub struct Experiment {
    config: ExperimentConfig,
}

impl Experiment {
    /// Create a driver; the configuration is validated.
    pub fn new(config: ExperimentConfig) -> Result<Self> {
        config.validate()?;
        Ok(Experiment { config })
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Run every configured cardinality on `corpus`.
    pub fn run(&self, corpus: &Corpus) -> Result<ExperimentSummary> {
        if corpus.train.is_empty() {
            return Err(LabelBenchError::insufficient_data("corpus has no training documents"));
        }
        if corpus.test.is_empty() {
            return Err(LabelBenchError::insufficient_data("corpus has no test documents"));
        }

        let vocabulary = corpus.vocabulary(self.config.corpus.min_df);
        let spaces = derive_feature_spaces(&vocabulary, &self.config.cardinalities)?;
        info!(
            "{} training documents, {} test documents, {} vocabulary terms",
            corpus.train.len(),
            corpus.test.len(),
            vocabulary.len()
        );

        let mut runs = Vec::with_capacity(spaces.len());
        for (space, &cardinality) in spaces.iter().zip(&self.config.cardinalities) {
            runs.push(self.run_feature_space(corpus, &vocabulary, space, cardinality)?);
        }

        Ok(ExperimentSummary {
            generated_at: Utc::now(),
            train_documents: corpus.train.len(),
            test_documents: corpus.test.len(),
            vocabulary_size: vocabulary.len(),
            classes: corpus.class_frequencies().len(),
            runs,
        })
    }

    /// Evaluate both classifiers on a single feature space.
    pub fn run_feature_space(
        &self,
        corpus: &Corpus,
        vocabulary: &Vocabulary,
        space: &FeatureSpace,
        cardinality: usize,
    ) -> Result<RunReport> {
        info!("feature space of cardinality {} ({} columns)", cardinality, space.len());

        let n_train = corpus.train.len();
        let train_features = FeatureMatrix::build(space, vocabulary, &corpus.train, n_train)?;
        let test_features = FeatureMatrix::build(space, vocabulary, &corpus.test, n_train)?;
        let class_frequencies = corpus.class_frequencies();
        let truth = corpus.test_labels();

        let training = TrainingData {
            documents: &corpus.train,
            features: &train_features,
            class_frequencies: &class_frequencies,
        };
        let test = TestData {
            documents: &corpus.test,
            features: &test_features,
        };

        let mut knn = KnnClassifier::from_config(&self.config.knn)?;
        let knn_build = fit_timed(&mut knn, &training)?;
        let mut knn_outcomes = Vec::with_capacity(self.config.knn.k_values.len());
        for &k in &self.config.knn.k_values {
            knn.set_k(k)?;
            knn_outcomes.push(evaluate(&knn, &test, &truth, knn_build, Some(k))?);
        }

        let mut naive_bayes = NaiveBayesClassifier::new(space.clone(), &self.config.naive_bayes)?;
        let naive_build = fit_timed(&mut naive_bayes, &training)?;
        let naive_outcome = evaluate(&naive_bayes, &test, &truth, naive_build, None)?;

        Ok(RunReport {
            cardinality,
            features: space.len(),
            knn: knn_outcomes,
            naive_bayes: naive_outcome,
        })
    }
}

fn fit_timed(classifier: &mut dyn Classifier, training: &TrainingData<'_>) -> Result<f64> {
    let start = Instant::now();
    classifier.fit(training)?;
    let seconds = start.elapsed().as_secs_f64();
    info!(
        "offline cost - time to build {} model: {:.6} s",
        classifier.name(),
        seconds
    );
    Ok(seconds)
}

fn evaluate(
    classifier: &dyn Classifier,
    test: &TestData<'_>,
    truth: &[LabelSet],
    build_seconds: f64,
    k: Option<usize>,
) -> Result<ClassifierOutcome> {
    let start = Instant::now();
    let predictions = classifier.predict(test)?;
    let predict_seconds = start.elapsed().as_secs_f64();
    let accuracy = accuracy(&predictions, truth)?;

    match k {
        Some(k) => info!(
            "{}: k = {}, accuracy {:.4}, online cost {:.6} s",
            classifier.name(),
            k,
            accuracy,
            predict_seconds
        ),
        None => info!(
            "{}: accuracy {:.4}, online cost {:.6} s",
            classifier.name(),
            accuracy,
            predict_seconds
        ),
    }

    Ok(ClassifierOutcome {
        classifier: classifier.name().to_string(),
        k,
        accuracy,
        build_seconds,
        predict_seconds,
        predictions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Document;

    fn corpus() -> Corpus {
        Corpus::new(
            vec![
                Document::new(0, vec![("oil", 3), ("barrel", 1)], vec!["crude"]),
                Document::new(1, vec![("oil", 1), ("gas", 2)], vec!["crude", "gas"]),
                Document::new(2, vec![("wheat", 2), ("corn", 1)], vec!["grain"]),
                Document::new(3, vec![("wheat", 1), ("export", 2)], vec!["grain", "trade"]),
            ],
            vec![
                Document::new(4, vec![("oil", 2)], vec!["crude"]),
                Document::new(5, vec![("wheat", 1), ("corn", 1)], vec!["grain"]),
            ],
        )
    }

    #[test]
    fn test_runs_in_cardinality_order() {
        let config = ExperimentConfig {
            cardinalities: vec![2, 270],
            ..ExperimentConfig::default()
        };
        let summary = Experiment::new(config).unwrap().run(&corpus()).unwrap();

        assert_eq!(summary.runs.len(), 2);
        assert_eq!(summary.runs[0].cardinality, 2);
        assert_eq!(summary.runs[0].features, 2);
        assert_eq!(summary.runs[1].cardinality, 270);
        assert_eq!(summary.runs[1].features, 6);
        assert_eq!(summary.train_documents, 4);
        assert_eq!(summary.test_documents, 2);
        assert_eq!(summary.vocabulary_size, 6);
        assert_eq!(summary.classes, 4);

        let run = summary.run(270).unwrap();
        assert_eq!(run.knn.len(), 1);
        assert_eq!(run.knn[0].k, Some(5));
        assert_eq!(run.knn[0].predictions.len(), 2);
        assert_eq!(run.naive_bayes.classifier, "naive_bayes");
        assert_eq!(run.naive_bayes.accuracy, 1.0);
        assert!(run.knn[0].build_seconds >= 0.0);
    }

    #[test]
    fn test_one_outcome_per_k() {
        let mut config = ExperimentConfig::default();
        config.knn.k_values = vec![1, 2, 3];
        let summary = Experiment::new(config).unwrap().run(&corpus()).unwrap();
        let ks: Vec<Option<usize>> = summary.runs[0].knn.iter().map(|o| o.k).collect();
        assert_eq!(ks, vec![Some(1), Some(2), Some(3)]);
        assert_eq!(summary.runs[0].final_knn().unwrap().k, Some(3));
        // k = 1 picks the single closest document
        assert_eq!(summary.runs[0].knn[0].accuracy, 1.0);
    }

    #[test]
    fn test_requires_both_splits() {
        let experiment = Experiment::new(ExperimentConfig::default()).unwrap();
        let mut no_test = corpus();
        no_test.test.clear();
        assert!(matches!(
            experiment.run(&no_test),
            Err(LabelBenchError::InsufficientData(_))
        ));

        let mut no_train = corpus();
        no_train.train.clear();
        assert!(experiment.run(&no_train).is_err());
    }
}
