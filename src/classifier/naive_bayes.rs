//! Multinomial Naive Bayes over the terms of a feature space.
//!
//! ```text
//! P(t|c) = (count(t, c) + alpha) / (total(c) + alpha * |F|)
//! P(c)   = docs(c) / sum over c' of docs(c')
//! score(c, d) = ln P(c) + sum over t in d of tf(t, d) * ln P(t|c)
//! ```
//!
//! A document with several labels counts once for each of them, so the
//! priors sum to one over the label assignments.
//!
//! Decision rule: with `top_k > 0` the `top_k` best-scoring classes are
//! returned. With `top_k == 0` scores are normalised into posteriors
//! (log-sum-exp) and every class reaching `posterior_threshold` is
//! returned, always including the best class. Score ties go to the class
//! that sorts first.

use crate::classifier::{Classifier, TestData, TrainingData};
use crate::config::NaiveBayesConfig;
use crate::corpus::{ClassFrequencies, Document, LabelSet};
use crate::error::{LabelBenchError, Result};
use crate::feature::FeatureSpace;

/// Lower bound for the smoothing constant.
pub const MIN_ALPHA: f64 = 1e-9;

#[derive(Debug, Clone)]
struct NaiveBayesModel {
    classes: Vec<String>,
    log_priors: Vec<f64>,
    /// class x column
    log_likelihoods: Vec<Vec<f64>>,
}

impl NaiveBayesModel {
    fn class_index(&self, class: &str) -> Option<usize> {
        self.classes.binary_search_by(|c| c.as_str().cmp(class)).ok()
    }
}

/// Naive Bayes classifier.
#[derive(Debug, Clone)]
pub struct NaiveBayesClassifier {
    space: FeatureSpace,
    alpha: f64,
    top_k: usize,
    posterior_threshold: f64,
    model: Option<NaiveBayesModel>,
}

impl NaiveBayesClassifier {
    /// Create an unfit classifier over `space`.
    pub fn new(space: FeatureSpace, config: &NaiveBayesConfig) -> Result<Self> {
        if !(0.0..=1.0).contains(&config.posterior_threshold) {
            return Err(LabelBenchError::invalid_parameter(format!(
                "posterior threshold must be within [0, 1], got {}",
                config.posterior_threshold
            )));
        }
        let alpha = if config.alpha.is_finite() {
            config.alpha.max(MIN_ALPHA)
        } else {
            return Err(LabelBenchError::invalid_parameter(format!(
                "smoothing constant must be finite, got {}",
                config.alpha
            )));
        };
        Ok(NaiveBayesClassifier {
            space,
            alpha,
            top_k: config.top_k,
            posterior_threshold: config.posterior_threshold,
            model: None,
        })
    }

    /// Change the class restriction used by later `predict` calls.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Effective smoothing constant.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn is_fitted(&self) -> bool {
        self.model.is_some()
    }

    /// Known classes in label order; empty before `fit`.
    pub fn classes(&self) -> &[String] {
        match &self.model {
            Some(model) => &model.classes,
            None => &[],
        }
    }

    /// `P(c)`, if `class` was seen in training.
    pub fn prior(&self, class: &str) -> Option<f64> {
        let model = self.model.as_ref()?;
        model.class_index(class).map(|c| model.log_priors[c].exp())
    }

    /// `P(t|c)`, if `class` was seen in training and `term` is in the space.
    pub fn term_probability(&self, class: &str, term: &str) -> Option<f64> {
        let model = self.model.as_ref()?;
        let c = model.class_index(class)?;
        let column = self.space.index_of(term)?;
        Some(model.log_likelihoods[c][column].exp())
    }

    fn model(&self) -> Result<&NaiveBayesModel> {
        self.model.as_ref().ok_or_else(|| {
            LabelBenchError::invalid_operation(
                "Naive Bayes classifier must be fit before predicting",
            )
        })
    }

    /// Log score of every class for `document`, in class order.
    pub fn log_scores(&self, document: &Document) -> Result<Vec<(&str, f64)>> {
        let model = self.model()?;
        let scores = Self::score(model, &self.space, document);
        Ok(model
            .classes
            .iter()
            .map(String::as_str)
            .zip(scores)
            .collect())
    }

    /// Normalised posterior of every class for `document`, in class order.
    pub fn posteriors(&self, document: &Document) -> Result<Vec<(&str, f64)>> {
        let model = self.model()?;
        let posteriors = normalise(&Self::score(model, &self.space, document));
        Ok(model
            .classes
            .iter()
            .map(String::as_str)
            .zip(posteriors)
            .collect())
    }

    fn score(model: &NaiveBayesModel, space: &FeatureSpace, document: &Document) -> Vec<f64> {
        let mut scores = model.log_priors.clone();
        for (term, &tf) in &document.term_frequencies {
            let Some(column) = space.index_of(term) else {
                continue;
            };
            for (score, likelihoods) in scores.iter_mut().zip(&model.log_likelihoods) {
                *score += tf as f64 * likelihoods[column];
            }
        }
        scores
    }

    fn select(&self, model: &NaiveBayesModel, scores: &[f64]) -> LabelSet {
        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));

        let chosen: Vec<usize> = if self.top_k > 0 {
            order.into_iter().take(self.top_k).collect()
        } else {
            let posteriors = normalise(scores);
            let best = order[0];
            order
                .into_iter()
                .filter(|&c| c == best || posteriors[c] >= self.posterior_threshold)
                .collect()
        };
        chosen.into_iter().map(|c| model.classes[c].clone()).collect()
    }
}

/// Softmax of log scores.
fn normalise(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exp: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exp.iter().sum();
    exp.into_iter().map(|e| e / sum).collect()
}

impl Classifier for NaiveBayesClassifier {
    fn name(&self) -> &str {
        "naive_bayes"
    }

    fn fit(&mut self, training: &TrainingData<'_>) -> Result<()> {
        training.check_shape()?;
        if training.documents.is_empty() {
            return Err(LabelBenchError::insufficient_data(
                "Naive Bayes needs at least one training document",
            ));
        }
        if self.space.is_empty() {
            return Err(LabelBenchError::insufficient_data("feature space is empty"));
        }

        let frequencies = ClassFrequencies::from_documents(training.documents);
        if frequencies.is_empty() {
            return Err(LabelBenchError::insufficient_data(
                "training documents carry no class labels",
            ));
        }
        let classes: Vec<String> = frequencies.iter().map(|(l, _)| l.to_string()).collect();
        let assignments = frequencies.total() as f64;
        let columns = self.space.len();

        let mut counts = vec![vec![0u64; columns]; classes.len()];
        let mut totals = vec![0u64; classes.len()];
        for document in training.documents {
            let class_ids: Vec<usize> = document
                .labels
                .iter()
                .filter_map(|l| classes.binary_search(l).ok())
                .collect();
            for (term, &tf) in &document.term_frequencies {
                let Some(column) = self.space.index_of(term) else {
                    continue;
                };
                for &c in &class_ids {
                    counts[c][column] += u64::from(tf);
                    totals[c] += u64::from(tf);
                }
            }
        }

        let log_priors: Vec<f64> = frequencies
            .iter()
            .map(|(_, n)| (n as f64 / assignments).ln())
            .collect();
        let log_likelihoods: Vec<Vec<f64>> = counts
            .iter()
            .zip(&totals)
            .map(|(row, &total)| {
                let denominator = total as f64 + self.alpha * columns as f64;
                row.iter()
                    .map(|&count| ((count as f64 + self.alpha) / denominator).ln())
                    .collect::<Vec<f64>>()
            })
            .collect();

        log::debug!(
            "fit naive bayes: {} classes, {} features, {} training documents",
            classes.len(),
            columns,
            training.documents.len()
        );
        self.model = Some(NaiveBayesModel {
            classes,
            log_priors,
            log_likelihoods,
        });
        Ok(())
    }

    fn predict(&self, test: &TestData<'_>) -> Result<Vec<LabelSet>> {
        let model = self.model()?;
        test.check_shape()?;
        Ok(test
            .documents
            .iter()
            .map(|document| self.select(model, &Self::score(model, &self.space, document)))
            .collect())
    }
}
