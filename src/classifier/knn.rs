//! k-nearest-neighbor classifier.
//!
//! Neighbors are ranked by cosine similarity, highest first; equal
//! similarities go to the lower training index. A `k` above the training
//! set size is clamped to it.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::classifier::{Classifier, TestData, TrainingData};
use crate::config::{KnnConfig, LabelVote};
use crate::corpus::{ClassFrequencies, LabelSet};
use crate::error::{LabelBenchError, Result};

/// Cosine similarity given precomputed L2 norms. A zero norm yields 0.0.
pub fn cosine_similarity(a: &[f64], b: &[f64], norm_a: f64, norm_b: f64) -> f64 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let dot_product: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    dot_product / (norm_a * norm_b)
}

fn l2_norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// A training document ranked against a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Position in the training set.
    pub index: usize,
    pub similarity: f64,
}

fn rank(a: &Neighbor, b: &Neighbor) -> Ordering {
    b.similarity
        .total_cmp(&a.similarity)
        .then(a.index.cmp(&b.index))
}

#[derive(Debug, Clone)]
struct KnnModel {
    rows: Vec<Vec<f64>>,
    norms: Vec<f64>,
    labels: Vec<LabelSet>,
    class_frequencies: ClassFrequencies,
    cardinality: usize,
}

/// KNN classifier.
#[derive(Debug, Clone)]
pub struct KnnClassifier {
    k: usize,
    vote: LabelVote,
    parallel: bool,
    model: Option<KnnModel>,
}

impl KnnClassifier {
    /// Create an unbuilt classifier with `k` neighbors and union voting.
    pub fn new(k: usize) -> Result<Self> {
        Self::check_k(k)?;
        Ok(KnnClassifier {
            k,
            vote: LabelVote::Union,
            parallel: false,
            model: None,
        })
    }

    /// Create from configuration, using the first configured k.
    pub fn from_config(config: &KnnConfig) -> Result<Self> {
        let k = config.k_values.first().copied().ok_or_else(|| {
            LabelBenchError::invalid_parameter("knn.k_values must not be empty")
        })?;
        Ok(Self::new(k)?
            .with_vote(config.vote)
            .with_parallel(config.parallel))
    }

    pub fn with_vote(mut self, vote: LabelVote) -> Self {
        self.vote = vote;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Change the neighbor count used by later `predict` calls.
    pub fn set_k(&mut self, k: usize) -> Result<()> {
        Self::check_k(k)?;
        self.k = k;
        Ok(())
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn is_fitted(&self) -> bool {
        self.model.is_some()
    }

    fn check_k(k: usize) -> Result<()> {
        if k == 0 {
            return Err(LabelBenchError::invalid_parameter(
                "number of neighbors k must be at least 1",
            ));
        }
        Ok(())
    }

    fn model(&self) -> Result<&KnnModel> {
        self.model.as_ref().ok_or_else(|| {
            LabelBenchError::invalid_operation("KNN classifier must be built before predicting")
        })
    }

    /// The `min(k, n_train)` nearest training documents of `query`, best
    /// first.
    pub fn neighbors(&self, query: &[f64]) -> Result<Vec<Neighbor>> {
        let model = self.model()?;
        if query.len() != model.cardinality {
            return Err(LabelBenchError::shape_mismatch(format!(
                "query has {} features, model was built with {}",
                query.len(),
                model.cardinality
            )));
        }
        Ok(Self::nearest(model, query, self.k))
    }

    fn nearest(model: &KnnModel, query: &[f64], k: usize) -> Vec<Neighbor> {
        let query_norm = l2_norm(query);
        let mut scored: Vec<Neighbor> = model
            .rows
            .iter()
            .zip(model.norms.iter())
            .enumerate()
            .map(|(index, (row, &norm))| Neighbor {
                index,
                similarity: cosine_similarity(query, row, query_norm, norm),
            })
            .collect();

        let k = k.min(scored.len());
        if k < scored.len() {
            scored.select_nth_unstable_by(k - 1, rank);
            scored.truncate(k);
        }
        scored.sort_by(rank);
        scored
    }

    fn aggregate(&self, model: &KnnModel, neighbors: &[Neighbor]) -> LabelSet {
        // label -> (neighbor count, summed similarity)
        let mut votes: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
        for neighbor in neighbors {
            for label in &model.labels[neighbor.index] {
                let entry = votes.entry(label.as_str()).or_insert((0, 0.0));
                entry.0 += 1;
                entry.1 += neighbor.similarity;
            }
        }

        match self.vote {
            LabelVote::Union => votes.keys().map(|l| l.to_string()).collect(),
            LabelVote::Majority => {
                let majority: LabelSet = votes
                    .iter()
                    .filter(|(_, (count, _))| count * 2 > neighbors.len())
                    .map(|(label, _)| label.to_string())
                    .collect();
                if !majority.is_empty() {
                    return majority;
                }

                let mut best: Option<(&str, f64, usize)> = None;
                for (label, (_, weight)) in &votes {
                    let frequency = model.class_frequencies.get(label);
                    let better = match best {
                        None => true,
                        Some((_, best_weight, best_frequency)) => {
                            *weight > best_weight
                                || (*weight == best_weight && frequency > best_frequency)
                        }
                    };
                    if better {
                        best = Some((*label, *weight, frequency));
                    }
                }
                best.map(|(label, _, _)| label.to_string())
                    .into_iter()
                    .collect()
            }
        }
    }
}

impl Classifier for KnnClassifier {
    fn name(&self) -> &str {
        "knn"
    }

    fn fit(&mut self, training: &TrainingData<'_>) -> Result<()> {
        training.check_shape()?;
        if training.documents.is_empty() {
            return Err(LabelBenchError::insufficient_data(
                "KNN needs at least one training document",
            ));
        }

        let rows: Vec<Vec<f64>> = training.features.dense_rows().map(<[f64]>::to_vec).collect();
        let norms = rows.iter().map(|r| l2_norm(r)).collect();
        let labels = training
            .documents
            .iter()
            .map(|d| d.labels.clone())
            .collect();

        self.model = Some(KnnModel {
            rows,
            norms,
            labels,
            class_frequencies: training.class_frequencies.clone(),
            cardinality: training.features.cardinality(),
        });
        log::debug!(
            "built knn model over {} training documents",
            training.documents.len()
        );
        Ok(())
    }

    fn predict(&self, test: &TestData<'_>) -> Result<Vec<LabelSet>> {
        let model = self.model()?;
        test.check_shape()?;
        if test.features.cardinality() != model.cardinality {
            return Err(LabelBenchError::shape_mismatch(format!(
                "test features have {} columns, model was built with {}",
                test.features.cardinality(),
                model.cardinality
            )));
        }
        if self.k > model.rows.len() {
            log::debug!(
                "k = {} exceeds the {} training documents, using all of them",
                self.k,
                model.rows.len()
            );
        }

        let classify = |query: &[f64]| {
            let neighbors = Self::nearest(model, query, self.k);
            self.aggregate(model, &neighbors)
        };

        let predictions: Vec<LabelSet> = if self.parallel {
            test.features
                .rows()
                .par_iter()
                .map(|row| classify(row.dense.as_slice()))
                .collect()
        } else {
            test.features.dense_rows().map(classify).collect()
        };
        Ok(predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{Document, Vocabulary};
    use crate::feature::{FeatureMatrix, FeatureSpace};

    struct Fixture {
        train: Vec<Document>,
        test: Vec<Document>,
        train_features: FeatureMatrix,
        test_features: FeatureMatrix,
        classes: ClassFrequencies,
    }

    fn fixture() -> Fixture {
        let train = vec![
            Document::new(0, vec![("oil", 3), ("barrel", 1)], vec!["crude"]),
            Document::new(1, vec![("oil", 1), ("gas", 2)], vec!["crude", "gas"]),
            Document::new(2, vec![("wheat", 2), ("corn", 1)], vec!["grain"]),
            Document::new(3, vec![("wheat", 1), ("export", 2)], vec!["grain", "trade"]),
        ];
        let test = vec![
            Document::new(4, vec![("oil", 2)], vec!["crude"]),
            Document::new(5, vec![("wheat", 1), ("corn", 1)], vec!["grain"]),
        ];
        let vocabulary = Vocabulary::from_documents(&train, 1);
        let space = FeatureSpace::from_vocabulary(&vocabulary, 10).unwrap();
        let train_features = FeatureMatrix::build(&space, &vocabulary, &train, 4).unwrap();
        let test_features = FeatureMatrix::build(&space, &vocabulary, &test, 4).unwrap();
        let classes = ClassFrequencies::from_documents(&train);
        Fixture {
            train,
            test,
            train_features,
            test_features,
            classes,
        }
    }

    fn built(f: &Fixture, k: usize) -> KnnClassifier {
        let mut knn = KnnClassifier::new(k).unwrap();
        knn.fit(&TrainingData {
            documents: &f.train,
            features: &f.train_features,
            class_frequencies: &f.classes,
        })
        .unwrap();
        knn
    }

    fn labels(names: &[&str]) -> LabelSet {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_cosine_similarity() {
        let a = [1.0, 0.0, 1.0];
        let b = [2.0, 0.0, 2.0];
        let s = cosine_similarity(&a, &b, l2_norm(&a), l2_norm(&b));
        assert!((s - 1.0).abs() < 1e-12);

        let zero = [0.0, 0.0, 0.0];
        assert_eq!(cosine_similarity(&a, &zero, l2_norm(&a), 0.0), 0.0);
    }

    #[test]
    fn test_predict_union() {
        let f = fixture();
        let knn = built(&f, 2);
        let predictions = knn
            .predict(&TestData {
                documents: &f.test,
                features: &f.test_features,
            })
            .unwrap();

        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0], labels(&["crude", "gas"]));
        assert_eq!(predictions[1], labels(&["grain", "trade"]));
    }

    #[test]
    fn test_predict_majority() {
        let f = fixture();
        let knn = built(&f, 2).with_vote(LabelVote::Majority);
        let predictions = knn
            .predict(&TestData {
                documents: &f.test,
                features: &f.test_features,
            })
            .unwrap();
        assert_eq!(predictions[0], labels(&["crude"]));
        assert_eq!(predictions[1], labels(&["grain"]));
    }

    #[test]
    fn test_ties_prefer_lower_training_index() {
        // an all-zero query is equally (0.0) similar to every row
        let f = fixture();
        let knn = built(&f, 3);
        let neighbors = knn.neighbors(&vec![0.0; f.train_features.cardinality()]).unwrap();
        let indices: Vec<usize> = neighbors.iter().map(|n| n.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_k_larger_than_training_set_is_clamped() {
        let f = fixture();
        let knn = built(&f, 50);
        let query = f.test_features.get(0).unwrap().dense.clone();
        let neighbors = knn.neighbors(&query).unwrap();
        assert_eq!(neighbors.len(), 4);
        assert!(neighbors.windows(2).all(|w| w[0].similarity >= w[1].similarity));

        let predictions = knn
            .predict(&TestData {
                documents: &f.test,
                features: &f.test_features,
            })
            .unwrap();
        assert_eq!(predictions[0], labels(&["crude", "gas", "grain", "trade"]));
    }

    #[test]
    fn test_zero_k_rejected() {
        assert!(matches!(
            KnnClassifier::new(0),
            Err(LabelBenchError::InvalidParameter(_))
        ));
        let mut knn = KnnClassifier::new(1).unwrap();
        assert!(knn.set_k(0).is_err());
        assert_eq!(knn.k(), 1);
    }

    #[test]
    fn test_empty_training_set() {
        let f = fixture();
        let empty = FeatureMatrix::build(
            &FeatureSpace::from_vocabulary(&Vocabulary::from_terms(vec![("oil", 1)]), 1).unwrap(),
            &Vocabulary::default(),
            &[],
            1,
        )
        .unwrap();
        let mut knn = KnnClassifier::new(1).unwrap();
        let result = knn.fit(&TrainingData {
            documents: &[],
            features: &empty,
            class_frequencies: &f.classes,
        });
        assert!(matches!(result, Err(LabelBenchError::InsufficientData(_))));
    }

    #[test]
    fn test_predict_before_fit() {
        let f = fixture();
        let knn = KnnClassifier::new(1).unwrap();
        let result = knn.predict(&TestData {
            documents: &f.test,
            features: &f.test_features,
        });
        assert!(matches!(result, Err(LabelBenchError::InvalidOperation(_))));
    }

    #[test]
    fn test_repeated_and_parallel_predictions_match() {
        let f = fixture();
        let sequential = built(&f, 3);
        let parallel = built(&f, 3).with_parallel(true);
        let test = TestData {
            documents: &f.test,
            features: &f.test_features,
        };
        let first = sequential.predict(&test).unwrap();
        assert_eq!(first, sequential.predict(&test).unwrap());
        assert_eq!(first, parallel.predict(&test).unwrap());
    }

    #[test]
    fn test_shape_mismatch() {
        let f = fixture();
        let knn = built(&f, 1);
        let result = knn.predict(&TestData {
            documents: &f.test[..1],
            features: &f.test_features,
        });
        assert!(matches!(result, Err(LabelBenchError::ShapeMismatch(_))));
    }
}
