//! Multi-label accuracy.
//!
//! Each document scores the share of its predicted labels that are true,
//! `|predicted ∩ truth| / |predicted|`, and the scores are averaged
//! uniformly. An empty prediction scores 0.

use crate::corpus::LabelSet;
use crate::error::{LabelBenchError, Result};

/// Overlap score of a single document.
pub fn document_precision(predicted: &LabelSet, truth: &LabelSet) -> f64 {
    if predicted.is_empty() {
        return 0.0;
    }
    let hits = predicted.intersection(truth).count();
    hits as f64 / predicted.len() as f64
}

/// Mean [`document_precision`] over aligned prediction and ground-truth
/// sequences.
pub fn accuracy(predicted: &[LabelSet], ground_truth: &[LabelSet]) -> Result<f64> {
    if predicted.len() != ground_truth.len() {
        return Err(LabelBenchError::shape_mismatch(format!(
            "{} predictions for {} ground-truth label sets",
            predicted.len(),
            ground_truth.len()
        )));
    }
    if predicted.is_empty() {
        return Err(LabelBenchError::insufficient_data(
            "accuracy needs at least one document",
        ));
    }

    let total: f64 = predicted
        .iter()
        .zip(ground_truth)
        .map(|(p, t)| document_precision(p, t))
        .sum();
    Ok(total / predicted.len() as f64)
}
