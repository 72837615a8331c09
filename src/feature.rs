//! Fixed-cardinality TF-IDF feature vectors.
//!
//! A [`FeatureSpace`] is a prefix of the [`Vocabulary`]; column `j` is the
//! `j`-th vocabulary term. A [`FeatureMatrix`] holds one dense TF-IDF row
//! per document, kept apart from the documents themselves.
//!
//! The weighting is `tf * idf` with the raw term count as `tf` and
//!
//! ```text
//! idf(df, n) = ln((1 + n) / (1 + min(df, n))) + 1
//! ```
//!
//! where `n` is the number of training documents. Clamping `df` to `n`
//! bounds `idf` below by 1, reached by terms present in every training
//! document.

use ahash::AHashMap;
use indexmap::{IndexMap, IndexSet};

use crate::corpus::{Document, Vocabulary};
use crate::error::{LabelBenchError, Result};

/// Smoothed inverse document frequency.
pub fn idf(df: usize, n: usize) -> f64 {
    let df = df.min(n) as f64;
    let n = n as f64;
    ((1.0 + n) / (1.0 + df)).ln() + 1.0
}

/// TF-IDF weight of a term occurring `tf` times.
pub fn tf_idf(tf: u32, df: usize, n: usize) -> f64 {
    tf as f64 * idf(df, n)
}

/// Term -> column mapping, read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSpace {
    columns: IndexSet<String>,
}

impl FeatureSpace {
    /// Take the first `min(|vocabulary|, limit)` vocabulary terms.
    pub fn from_vocabulary(vocabulary: &Vocabulary, limit: usize) -> Result<Self> {
        if limit == 0 {
            return Err(LabelBenchError::invalid_parameter(
                "feature space cardinality must be positive",
            ));
        }
        if vocabulary.is_empty() {
            return Err(LabelBenchError::insufficient_data("vocabulary is empty"));
        }
        let columns = vocabulary.terms().take(limit).map(str::to_string).collect();
        Ok(FeatureSpace { columns })
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column of `term`, if it is part of the space.
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.columns.get_index_of(term)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.columns.contains(term)
    }

    /// Term of column `index`.
    pub fn term(&self, index: usize) -> Option<&str> {
        self.columns.get_index(index).map(String::as_str)
    }

    /// `(term, column)` in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.columns
            .iter()
            .enumerate()
            .map(|(index, term)| (term.as_str(), index))
    }
}

/// Build one feature space per limit, in the order given.
pub fn derive_feature_spaces(
    vocabulary: &Vocabulary,
    limits: &[usize],
) -> Result<Vec<FeatureSpace>> {
    limits
        .iter()
        .map(|&limit| FeatureSpace::from_vocabulary(vocabulary, limit))
        .collect()
}

/// Feature values of one document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentFeatures {
    /// One value per feature space column; 0 for absent terms.
    pub dense: Vec<f64>,
    /// TF-IDF of the document terms that belong to the space, in document
    /// term order.
    pub sparse: IndexMap<String, f64>,
}

/// Dense TF-IDF matrix, one row per document in input order.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    cardinality: usize,
    rows: Vec<DocumentFeatures>,
    row_of: AHashMap<usize, usize>,
}

impl FeatureMatrix {
    /// Weight `documents` against `space`.
    ///
    /// Document frequencies come from `vocabulary`; a term of the space
    /// missing from it counts as df 0.
    pub fn build(
        space: &FeatureSpace,
        vocabulary: &Vocabulary,
        documents: &[Document],
        n_train: usize,
    ) -> Result<Self> {
        if n_train == 0 {
            return Err(LabelBenchError::insufficient_data(
                "TF-IDF needs at least one training document",
            ));
        }

        let cardinality = space.len();
        let mut rows = Vec::with_capacity(documents.len());
        let mut row_of = AHashMap::with_capacity(documents.len());

        for (row, document) in documents.iter().enumerate() {
            let mut dense = vec![0.0; cardinality];
            let mut sparse = IndexMap::new();
            for (term, &tf) in &document.term_frequencies {
                let Some(column) = space.index_of(term) else {
                    continue;
                };
                if tf == 0 {
                    continue;
                }
                let df = vocabulary.document_frequency(term).unwrap_or(0);
                let value = tf_idf(tf, df, n_train);
                dense[column] = value;
                sparse.insert(term.clone(), value);
            }
            rows.push(DocumentFeatures { dense, sparse });
            row_of.insert(document.id, row);
        }

        Ok(FeatureMatrix {
            cardinality,
            rows,
            row_of,
        })
    }

    /// Number of columns.
    pub fn cardinality(&self) -> usize {
        self.cardinality
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Features of the `row`-th input document.
    pub fn get(&self, row: usize) -> Option<&DocumentFeatures> {
        self.rows.get(row)
    }

    /// Features of the document with id `document_id`.
    pub fn by_document(&self, document_id: usize) -> Option<&DocumentFeatures> {
        self.row_of.get(&document_id).map(|&row| &self.rows[row])
    }

    pub fn rows(&self) -> &[DocumentFeatures] {
        &self.rows
    }

    /// Dense rows, for callers that only need the vectors.
    pub fn dense_rows(&self) -> impl Iterator<Item = &[f64]> {
        self.rows.iter().map(|r| r.dense.as_slice())
    }
}
