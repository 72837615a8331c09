//! Labeled documents, the vocabulary and the training class table.
//!
//! A corpus is read from JSON Lines, one document per line:
//!
//! ```json
//! {"split": "train", "labels": ["grain", "wheat"], "text": "Wheat exports rose ..."}
//! {"split": "test", "labels": ["crude"], "terms": {"oil": 3, "barrel": 1}}
//! ```
//!
//! `terms` takes precedence over `text`. Documents without a `split` are
//! assigned by a seeded random draw against [`CorpusConfig::test_ratio`].

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::analysis::{TermFrequencies, TextAnalyzer};
use crate::config::CorpusConfig;
use crate::error::{LabelBenchError, Result};

/// A set of class labels, iterated in label order.
pub type LabelSet = BTreeSet<String>;

/// A labeled document reduced to its term frequency bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Position of the document in the corpus file.
    pub id: usize,
    /// Raw term counts, in first-occurrence order.
    pub term_frequencies: TermFrequencies,
    /// Class labels of the document.
    pub labels: LabelSet,
}

impl Document {
    /// Create a document from `(term, count)` pairs and labels.
    ///
    /// Repeated terms add up.
    pub fn new<T, L, S>(id: usize, terms: T, labels: L) -> Self
    where
        T: IntoIterator<Item = (S, u32)>,
        L: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut term_frequencies = TermFrequencies::new();
        for (term, count) in terms {
            *term_frequencies.entry(term.into()).or_insert(0) += count;
        }
        Document {
            id,
            term_frequencies,
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Raw count of `term`, 0 when absent.
    pub fn term_count(&self, term: &str) -> u32 {
        self.term_frequencies.get(term).copied().unwrap_or(0)
    }
}

/// Ordered, deduplicated terms with their document frequency.
///
/// The index of a term is its position; feature spaces are prefixes of
/// this order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    terms: IndexMap<String, usize>,
}

impl Vocabulary {
    /// Build a vocabulary from `(term, df)` pairs, keeping their order.
    /// A repeated term keeps its first position and df.
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = (S, usize)>,
        S: Into<String>,
    {
        let mut map = IndexMap::new();
        for (term, df) in terms {
            map.entry(term.into()).or_insert(df);
        }
        Vocabulary { terms: map }
    }

    /// Extract the vocabulary of `documents`.
    ///
    /// Terms are ordered by descending document frequency, ties by first
    /// appearance. Terms with `df < min_df` are dropped. A zero count does
    /// not make a term occur in a document.
    pub fn from_documents(documents: &[Document], min_df: usize) -> Self {
        let mut df: IndexMap<&str, usize> = IndexMap::new();
        for document in documents {
            for (term, _) in document.term_frequencies.iter().filter(|(_, tf)| **tf > 0) {
                *df.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        let mut ordered: Vec<(&str, usize)> =
            df.into_iter().filter(|(_, count)| *count >= min_df).collect();
        // stable: equal df keeps first-appearance order
        ordered.sort_by(|a, b| b.1.cmp(&a.1));

        Self::from_terms(ordered)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Terms in index order.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.keys().map(String::as_str)
    }

    /// `(index, term, df)` in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str, usize)> {
        self.terms
            .iter()
            .enumerate()
            .map(|(index, (term, df))| (index, term.as_str(), *df))
    }

    /// Global document frequency of `term`.
    pub fn document_frequency(&self, term: &str) -> Option<usize> {
        self.terms.get(term).copied()
    }

    /// Positional index of `term`.
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.terms.get_index_of(term)
    }
}

/// Class label -> number of training documents bearing it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassFrequencies {
    counts: BTreeMap<String, usize>,
}

impl ClassFrequencies {
    /// Count labels over `documents`.
    pub fn from_documents(documents: &[Document]) -> Self {
        let mut counts = BTreeMap::new();
        for document in documents {
            for label in &document.labels {
                *counts.entry(label.clone()).or_insert(0) += 1;
            }
        }
        ClassFrequencies { counts }
    }

    /// Number of documents labeled `label`, 0 for unknown labels.
    pub fn get(&self, label: &str) -> usize {
        self.counts.get(label).copied().unwrap_or(0)
    }

    /// `(label, count)` in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(label, count)| (label.as_str(), *count))
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts; a document counts once per label.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Split {
    Train,
    Test,
}

#[derive(Debug, Deserialize)]
struct CorpusRecord {
    #[serde(default)]
    split: Option<Split>,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    terms: Option<IndexMap<String, u32>>,
}

/// Training and test documents.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub train: Vec<Document>,
    pub test: Vec<Document>,
}

impl Corpus {
    pub fn new(train: Vec<Document>, test: Vec<Document>) -> Self {
        Corpus { train, test }
    }

    /// Load a JSON Lines corpus file.
    pub fn load_jsonl<P: AsRef<Path>>(
        path: P,
        analyzer: &TextAnalyzer,
        config: &CorpusConfig,
    ) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), analyzer, config)
    }

    /// Read JSON Lines records from `reader`.
    pub fn from_reader<R: BufRead>(
        reader: R,
        analyzer: &TextAnalyzer,
        config: &CorpusConfig,
    ) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut corpus = Corpus::default();
        let mut next_id = 0;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: CorpusRecord =
                serde_json::from_str(&line).map_err(|source| LabelBenchError::Corpus {
                    line: line_no + 1,
                    source,
                })?;

            let term_frequencies = match (record.terms, record.text) {
                (Some(mut terms), _) => {
                    terms.retain(|_, tf| *tf > 0);
                    terms
                }
                (None, Some(text)) => analyzer.term_frequencies(&text),
                (None, None) => TermFrequencies::new(),
            };
            let document = Document {
                id: next_id,
                term_frequencies,
                labels: record.labels.into_iter().collect(),
            };
            next_id += 1;

            let split = record.split.unwrap_or_else(|| {
                if rng.random::<f64>() < config.test_ratio {
                    Split::Test
                } else {
                    Split::Train
                }
            });
            match split {
                Split::Train => corpus.train.push(document),
                Split::Test => corpus.test.push(document),
            }
        }

        log::debug!(
            "loaded corpus: {} training, {} test documents",
            corpus.train.len(),
            corpus.test.len()
        );
        Ok(corpus)
    }

    /// Label counts over the training documents.
    pub fn class_frequencies(&self) -> ClassFrequencies {
        ClassFrequencies::from_documents(&self.train)
    }

    /// Vocabulary extracted from the training documents.
    pub fn vocabulary(&self, min_df: usize) -> Vocabulary {
        Vocabulary::from_documents(&self.train, min_df)
    }

    /// Ground-truth label sets of the test documents, in order.
    pub fn test_labels(&self) -> Vec<LabelSet> {
        self.test.iter().map(|d| d.labels.clone()).collect()
    }

    /// All documents ordered by id.
    pub fn documents(&self) -> Vec<&Document> {
        let mut all: Vec<&Document> = self.train.iter().chain(self.test.iter()).collect();
        all.sort_by_key(|d| d.id);
        all
    }
}
