//! TF-IDF matrix construction.
//!
//! Weights are `tf * idf` with raw term counts and the smoothed
//! `idf = ln((1 + N) / (1 + df)) + 1`, then every row is L2-normalized.

use crate::aggregate::DocumentTermBag;
use crate::error::{Error, Result};
use crate::tokenizer::analyze;
use crate::{TermDocMatrix, Vocabulary};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How record terms become vocabulary terms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermAnalysis {
    /// Each term is used unchanged.
    #[default]
    Verbatim,
    /// Terms are split into lowercase word tokens (see [`analyze`]).
    Words,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IndexConfig {
    pub term_analysis: TermAnalysis,
}

/// Smoothed inverse document frequency. Strictly positive for `df <= n`.
pub fn smoothed_idf(num_docs: usize, doc_frequency: usize) -> f64 {
    ((1.0 + num_docs as f64) / (1.0 + doc_frequency as f64)).ln() + 1.0
}

/// Divide `v` by its Euclidean norm in place; zero vectors are left untouched.
pub fn l2_normalize(v: &mut [f64]) {
    let norm = v.iter().map(|w| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        for w in v.iter_mut() {
            *w /= norm;
        }
    }
}

pub struct TfidfIndexBuilder {
    config: IndexConfig,
}

impl TfidfIndexBuilder {
    pub fn new(config: IndexConfig) -> Self { Self { config } }

    fn analyze_terms<'a>(&self, terms: &'a [String]) -> Vec<std::borrow::Cow<'a, str>> {
        match self.config.term_analysis {
            TermAnalysis::Verbatim => terms.iter().map(|t| t.as_str().into()).collect(),
            TermAnalysis::Words => terms.iter().flat_map(|t| analyze(t)).map(Into::into).collect(),
        }
    }

    /// Vectorize the bags. Fails with [`Error::EmptyCorpus`] when there are no documents.
    pub fn build(&self, bags: &DocumentTermBag) -> Result<TermDocMatrix> {
        if bags.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        let num_docs = bags.len();

        // Term counts per document, document frequency per term.
        let mut counts: Vec<HashMap<String, u32>> = Vec::with_capacity(num_docs);
        let mut df: HashMap<String, usize> = HashMap::new();
        for (_, terms) in bags.iter() {
            let mut tf: HashMap<String, u32> = HashMap::new();
            for term in self.analyze_terms(terms) {
                *tf.entry(term.into_owned()).or_insert(0) += 1;
            }
            for term in tf.keys() {
                *df.entry(term.clone()).or_insert(0) += 1;
            }
            counts.push(tf);
        }

        let vocabulary = Vocabulary::from_terms(df.keys().cloned());
        let idf: Vec<f64> = vocabulary.terms().iter().map(|t| smoothed_idf(num_docs, df[t])).collect();

        let width = vocabulary.len();
        let mut weights = vec![0.0f64; num_docs * width];
        for (row, tf) in weights.chunks_mut(width.max(1)).zip(counts.iter()) {
            for (term, count) in tf {
                if let Some(col) = vocabulary.column(term) {
                    row[col] = *count as f64 * idf[col];
                }
            }
            l2_normalize(row);
        }

        tracing::info!(num_docs, num_terms = width, "built tf-idf matrix");
        let doc_ids = bags.doc_ids().to_vec();
        // Bags hold each document once and weights were sized from the vocabulary.
        Ok(TermDocMatrix::from_valid_parts(doc_ids, vocabulary, weights))
    }
}

impl Default for TfidfIndexBuilder {
    fn default() -> Self { Self::new(IndexConfig::default()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DocumentId;

    fn bags(docs: Vec<(i64, Vec<&str>)>) -> DocumentTermBag {
        docs.into_iter().map(|(id, terms)| (DocumentId::Int(id), terms)).collect()
    }

    #[test]
    fn idf_is_positive_and_non_increasing() {
        let n = 10;
        let mut prev = f64::INFINITY;
        for df in 1..=n {
            let idf = smoothed_idf(n, df);
            assert!(idf > 0.0);
            assert!(idf <= prev);
            prev = idf;
        }
        assert!((smoothed_idf(n, n) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rows_are_unit_length() {
        let m = TfidfIndexBuilder::default()
            .build(&bags(vec![(1, vec!["a", "b", "b"]), (2, vec!["c"]), (3, vec!["a", "c", "d", "d", "d"])]))
            .unwrap();
        for (_, row) in m.rows() {
            let norm: f64 = row.iter().map(|w| w * w).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn weights_follow_raw_tf_times_idf() {
        let m = TfidfIndexBuilder::default().build(&bags(vec![(1, vec!["a", "a", "b"]), (2, vec!["b"])])).unwrap();
        // doc 1: a -> 2 * idf(df=1), b -> 1 * idf(df=2) = 1.
        let a = 2.0 * smoothed_idf(2, 1);
        let b = 1.0;
        let norm = (a * a + b * b).sqrt();
        assert!((m.weight(&1.into(), "a").unwrap() - a / norm).abs() < 1e-12);
        assert!((m.weight(&1.into(), "b").unwrap() - b / norm).abs() < 1e-12);
        assert_eq!(m.weight(&2.into(), "a"), Some(0.0));
        assert_eq!(m.weight(&2.into(), "b"), Some(1.0));
    }

    #[test]
    fn empty_document_yields_zero_row() {
        let m = TfidfIndexBuilder::default().build(&bags(vec![(1, vec!["x"]), (2, vec![])])).unwrap();
        assert!(m.row(&2.into()).unwrap().iter().all(|w| *w == 0.0));
    }

    #[test]
    fn corpus_of_empty_documents_has_no_columns() {
        let m = TfidfIndexBuilder::default().build(&bags(vec![(1, vec![]), (2, vec![])])).unwrap();
        assert_eq!(m.num_docs(), 2);
        assert_eq!(m.num_terms(), 0);
    }

    #[test]
    fn empty_corpus_is_an_error() {
        let err = TfidfIndexBuilder::default().build(&DocumentTermBag::new()).unwrap_err();
        assert!(matches!(err, Error::EmptyCorpus));
    }

    #[test]
    fn word_analysis_splits_phrases() {
        let builder = TfidfIndexBuilder::new(IndexConfig { term_analysis: TermAnalysis::Words });
        let m = builder.build(&bags(vec![(1, vec!["Sąd Apelacyjny", "sąd"])])).unwrap();
        assert_eq!(m.vocabulary().terms(), vec!["apelacyjny", "sąd"]);
    }

    #[test]
    fn build_is_deterministic() {
        let input = bags(vec![(3, vec!["z", "y"]), (1, vec!["y", "x", "x"]), (2, vec!["w"])]);
        let a = TfidfIndexBuilder::default().build(&input).unwrap();
        let b = TfidfIndexBuilder::default().build(&input).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.doc_ids(), vec![3.into(), 1.into(), 2.into()]);
    }

    #[test]
    fn built_matrix_supports_row_lookup() {
        let m = TfidfIndexBuilder::default().build(&bags(vec![(5, vec!["a"]), (9, vec!["b"])])).unwrap();
        assert_eq!(m.row_index(&9.into()), Some(1));
        assert_eq!(m.weight(&5.into(), "a"), Some(1.0));
    }
}
