use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Opaque document identifier: numeric or textual, never assumed contiguous.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentId {
    Int(i64),
    Text(String),
}

impl DocumentId {
    /// Interpret a row label read back from a matrix file.
    ///
    /// Only the canonical decimal form becomes numeric, so `007` or `+5` stay textual.
    pub fn from_label(label: &str) -> Self {
        match label.parse::<i64>() {
            Ok(n) if n.to_string() == label => DocumentId::Int(n),
            _ => DocumentId::Text(label.to_string()),
        }
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentId::Int(n) => write!(f, "{n}"),
            DocumentId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for DocumentId {
    fn from(n: i64) -> Self { DocumentId::Int(n) }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self { DocumentId::Text(s.to_string()) }
}

/// Sorted, de-duplicated term list. Position in the list is the matrix column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vocabulary {
    terms: Vec<String>,
    columns: HashMap<String, usize>,
}

impl Vocabulary {
    /// Build from any term iterator; duplicates collapse and order becomes lexicographic.
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut terms: Vec<String> = terms.into_iter().map(Into::into).collect();
        terms.sort();
        terms.dedup();
        Self::from_ordered(terms)
    }

    /// Build from terms already in column order (e.g. a persisted header) without re-sorting.
    pub(crate) fn from_ordered(terms: Vec<String>) -> Self {
        let columns = terms.iter().enumerate().map(|(i, t)| (t.clone(), i)).collect();
        Self { terms, columns }
    }

    pub fn column(&self, term: &str) -> Option<usize> { self.columns.get(term).copied() }
    pub fn contains(&self, term: &str) -> bool { self.columns.contains_key(term) }
    pub fn terms(&self) -> &[String] { &self.terms }
    pub fn len(&self) -> usize { self.terms.len() }
    pub fn is_empty(&self) -> bool { self.terms.is_empty() }
}

/// Dense term-document weight matrix.
///
/// Rows follow document aggregation order, columns follow [`Vocabulary`] order.
/// Both rows (by id) and columns (by term) are addressable in O(1).
#[derive(Debug, Clone, PartialEq)]
pub struct TermDocMatrix {
    doc_ids: Vec<DocumentId>,
    rows: HashMap<DocumentId, usize>,
    vocabulary: Vocabulary,
    weights: Vec<f64>, // row-major, doc_ids.len() * vocabulary.len()
}

impl TermDocMatrix {
    /// Assemble a matrix. Returns `None` when the weight buffer does not match
    /// the declared shape or a document id repeats.
    pub fn from_parts(doc_ids: Vec<DocumentId>, vocabulary: Vocabulary, weights: Vec<f64>) -> Option<Self> {
        if weights.len() != doc_ids.len() * vocabulary.len() {
            return None;
        }
        let mut rows = HashMap::with_capacity(doc_ids.len());
        for (i, id) in doc_ids.iter().enumerate() {
            if rows.insert(id.clone(), i).is_some() {
                return None;
            }
        }
        Some(Self { doc_ids, rows, vocabulary, weights })
    }

    /// Assemble a matrix whose shape and row ids are already known to be valid.
    pub(crate) fn from_valid_parts(doc_ids: Vec<DocumentId>, vocabulary: Vocabulary, weights: Vec<f64>) -> Self {
        debug_assert_eq!(weights.len(), doc_ids.len() * vocabulary.len());
        let rows: HashMap<DocumentId, usize> = doc_ids.iter().cloned().enumerate().map(|(i, id)| (id, i)).collect();
        debug_assert_eq!(rows.len(), doc_ids.len());
        Self { doc_ids, rows, vocabulary, weights }
    }

    pub fn num_docs(&self) -> usize { self.doc_ids.len() }
    pub fn num_terms(&self) -> usize { self.vocabulary.len() }
    pub fn doc_ids(&self) -> &[DocumentId] { &self.doc_ids }
    pub fn vocabulary(&self) -> &Vocabulary { &self.vocabulary }

    pub fn row_index(&self, id: &DocumentId) -> Option<usize> { self.rows.get(id).copied() }

    /// Weights of the row at `index`.
    pub fn row_at(&self, index: usize) -> &[f64] {
        let width = self.vocabulary.len();
        &self.weights[index * width..(index + 1) * width]
    }

    pub fn row(&self, id: &DocumentId) -> Option<&[f64]> {
        self.row_index(id).map(|i| self.row_at(i))
    }

    /// Single cell lookup by document id and term.
    pub fn weight(&self, id: &DocumentId, term: &str) -> Option<f64> {
        let col = self.vocabulary.column(term)?;
        self.row(id).map(|r| r[col])
    }

    /// Iterate `(id, row)` pairs in row order.
    pub fn rows(&self) -> impl Iterator<Item = (&DocumentId, &[f64])> + '_ {
        self.doc_ids.iter().enumerate().map(move |(i, id)| (id, self.row_at(i)))
    }
}
