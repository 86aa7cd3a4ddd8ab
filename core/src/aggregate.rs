use crate::records::{ParseSkip, TermRecord};
use crate::DocumentId;
use std::collections::HashMap;

/// Per-document term bags in first-seen document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentTermBag {
    order: Vec<DocumentId>,
    bags: HashMap<DocumentId, Vec<String>>,
}

impl DocumentTermBag {
    pub fn new() -> Self { Self::default() }

    /// Make sure `id` has a bag, registering it in first-seen order.
    fn bag_mut(&mut self, id: DocumentId) -> &mut Vec<String> {
        if !self.bags.contains_key(&id) {
            self.order.push(id.clone());
        }
        self.bags.entry(id).or_default()
    }

    /// Append one term occurrence to a document's bag.
    pub fn push(&mut self, id: DocumentId, term: impl Into<String>) {
        self.bag_mut(id).push(term.into());
    }

    pub fn terms(&self, id: &DocumentId) -> Option<&[String]> { self.bags.get(id).map(Vec::as_slice) }
    pub fn doc_ids(&self) -> &[DocumentId] { &self.order }
    pub fn len(&self) -> usize { self.order.len() }
    pub fn is_empty(&self) -> bool { self.order.is_empty() }

    /// `(id, terms)` pairs in row order.
    pub fn iter(&self) -> impl Iterator<Item = (&DocumentId, &[String])> + '_ {
        self.order.iter().map(move |id| (id, self.bags[id].as_slice()))
    }
}

impl<S: Into<String>> FromIterator<(DocumentId, Vec<S>)> for DocumentTermBag {
    fn from_iter<I: IntoIterator<Item = (DocumentId, Vec<S>)>>(iter: I) -> Self {
        let mut out = DocumentTermBag::new();
        for (id, terms) in iter {
            let bag = out.bag_mut(id);
            bag.extend(terms.into_iter().map(Into::into));
        }
        out
    }
}

/// A record dropped because its document list did not parse.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    pub row: usize,
    pub term: String,
    pub reason: ParseSkip,
}

/// Aggregation output: the bags plus every skipped record.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub bags: DocumentTermBag,
    pub skipped: Vec<SkippedRecord>,
}

/// Group `(term, documents)` records into per-document term bags.
///
/// Each (term, document) pairing appends one occurrence, so a record naming
/// several documents contributes the full term to each of them. A record with
/// a blank term still registers its documents.
pub fn aggregate<'a, I>(records: I) -> Aggregation
where
    I: IntoIterator<Item = &'a TermRecord>,
{
    let mut out = Aggregation::default();
    for record in records {
        let ids = match record.docs.resolve() {
            Ok(ids) => ids,
            Err(reason) => {
                tracing::debug!(row = record.row, %reason, "skipping record with malformed document list");
                out.skipped.push(SkippedRecord { row: record.row, term: record.term.clone(), reason });
                continue;
            }
        };
        for id in ids {
            let bag = out.bags.bag_mut(id);
            if !record.term.is_empty() {
                bag.push(record.term.clone());
            }
        }
    }
    if !out.skipped.is_empty() {
        tracing::warn!(skipped = out.skipped.len(), "records skipped during aggregation");
    }
    out
}
