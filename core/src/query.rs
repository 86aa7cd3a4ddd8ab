use crate::lemmatizer::Lemmatizer;
use crate::Vocabulary;

/// Outcome of matching a query against the vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryMatch {
    /// Terms present in the vocabulary, in analyzer emission order, de-duplicated.
    Matched(Vec<String>),
    /// No candidate is a vocabulary term; ranking must not run.
    NoMatch { candidates: Vec<String> },
}

impl QueryMatch {
    pub fn terms(&self) -> &[String] {
        match self {
            QueryMatch::Matched(terms) => terms,
            QueryMatch::NoMatch { .. } => &[],
        }
    }

    pub fn is_match(&self) -> bool { matches!(self, QueryMatch::Matched(_)) }
}

/// Lemmatizes free-text queries and keeps the lemmas the index knows.
pub struct QueryTermExtractor<L> {
    lemmatizer: L,
}

impl<L: Lemmatizer> QueryTermExtractor<L> {
    pub fn new(lemmatizer: L) -> Self { Self { lemmatizer } }

    /// Lowercase, lemmatize, and intersect with `vocabulary` by exact match.
    pub fn extract(&self, query: &str, vocabulary: &Vocabulary) -> QueryMatch {
        let candidates = self.lemmatizer.lemmas(&query.to_lowercase());
        let mut matched: Vec<String> = Vec::new();
        for lemma in &candidates {
            if vocabulary.contains(lemma) && !matched.contains(lemma) {
                matched.push(lemma.clone());
            }
        }
        if matched.is_empty() {
            tracing::info!(?candidates, "no query term found in vocabulary");
            QueryMatch::NoMatch { candidates }
        } else {
            tracing::info!(terms = ?matched, "identified query terms");
            QueryMatch::Matched(matched)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Returns canned interpretations and records what it was asked.
    struct Canned {
        seen: RefCell<Vec<String>>,
        out: Vec<&'static str>,
    }

    impl Lemmatizer for Canned {
        fn lemmas(&self, text: &str) -> Vec<String> {
            self.seen.borrow_mut().push(text.to_string());
            self.out.iter().map(|s| s.to_string()).collect()
        }
    }

    fn canned(out: Vec<&'static str>) -> Canned { Canned { seen: RefCell::new(Vec::new()), out } }

    #[test]
    fn lowercases_before_analysis_and_filters() {
        let vocab = Vocabulary::from_terms(["apelacja", "prawo", "sąd"]);
        let lem = canned(vec!["sąd", "sądzić", "Prawo", "sąd", "prawo"]);
        let extractor = QueryTermExtractor::new(&lem);
        let got = extractor.extract("Sąd PRAWO", &vocab);
        assert_eq!(got, QueryMatch::Matched(vec!["sąd".into(), "prawo".into()]));
        assert_eq!(lem.seen.borrow().as_slice(), &["sąd prawo".to_string()]);
    }

    #[test]
    fn no_candidate_in_vocabulary_is_no_match() {
        let vocab = Vocabulary::from_terms(["prawo"]);
        let extractor = QueryTermExtractor::new(canned(vec!["lek"]));
        let got = extractor.extract("leki", &vocab);
        assert!(!got.is_match());
        assert!(got.terms().is_empty());
        assert_eq!(got, QueryMatch::NoMatch { candidates: vec!["lek".into()] });
    }

    #[test]
    fn empty_analysis_is_no_match() {
        let vocab = Vocabulary::from_terms(["prawo"]);
        let got = QueryTermExtractor::new(canned(vec![])).extract("", &vocab);
        assert!(!got.is_match());
    }
}
