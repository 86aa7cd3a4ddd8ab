use lexmatrix_core::aggregate::aggregate;
use lexmatrix_core::lemmatizer::{Lemmatizer, LexiconLemmatizer};
use lexmatrix_core::persist::{load_matrix, save_matrix};
use lexmatrix_core::query::{QueryMatch, QueryTermExtractor};
use lexmatrix_core::rank::rank;
use lexmatrix_core::records::TermRecord;
use lexmatrix_core::tfidf::TfidfIndexBuilder;
use lexmatrix_core::{DocumentId, TermDocMatrix};

fn court_corpus() -> TermDocMatrix {
    let records = vec![
        TermRecord::new(1, "prawo", "[1]"),
        TermRecord::new(2, "sąd", "[1, 2]"),
        TermRecord::new(3, "apelacja", "[2]"),
    ];
    let agg = aggregate(&records);
    TfidfIndexBuilder::default().build(&agg.bags).unwrap()
}

/// Yields every surface form it knows plus a competing reading.
struct Ambiguous;

impl Lemmatizer for Ambiguous {
    fn lemmas(&self, text: &str) -> Vec<String> {
        text.split_whitespace()
            .flat_map(|w| match w {
                "sądu" | "sąd" => vec!["sąd".to_string(), "sądzić".to_string()],
                other => vec![other.to_string()],
            })
            .collect()
    }
}

#[test]
fn court_scenario_ranks_with_first_seen_tie_break() {
    let matrix = court_corpus();
    assert_eq!(matrix.vocabulary().terms(), &["apelacja", "prawo", "sąd"]);

    let extracted = QueryTermExtractor::new(Ambiguous).extract("Sądu", matrix.vocabulary());
    let terms = match extracted {
        QueryMatch::Matched(terms) => terms,
        other => panic!("expected a match, got {other:?}"),
    };
    assert_eq!(terms, vec!["sąd".to_string()]);

    let w1 = matrix.weight(&1.into(), "sąd").unwrap();
    let w2 = matrix.weight(&2.into(), "sąd").unwrap();
    assert!(w1 > 0.0 && w2 > 0.0);

    let ranked = rank(&matrix, &terms);
    assert_eq!(ranked.len(), 2);
    // Symmetric corpus: equal weights, doc 1 was aggregated first.
    assert!((w1 - w2).abs() < 1e-12);
    assert_eq!(ranked[0].doc_id, DocumentId::Int(1));
    assert_eq!(ranked[1].doc_id, DocumentId::Int(2));
    assert!(ranked.iter().all(|r| (0.0..=1.0).contains(&r.score)));
}

#[test]
fn heavier_document_ranks_first() {
    let records = vec![
        TermRecord::new(1, "sąd", "[1, 2]"),
        TermRecord::new(2, "prawo", "[1]"),
        TermRecord::new(3, "prawo", "[1]"),
    ];
    let matrix = TfidfIndexBuilder::default().build(&aggregate(&records).bags).unwrap();
    let ranked = rank(&matrix, &["sąd".to_string()]);
    assert_eq!(ranked[0].doc_id, DocumentId::Int(2));
    assert!((ranked[0].score - 1.0).abs() < 1e-12);
}

#[test]
fn unmatched_query_never_reaches_ranking() {
    let matrix = court_corpus();
    let extracted = QueryTermExtractor::new(Ambiguous).extract("leki", matrix.vocabulary());
    assert_eq!(extracted, QueryMatch::NoMatch { candidates: vec!["leki".into()] });
}

#[test]
fn malformed_rows_contribute_to_no_document() {
    let records = vec![
        TermRecord::new(1, "prawo", "[1]"),
        TermRecord::new(2, "kara", "{broken"),
    ];
    let agg = aggregate(&records);
    assert_eq!(agg.skipped.len(), 1);
    let matrix = TfidfIndexBuilder::default().build(&agg.bags).unwrap();
    assert!(!matrix.vocabulary().contains("kara"));
}

#[test]
fn build_and_reload_is_byte_stable() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.csv");
    let b = dir.path().join("b.csv");
    save_matrix(&a, &court_corpus()).unwrap();
    save_matrix(&b, &court_corpus()).unwrap();
    assert_eq!(std::fs::read(&a).unwrap(), std::fs::read(&b).unwrap());

    let reloaded = load_matrix(&a).unwrap();
    assert_eq!(reloaded, court_corpus());
}

#[test]
fn lexicon_lemmatizer_drives_extraction() {
    let matrix = court_corpus();
    let mut lex = LexiconLemmatizer::new();
    lex.insert("sądy", "sąd:s1", "subst:pl:nom:m3");
    lex.insert("apelacji", "apelacja", "subst:sg:gen:f");
    let got = QueryTermExtractor::new(lex).extract("Sądy a apelacji?", matrix.vocabulary());
    assert_eq!(got.terms(), &["sąd".to_string(), "apelacja".to_string()]);
}
