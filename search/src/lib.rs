use anyhow::{Context, Result};
use lexmatrix_core::lemmatizer::Lemmatizer;
use lexmatrix_core::persist::{load_matrix, save_results};
use lexmatrix_core::query::{QueryMatch, QueryTermExtractor};
use lexmatrix_core::rank::{rank, RankedDocument};
use std::path::PathBuf;

pub const DEFAULT_MATRIX: &str = "tfidf_matrix.csv";
pub const DEFAULT_RESULTS: &str = "results.csv";

pub struct SearchOptions {
    pub query: String,
    pub matrix: PathBuf,
    pub results: PathBuf,
}

#[derive(Debug)]
pub enum SearchOutcome {
    /// Ranking ran and the results file was written.
    Ranked { terms: Vec<String>, results: Vec<RankedDocument> },
    /// No query lemma is in the vocabulary; nothing was written.
    NoMatch { candidates: Vec<String> },
}

/// Load the matrix, match the query, rank, and persist the full ranking.
pub fn run_search<L: Lemmatizer>(opts: &SearchOptions, lemmatizer: L) -> Result<SearchOutcome> {
    let start = std::time::Instant::now();
    let matrix = load_matrix(&opts.matrix).context("cannot search without a TF-IDF matrix")?;

    let terms = match QueryTermExtractor::new(lemmatizer).extract(&opts.query, matrix.vocabulary()) {
        QueryMatch::Matched(terms) => terms,
        QueryMatch::NoMatch { candidates } => return Ok(SearchOutcome::NoMatch { candidates }),
    };

    let results = rank(&matrix, &terms);
    save_results(&opts.results, &results)
        .with_context(|| format!("writing results to {}", opts.results.display()))?;
    tracing::info!(took_s = start.elapsed().as_secs_f64(), hits = results.len(), "search complete");
    Ok(SearchOutcome::Ranked { terms, results })
}

/// Human-readable summary of the first `top` results.
pub fn render_top(results: &[RankedDocument], top: usize) -> String {
    let width = results.iter().take(top).map(|r| r.doc_id.to_string().len()).max().unwrap_or(0).max(8);
    let mut out = format!("{:<width$}  score\n", "document");
    for r in results.iter().take(top) {
        out.push_str(&format!("{:<width$}  {:.6}\n", r.doc_id.to_string(), r.score));
    }
    out
}
