use anyhow::Result;
use clap::Parser;
use lexmatrix_core::lemmatizer::select_lemmatizer;
use search::{render_top, run_search, SearchOptions, SearchOutcome, DEFAULT_MATRIX, DEFAULT_RESULTS};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "search")]
#[command(about = "Rank documents of a TF-IDF matrix against a free-text query")]
struct Args {
    /// Natural-language query
    query: String,
    /// Matrix CSV produced by `indexer build`
    #[arg(long, env = "LEXMATRIX_MATRIX", default_value = DEFAULT_MATRIX)]
    matrix: PathBuf,
    /// Where to write the full ranking
    #[arg(long, env = "LEXMATRIX_RESULTS", default_value = DEFAULT_RESULTS)]
    results: PathBuf,
    /// `form,lemma,tag` lexicon CSV
    #[arg(long, env = "LEXMATRIX_LEXICON")]
    lexicon: Option<PathBuf>,
    /// Snowball stemmer language, used when no lexicon is given
    #[arg(long, env = "LEXMATRIX_STEMMER")]
    stemmer: Option<String>,
    /// Number of results shown on the console
    #[arg(long, default_value_t = 10)]
    top: usize,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let lemmatizer = select_lemmatizer(args.lexicon.as_deref(), args.stemmer.as_deref())?;
    let opts = SearchOptions { query: args.query, matrix: args.matrix, results: args.results };

    match run_search(&opts, lemmatizer)? {
        SearchOutcome::NoMatch { .. } => {
            println!("None of the query words is present in the matrix.");
        }
        SearchOutcome::Ranked { terms, results } => {
            println!("Identified query terms: {}", terms.join(", "));
            println!("\nBest matching documents:\n");
            print!("{}", render_top(&results, args.top));
            println!("\nResults saved to '{}'.", opts.results.display());
        }
    }
    Ok(())
}
