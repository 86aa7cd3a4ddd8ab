use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lexmatrix_core::aggregate::aggregate;
use lexmatrix_core::lemmatizer::{select_lemmatizer, Lemmatizer};
use lexmatrix_core::persist::{meta_path, save_matrix, save_meta, MetaFile};
use lexmatrix_core::records::{load_records, InputColumns, DEFAULT_DOCS_COLUMN, DEFAULT_TERM_COLUMN};
use lexmatrix_core::tfidf::{IndexConfig, TermAnalysis, TfidfIndexBuilder};
use lexmatrix_core::Error;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build a TF-IDF term-document matrix from lemmatized term records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the matrix from a CSV/JSONL file or a directory of them
    Build {
        /// Input path (file or directory)
        #[arg(long, env = "LEXMATRIX_INPUT")]
        input: PathBuf,
        /// Output matrix CSV
        #[arg(long, env = "LEXMATRIX_MATRIX")]
        output: PathBuf,
        /// Column holding the lemmatized term
        #[arg(long, default_value = DEFAULT_TERM_COLUMN)]
        term_column: String,
        /// Column holding the serialized related-document list
        #[arg(long, default_value = DEFAULT_DOCS_COLUMN)]
        docs_column: String,
        /// Split multi-word terms into lowercase word tokens
        #[arg(long, default_value_t = false)]
        words: bool,
    },
    /// Add a lemma column next to a raw term column
    Lemmatize {
        /// Input CSV
        #[arg(long)]
        input: PathBuf,
        /// Output CSV
        #[arg(long)]
        output: PathBuf,
        /// `form,lemma,tag` lexicon CSV
        #[arg(long, env = "LEXMATRIX_LEXICON")]
        lexicon: Option<PathBuf>,
        /// Snowball stemmer language, used when no lexicon is given
        #[arg(long, env = "LEXMATRIX_STEMMER")]
        stemmer: Option<String>,
        #[arg(long, default_value = "law_term")]
        source_column: String,
        #[arg(long, default_value = DEFAULT_TERM_COLUMN)]
        target_column: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, term_column, docs_column, words } => {
            let columns = InputColumns { term: term_column, docs: docs_column };
            let analysis = if words { TermAnalysis::Words } else { TermAnalysis::Verbatim };
            build_matrix(&input, &output, &columns, analysis)
        }
        Commands::Lemmatize { input, output, lexicon, stemmer, source_column, target_column } => {
            let lemmatizer = select_lemmatizer(lexicon.as_deref(), stemmer.as_deref())?;
            lemmatize_file(&input, &output, &lemmatizer, &source_column, &target_column)
        }
    }
}

fn build_matrix(input: &Path, output: &Path, columns: &InputColumns, term_analysis: TermAnalysis) -> Result<()> {
    let records = load_records(input, columns)?;
    let agg = aggregate(&records);
    tracing::info!(records = records.len(), documents = agg.bags.len(), skipped = agg.skipped.len(), "aggregated records");

    let builder = TfidfIndexBuilder::new(IndexConfig { term_analysis });
    let matrix = match builder.build(&agg.bags) {
        Err(Error::EmptyCorpus) => anyhow::bail!(
            "no documents found in {} ({} records, {} skipped)",
            input.display(),
            records.len(),
            agg.skipped.len()
        ),
        other => other?,
    };

    save_matrix(output, &matrix).with_context(|| format!("writing {}", output.display()))?;
    let meta = MetaFile::for_matrix(&matrix, agg.skipped.len(), term_analysis)?;
    save_meta(meta_path(output), &meta)?;

    println!("TF-IDF matrix saved to '{}' ({} documents x {} terms)", output.display(), matrix.num_docs(), matrix.num_terms());
    if !agg.skipped.is_empty() {
        println!("{} records skipped (malformed document lists)", agg.skipped.len());
    }
    Ok(())
}

/// Replace every word with its base form, joined by single spaces.
fn lemmatize_text<L: Lemmatizer + ?Sized>(text: &str, lemmatizer: &L) -> String {
    text.split_whitespace()
        .map(|w| lemmatizer.base_form(w).unwrap_or_else(|| w.to_string()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn lemmatize_file<L: Lemmatizer + ?Sized>(input: &Path, output: &Path, lemmatizer: &L, source: &str, target: &str) -> Result<()> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(input)
        .with_context(|| format!("opening {}", input.display()))?;
    let headers = rdr.headers()?.clone();
    let src = headers
        .iter()
        .position(|h| h.trim() == source)
        .with_context(|| format!("missing column `{source}` in {}", input.display()))?;
    // An existing target column is replaced rather than duplicated.
    let existing = headers.iter().position(|h| h.trim() == target);

    let reorder = |cells: Vec<String>, lemma: String| -> Vec<String> {
        let mut out: Vec<String> = cells
            .into_iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != existing)
            .map(|(_, c)| c)
            .collect();
        let at = match existing {
            Some(e) if e < src => src,
            _ => src + 1,
        };
        out.insert(at.min(out.len()), lemma);
        out
    };

    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let mut wtr = csv::Writer::from_path(output).with_context(|| format!("creating {}", output.display()))?;
    wtr.write_record(reorder(headers.iter().map(str::to_string).collect(), target.to_string()))?;

    let mut rows = 0usize;
    for record in rdr.records() {
        let record = record?;
        let lemma = lemmatize_text(record.get(src).unwrap_or(""), lemmatizer);
        wtr.write_record(reorder(record.iter().map(str::to_string).collect(), lemma))?;
        rows += 1;
    }
    wtr.flush()?;
    tracing::info!(rows, output = %output.display(), "lemmatized terms");
    println!("Lemmatized {rows} rows into '{}'", output.display());
    Ok(())
}
