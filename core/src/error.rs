use std::path::PathBuf;

/// Errors raised by index construction, loading and persistence.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Aggregation produced no documents, so there is nothing to vectorize.
    #[error("empty corpus: no documents to index")]
    EmptyCorpus,
    /// A persisted file is missing or unreadable.
    #[error("failed to load {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },
    /// The persisted matrix was readable but its layout is wrong.
    #[error("malformed matrix {} (line {line}): {reason}", .path.display())]
    MalformedMatrix {
        path: PathBuf,
        line: u64,
        reason: String,
    },
    /// Distinct document ids that would be written under the same row label.
    #[error("document ids {first:?} and {second:?} share the row label `{label}`")]
    LabelClash {
        label: String,
        first: crate::DocumentId,
        second: crate::DocumentId,
    },
    /// A required input column is absent from a tabular file.
    #[error("missing column `{column}` in {}", .path.display())]
    MissingColumn { path: PathBuf, column: String },
    /// No Snowball stemmer exists for the requested language.
    #[error("unknown stemmer language `{0}`")]
    UnknownStemmer(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("timestamp formatting error: {0}")]
    Time(#[from] time::error::Format),
}

impl Error {
    /// Wrap an error with the path it was raised for.
    pub fn load<P: Into<PathBuf>>(path: P, source: Error) -> Self {
        Error::Load { path: path.into(), source: Box::new(source) }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
