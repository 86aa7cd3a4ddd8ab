//! Lexical document retrieval over a persisted TF-IDF term-document matrix.
//!
//! Build phase: [`records`] -> [`aggregate`] -> [`tfidf`] -> [`persist`].
//! Query phase: [`persist::load_matrix`] -> [`query`] -> [`rank`].

pub mod aggregate;
pub mod error;
pub mod index;
pub mod lemmatizer;
pub mod persist;
pub mod query;
pub mod rank;
pub mod records;
pub mod tfidf;
pub mod tokenizer;

pub use error::{Error, Result};
pub use index::{DocumentId, TermDocMatrix, Vocabulary};
