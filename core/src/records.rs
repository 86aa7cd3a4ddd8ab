//! Typed build-phase input records.
//!
//! Each record carries one (already lemmatized) term and the documents it is
//! related to. The related-document field usually arrives as a serialized list
//! such as `[1, 7, 9]`; it is parsed lazily by the aggregator so that a broken
//! list skips only its own record.

use crate::error::{Error, Result};
use crate::DocumentId;
use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const DEFAULT_TERM_COLUMN: &str = "law_term_lemma";
pub const DEFAULT_DOCS_COLUMN: &str = "related_nodes";

/// Names of the input columns holding the term and the related documents.
#[derive(Debug, Clone)]
pub struct InputColumns {
    pub term: String,
    pub docs: String,
}

impl Default for InputColumns {
    fn default() -> Self {
        Self { term: DEFAULT_TERM_COLUMN.to_string(), docs: DEFAULT_DOCS_COLUMN.to_string() }
    }
}

/// Related-document field as it appeared in the source.
#[derive(Debug, Clone, PartialEq)]
pub enum RelatedDocs {
    /// Textual serialization, parsed with [`parse_doc_ids`].
    Serialized(String),
    /// Already-structured list (JSON array input).
    List(Vec<serde_json::Value>),
}

impl RelatedDocs {
    pub fn resolve(&self) -> std::result::Result<Vec<DocumentId>, ParseSkip> {
        match self {
            RelatedDocs::Serialized(text) => parse_doc_ids(text),
            RelatedDocs::List(values) => values.iter().map(id_from_json).collect(),
        }
    }
}

/// One input row.
#[derive(Debug, Clone, PartialEq)]
pub struct TermRecord {
    /// 1-based position across all loaded inputs.
    pub row: usize,
    pub term: String,
    pub docs: RelatedDocs,
}

impl TermRecord {
    pub fn new(row: usize, term: impl Into<String>, serialized_docs: impl Into<String>) -> Self {
        Self { row, term: term.into(), docs: RelatedDocs::Serialized(serialized_docs.into()) }
    }
}

/// Reason a related-document list could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSkip {
    pub reason: String,
}

impl ParseSkip {
    fn new(reason: impl Into<String>) -> Self { Self { reason: reason.into() } }
}

impl fmt::Display for ParseSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.reason) }
}

fn id_from_json(value: &serde_json::Value) -> std::result::Result<DocumentId, ParseSkip> {
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(DocumentId::Int)
            .ok_or_else(|| ParseSkip::new(format!("non-integer document id {n}"))),
        serde_json::Value::String(s) => Ok(DocumentId::Text(s.clone())),
        other => Err(ParseSkip::new(format!("unsupported document id {other}"))),
    }
}

/// Parse a literal list of document ids: `[1, 7, 9]`, `['a', "b"]`, `[]`.
///
/// Elements are integers or single/double quoted strings; a trailing comma is
/// accepted. Anything else yields a [`ParseSkip`].
pub fn parse_doc_ids(text: &str) -> std::result::Result<Vec<DocumentId>, ParseSkip> {
    let trimmed = text.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| ParseSkip::new(format!("not a list literal: {trimmed:?}")))?;

    let mut ids = Vec::new();
    let mut chars = inner.chars().peekable();
    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        let Some(&first) = chars.peek() else { break };
        let id = match first {
            '\'' | '"' => {
                chars.next();
                let mut s = String::new();
                let mut closed = false;
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => match chars.next() {
                            Some(escaped) => s.push(escaped),
                            None => break,
                        },
                        c if c == first => {
                            closed = true;
                            break;
                        }
                        c => s.push(c),
                    }
                }
                if !closed {
                    return Err(ParseSkip::new("unterminated string"));
                }
                DocumentId::Text(s)
            }
            _ => {
                let mut tok = String::new();
                while let Some(&c) = chars.peek() {
                    if c == ',' || c.is_whitespace() {
                        break;
                    }
                    tok.push(c);
                    chars.next();
                }
                let n = tok
                    .replace('_', "")
                    .parse::<i64>()
                    .map_err(|_| ParseSkip::new(format!("invalid element {tok:?}")))?;
                DocumentId::Int(n)
            }
        };
        ids.push(id);

        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        match chars.next() {
            None => break,
            Some(',') => continue,
            Some(c) => return Err(ParseSkip::new(format!("unexpected character {c:?}"))),
        }
    }
    Ok(ids)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonDocs {
    Serialized(String),
    List(Vec<serde_json::Value>),
}

/// Load records from a `.csv`/`.jsonl` file, or every such file under a directory.
pub fn load_records<P: AsRef<Path>>(input: P, columns: &InputColumns) -> Result<Vec<TermRecord>> {
    let input = input.as_ref();
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && matches!(extension(p), Some("csv" | "jsonl")) {
                files.push(p.to_path_buf());
            }
        }
    } else {
        files.push(input.to_path_buf());
    }

    let mut records = Vec::new();
    for file in files {
        let loaded = if extension(&file) == Some("jsonl") {
            load_jsonl(&file, columns, &mut records)
        } else {
            load_csv(&file, columns, &mut records)
        };
        loaded.map_err(|e| Error::load(&file, e))?;
        tracing::debug!(file = %file.display(), total = records.len(), "loaded input file");
    }
    Ok(records)
}

fn extension(p: &Path) -> Option<&str> { p.extension().and_then(|s| s.to_str()) }

fn load_csv(file: &Path, columns: &InputColumns, out: &mut Vec<TermRecord>) -> Result<()> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(file)?;
    let headers = reader.headers()?.clone();
    let find = |name: &str| {
        headers.iter().position(|h| h.trim() == name).ok_or_else(|| Error::MissingColumn {
            path: file.to_path_buf(),
            column: name.to_string(),
        })
    };
    let term_col = find(&columns.term)?;
    let docs_col = find(&columns.docs)?;

    for row in reader.records() {
        let row = row?;
        out.push(TermRecord {
            row: out.len() + 1,
            term: row.get(term_col).unwrap_or("").trim().to_string(),
            docs: RelatedDocs::Serialized(row.get(docs_col).unwrap_or("").to_string()),
        });
    }
    Ok(())
}

fn load_jsonl(file: &Path, columns: &InputColumns, out: &mut Vec<TermRecord>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let mut obj: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&line)?;
        let term = match obj.remove(&columns.term) {
            Some(serde_json::Value::String(s)) => s.trim().to_string(),
            Some(serde_json::Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        let docs = match obj.remove(&columns.docs) {
            Some(v) => match serde_json::from_value::<JsonDocs>(v) {
                Ok(JsonDocs::Serialized(s)) => RelatedDocs::Serialized(s),
                Ok(JsonDocs::List(l)) => RelatedDocs::List(l),
                Err(_) => RelatedDocs::Serialized(String::new()),
            },
            None => RelatedDocs::Serialized(String::new()),
        };
        out.push(TermRecord { row: out.len() + 1, term, docs });
    }
    Ok(())
}
