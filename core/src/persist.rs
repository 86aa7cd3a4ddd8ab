//! Flat-file persistence: the matrix CSV, its JSON sidecar, and ranked results.
//!
//! Matrix layout: header row is an empty label cell followed by the vocabulary;
//! every other row is a document id followed by its weights. Floats use the
//! shortest round-trip formatting so identical builds give identical bytes.

use crate::error::{Error, Result};
use crate::rank::RankedDocument;
use crate::tfidf::TermAnalysis;
use crate::{DocumentId, TermDocMatrix, Vocabulary};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const META_VERSION: u32 = 1;

/// Build summary written next to the matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: usize,
    pub num_terms: usize,
    pub skipped_records: usize,
    pub term_analysis: TermAnalysis,
    pub created_at: String,
    pub version: u32,
}

impl MetaFile {
    pub fn for_matrix(matrix: &TermDocMatrix, skipped_records: usize, term_analysis: TermAnalysis) -> Result<Self> {
        Ok(Self {
            num_docs: matrix.num_docs(),
            num_terms: matrix.num_terms(),
            skipped_records,
            term_analysis,
            created_at: time::OffsetDateTime::now_utc()
                .format(&time::format_description::well_known::Rfc3339)?,
            version: META_VERSION,
        })
    }
}

/// `<matrix path>.meta.json`
pub fn meta_path(matrix_path: &Path) -> PathBuf {
    let mut s: OsString = matrix_path.as_os_str().to_owned();
    s.push(".meta.json");
    PathBuf::from(s)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        create_dir_all(dir)?;
    }
    Ok(())
}

/// Row labels for every document. Fails when two ids print the same,
/// e.g. `Int(42)` and `Text("42")`, since the file could not be reloaded.
fn row_labels(matrix: &TermDocMatrix) -> Result<Vec<String>> {
    let mut seen: HashMap<String, &DocumentId> = HashMap::with_capacity(matrix.num_docs());
    let mut labels = Vec::with_capacity(matrix.num_docs());
    for id in matrix.doc_ids() {
        let label = id.to_string();
        if let Some(other) = seen.get(label.as_str()).copied() {
            return Err(Error::LabelClash { label, first: other.clone(), second: id.clone() });
        }
        seen.insert(label.clone(), id);
        labels.push(label);
    }
    Ok(labels)
}

pub fn save_matrix<P: AsRef<Path>>(path: P, matrix: &TermDocMatrix) -> Result<()> {
    let path = path.as_ref();
    let labels = row_labels(matrix)?;
    ensure_parent(path)?;
    let mut wtr = csv::Writer::from_path(path)?;
    let mut header: Vec<&str> = Vec::with_capacity(matrix.num_terms() + 1);
    header.push("");
    header.extend(matrix.vocabulary().terms().iter().map(String::as_str));
    wtr.write_record(&header)?;

    let mut line: Vec<String> = Vec::with_capacity(matrix.num_terms() + 1);
    for (label, (_, row)) in labels.into_iter().zip(matrix.rows()) {
        line.clear();
        line.push(label);
        line.extend(row.iter().map(|w| w.to_string()));
        wtr.write_record(&line)?;
    }
    wtr.flush()?;
    tracing::info!(path = %path.display(), rows = matrix.num_docs(), cols = matrix.num_terms(), "saved matrix");
    Ok(())
}

/// Load a persisted matrix. Missing or unreadable files give [`Error::Load`],
/// layout problems give [`Error::MalformedMatrix`].
pub fn load_matrix<P: AsRef<Path>>(path: P) -> Result<TermDocMatrix> {
    let path = path.as_ref();
    let matrix = read_matrix(path).map_err(|e| match e {
        e @ Error::MalformedMatrix { .. } => e,
        other => Error::load(path, other),
    })?;
    tracing::info!(path = %path.display(), rows = matrix.num_docs(), cols = matrix.num_terms(), "loaded matrix");
    Ok(matrix)
}

fn read_matrix(path: &Path) -> Result<TermDocMatrix> {
    let malformed = |line: u64, reason: String| Error::MalformedMatrix { path: path.to_path_buf(), line, reason };

    let mut rdr = csv::ReaderBuilder::new().has_headers(true).flexible(true).from_path(path)?;
    let header = rdr.headers()?.clone();
    if header.is_empty() {
        return Err(malformed(1, "missing header row".into()));
    }
    let terms: Vec<String> = header.iter().skip(1).map(str::to_string).collect();
    let mut seen = HashSet::with_capacity(terms.len());
    for term in &terms {
        if !seen.insert(term.as_str()) {
            return Err(malformed(1, format!("duplicate term column {term:?}")));
        }
    }
    let width = terms.len();

    let mut doc_ids = Vec::new();
    let mut weights = Vec::new();
    let mut ids_seen = HashSet::new();
    for record in rdr.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        if record.len() != width + 1 {
            return Err(malformed(line, format!("expected {} cells, found {}", width + 1, record.len())));
        }
        let id = DocumentId::from_label(record.get(0).unwrap_or(""));
        if !ids_seen.insert(id.clone()) {
            return Err(malformed(line, format!("duplicate document id {id}")));
        }
        for cell in record.iter().skip(1) {
            let w: f64 = cell
                .trim()
                .parse()
                .map_err(|_| malformed(line, format!("invalid weight {cell:?}")))?;
            if !w.is_finite() || w < 0.0 {
                return Err(malformed(line, format!("weight {cell:?} is not a finite non-negative number")));
            }
            weights.push(w);
        }
        doc_ids.push(id);
    }

    TermDocMatrix::from_parts(doc_ids, Vocabulary::from_ordered(terms), weights)
        .ok_or_else(|| malformed(0, "inconsistent matrix shape".into()))
}

pub fn save_meta<P: AsRef<Path>>(path: P, meta: &MetaFile) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;
    let mut f = File::create(path)?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta<P: AsRef<Path>>(path: P) -> Result<MetaFile> {
    let path = path.as_ref();
    let read = || -> Result<MetaFile> {
        let mut f = File::open(path)?;
        let mut buf = String::new();
        f.read_to_string(&mut buf)?;
        Ok(serde_json::from_str(&buf)?)
    };
    read().map_err(|e| Error::load(path, e))
}

/// Write the full ranking as `document,score` CSV.
pub fn save_results<P: AsRef<Path>>(path: P, results: &[RankedDocument]) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["document", "score"])?;
    for r in results {
        wtr.write_record([r.doc_id.to_string(), r.score.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}
