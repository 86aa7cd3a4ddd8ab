//! Morphological analysis behind a small capability trait.

use crate::error::{Error, Result};
use crate::tokenizer::words;
use rust_stemmers::{Algorithm, Stemmer};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Text in, lemma candidates out.
///
/// Candidates need not line up one-to-one with input words: an analyzer may
/// emit several interpretations for the same span.
pub trait Lemmatizer {
    fn lemmas(&self, text: &str) -> Vec<String>;

    /// Single preferred base form of one word, used when rewriting terms.
    fn base_form(&self, word: &str) -> Option<String> {
        self.lemmas(word).into_iter().next()
    }
}

impl<L: Lemmatizer + ?Sized> Lemmatizer for &L {
    fn lemmas(&self, text: &str) -> Vec<String> { (**self).lemmas(text) }
    fn base_form(&self, word: &str) -> Option<String> { (**self).base_form(word) }
}

impl<L: Lemmatizer + ?Sized> Lemmatizer for Box<L> {
    fn lemmas(&self, text: &str) -> Vec<String> { (**self).lemmas(text) }
    fn base_form(&self, word: &str) -> Option<String> { (**self).base_form(word) }
}

/// Every word is its own lemma.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityLemmatizer;

impl Lemmatizer for IdentityLemmatizer {
    fn lemmas(&self, text: &str) -> Vec<String> {
        words(text).into_iter().map(str::to_string).collect()
    }

    fn base_form(&self, word: &str) -> Option<String> { Some(word.to_string()) }
}

/// One analysis of a word form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Interpretation {
    pub lemma: String,
    pub tag: String,
}

#[derive(Deserialize)]
struct LexiconRow {
    form: String,
    lemma: String,
    #[serde(default)]
    tag: String,
}

/// Strip a homonym marker: `sąd:s1` -> `sąd`.
fn bare_lemma(lemma: &str) -> &str {
    lemma.split(':').next().unwrap_or(lemma)
}

/// Dictionary-backed analyzer: word form -> interpretations.
///
/// Lookups are by lowercased form. Unknown words are returned unchanged.
#[derive(Debug, Clone, Default)]
pub struct LexiconLemmatizer {
    entries: HashMap<String, Vec<Interpretation>>,
}

impl LexiconLemmatizer {
    pub fn new() -> Self { Self::default() }

    pub fn insert(&mut self, form: &str, lemma: &str, tag: &str) {
        self.entries.entry(form.to_lowercase()).or_default().push(Interpretation {
            lemma: bare_lemma(lemma).to_string(),
            tag: tag.to_string(),
        });
    }

    /// Load a `form,lemma,tag` CSV lexicon.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let read = || -> Result<Self> {
            let mut reader = csv::Reader::from_path(path)?;
            let mut lex = Self::new();
            for row in reader.deserialize::<LexiconRow>() {
                let row = row?;
                lex.insert(row.form.trim(), row.lemma.trim(), row.tag.trim());
            }
            Ok(lex)
        };
        let lex = read().map_err(|e| Error::load(path, e))?;
        tracing::debug!(forms = lex.entries.len(), path = %path.display(), "loaded lexicon");
        Ok(lex)
    }

    pub fn interpretations(&self, word: &str) -> &[Interpretation] {
        self.entries.get(&word.to_lowercase()).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Lemmatizer for LexiconLemmatizer {
    fn lemmas(&self, text: &str) -> Vec<String> {
        let mut out = Vec::new();
        for word in words(text) {
            let found = self.interpretations(word);
            if found.is_empty() {
                out.push(word.to_string());
            } else {
                out.extend(found.iter().map(|i| i.lemma.clone()));
            }
        }
        out
    }

    /// Prefer a noun reading, then the first reading, then the word itself.
    fn base_form(&self, word: &str) -> Option<String> {
        let found = self.interpretations(word);
        let chosen = found.iter().find(|i| i.tag.contains("subst")).or_else(|| found.first());
        Some(chosen.map(|i| i.lemma.clone()).unwrap_or_else(|| word.to_string()))
    }
}

/// Snowball stemming as a stand-in lemmatizer for supported languages.
pub struct SnowballLemmatizer {
    stemmer: Stemmer,
}

impl SnowballLemmatizer {
    pub fn new(algorithm: Algorithm) -> Self { Self { stemmer: Stemmer::create(algorithm) } }
}

impl Lemmatizer for SnowballLemmatizer {
    fn lemmas(&self, text: &str) -> Vec<String> {
        words(text).into_iter().map(|w| self.stemmer.stem(&w.to_lowercase()).into_owned()).collect()
    }
}

/// Snowball algorithm by language name (`english`, `german`, ...).
pub fn stemmer_algorithm(name: &str) -> Option<Algorithm> {
    let algorithm = match name.trim().to_lowercase().as_str() {
        "arabic" => Algorithm::Arabic,
        "danish" => Algorithm::Danish,
        "dutch" => Algorithm::Dutch,
        "english" => Algorithm::English,
        "finnish" => Algorithm::Finnish,
        "french" => Algorithm::French,
        "german" => Algorithm::German,
        "greek" => Algorithm::Greek,
        "hungarian" => Algorithm::Hungarian,
        "italian" => Algorithm::Italian,
        "norwegian" => Algorithm::Norwegian,
        "portuguese" => Algorithm::Portuguese,
        "romanian" => Algorithm::Romanian,
        "russian" => Algorithm::Russian,
        "spanish" => Algorithm::Spanish,
        "swedish" => Algorithm::Swedish,
        "tamil" => Algorithm::Tamil,
        "turkish" => Algorithm::Turkish,
        _ => return None,
    };
    Some(algorithm)
}

/// Pick an analyzer: a lexicon file wins over a stemmer, identity otherwise.
pub fn select_lemmatizer(lexicon: Option<&Path>, stemmer: Option<&str>) -> Result<Box<dyn Lemmatizer>> {
    if let Some(path) = lexicon {
        return Ok(Box::new(LexiconLemmatizer::from_csv(path)?));
    }
    if let Some(name) = stemmer {
        let algorithm = stemmer_algorithm(name).ok_or_else(|| Error::UnknownStemmer(name.to_string()))?;
        return Ok(Box::new(SnowballLemmatizer::new(algorithm)));
    }
    Ok(Box::new(IdentityLemmatizer))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexicon() -> LexiconLemmatizer {
        let mut lex = LexiconLemmatizer::new();
        lex.insert("sądu", "sąd:s1", "subst:sg:gen:m3");
        lex.insert("sądu", "sądzić", "impt:sg:sec:imperf");
        lex.insert("leki", "lek", "subst:pl:nom:m3");
        lex.insert("wymagają", "wymagać", "fin:pl:ter:imperf");
        lex.insert("mam", "mieć", "fin:sg:pri:imperf");
        lex.insert("mam", "mama", "subst:pl:gen:f");
        lex
    }

    #[test]
    fn lexicon_emits_every_interpretation() {
        assert_eq!(lexicon().lemmas("Leki do sądu"), vec!["lek", "do", "sąd", "sądzić"]);
    }

    #[test]
    fn base_form_prefers_nouns() {
        let lex = lexicon();
        assert_eq!(lex.base_form("mam").as_deref(), Some("mama"));
        assert_eq!(lex.base_form("wymagają").as_deref(), Some("wymagać"));
        assert_eq!(lex.base_form("xyz").as_deref(), Some("xyz"));
    }

    #[test]
    fn lexicon_loads_from_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lex.csv");
        std::fs::write(&path, "form,lemma,tag\nsądy,sąd:s1,subst\nprawa,prawo,subst\n").unwrap();
        let lex = LexiconLemmatizer::from_csv(&path).unwrap();
        assert_eq!(lex.lemmas("sądy prawa"), vec!["sąd", "prawo"]);
    }

    #[test]
    fn selection_falls_back_to_identity() {
        let lem = select_lemmatizer(None, None).unwrap();
        assert_eq!(lem.base_form("k.p.c.").as_deref(), Some("k.p.c."));
        assert_eq!(select_lemmatizer(None, Some("English")).unwrap().lemmas("courts"), vec!["court"]);
        assert!(matches!(select_lemmatizer(None, Some("klingon")), Err(Error::UnknownStemmer(_))));
    }

    #[test]
    fn identity_and_snowball() {
        assert_eq!(IdentityLemmatizer.lemmas("a b"), vec!["a", "b"]);
        let stem = SnowballLemmatizer::new(Algorithm::English);
        assert_eq!(stem.lemmas("Running courts"), vec!["run", "court"]);
    }
}
