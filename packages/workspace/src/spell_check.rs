//! Spell checking for open documents.

use quire_editor::{Document, DocumentContent};
use quire_parser::LOG_DIRECTIVE_PREFIX;
use std::collections::HashMap;

/// Shown at most per misspelled word
const MAX_SUGGESTIONS: usize = 3;

pub trait SpellChecker {
    /// `None` for a correctly spelled word, otherwise suggested corrections
    /// (possibly none).
    fn check_word(&self, word: &str) -> Option<Vec<String>>;
}

/// Checker backed by a fixed table of misspellings
#[derive(Debug, Clone)]
pub struct KnownMisspellings {
    known: HashMap<String, Vec<String>>,
}

impl KnownMisspellings {
    pub fn empty() -> Self {
        Self {
            known: HashMap::new(),
        }
    }

    pub fn with_entry(mut self, word: &str, suggestions: &[&str]) -> Self {
        self.known.insert(
            word.to_string(),
            suggestions.iter().map(|s| s.to_string()).collect(),
        );
        self
    }
}

impl Default for KnownMisspellings {
    fn default() -> Self {
        Self::empty()
            .with_entry("recieve", &["receive"])
            .with_entry("occured", &["occurred"])
            .with_entry("seperate", &["separate"])
            .with_entry("Itallian", &["Italian"])
            .with_entry("Rowlling", &["Rowling"])
    }
}

impl SpellChecker for KnownMisspellings {
    fn check_word(&self, word: &str) -> Option<Vec<String>> {
        self.known.get(word).cloned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Misspelling {
    pub word: String,
    pub suggestions: Vec<String>,
}

impl Misspelling {
    fn report(&self, location: &str) -> String {
        let suggestions = if self.suggestions.is_empty() {
            "no suggestions".to_string()
        } else {
            let shown: Vec<&str> = self
                .suggestions
                .iter()
                .take(MAX_SUGGESTIONS)
                .map(String::as_str)
                .collect();
            format!("suggestions: {}", shown.join(", "))
        };
        format!("{location}: \"{}\" -> {suggestions}", self.word)
    }
}

/// Check whitespace-separated words with punctuation stripped.
pub fn check_text(checker: &dyn SpellChecker, text: &str) -> Vec<Misspelling> {
    text.split_whitespace()
        .filter_map(|token| {
            let word: String = token.chars().filter(|c| c.is_alphabetic()).collect();
            if word.is_empty() {
                return None;
            }
            checker
                .check_word(&word)
                .map(|suggestions| Misspelling { word, suggestions })
        })
        .collect()
}

/// Spell-check report for a document, one line per misspelling.
pub fn check_document(checker: &dyn SpellChecker, document: &Document) -> Vec<String> {
    let mut report = Vec::new();

    match document.content() {
        DocumentContent::Flat { buffer, .. } => {
            for (index, line) in buffer.lines().iter().enumerate() {
                if line.trim_start().starts_with(LOG_DIRECTIVE_PREFIX) {
                    continue;
                }
                for misspelling in check_text(checker, line) {
                    let column = line
                        .find(&misspelling.word)
                        .map_or(1, |byte| line[..byte].chars().count() + 1);
                    report.push(misspelling.report(&format!("line {}, col {column}", index + 1)));
                }
            }
        }
        DocumentContent::Structural { markup, .. } => {
            for element in markup.tree.walk() {
                let Some(text) = element.text().filter(|t| !t.trim().is_empty()) else {
                    continue;
                };
                let name = element.id().unwrap_or(element.tag());
                for misspelling in check_text(checker, text) {
                    report.push(misspelling.report(&format!("element {name}")));
                }
            }
        }
    }

    if report.is_empty() {
        report.push("No spelling errors found".to_string());
    }
    report
}
