//! Insurance term identification.
//!
//! Two passes run over the same text:
//! - a vocabulary pass matching glossary terms as whole words, longest first
//! - a pattern pass for percentages, dollar amounts, durations and legal clauses
//!
//! Matches from both passes are merged by start offset. Overlapping spans are
//! all kept: a vocabulary hit surfaces a term while a pattern hit surfaces a
//! numeric or legal fact.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::glossary::{Glossary, InsuranceType, TermCategory, VocabularyEntry};

/// Characters of context captured on each side of a match.
pub const DEFAULT_CONTEXT_WINDOW: usize = 50;

/// An occurrence of insurance jargon in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermMatch {
    /// Vocabulary entry, or the matched text for pattern hits.
    pub term: String,

    /// Text exactly as it appears in the document.
    pub original_text: String,

    /// Start byte offset in the document text.
    pub start_index: usize,

    /// End byte offset in the document text (exclusive).
    pub end_index: usize,

    /// Surrounding text, clipped to the document bounds.
    pub context: String,

    pub category: TermCategory,

    pub insurance_type: InsuranceType,
}

struct CompiledTerm {
    entry: VocabularyEntry,
    pattern: Regex,
}

struct CompiledPattern {
    category: TermCategory,
    pattern: Regex,
}

/// Finds glossary terms and numeric/legal patterns in text.
pub struct TermIdentifier {
    vocabulary: Vec<CompiledTerm>,
    patterns: Vec<CompiledPattern>,
    context_window: usize,
}

impl TermIdentifier {
    /// Compile the glossary vocabulary and the fixed pattern set.
    pub fn new(glossary: &Glossary) -> Result<Self> {
        let vocabulary = glossary
            .vocabulary()
            .into_iter()
            .map(|entry| {
                let pattern = Regex::new(&vocabulary_pattern(&entry.term))?;
                Ok(CompiledTerm { entry, pattern })
            })
            .collect::<Result<Vec<_>>>()?;

        let pattern_sources = [
            (TermCategory::Percentage, r"\b\d+(?:\.\d+)?%"),
            (TermCategory::Monetary, r"\$\s*\d+(?:,\d{3})*(?:\.\d{2})?"),
            (
                TermCategory::TimePeriod,
                r"(?i)\b\d+\s+(?:day|week|month|year)s?\b",
            ),
            (
                TermCategory::LegalClause,
                r"(?i)\b(?:provided that|subject to|notwithstanding|whereas)\b[^.]*\.",
            ),
        ];
        let patterns = pattern_sources
            .into_iter()
            .map(|(category, source)| {
                Ok(CompiledPattern {
                    category,
                    pattern: Regex::new(source)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            vocabulary,
            patterns,
            context_window: DEFAULT_CONTEXT_WINDOW,
        })
    }

    /// Set the number of context characters captured on each side.
    pub fn with_context_window(mut self, window: usize) -> Self {
        self.context_window = window;
        self
    }

    /// Identify every term and pattern occurrence, ordered by start offset.
    pub fn identify(&self, text: &str, insurance_type: InsuranceType) -> Vec<TermMatch> {
        let mut matches = self.identify_vocabulary(text, insurance_type);
        let vocabulary_hits = matches.len();
        matches.extend(self.identify_patterns(text, insurance_type));

        // Stable: at equal offsets longer vocabulary terms stay ahead.
        matches.sort_by_key(|m| m.start_index);

        debug!(
            "Identified {} terms ({vocabulary_hits} vocabulary, {} pattern)",
            matches.len(),
            matches.len() - vocabulary_hits
        );
        matches
    }

    /// Vocabulary terms mentioned in a question, unique, in order of appearance.
    pub fn related_terms(&self, question: &str, insurance_type: InsuranceType) -> Vec<String> {
        let mut matches = self.identify_vocabulary(question, insurance_type);
        matches.sort_by_key(|m| m.start_index);

        let mut related: Vec<String> = Vec::new();
        for m in matches {
            if !related.contains(&m.term) {
                related.push(m.term);
            }
        }
        related
    }

    fn identify_vocabulary(&self, text: &str, insurance_type: InsuranceType) -> Vec<TermMatch> {
        let mut matches = Vec::new();

        for compiled in &self.vocabulary {
            if compiled
                .entry
                .scope
                .is_some_and(|scope| scope != insurance_type)
            {
                continue;
            }

            for mat in compiled.pattern.find_iter(text) {
                matches.push(TermMatch {
                    term: compiled.entry.term.clone(),
                    original_text: mat.as_str().to_string(),
                    start_index: mat.start(),
                    end_index: mat.end(),
                    context: self.context(text, mat.start(), mat.end()),
                    category: compiled.entry.category,
                    insurance_type,
                });
            }
        }

        matches
    }

    fn identify_patterns(&self, text: &str, insurance_type: InsuranceType) -> Vec<TermMatch> {
        let mut matches = Vec::new();

        for compiled in &self.patterns {
            for mat in compiled.pattern.find_iter(text) {
                matches.push(TermMatch {
                    term: mat.as_str().to_string(),
                    original_text: mat.as_str().to_string(),
                    start_index: mat.start(),
                    end_index: mat.end(),
                    context: self.context(text, mat.start(), mat.end()),
                    category: compiled.category,
                    insurance_type,
                });
            }
        }

        matches
    }

    /// Text around `start..end`, up to `context_window` characters each side.
    fn context(&self, text: &str, start: usize, end: usize) -> String {
        let window = self.context_window;
        let ctx_start = text[..start]
            .char_indices()
            .rev()
            .take(window)
            .last()
            .map_or(start, |(i, _)| i);
        let ctx_end = text[end..]
            .char_indices()
            .nth(window)
            .map_or(text.len(), |(i, _)| end + i);

        text[ctx_start..ctx_end].to_string()
    }
}

/// Whole-word, case-insensitive pattern for a vocabulary term.
///
/// Words may be separated by any whitespace run so terms wrapped across
/// lines still match.
fn vocabulary_pattern(term: &str) -> String {
    let words: Vec<String> = term.split_whitespace().map(regex_lite::escape).collect();
    format!(r"(?i)\b{}\b", words.join(r"\s+"))
}
