//! Document normalization and sectioning.
//!
//! Extracted text is cleaned of scanning artifacts, then split into sections
//! at well-known policy headings. A section spanning the whole document is
//! always present.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::glossary::InsuranceType;

/// Title of the section that spans the whole document.
pub const FULL_DOCUMENT_TITLE: &str = "FULL DOCUMENT";

/// Headings that start a new section when found at a line start.
pub const SECTION_HEADINGS: &[&str] = &[
    "DEFINITIONS",
    "COVERAGE",
    "EXCLUSIONS",
    "LIMITATIONS",
    "BENEFITS",
    "ELIGIBILITY",
    "PREMIUMS",
    "CLAIMS",
    "GENERAL PROVISIONS",
];

/// A titled span of the document text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Heading as written in the document.
    pub title: String,

    /// Text of the section.
    pub content: String,

    /// Byte offset where the section starts.
    pub start_index: usize,

    /// Byte offset where the section ends (exclusive).
    pub end_index: usize,
}

/// Simple statistics about a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub word_count: usize,
    pub section_count: usize,
}

/// A cleaned policy document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Cleaned text. All offsets refer to this string.
    pub text: String,

    /// Insurance type the caller declared.
    pub insurance_type: InsuranceType,

    /// Sections, whole-document section first, then by start offset.
    pub sections: Vec<Section>,

    /// Word and section counts.
    pub metadata: DocumentMetadata,
}

/// Builds [`Document`]s from raw extracted text.
pub struct DocumentProcessor {
    heading: Regex,
}

impl DocumentProcessor {
    /// Compile the section heading pattern.
    pub fn new() -> Result<Self> {
        let alternatives = SECTION_HEADINGS
            .iter()
            .map(|h| regex_lite::escape(h))
            .collect::<Vec<_>>()
            .join("|");
        let heading = Regex::new(&format!(r"(?im)^[ \t]*({alternatives})[ \t]*(?:[:.]|$)"))?;
        Ok(Self { heading })
    }

    /// Clean raw text and derive sections and metadata.
    pub fn process(&self, raw: &str, insurance_type: InsuranceType) -> Document {
        let text = clean_text(raw);
        let sections = self.split_into_sections(&text);
        let metadata = DocumentMetadata {
            word_count: text.split_whitespace().count(),
            section_count: sections.len(),
        };

        debug!(
            "Processed document: {} words, {} sections",
            metadata.word_count, metadata.section_count
        );

        Document {
            text,
            insurance_type,
            sections,
            metadata,
        }
    }

    /// Split text at known headings.
    pub fn split_into_sections(&self, text: &str) -> Vec<Section> {
        let mut starts: Vec<(usize, String)> = self
            .heading
            .captures_iter(text)
            .filter_map(|cap| {
                let whole = cap.get(0)?;
                let title = cap.get(1)?;
                Some((whole.start(), title.as_str().to_string()))
            })
            .collect();
        starts.sort_by_key(|(start, _)| *start);

        let mut sections = Vec::with_capacity(starts.len() + 1);
        sections.push(Section {
            title: FULL_DOCUMENT_TITLE.to_string(),
            content: text.to_string(),
            start_index: 0,
            end_index: text.len(),
        });

        for (i, (start, title)) in starts.iter().enumerate() {
            let end = starts.get(i + 1).map_or(text.len(), |(next, _)| *next);
            sections.push(Section {
                title: title.clone(),
                content: text[*start..end].to_string(),
                start_index: *start,
                end_index: end,
            });
        }

        sections
    }
}

/// Clean extracted text.
///
/// Standalone page-number lines are dropped, `|` becomes `I`, and each run of
/// whitespace collapses to a single character: `\n` if the run contained a
/// line break, otherwise a space. Digits are never rewritten.
pub fn clean_text(text: &str) -> String {
    let kept: Vec<&str> = text
        .lines()
        .filter(|line| !is_page_number_line(line))
        .collect();
    let joined = kept.join("\n").replace('|', "I");

    let mut out = String::with_capacity(joined.len());
    let mut pending: Option<char> = None;
    for c in joined.chars() {
        if c.is_whitespace() {
            let separator = if c == '\n' || c == '\r' { '\n' } else { ' ' };
            pending = match pending {
                Some('\n') => Some('\n'),
                _ => Some(separator),
            };
            continue;
        }
        if let Some(separator) = pending.take() {
            if !out.is_empty() {
                out.push(separator);
            }
        }
        out.push(c);
    }
    out
}

fn is_page_number_line(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit())
}
