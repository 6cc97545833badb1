//! Static insurance vocabulary and canned explanations.
//!
//! The glossary is immutable configuration data: it is deserialized once at
//! process start and shared read-only by the term identifier, the explanation
//! generator and the question answerer.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;

const BUILTIN_GLOSSARY: &str = include_str!("../data/glossary.json");

/// Kind of insurance policy a document describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsuranceType {
    Health,
    Life,
    Disability,
    Other,
}

impl InsuranceType {
    /// Parse a user-supplied label; unknown labels map to [`InsuranceType::Other`].
    pub fn parse(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "health" => Self::Health,
            "life" => Self::Life,
            "disability" => Self::Disability,
            _ => Self::Other,
        }
    }

    /// Lowercase label used in prompts and responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::Life => "life",
            Self::Disability => "disability",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for InsuranceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category attached to an identified term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermCategory {
    Payment,
    Policy,
    Coverage,
    Benefit,
    Process,
    Medical,
    Legal,
    General,
    Percentage,
    Monetary,
    TimePeriod,
    LegalClause,
}

impl TermCategory {
    /// Snake-case label, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Payment => "payment",
            Self::Policy => "policy",
            Self::Coverage => "coverage",
            Self::Benefit => "benefit",
            Self::Process => "process",
            Self::Medical => "medical",
            Self::Legal => "legal",
            Self::General => "general",
            Self::Percentage => "percentage",
            Self::Monetary => "monetary",
            Self::TimePeriod => "time_period",
            Self::LegalClause => "legal_clause",
        }
    }
}

impl fmt::Display for TermCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A vocabulary entry and the insurance type it is limited to, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyEntry {
    pub term: String,
    pub category: TermCategory,
    pub scope: Option<InsuranceType>,
}

/// Insurance vocabulary, explanations and implications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Glossary {
    /// Term → category, shared across insurance types.
    common_terms: HashMap<String, TermCategory>,

    /// Bare terms that only apply to one insurance type.
    #[serde(default)]
    type_terms: HashMap<InsuranceType, Vec<String>>,

    /// Term → canned plain-language explanation.
    #[serde(default)]
    explanations: HashMap<String, String>,

    /// Term → insurance type → implication sentence.
    #[serde(default)]
    implications: HashMap<String, HashMap<InsuranceType, String>>,

    /// Implication used when no specific entry exists.
    default_implication: String,
}

impl Glossary {
    /// The glossary compiled into the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_GLOSSARY)
    }

    /// Parse a glossary from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let glossary: Self = serde_json::from_str(json)?;
        Ok(glossary.normalized())
    }

    /// Load a glossary from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let glossary = Self::from_json(&json)?;
        info!(
            "Loaded glossary from {} ({} entries)",
            path.display(),
            glossary.vocabulary().len()
        );
        Ok(glossary)
    }

    /// Lowercase and trim every key so lookups can use the lowercased term.
    fn normalized(self) -> Self {
        let key = |term: String| term.trim().to_lowercase();
        Self {
            common_terms: self
                .common_terms
                .into_iter()
                .map(|(term, category)| (key(term), category))
                .collect(),
            type_terms: self
                .type_terms
                .into_iter()
                .map(|(kind, terms)| (kind, terms.into_iter().map(key).collect()))
                .collect(),
            explanations: self
                .explanations
                .into_iter()
                .map(|(term, text)| (key(term), text))
                .collect(),
            implications: self
                .implications
                .into_iter()
                .map(|(term, by_type)| (key(term), by_type))
                .collect(),
            default_implication: self.default_implication,
        }
    }

    /// Every vocabulary entry across all insurance types.
    ///
    /// Supplemental terms take their category from the common table when
    /// listed there, otherwise [`TermCategory::General`]. Entries are ordered
    /// longest first so multi-word terms precede the shorter terms they contain.
    pub fn vocabulary(&self) -> Vec<VocabularyEntry> {
        let mut entries: Vec<VocabularyEntry> = self
            .common_terms
            .iter()
            .map(|(term, category)| VocabularyEntry {
                term: term.clone(),
                category: *category,
                scope: None,
            })
            .collect();

        for (kind, terms) in &self.type_terms {
            for term in terms {
                if self.common_terms.contains_key(term) {
                    continue;
                }
                entries.push(VocabularyEntry {
                    term: term.clone(),
                    category: TermCategory::General,
                    scope: Some(*kind),
                });
            }
        }

        entries.sort_by(|a, b| {
            b.term
                .len()
                .cmp(&a.term.len())
                .then_with(|| a.term.cmp(&b.term))
        });
        entries.dedup_by(|a, b| a.term == b.term && a.scope == b.scope);
        entries
    }

    /// Canned explanation for a term.
    pub fn explanation(&self, term: &str) -> Option<&str> {
        self.explanations
            .get(&term.to_lowercase())
            .map(String::as_str)
    }

    /// Implication for a term under an insurance type, or the generic default.
    pub fn implication(&self, term: &str, insurance_type: InsuranceType) -> &str {
        self.implications
            .get(&term.to_lowercase())
            .and_then(|by_type| by_type.get(&insurance_type))
            .map_or(self.default_implication.as_str(), String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Category of an unscoped vocabulary entry.
    fn common_category(glossary: &Glossary, term: &str) -> Option<TermCategory> {
        glossary
            .vocabulary()
            .into_iter()
            .find(|entry| entry.term == term && entry.scope.is_none())
            .map(|entry| entry.category)
    }

    #[test]
    fn test_builtin_glossary_parses() {
        let glossary = Glossary::builtin().unwrap();

        assert_eq!(
            common_category(&glossary, "premium"),
            Some(TermCategory::Payment)
        );
        assert_eq!(
            common_category(&glossary, "exclusion"),
            Some(TermCategory::Coverage)
        );
        assert!(glossary.explanation("deductible").is_some());
        assert!(glossary.explanation("formulary").is_none());
    }

    #[test]
    fn test_insurance_type_parse() {
        assert_eq!(InsuranceType::parse("Health"), InsuranceType::Health);
        assert_eq!(InsuranceType::parse(" life "), InsuranceType::Life);
        assert_eq!(
            InsuranceType::parse("DISABILITY"),
            InsuranceType::Disability
        );
        assert_eq!(InsuranceType::parse("auto"), InsuranceType::Other);
    }

    #[test]
    fn test_vocabulary_longest_first() {
        let glossary = Glossary::builtin().unwrap();
        let vocabulary = glossary.vocabulary();

        let lengths: Vec<usize> = vocabulary.iter().map(|e| e.term.len()).collect();
        assert!(lengths.windows(2).all(|w| w[0] >= w[1]));

        let formulary = vocabulary.iter().find(|e| e.term == "formulary").unwrap();
        assert_eq!(formulary.category, TermCategory::General);
        assert_eq!(formulary.scope, Some(InsuranceType::Health));
    }

    #[test]
    fn test_implication_lookup() {
        let glossary = Glossary::builtin().unwrap();

        assert_eq!(
            glossary.implication("deductible", InsuranceType::Life),
            "Life insurance typically doesn't have deductibles."
        );
        assert_eq!(
            glossary.implication("copay", InsuranceType::Health),
            "This may affect your coverage or costs. Check your specific policy details."
        );
        assert_eq!(
            glossary.implication("premium", InsuranceType::Other),
            "This may affect your coverage or costs. Check your specific policy details."
        );
    }

    #[test]
    fn test_custom_glossary_keys_are_normalized() {
        let glossary = Glossary::from_json(
            r#"{
                "common_terms": { "Stop-Loss": "payment" },
                "explanations": { " Stop-Loss ": "A cap on your costs." },
                "default_implication": "Check your policy."
            }"#,
        )
        .unwrap();

        assert_eq!(
            common_category(&glossary, "stop-loss"),
            Some(TermCategory::Payment)
        );
        assert_eq!(
            glossary.explanation("STOP-LOSS"),
            Some("A cap on your costs.")
        );
        assert_eq!(
            glossary.implication("stop-loss", InsuranceType::Health),
            "Check your policy."
        );
    }

    #[test]
    fn test_invalid_glossary_is_error() {
        assert!(Glossary::from_json("{ \"common_terms\": 3 }").is_err());
    }
}
