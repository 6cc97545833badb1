//! Plain-language explanations for identified terms.
//!
//! Each term is explained by exactly one of three paths:
//! 1. the glossary's canned explanation (`lookup_table`)
//! 2. a generation call returning a small JSON object (`generated`)
//! 3. a templated sentence when the call fails (`fallback`)

use std::sync::Arc;

use insurspeak_llm::{CompletionProvider, CompletionRequest};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{CoreError, Result};
use crate::glossary::Glossary;
use crate::terms::TermMatch;
use crate::text::truncate_chars;

/// Longest raw response kept when the structured result cannot be parsed.
pub const MAX_RAW_EXPLANATION_CHARS: usize = 150;

const SYSTEM_PROMPT: &str =
    "You are an insurance expert that explains complex terms in simple language.";

const UNPARSED_IMPLICATIONS: &str = "Please consult your insurance provider for specific details about how this affects your policy.";

const FALLBACK_IMPLICATIONS: &str =
    "You may want to ask your insurance provider for clarification.";

/// Which path produced an explanation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    LookupTable,
    Generated,
    Fallback,
}

/// A term with its explanation attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainedTerm {
    #[serde(flatten)]
    pub term: TermMatch,

    pub explanation: String,

    pub implications: String,

    #[serde(rename = "source")]
    pub provenance: Provenance,
}

/// The two-field object the generation service is asked to return.
#[derive(Debug, Deserialize)]
struct GeneratedExplanation {
    explanation: String,
    implications: String,
}

/// Attaches explanations to identified terms.
pub struct ExplanationGenerator {
    glossary: Arc<Glossary>,
    provider: Arc<dyn CompletionProvider>,
}

impl ExplanationGenerator {
    pub fn new(glossary: Arc<Glossary>, provider: Arc<dyn CompletionProvider>) -> Self {
        Self { glossary, provider }
    }

    /// Explain every term, in order.
    pub async fn explain_all(&self, terms: Vec<TermMatch>) -> Vec<ExplainedTerm> {
        let mut explained = Vec::with_capacity(terms.len());
        for term in terms {
            explained.push(self.explain(term).await);
        }
        explained
    }

    /// Explain a single term.
    pub async fn explain(&self, term: TermMatch) -> ExplainedTerm {
        if let Some(explanation) = self.glossary.explanation(&term.term) {
            let implications = self
                .glossary
                .implication(&term.term, term.insurance_type)
                .to_string();
            return ExplainedTerm {
                explanation: explanation.to_string(),
                implications,
                provenance: Provenance::LookupTable,
                term,
            };
        }

        let request = CompletionRequest::new(explanation_prompt(&term))
            .with_system(SYSTEM_PROMPT)
            .with_temperature(0.3)
            .with_max_tokens(300);

        let text = match self.provider.complete(request).await {
            Ok(response) if !response.text.trim().is_empty() => response.text,
            Ok(_) => {
                warn!("Empty explanation for '{}', using fallback", term.term);
                return fallback(term);
            }
            Err(e) => {
                warn!(
                    "Explanation call for '{}' failed, using fallback: {e}",
                    term.term
                );
                return fallback(term);
            }
        };

        match parse_generated(&text) {
            Ok(generated) => {
                debug!("Generated explanation for '{}'", term.term);
                ExplainedTerm {
                    explanation: generated.explanation,
                    implications: generated.implications,
                    provenance: Provenance::Generated,
                    term,
                }
            }
            Err(e) => {
                warn!("Keeping raw text for '{}': {e}", term.term);
                ExplainedTerm {
                    explanation: truncate_chars(text.trim(), MAX_RAW_EXPLANATION_CHARS)
                        .to_string(),
                    implications: UNPARSED_IMPLICATIONS.to_string(),
                    provenance: Provenance::Generated,
                    term,
                }
            }
        }
    }
}

fn fallback(term: TermMatch) -> ExplainedTerm {
    ExplainedTerm {
        explanation: format!(
            "This is insurance terminology related to {}.",
            term.category
        ),
        implications: FALLBACK_IMPLICATIONS.to_string(),
        provenance: Provenance::Fallback,
        term,
    }
}

fn explanation_prompt(term: &TermMatch) -> String {
    format!(
        "You are an expert insurance translator helping people understand complex insurance terms.\n\
         \n\
         Please explain the following insurance term in simple language (8th-grade reading level):\n\
         \n\
         Term: {term}\n\
         Context: {context}\n\
         Insurance Type: {insurance_type}\n\
         Category: {category}\n\
         \n\
         Provide:\n\
         1. A clear, simple explanation of what this term means\n\
         2. Any practical implications this might have for the policyholder\n\
         \n\
         Format your response as a JSON object with the following structure:\n\
         {{\n  \"explanation\": \"your simple explanation here\",\n  \"implications\": \"practical implications for the policyholder\"\n}}",
        term = term.term,
        context = term.context,
        insurance_type = term.insurance_type,
        category = term.category,
    )
}

/// Parse the outermost `{ ... }` of a response into the two-field object.
fn parse_generated(text: &str) -> Result<GeneratedExplanation> {
    let (start, end) = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => (start, end),
        _ => {
            return Err(CoreError::MalformedResponse(
                "no JSON object in response".to_string(),
            ));
        }
    };

    let generated: GeneratedExplanation = serde_json::from_str(&text[start..=end])
        .map_err(|e| CoreError::MalformedResponse(e.to_string()))?;

    if generated.explanation.trim().is_empty() || generated.implications.trim().is_empty() {
        return Err(CoreError::MalformedResponse(
            "empty explanation or implications".to_string(),
        ));
    }
    Ok(generated)
}
