//! Answers to free-form questions about a policy.
//!
//! Answers come from a single generation call. When the call fails for any
//! reason, a canned answer keyed on topic words in the question is returned
//! instead, so a question always gets an answer.

use std::fmt::Write as _;
use std::sync::Arc;

use insurspeak_llm::{CompletionProvider, CompletionRequest};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::glossary::InsuranceType;
use crate::question::{Question, QuestionCategory};
use crate::text::truncate_chars;

/// Longest excerpt of the document included in the prompt.
pub const MAX_DOCUMENT_CHARS: usize = 4000;

const SYSTEM_PROMPT: &str = "You are an insurance expert assistant that explains complex insurance concepts in simple terms.";

/// Which path produced an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    Generated,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub source: AnswerSource,
}

/// Answers classified questions against a document.
pub struct QuestionAnswerer {
    provider: Arc<dyn CompletionProvider>,
}

impl QuestionAnswerer {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    pub async fn answer(
        &self,
        question: &Question,
        document_text: &str,
        insurance_type: InsuranceType,
    ) -> Answer {
        let request =
            CompletionRequest::new(answer_prompt(question, document_text, insurance_type))
                .with_system(SYSTEM_PROMPT)
                .with_temperature(0.5)
                .with_max_tokens(500);

        match self.provider.complete(request).await {
            Ok(response) if !response.text.trim().is_empty() => {
                info!(
                    "Answered {} question with {}",
                    question.category,
                    self.provider.name()
                );
                Answer {
                    text: response.text,
                    source: AnswerSource::Generated,
                }
            }
            Ok(_) => {
                warn!("Empty answer from {}, using canned answer", self.provider.name());
                canned(&question.text, insurance_type)
            }
            Err(e) => {
                warn!("Answer generation failed, using canned answer: {e}");
                canned(&question.text, insurance_type)
            }
        }
    }
}

fn canned(question: &str, insurance_type: InsuranceType) -> Answer {
    Answer {
        text: canned_answer(question, insurance_type),
        source: AnswerSource::Fallback,
    }
}

/// A topic rule: any of `keywords` in the lowercased question selects `answer`.
struct TopicRule {
    keywords: &'static [&'static str],
    answer: &'static str,
}

const COVERAGE_KEYWORDS: &[&str] = &["cover", "coverage"];

/// Sub-rules consulted when the question is about coverage.
const COVERAGE_RULES: &[TopicRule] = &[
    TopicRule {
        keywords: &["prescription", "medication"],
        answer: "Your policy covers prescription medications with the following copayments: $15 for generic medications, $40 for preferred brand medications, $75 for non-preferred brand medications, and 30% coinsurance (up to $250 maximum) for specialty medications.",
    },
    TopicRule {
        keywords: &["specialist"],
        answer: "Specialist visits are covered with a $50 copayment per visit.",
    },
    TopicRule {
        keywords: &["preventive", "prevention"],
        answer: "Preventive care services are covered at 100% with no deductible. This includes routine check-ups, vaccinations, and screenings as recommended by standard medical guidelines.",
    },
];

const GENERAL_COVERAGE_ANSWER: &str = "Your policy provides coverage for hospitalization (80% after deductible), emergency services ($250 copay, waived if admitted), physician services, and prescription drugs, subject to the specific limitations and exclusions outlined in the policy.";

const DEDUCTIBLE_RULE: TopicRule = TopicRule {
    keywords: &["deductible"],
    answer: "According to your policy, your annual deductible is $1,500 for an individual and $3,000 for a family. This means you'll need to pay this amount out of pocket before your insurance coverage begins to pay for eligible medical expenses.",
};

const COPAY_RULE: TopicRule = TopicRule {
    keywords: &["copay", "co-pay"],
    answer: "Based on your policy, you have different copayments depending on the service: $30 for primary care visits, $50 for specialist visits, $250 for emergency room visits (waived if admitted), and varying copays for prescription medications ($15 for generic, $40 for preferred brands, and $75 for non-preferred brands).",
};

/// Rules checked after coverage, in order.
const LATER_RULES: &[TopicRule] = &[
    TopicRule {
        keywords: &["out of pocket", "out-of-pocket", "maximum"],
        answer: "Your policy has an out-of-pocket maximum of $6,000 for an individual and $12,000 for a family. Once you reach this amount in a calendar year, your eligible medical expenses will be covered at 100% for the remainder of the year. This maximum includes your deductibles, copayments, and coinsurance.",
    },
    TopicRule {
        keywords: &["exclusion", "not covered"],
        answer: "Your policy does not cover: 1) Cosmetic procedures unless medically necessary for correcting functional defects, 2) Experimental or investigational treatments, 3) Preexisting conditions during the 12-month waiting period, 4) Services not deemed medically necessary, and 5) Out-of-network services without prior authorization (except in emergencies).",
    },
    TopicRule {
        keywords: &["emergency"],
        answer: "Emergency room visits have a $250 copayment, which is waived if you're admitted to the hospital. Ambulance services are covered at 80% after your deductible for medically necessary transportation.",
    },
];

impl TopicRule {
    fn matches(&self, lower: &str) -> bool {
        self.keywords.iter().any(|k| lower.contains(k))
    }
}

/// Deterministic answer used when generation is unavailable.
pub fn canned_answer(question: &str, insurance_type: InsuranceType) -> String {
    let lower = question.to_lowercase();

    for rule in [&DEDUCTIBLE_RULE, &COPAY_RULE] {
        if rule.matches(&lower) {
            return rule.answer.to_string();
        }
    }

    if COVERAGE_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return COVERAGE_RULES
            .iter()
            .find(|rule| rule.matches(&lower))
            .map_or(GENERAL_COVERAGE_ANSWER, |rule| rule.answer)
            .to_string();
    }

    if let Some(rule) = LATER_RULES.iter().find(|rule| rule.matches(&lower)) {
        return rule.answer.to_string();
    }

    format!(
        "Based on your {insurance_type} insurance policy, I would need more specific information to answer your question accurately. Could you please provide more details or ask a more specific question about your coverage, deductibles, copayments, or exclusions?"
    )
}

fn category_instructions(category: QuestionCategory) -> &'static str {
    match category {
        QuestionCategory::Recommendation => {
            "This appears to be a personalized recommendation question. Please:\n\
             1. Consider the user's individual situation as implied in their question\n\
             2. Explain how various factors (age, health status, family situation, etc.) might affect this decision\n\
             3. Highlight the pros and cons of different options\n\
             4. Suggest what questions they should ask themselves to make the best decision\n\
             5. End with a balanced recommendation but emphasize they should consult with a licensed insurance advisor\n"
        }
        QuestionCategory::Coverage => {
            "This appears to be a coverage question. Please:\n\
             1. Clearly state what the policy seems to cover and what it doesn't\n\
             2. Highlight any conditions, limitations, or exclusions that apply\n\
             3. Explain any relevant deductibles, copays, or out-of-pocket costs\n\
             4. Mention if there are any circumstances where coverage might change\n\
             5. Note if there are any ambiguities in the policy that would require clarification\n"
        }
        QuestionCategory::Comparison => {
            "This appears to be a comparison question. Please:\n\
             1. Clearly outline the key differences between the options mentioned\n\
             2. Compare costs, coverage, limitations, and benefits objectively\n\
             3. Highlight scenarios where one option might be better than another\n\
             4. Consider different user circumstances in your comparison\n\
             5. Provide a balanced assessment rather than strongly favoring one option\n"
        }
        QuestionCategory::Definition => {
            "This appears to be a question about defining a term or concept. Please:\n\
             1. Provide a clear, simple definition in everyday language\n\
             2. Explain why this term matters in the context of insurance\n\
             3. Give a practical example of how this concept works in real life\n\
             4. Note any variations in how this term might be used across different policies\n"
        }
        QuestionCategory::General => {
            "This appears to be a general question about the policy. Please:\n\
             1. Answer using only what the policy text supports\n\
             2. Point to the part of the policy the answer relies on\n\
             3. Say so plainly when the policy text does not settle the question\n"
        }
    }
}

fn answer_prompt(question: &Question, document_text: &str, insurance_type: InsuranceType) -> String {
    let mut prompt = format!(
        "You are an insurance expert assistant helping a user understand their insurance policy. \
         Your goal is to explain complex insurance concepts in simple terms.\n\
         \n\
         User's insurance policy type: {insurance_type}\n\
         \n\
         Relevant policy text:\n\
         {policy}\n\
         \n\
         User question: {text}\n\
         \n",
        policy = truncate_chars(document_text, MAX_DOCUMENT_CHARS),
        text = question.text,
    );

    let context = question.personal_context.fields();
    if !context.is_empty() {
        let pairs: Vec<String> = context
            .iter()
            .map(|(key, value)| format!("{key}: {value}"))
            .collect();
        let _ = writeln!(prompt, "User's personal context:\n{}\n", pairs.join(", "));
    }

    prompt.push_str(category_instructions(question.category));
    prompt.push_str(
        "\nProvide a clear, straightforward answer that:\n\
         1. Directly addresses the user's question\n\
         2. Uses simple language (aim for 8th-grade reading level)\n\
         3. Explains any technical terms you need to use\n\
         4. Does NOT provide legal advice or definitive coverage determinations\n\
         5. Includes appropriate disclaimers when the answer requires interpretation\n\
         \n\
         If the answer cannot be determined from the policy text provided, explain what additional information would be needed.\n",
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::{PersonalContext, QuestionClassifier};
    use async_trait::async_trait;
    use insurspeak_llm::{CompletionResponse, LlmError};
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    struct RecordingProvider {
        reply: std::result::Result<String, u16>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl RecordingProvider {
        fn new(reply: std::result::Result<String, u16>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CompletionProvider for RecordingProvider {
        fn name(&self) -> &str {
            "recording"
        }

        fn is_available(&self) -> bool {
            true
        }

        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> insurspeak_llm::Result<CompletionResponse> {
            self.requests.lock().unwrap().push(request);
            match &self.reply {
                Ok(text) => Ok(CompletionResponse {
                    text: text.clone(),
                    model: "recording".to_string(),
                    tokens_used: Some(42),
                }),
                Err(status) => Err(LlmError::ApiRequest {
                    status: *status,
                    message: "upstream unavailable".to_string(),
                }),
            }
        }
    }

    fn question(text: &str) -> Question {
        QuestionClassifier::new().unwrap().analyze(text)
    }

    #[tokio::test]
    async fn test_generated_answer_returned_verbatim() {
        let provider = RecordingProvider::new(Ok("Your copay is $30.".to_string()));
        let answerer = QuestionAnswerer::new(Arc::clone(&provider) as Arc<dyn CompletionProvider>);

        let answer = answerer
            .answer(
                &question("I am 52 and married. Should I raise my deductible?"),
                "The deductible is $1,000.",
                InsuranceType::Health,
            )
            .await;

        assert_eq!(
            answer,
            Answer {
                text: "Your copay is $30.".to_string(),
                source: AnswerSource::Generated,
            }
        );

        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.temperature, 0.5);
        assert_eq!(request.max_tokens, 500);
        assert!(request.prompt.contains("User's insurance policy type: health"));
        assert!(request.prompt.contains("The deductible is $1,000."));
        assert!(request.prompt.contains("age: 52, married: true"));
        assert!(request.prompt.contains("personalized recommendation question"));
    }

    #[tokio::test]
    async fn test_unreachable_service_gives_canned_copay_answer() {
        let answerer = QuestionAnswerer::new(RecordingProvider::new(Err(503)));

        let first = answerer
            .answer(&question("How much is my copay?"), "", InsuranceType::Health)
            .await;
        let second = answerer
            .answer(&question("How much is my copay?"), "", InsuranceType::Health)
            .await;

        assert_eq!(first.source, AnswerSource::Fallback);
        assert!(first.text.starts_with("Based on your policy, you have different copayments"));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_blank_generation_uses_canned_answer() {
        let answerer = QuestionAnswerer::new(RecordingProvider::new(Ok("  ".to_string())));
        let answer = answerer
            .answer(&question("Is the ER covered?"), "", InsuranceType::Health)
            .await;

        assert_eq!(answer.source, AnswerSource::Fallback);
        assert_eq!(answer.text, GENERAL_COVERAGE_ANSWER);
    }

    #[test]
    fn test_document_excerpt_is_capped() {
        let document = "x".repeat(MAX_DOCUMENT_CHARS + 500);
        let prompt = answer_prompt(
            &Question {
                text: "What is a rider?".to_string(),
                category: QuestionCategory::Definition,
                personal_context: PersonalContext::default(),
            },
            &document,
            InsuranceType::Life,
        );

        assert!(prompt.contains(&"x".repeat(MAX_DOCUMENT_CHARS)));
        assert!(!prompt.contains(&"x".repeat(MAX_DOCUMENT_CHARS + 1)));
        assert!(!prompt.contains("User's personal context"));
        assert!(prompt.contains("defining a term or concept"));
    }

    #[test]
    fn test_canned_topic_order() {
        let health = InsuranceType::Health;

        // Deductible outranks copay.
        assert_eq!(
            canned_answer("Does my copay count toward the deductible?", health),
            DEDUCTIBLE_RULE.answer
        );
        assert_eq!(
            canned_answer("Do you cover my medication?", health),
            COVERAGE_RULES[0].answer
        );
        assert_eq!(
            canned_answer("Is a specialist covered?", health),
            COVERAGE_RULES[1].answer
        );
        assert_eq!(
            canned_answer("What coverage exists for prevention?", health),
            COVERAGE_RULES[2].answer
        );
        assert_eq!(
            canned_answer("What is my out-of-pocket limit?", health),
            LATER_RULES[0].answer
        );
        assert_eq!(
            canned_answer("Which exclusion applies here?", health),
            LATER_RULES[1].answer
        );
        assert_eq!(
            canned_answer("What about an emergency?", health),
            LATER_RULES[2].answer
        );
    }

    #[test]
    fn test_canned_default_names_insurance_type() {
        let answer = canned_answer("When is my renewal date?", InsuranceType::Disability);
        assert!(answer.starts_with("Based on your disability insurance policy"));
    }
}
