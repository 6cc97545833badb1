//! Question classification and personal-context extraction.

use std::fmt;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// What kind of answer a question is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionCategory {
    Recommendation,
    Coverage,
    Comparison,
    Definition,
    General,
}

impl QuestionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recommendation => "recommendation",
            Self::Coverage => "coverage",
            Self::Comparison => "comparison",
            Self::Definition => "definition",
            Self::General => "general",
        }
    }
}

impl fmt::Display for QuestionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phrase groups checked in order; the first group with a hit wins.
const CATEGORY_PHRASES: &[(QuestionCategory, &[&str])] = &[
    (
        QuestionCategory::Recommendation,
        &[
            "should i",
            "better for me",
            "recommend",
            "best for my",
            "good for my situation",
        ],
    ),
    (
        QuestionCategory::Coverage,
        &["cover", "covered", "coverage", "pay for", "reimburse"],
    ),
    (
        QuestionCategory::Comparison,
        &["compare", "difference", "better", "versus", "vs"],
    ),
    (
        QuestionCategory::Definition,
        &["what is", "what does", "mean", "define", "explain"],
    ),
];

/// Facts about the asker mentioned in the question.
///
/// Fields that were not detected are `None` and left out of serialized output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub married: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_children: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_health_conditions: Option<bool>,
}

impl PersonalContext {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Detected fields as `key: value` pairs, in declaration order.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if let Some(age) = self.age {
            fields.push(("age", age.to_string()));
        }
        if let Some(married) = self.married {
            fields.push(("married", married.to_string()));
        }
        if let Some(has_children) = self.has_children {
            fields.push(("has_children", has_children.to_string()));
        }
        if let Some(has_health_conditions) = self.has_health_conditions {
            fields.push(("has_health_conditions", has_health_conditions.to_string()));
        }
        fields
    }
}

/// A classified question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    pub category: QuestionCategory,
    pub personal_context: PersonalContext,
}

/// Classifies questions and extracts personal context from them.
pub struct QuestionClassifier {
    age_stated: Regex,
    age_years_old: Regex,
    married: Regex,
    children: Regex,
    health_conditions: Regex,
}

impl QuestionClassifier {
    pub fn new() -> Result<Self> {
        Ok(Self {
            age_stated: Regex::new(r"I am (\d+)")?,
            age_years_old: Regex::new(r"(\d+) years old")?,
            married: Regex::new(r"(?i)married|spouse|wife|husband")?,
            children: Regex::new(r"(?i)kids|children|child|baby|infant")?,
            health_conditions: Regex::new(r"(?i)chronic|condition|diabetes|asthma|heart|cancer")?,
        })
    }

    /// Classify a question and extract its personal context.
    pub fn analyze(&self, text: &str) -> Question {
        Question {
            text: text.to_string(),
            category: classify(text),
            personal_context: self.personal_context(text),
        }
    }

    pub fn personal_context(&self, text: &str) -> PersonalContext {
        let age = self
            .age_stated
            .captures(text)
            .or_else(|| self.age_years_old.captures(text))
            .and_then(|cap| cap.get(1))
            .and_then(|m| m.as_str().parse().ok());

        let flag = |re: &Regex| re.is_match(text).then_some(true);

        PersonalContext {
            age,
            married: flag(&self.married),
            has_children: flag(&self.children),
            has_health_conditions: flag(&self.health_conditions),
        }
    }
}

/// Category of a question; [`QuestionCategory::General`] when nothing matches.
pub fn classify(text: &str) -> QuestionCategory {
    let lower = text.to_lowercase();
    CATEGORY_PHRASES
        .iter()
        .find(|(_, phrases)| phrases.iter().any(|p| lower.contains(p)))
        .map_or(QuestionCategory::General, |(category, _)| *category)
}
