//! # InsurSpeak core
//!
//! Turns insurance policy documents into plain language.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Document pipeline                        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  PDF / text ──► TextExtractor ──► DocumentProcessor              │
//! │                                        │                        │
//! │                                        ▼                        │
//! │                 TermIdentifier ──► ExplanationGenerator          │
//! │                                        │                        │
//! │                       Glossary ────────┤                        │
//! │                                        ▼                        │
//! │                               CompletionProvider                │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                        Question pipeline                        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  question ──► QuestionClassifier ──► QuestionAnswerer            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use insurspeak_core::{DocumentInput, InsuranceType, PolicyPipeline};
//!
//! let pipeline = PolicyPipeline::builder().build()?;
//!
//! let processed = pipeline
//!     .process_document(
//!         Some(DocumentInput::Text("Your deductible is $500.".into())),
//!         InsuranceType::Health,
//!     )
//!     .await?;
//!
//! let answered = pipeline
//!     .answer_question("What is my copay?", &processed.document.text, InsuranceType::Health)
//!     .await?;
//! ```

pub mod answer;
pub mod document;
pub mod error;
pub mod explanation;
pub mod extraction;
pub mod glossary;
pub mod pipeline;
pub mod question;
pub mod terms;
mod text;

pub use answer::{Answer, AnswerSource, QuestionAnswerer, canned_answer};
pub use document::{Document, DocumentMetadata, DocumentProcessor, Section, clean_text};
pub use error::{CoreError, Result};
pub use explanation::{ExplainedTerm, ExplanationGenerator, Provenance};
pub use extraction::{DocumentInput, PageExtractor, TextExtractor};
pub use glossary::{Glossary, InsuranceType, TermCategory};
pub use pipeline::{AnsweredQuestion, PolicyPipeline, PolicyPipelineBuilder, ProcessedDocument};
pub use question::{PersonalContext, Question, QuestionCategory, QuestionClassifier, classify};
pub use terms::{TermIdentifier, TermMatch};
