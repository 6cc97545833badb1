//! Document and question pipelines.

use std::sync::Arc;

use insurspeak_llm::{CompletionProvider, OpenAIProvider};
use serde::Serialize;
use tracing::info;

use crate::answer::{Answer, QuestionAnswerer};
use crate::document::{Document, DocumentProcessor};
use crate::error::{CoreError, Result};
use crate::explanation::{ExplainedTerm, ExplanationGenerator};
use crate::extraction::{DocumentInput, TextExtractor};
use crate::glossary::{Glossary, InsuranceType};
use crate::question::{Question, QuestionClassifier};
use crate::terms::TermIdentifier;

/// A processed document with every identified term explained.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedDocument {
    pub document: Document,
    pub terms: Vec<ExplainedTerm>,
}

/// An answered question.
#[derive(Debug, Clone, Serialize)]
pub struct AnsweredQuestion {
    pub question: Question,
    pub answer: Answer,

    /// Vocabulary terms the question mentions.
    pub related_terms: Vec<String>,
}

/// Runs the document and question pipelines.
///
/// All components are read-only after construction, so one pipeline is
/// shared by every request.
pub struct PolicyPipeline {
    extractor: Arc<TextExtractor>,
    processor: DocumentProcessor,
    identifier: TermIdentifier,
    explainer: ExplanationGenerator,
    classifier: QuestionClassifier,
    answerer: QuestionAnswerer,
}

impl PolicyPipeline {
    pub fn builder() -> PolicyPipelineBuilder {
        PolicyPipelineBuilder::new()
    }

    /// Extract, clean, section, identify and explain.
    ///
    /// Missing input fails with [`CoreError::Input`] before any extraction
    /// is attempted.
    pub async fn process_document(
        &self,
        input: Option<DocumentInput>,
        insurance_type: InsuranceType,
    ) -> Result<ProcessedDocument> {
        let input = match input {
            Some(DocumentInput::Text(text)) if text.trim().is_empty() => None,
            other => other,
        }
        .ok_or_else(|| {
            CoreError::Input("Either file or text_content must be provided".to_string())
        })?;

        let raw = match input {
            DocumentInput::Text(text) => text,
            pdf @ DocumentInput::Pdf(_) => {
                let extractor = Arc::clone(&self.extractor);
                tokio::task::spawn_blocking(move || extractor.extract(pdf))
                    .await
                    .map_err(|e| CoreError::Extraction(format!("extraction task failed: {e}")))??
            }
        };

        let document = self.processor.process(&raw, insurance_type);
        let matches = self.identifier.identify(&document.text, insurance_type);
        let terms = self.explainer.explain_all(matches).await;

        info!(
            "Processed {insurance_type} document: {} words, {} sections, {} terms",
            document.metadata.word_count,
            document.metadata.section_count,
            terms.len()
        );

        Ok(ProcessedDocument { document, terms })
    }

    /// Classify and answer a question about a document.
    pub async fn answer_question(
        &self,
        question: &str,
        document_text: &str,
        insurance_type: InsuranceType,
    ) -> Result<AnsweredQuestion> {
        if question.trim().is_empty() {
            return Err(CoreError::Input("question must not be empty".to_string()));
        }

        let question = self.classifier.analyze(question);
        let related_terms = self.identifier.related_terms(&question.text, insurance_type);
        let answer = self
            .answerer
            .answer(&question, document_text, insurance_type)
            .await;

        info!(
            "Answered {} question ({:?}), {} related terms",
            question.category,
            answer.source,
            related_terms.len()
        );

        Ok(AnsweredQuestion {
            question,
            answer,
            related_terms,
        })
    }
}

/// Builder for [`PolicyPipeline`].
pub struct PolicyPipelineBuilder {
    glossary: Option<Arc<Glossary>>,
    provider: Option<Arc<dyn CompletionProvider>>,
    extractor: Option<TextExtractor>,
}

impl PolicyPipelineBuilder {
    pub fn new() -> Self {
        Self {
            glossary: None,
            provider: None,
            extractor: None,
        }
    }

    /// Use a specific glossary instead of the built-in one.
    pub fn with_glossary(mut self, glossary: Arc<Glossary>) -> Self {
        self.glossary = Some(glossary);
        self
    }

    /// Use a specific completion provider instead of OpenAI from the environment.
    pub fn with_provider(mut self, provider: Arc<dyn CompletionProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_extractor(mut self, extractor: TextExtractor) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn build(self) -> Result<PolicyPipeline> {
        let glossary = match self.glossary {
            Some(glossary) => glossary,
            None => Arc::new(Glossary::builtin()?),
        };
        let provider: Arc<dyn CompletionProvider> = match self.provider {
            Some(provider) => provider,
            None => Arc::new(OpenAIProvider::new()),
        };

        if !provider.is_available() {
            info!(
                "{} provider not configured; explanations and answers will use canned text",
                provider.name()
            );
        }

        Ok(PolicyPipeline {
            extractor: Arc::new(self.extractor.unwrap_or_default()),
            processor: DocumentProcessor::new()?,
            identifier: TermIdentifier::new(&glossary)?,
            explainer: ExplanationGenerator::new(Arc::clone(&glossary), Arc::clone(&provider)),
            classifier: QuestionClassifier::new()?,
            answerer: QuestionAnswerer::new(provider),
        })
    }
}

impl Default for PolicyPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
