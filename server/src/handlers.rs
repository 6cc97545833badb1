//! Request handlers.

use axum::Json;
use axum::extract::{Multipart, State};
use insurspeak_core::{
    AnswerSource, DocumentInput, DocumentMetadata, ExplainedTerm, InsuranceType, PersonalContext,
    QuestionCategory, Section,
};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::info;

use crate::AppState;
use crate::error::ApiError;
use crate::form::FormData;

#[derive(Debug, Serialize)]
pub struct ProcessDocumentResponse {
    pub original_text: String,
    pub terms: Vec<ExplainedTerm>,
    pub insurance_type: InsuranceType,
    pub sections: Vec<Section>,
    pub metadata: DocumentMetadata,
}

#[derive(Debug, Serialize)]
pub struct AskQuestionResponse {
    pub question: String,
    pub answer: String,
    pub question_type: QuestionCategory,
    pub personal_context: PersonalContext,
    pub answer_source: AnswerSource,
    pub related_terms: Vec<String>,
}

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to InsurSpeak API" }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `POST /process-document`: fields `file`, `text_content`, `insurance_type`.
pub async fn process_document(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ProcessDocumentResponse>, ApiError> {
    let mut form = FormData::read(multipart).await?;
    let insurance_type = InsuranceType::parse(&form.require_text("insurance_type")?);

    let input = match form.take_bytes("file") {
        Some(bytes) => Some(DocumentInput::Pdf(bytes.to_vec())),
        None => form.take_text("text_content")?.map(DocumentInput::Text),
    };

    let processed = state
        .pipeline
        .process_document(input, insurance_type)
        .await?;
    info!(
        "process-document: {} terms, {} sections",
        processed.terms.len(),
        processed.document.sections.len()
    );

    let document = processed.document;
    Ok(Json(ProcessDocumentResponse {
        original_text: document.text,
        terms: processed.terms,
        insurance_type: document.insurance_type,
        sections: document.sections,
        metadata: document.metadata,
    }))
}

/// `POST /ask-question`: fields `question`, `document_text`, `insurance_type`.
pub async fn ask_question(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AskQuestionResponse>, ApiError> {
    let mut form = FormData::read(multipart).await?;
    let question = form.require_text("question")?;
    let document_text = form.require_text("document_text")?;
    let insurance_type = InsuranceType::parse(&form.require_text("insurance_type")?);

    let answered = state
        .pipeline
        .answer_question(&question, &document_text, insurance_type)
        .await?;

    Ok(Json(AskQuestionResponse {
        question: answered.question.text,
        answer: answered.answer.text,
        question_type: answered.question.category,
        personal_context: answered.question.personal_context,
        answer_source: answered.answer.source,
        related_terms: answered.related_terms,
    }))
}
