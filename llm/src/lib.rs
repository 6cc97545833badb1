//! # LLM
//!
//! This crate provides the narrow text-generation capability used by
//! InsurSpeak: submit a prompt, receive text.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Completion System                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  CompletionRequest ──► CompletionProvider ──► CompletionResponse│
//! │                              │                                  │
//! │                              ▼                                  │
//! │                   OpenAIProvider / test stubs                   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Callers treat every [`LlmError`] as recoverable and fall back to canned
//! text, so providers never panic and never retry.

pub mod error;
pub mod provider;

pub use error::{LlmError, Result};
pub use provider::{
    CompletionProvider, CompletionRequest, CompletionResponse, DEFAULT_BASE_URL, DEFAULT_MODEL,
    OpenAIProvider,
};
