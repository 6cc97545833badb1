//! # InsurSpeak HTTP API
//!
//! | route | method | body |
//! |---|---|---|
//! | `/` | GET | |
//! | `/health` | GET | |
//! | `/process-document` | POST | multipart: `file`, `text_content`, `insurance_type` |
//! | `/ask-question` | POST | multipart: `question`, `document_text`, `insurance_type` |

pub mod config;
pub mod error;
pub mod form;
pub mod handlers;
pub mod telemetry;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use insurspeak_core::PolicyPipeline;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::warn;

pub use config::{ConfigError, ServerConfig};
pub use error::ApiError;

/// Shared, read-only request state.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<PolicyPipeline>,
}

impl AppState {
    pub fn new(pipeline: PolicyPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/process-document", post(handlers::process_document))
        .route("/ask-question", post(handlers::ask_question))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors_layer(&config.allowed_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin {origin:?}: {e}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
