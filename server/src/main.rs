use std::sync::Arc;

use anyhow::Context;
use insurspeak_core::{Glossary, PolicyPipeline};
use insurspeak_llm::OpenAIProvider;
use insurspeak_server::telemetry::init_tracing;
use insurspeak_server::{AppState, ServerConfig, build_router};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("info");

    let config = ServerConfig::from_env().context("failed to load configuration")?;

    let glossary = match &config.glossary_path {
        Some(path) => Glossary::from_json_file(path)
            .with_context(|| format!("failed to load glossary from {}", path.display()))?,
        None => Glossary::builtin()?,
    };

    let provider = match &config.openai_api_key {
        Some(key) => OpenAIProvider::new().with_api_key(key),
        None => OpenAIProvider::new().without_api_key(),
    }
    .with_base_url(&config.openai_base_url)
    .with_model(&config.openai_model)
    .with_timeout(config.llm_timeout)?;

    let pipeline = PolicyPipeline::builder()
        .with_glossary(Arc::new(glossary))
        .with_provider(Arc::new(provider))
        .build()?;

    let app = build_router(AppState::new(pipeline), &config);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr.as_str())
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "InsurSpeak API listening");

    axum::serve(listener, app).await?;
    Ok(())
}
