#[cfg(test)]
mod tests;

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::VisionflowError;
use crate::config::EmbeddingConfig;
use crate::http::{
    CallError, DEFAULT_RETRY_ATTEMPTS, DEFAULT_TIMEOUT_SECONDS, agent_with_timeout, read_body,
    send_with_retry,
};

/// The one capability the pipeline needs from the embedding service. Kept as
/// a trait so the orchestrator can be driven by an in-process fake in tests.
pub trait Embedder {
    fn embed(&self, text: &str) -> crate::Result<Vec<f32>>;
}

/// Client for an Azure OpenAI style embedding deployment. Constructed once
/// per run from resolved configuration; one POST per `embed` call.
#[derive(Debug, Clone)]
pub struct EmbeddingClient {
    url: Url,
    api_key: String,
    agent: ureq::Agent,
    retry_attempts: u32,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    data: Vec<EmbedData>,
}

#[derive(Debug, Deserialize)]
struct EmbedData {
    embedding: Vec<f32>,
}

impl EmbeddingClient {
    #[inline]
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let mut url = config
            .endpoint
            .join(&format!(
                "openai/deployments/{}/embeddings",
                config.deployment
            ))
            .context("Failed to build embedding URL from endpoint")?;
        url.set_query(Some(&format!("api-version={}", config.api_version)));

        Ok(Self {
            url,
            api_key: config.api_key.clone(),
            agent: agent_with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)),
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
        })
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = agent_with_timeout(timeout);
        self
    }

    #[inline]
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts;
        self
    }

    fn request_embedding(&self, text: &str) -> Result<Vec<f32>> {
        let request_json = serde_json::to_string(&EmbedRequest { input: text })
            .context("Failed to serialize embedding request")?;

        let response_text = send_with_retry(self.retry_attempts, || {
            self.agent
                .post(self.url.as_str())
                .header("Content-Type", "application/json")
                .header("api-key", &self.api_key)
                .send(&request_json)
                .map_err(CallError::from)
                .and_then(read_body)
        })
        .context("Embedding request failed")?;

        let response: EmbedResponse = serde_json::from_str(&response_text)
            .context("Failed to parse embedding response")?;

        let embedding = response
            .data
            .into_iter()
            .next()
            .map(|data| data.embedding)
            .context("Embedding response contained no data")?;

        debug!("Received embedding with {} dimensions", embedding.len());
        Ok(embedding)
    }
}

impl Embedder for EmbeddingClient {
    #[inline]
    fn embed(&self, text: &str) -> crate::Result<Vec<f32>> {
        debug!("Requesting embedding for text of {} chars", text.chars().count());

        self.request_embedding(text)
            .map_err(|e| VisionflowError::Service(format!("{e:#}")))
    }
}
