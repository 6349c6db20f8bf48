//! Embedding client
//!
//! Remote text-to-vector conversion via an OpenAI-compatible `/embeddings`
//! endpoint (Together AI by default). One outbound call per invocation; no
//! caching and no retries, so identical text embedded twice costs two calls.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};

/// Converts free text into a fixed-dimension vector
///
/// Implement this to swap in another provider or a mock.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Embedding request envelope: `{input, model}`
#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
    model: &'a str,
}

/// Embedding response envelope: `{data: [{embedding}]}`
#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Together AI embedding client
pub struct TogetherEmbeddings {
    client: Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl TogetherEmbeddings {
    /// Create a new embedding client
    pub fn new(config: EmbeddingConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(TogetherEmbeddings {
            client,
            api_key: config.api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model,
        })
    }
}

#[async_trait]
impl EmbeddingClient for TogetherEmbeddings {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&EmbeddingRequest {
                input: text,
                model: &self.model,
            })
            .send()
            .await
            .map_err(|e| Error::Embedding(format!("embedding request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text: String = response.text().await.unwrap_or_default();
            return Err(Error::Embedding(format!(
                "embedding request failed with status {}: {}",
                status, text
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::Embedding(format!("failed to parse embedding response: {}", e)))?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| Error::Embedding("empty embedding response".to_string()))
    }
}
