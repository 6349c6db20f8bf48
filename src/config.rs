//! Configuration from environment variables
//!
//! Everything is loaded once at process start; handlers never touch the
//! environment. API keys are wrapped in `SecretString` so they stay out of
//! debug output.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::{Error, Result};

/// Default timeout for outbound requests
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default embedding endpoint base (OpenAI-compatible)
const DEFAULT_EMBEDDING_BASE_URL: &str = "https://api.together.xyz/v1";

/// Default embedding model
const DEFAULT_EMBEDDING_MODEL: &str = "togethercomputer/m2-bert-80M-8k-retrieval";

/// Embedding provider configuration
#[derive(Debug)]
pub struct EmbeddingConfig {
    /// Bearer token for the embedding API
    pub api_key: SecretString,
    /// Base URL, e.g. `https://api.together.xyz/v1`
    pub base_url: String,
    /// Embedding model identifier
    pub model: String,
    /// Request timeout
    pub timeout: Duration,
}

/// Pinecone index configuration
#[derive(Debug)]
pub struct PineconeConfig {
    /// Pinecone API key
    pub api_key: SecretString,
    /// Pinecone environment, e.g. `us-east1-gcp`
    pub environment: String,
    /// Index name
    pub index: String,
    /// Data-plane host URL for the index
    pub host: String,
    /// Request timeout
    pub timeout: Duration,
}

/// Top-level service configuration
#[derive(Debug)]
pub struct Config {
    pub embedding: EmbeddingConfig,
    pub pinecone: PineconeConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required: `TOGETHER_API_KEY`, `PINECONE_API_KEY`, `PINECONE_ENV`,
    /// `PINECONE_INDEX`. Everything else has a default.
    pub fn from_env() -> Result<Self> {
        let timeout = Duration::from_secs(
            std::env::var("MEMVAULT_HTTP_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        );

        let embedding = EmbeddingConfig {
            api_key: SecretString::from(require("TOGETHER_API_KEY")?),
            base_url: std::env::var("TOGETHER_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_EMBEDDING_BASE_URL.to_string()),
            model: std::env::var("TOGETHER_EMBEDDING_MODEL")
                .unwrap_or_else(|_| DEFAULT_EMBEDDING_MODEL.to_string()),
            timeout,
        };

        let environment = require("PINECONE_ENV")?;
        let index = require("PINECONE_INDEX")?;
        let host = std::env::var("PINECONE_INDEX_HOST")
            .unwrap_or_else(|_| index_host(&index, &environment));

        let pinecone = PineconeConfig {
            api_key: SecretString::from(require("PINECONE_API_KEY")?),
            environment,
            index,
            host,
            timeout,
        };

        Ok(Config { embedding, pinecone })
    }
}

/// Read a required environment variable; empty counts as unset
fn require(name: &'static str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::Config(format!("{} is not set", name))),
    }
}

/// Derive the data-plane host from index name and environment
fn index_host(index: &str, environment: &str) -> String {
    format!("https://{}.svc.{}.pinecone.io", index, environment)
}
