//! Vector index client
//!
//! Defines the `VectorIndex` seam (upsert-by-id, top-k similarity query
//! with optional metadata filter) that any vector database can implement,
//! plus the Pinecone data-plane implementation used in production.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::PineconeConfig;
use crate::error::{Error, Result};

/// Metadata attached to every stored vector and returned by queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryMetadata {
    #[serde(default)]
    pub project: String,
    /// Memory type, e.g. "note"
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
}

/// A single record upserted into the index
#[derive(Debug, Clone, Serialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: MemoryMetadata,
}

/// External vector store supporting nearest-neighbor search
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert-or-replace records by id
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<()>;

    /// Return the metadata of the `top_k` most similar records, in the
    /// order the index ranks them (best-similarity-first). Matches without
    /// metadata are skipped.
    async fn query(
        &self,
        vector: Vec<f32>,
        top_k: usize,
        filter: Option<Value>,
    ) -> Result<Vec<MemoryMetadata>>;
}

/// Pinecone upsert request: `{vectors: [{id, values, metadata}]}`
#[derive(Serialize)]
struct UpsertRequest {
    vectors: Vec<VectorRecord>,
}

/// Pinecone query request (camelCase wire form)
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest {
    vector: Vec<f32>,
    top_k: usize,
    include_metadata: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<Value>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    metadata: Option<MemoryMetadata>,
}

/// Pinecone data-plane client for a single index
///
/// Constructed once at startup from config; requests carry the `Api-Key`
/// header against the index host.
pub struct PineconeIndex {
    client: Client,
    api_key: SecretString,
    host: String,
}

impl PineconeIndex {
    /// Create a new index client
    pub fn new(config: PineconeConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(PineconeIndex {
            client,
            api_key: config.api_key,
            host: config.host.trim_end_matches('/').to_string(),
        })
    }

    async fn post_json<B: Serialize>(&self, route: &str, body: &B) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(format!("{}{}", self.host, route))
            .header("Api-Key", self.api_key.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Index(format!("index request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text: String = response.text().await.unwrap_or_default();
            return Err(Error::Index(format!(
                "index request failed with status {}: {}",
                status, text
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<()> {
        self.post_json("/vectors/upsert", &UpsertRequest { vectors: records })
            .await?;
        Ok(())
    }

    async fn query(
        &self,
        vector: Vec<f32>,
        top_k: usize,
        filter: Option<Value>,
    ) -> Result<Vec<MemoryMetadata>> {
        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
            filter,
        };

        let parsed: QueryResponse = self
            .post_json("/query", &request)
            .await?
            .json()
            .await
            .map_err(|e| Error::Index(format!("failed to parse query response: {}", e)))?;

        Ok(parsed
            .matches
            .into_iter()
            .filter_map(|m| m.metadata)
            .collect())
    }
}
