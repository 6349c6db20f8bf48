//! Memory service - store and recall over an embedding client and a vector index
//!
//! Both operations follow the same path: validate required fields, embed the
//! text, then hit the index. Validation happens before any external call, so
//! a bad request never costs an embedding.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::embedding::EmbeddingClient;
use crate::error::{Error, Result};
use crate::index::{MemoryMetadata, VectorIndex, VectorRecord};

/// Number of matches a recall returns
const RECALL_TOP_K: usize = 5;

/// Memory type recorded when the caller does not supply one
const DEFAULT_TYPE: &str = "note";

/// Request body for `POST /memory/store`
///
/// Fields are optional so that absent values reach validation (and a 400)
/// instead of a deserialization rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreRequest {
    pub text: Option<String>,
    pub project: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub title: Option<String>,
}

/// Acknowledgment returned by a successful store
#[derive(Debug, Clone, Serialize)]
pub struct StoreResponse {
    pub status: &'static str,
    pub project: String,
    pub title: String,
}

/// Request body for `POST /memory/recall`
#[derive(Debug, Clone, Deserialize)]
pub struct RecallRequest {
    pub query: Option<String>,
    pub project: Option<String>,
}

/// Matches returned by a recall, best-similarity-first
#[derive(Debug, Clone, Serialize)]
pub struct RecallResponse {
    pub results: Vec<MemoryMetadata>,
}

/// Stateless store/recall service
///
/// Holds the embedding client and index handle constructed once at startup
/// and injected here; requests share them without any lazy initialization.
pub struct MemoryService {
    embeddings: Arc<dyn EmbeddingClient>,
    index: Arc<dyn VectorIndex>,
}

impl MemoryService {
    /// Create a new memory service
    pub fn new(embeddings: Arc<dyn EmbeddingClient>, index: Arc<dyn VectorIndex>) -> Self {
        MemoryService { embeddings, index }
    }

    /// Embed a text memory and upsert it with its metadata.
    ///
    /// `type` defaults to "note" and `title` to "" when omitted. The record
    /// id is time-based; uniqueness is not guaranteed for same-millisecond
    /// writes.
    pub async fn store(&self, request: StoreRequest) -> Result<StoreResponse> {
        let text = require(request.text, "text")?;
        let project = require(request.project, "project")?;
        let kind = request.kind.unwrap_or_else(|| DEFAULT_TYPE.to_string());
        let title = request.title.unwrap_or_default();

        let values = self.embeddings.embed(&text).await?;

        let record = VectorRecord {
            id: memory_id(),
            values,
            metadata: MemoryMetadata {
                project: project.clone(),
                kind,
                title: title.clone(),
                text,
            },
        };
        let id = record.id.clone();

        self.index.upsert(vec![record]).await?;

        info!("Memory stored: id={}, project={}", id, project);

        Ok(StoreResponse {
            status: "stored",
            project,
            title,
        })
    }

    /// Embed the query and return the top matches' metadata.
    ///
    /// With `project` supplied the index query carries an equality filter;
    /// zero matches is a valid outcome, not an error.
    pub async fn recall(&self, request: RecallRequest) -> Result<RecallResponse> {
        let query = require(request.query, "query")?;

        let vector = self.embeddings.embed(&query).await?;

        let filter = request
            .project
            .filter(|p| !p.is_empty())
            .map(|project| json!({ "project": project }));
        let results = self.index.query(vector, RECALL_TOP_K, filter).await?;

        info!("Memory recall returned {} matches", results.len());

        Ok(RecallResponse { results })
    }
}

/// Reject absent or whitespace-only required fields
fn require(value: Option<String>, field: &'static str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::MissingField(field)),
    }
}

/// Time-based record id, e.g. `mem-1722945600000`
fn memory_id() -> String {
    format!("mem-{}", Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct MockEmbeddings {
        calls: AtomicUsize,
        fail: bool,
    }

    impl MockEmbeddings {
        fn new() -> Self {
            MockEmbeddings {
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            MockEmbeddings {
                calls: AtomicUsize::new(0),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl EmbeddingClient for MockEmbeddings {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(Error::Embedding("provider exploded".to_string()))
            } else {
                Ok(vec![0.5, 0.25])
            }
        }
    }

    #[derive(Default)]
    struct MockIndex {
        upserts: Mutex<Vec<Vec<VectorRecord>>>,
        queries: Mutex<Vec<(usize, Option<Value>)>>,
        matches: Vec<MemoryMetadata>,
    }

    #[async_trait]
    impl VectorIndex for MockIndex {
        async fn upsert(&self, records: Vec<VectorRecord>) -> Result<()> {
            self.upserts.lock().unwrap().push(records);
            Ok(())
        }

        async fn query(
            &self,
            _vector: Vec<f32>,
            top_k: usize,
            filter: Option<Value>,
        ) -> Result<Vec<MemoryMetadata>> {
            self.queries.lock().unwrap().push((top_k, filter));
            Ok(self.matches.clone())
        }
    }

    fn service(embeddings: MockEmbeddings, index: Arc<MockIndex>) -> MemoryService {
        MemoryService::new(Arc::new(embeddings), index)
    }

    fn store_request(text: Option<&str>, project: Option<&str>) -> StoreRequest {
        StoreRequest {
            text: text.map(String::from),
            project: project.map(String::from),
            kind: None,
            title: None,
        }
    }

    #[tokio::test]
    async fn test_store_missing_text_makes_no_external_calls() {
        let embeddings = MockEmbeddings::new();
        let index = Arc::new(MockIndex::default());
        let svc = MemoryService::new(Arc::new(embeddings), index.clone());

        let err = svc
            .store(store_request(None, Some("demo")))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingField("text")));
        assert!(index.upserts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_blank_project_is_missing() {
        let index = Arc::new(MockIndex::default());
        let svc = service(MockEmbeddings::new(), index.clone());

        let err = svc
            .store(store_request(Some("remember"), Some("   ")))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingField("project")));
        assert!(index.upserts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_defaults_type_and_title() {
        let index = Arc::new(MockIndex::default());
        let svc = service(MockEmbeddings::new(), index.clone());

        let response = svc
            .store(store_request(Some("remember this"), Some("demo")))
            .await
            .unwrap();
        assert_eq!(response.status, "stored");
        assert_eq!(response.project, "demo");
        assert_eq!(response.title, "");

        let upserts = index.upserts.lock().unwrap();
        assert_eq!(upserts.len(), 1);
        let record = &upserts[0][0];
        assert!(record.id.starts_with("mem-"));
        assert_eq!(record.values, vec![0.5, 0.25]);
        assert_eq!(record.metadata.kind, "note");
        assert_eq!(record.metadata.title, "");
        assert_eq!(record.metadata.text, "remember this");
    }

    #[tokio::test]
    async fn test_store_embeds_exactly_once() {
        let embeddings = Arc::new(MockEmbeddings::new());
        let index = Arc::new(MockIndex::default());
        let svc = MemoryService::new(embeddings.clone(), index.clone());

        svc.store(store_request(Some("remember"), Some("demo")))
            .await
            .unwrap();
        assert_eq!(embeddings.calls.load(Ordering::SeqCst), 1);
        assert_eq!(index.upserts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_store_embedding_failure_skips_upsert() {
        let index = Arc::new(MockIndex::default());
        let svc = service(MockEmbeddings::failing(), index.clone());

        let err = svc
            .store(store_request(Some("remember"), Some("demo")))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("provider exploded"));
        assert!(index.upserts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_recall_missing_query_makes_no_external_calls() {
        let embeddings = Arc::new(MockEmbeddings::new());
        let index = Arc::new(MockIndex::default());
        let svc = MemoryService::new(embeddings.clone(), index.clone());

        let err = svc
            .recall(RecallRequest {
                query: None,
                project: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingField("query")));
        assert_eq!(embeddings.calls.load(Ordering::SeqCst), 0);
        assert!(index.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_recall_without_project_omits_filter() {
        let index = Arc::new(MockIndex::default());
        let svc = service(MockEmbeddings::new(), index.clone());

        svc.recall(RecallRequest {
            query: Some("what did I say".to_string()),
            project: None,
        })
        .await
        .unwrap();

        let queries = index.queries.lock().unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].0, RECALL_TOP_K);
        assert!(queries[0].1.is_none());
    }

    #[tokio::test]
    async fn test_recall_with_project_sets_equality_filter() {
        let index = Arc::new(MockIndex::default());
        let svc = service(MockEmbeddings::new(), index.clone());

        svc.recall(RecallRequest {
            query: Some("what did I say".to_string()),
            project: Some("demo".to_string()),
        })
        .await
        .unwrap();

        let queries = index.queries.lock().unwrap();
        assert_eq!(queries[0].1, Some(json!({"project": "demo"})));
    }

    #[tokio::test]
    async fn test_recall_empty_results_is_not_an_error() {
        let index = Arc::new(MockIndex::default());
        let svc = service(MockEmbeddings::new(), index.clone());

        let response = svc
            .recall(RecallRequest {
                query: Some("anything".to_string()),
                project: None,
            })
            .await
            .unwrap();
        assert!(response.results.is_empty());
    }

    #[tokio::test]
    async fn test_recall_returns_matches_in_index_order() {
        let first = MemoryMetadata {
            project: "demo".to_string(),
            kind: "note".to_string(),
            title: "a".to_string(),
            text: "first".to_string(),
        };
        let second = MemoryMetadata {
            title: "b".to_string(),
            text: "second".to_string(),
            ..first.clone()
        };
        let index = Arc::new(MockIndex {
            matches: vec![first.clone(), second.clone()],
            ..MockIndex::default()
        });
        let svc = service(MockEmbeddings::new(), index);

        let response = svc
            .recall(RecallRequest {
                query: Some("anything".to_string()),
                project: None,
            })
            .await
            .unwrap();
        assert_eq!(response.results, vec![first, second]);
    }
}
