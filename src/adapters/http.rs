use crate::domain::model::MemoryQueryResult;
use crate::domain::ports::SemanticTextMemory;
use crate::utils::error::{MemoryPluginError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Client for a memory service speaking JSON over HTTP.
///
/// Records live under `{base}/collections/{collection}`; search is a POST to
/// `.../search` and save is a PUT to `.../records/{id}`.
#[derive(Debug, Clone)]
pub struct HttpMemoryStore {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    limit: usize,
    min_relevance_score: f64,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<MemoryQueryResult>,
}

#[derive(Debug, Serialize)]
struct SaveRequest<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    additional_metadata: Option<&'a str>,
}

impl HttpMemoryStore {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::builder(base_url).build()
    }

    pub fn builder(base_url: &str) -> HttpMemoryStoreBuilder {
        HttpMemoryStoreBuilder {
            base_url: base_url.to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn collection_url(&self, collection: &str, tail: &[&str]) -> Result<Url> {
        // `path_segments_mut` resolves dot segments, which would move the
        // request outside the collection.
        if let Some(segment) = std::iter::once(&collection)
            .chain(tail)
            .find(|s| matches!(**s, "." | ".."))
        {
            return Err(MemoryPluginError::invalid_argument(format!(
                "'{}' is not a valid collection or record name",
                segment
            )));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| MemoryPluginError::ConfigError {
                message: format!("Memory endpoint cannot be a base URL: {}", self.base_url),
            })?
            .pop_if_empty()
            .push("collections")
            .push(collection)
            .extend(tail);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        tracing::debug!("Memory store answered {}: {}", status, message);
        Err(MemoryPluginError::MemoryStoreError {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl SemanticTextMemory for HttpMemoryStore {
    async fn search(
        &self,
        collection: &str,
        query: &str,
        limit: usize,
        min_relevance_score: f64,
    ) -> Result<Vec<MemoryQueryResult>> {
        let url = self.collection_url(collection, &["search"])?;
        tracing::debug!("POST {}", url);

        let body = SearchRequest {
            query,
            limit,
            min_relevance_score,
        };
        let response = self
            .authorize(self.client.post(url))
            .json(&body)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let bytes = response.bytes().await?;
        let parsed: SearchResponse = serde_json::from_slice(&bytes)?;
        Ok(parsed.results)
    }

    async fn save_information(
        &self,
        collection: &str,
        text: &str,
        id: &str,
        description: Option<&str>,
        additional_metadata: Option<&str>,
    ) -> Result<()> {
        let url = self.collection_url(collection, &["records", id])?;
        tracing::debug!("PUT {}", url);

        let body = SaveRequest {
            text,
            description,
            additional_metadata,
        };
        let response = self
            .authorize(self.client.put(url))
            .json(&body)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct HttpMemoryStoreBuilder {
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpMemoryStoreBuilder {
    pub fn api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.is_empty());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<HttpMemoryStore> {
        crate::utils::validation::validate_url("memory.endpoint", &self.base_url)?;
        let base_url = Url::parse(&self.base_url).map_err(|e| MemoryPluginError::ConfigError {
            message: format!("Invalid memory endpoint '{}': {}", self.base_url, e),
        })?;
        let client = Client::builder().timeout(self.timeout).build()?;

        Ok(HttpMemoryStore {
            client,
            base_url,
            api_key: self.api_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_collection_url_encodes_segments() {
        let store = HttpMemoryStore::new("http://localhost:8080/api/").unwrap();

        let url = store
            .collection_url("my notes", &["records", "a/b"])
            .unwrap();

        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/collections/my%20notes/records/a%2Fb"
        );
    }

    #[test]
    fn test_collection_url_rejects_dot_segments() {
        let store = HttpMemoryStore::new("http://localhost:8080/api").unwrap();

        let err = store
            .collection_url("generic", &["records", ".."])
            .unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(store.collection_url("..", &["search"]).is_err());
        assert!(store.collection_url(".", &["search"]).is_err());

        let url = store.collection_url("generic", &["records", "..."]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/collections/generic/records/..."
        );
    }

    #[tokio::test]
    async fn test_dot_key_never_reaches_other_paths() {
        let server = MockServer::start();
        let any_request = server.mock(|when, then| {
            when.path_contains("/");
            then.status(200);
        });

        let store = HttpMemoryStore::new(&server.base_url()).unwrap();
        let err = store
            .save_information("generic", "text", "..", None, None)
            .await
            .unwrap_err();

        assert!(err.is_invalid_argument());
        any_request.assert_hits(0);
    }

    #[test]
    fn test_builder_rejects_invalid_endpoint() {
        assert!(HttpMemoryStore::new("not a url").is_err());
        assert!(HttpMemoryStore::new("ftp://memory.local").is_err());
    }

    #[tokio::test]
    async fn test_search_posts_query_and_parses_results() {
        let server = MockServer::start();
        let search_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/collections/generic/search")
                .json_body(serde_json::json!({
                    "query": "capital of France",
                    "limit": 2,
                    "min_relevance_score": 0.75
                }));
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "results": [
                        {"id": "countryInfo1", "text": "Paris", "relevance": 0.92},
                        {"id": "countryInfo2", "text": "Lyon", "relevance": 0.80}
                    ]
                }));
        });

        let store = HttpMemoryStore::new(&server.base_url()).unwrap();
        let results = store
            .search("generic", "capital of France", 2, 0.75)
            .await
            .unwrap();

        search_mock.assert();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text.as_deref(), Some("Paris"));
        assert_eq!(results[1].id, "countryInfo2");
    }

    #[tokio::test]
    async fn test_search_sends_bearer_token() {
        let server = MockServer::start();
        let search_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/collections/generic/search")
                .header("authorization", "Bearer secret-token");
            then.status(200).json_body(serde_json::json!({"results": []}));
        });

        let store = HttpMemoryStore::builder(&server.base_url())
            .api_key(Some("secret-token".to_string()))
            .build()
            .unwrap();
        let results = store.search("generic", "q", 1, 0.5).await.unwrap();

        search_mock.assert();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_save_puts_record() {
        let server = MockServer::start();
        let save_mock = server.mock(|when, then| {
            when.method(PUT)
                .path("/collections/generic/records/countryInfo1")
                .json_body(serde_json::json!({"text": "the capital of France is Paris"}));
            then.status(204);
        });

        let store = HttpMemoryStore::new(&server.base_url()).unwrap();
        store
            .save_information(
                "generic",
                "the capital of France is Paris",
                "countryInfo1",
                None,
                None,
            )
            .await
            .unwrap();

        save_mock.assert();
    }

    #[tokio::test]
    async fn test_error_status_maps_to_store_error() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/collections/missing/search");
            then.status(404).body("collection not found");
        });

        let store = HttpMemoryStore::new(&server.base_url()).unwrap();
        let err = store.search("missing", "q", 1, 0.5).await.unwrap_err();

        mock.assert();
        match err {
            MemoryPluginError::MemoryStoreError { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "collection not found");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_search_body_is_serialization_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/collections/generic/search");
            then.status(200).body("not json");
        });

        let store = HttpMemoryStore::new(&server.base_url()).unwrap();
        let err = store.search("generic", "q", 1, 0.5).await.unwrap_err();

        assert!(matches!(err, MemoryPluginError::SerializationError(_)));
    }
}
