use crate::http::join_endpoint;
use crate::traits::VectorIndex;
use crate::{ConfigError, Passage, RetrievalError, SearchQuery};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use url::Url;

const BACKEND: &str = "qdrant";
const FILENAME_KEY: &str = "filename";
const CHUNK_TEXT_KEY: &str = "chunk_text";
const UNKNOWN_SOURCE: &str = "unknown";

pub struct QdrantStore {
    endpoint: String,
    collection: String,
    client: Client,
}

impl QdrantStore {
    pub fn new(
        endpoint: impl Into<String>,
        collection: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let collection = collection.into();
        if collection.trim().is_empty() {
            return Err(ConfigError::Empty("collection"));
        }

        Ok(Self {
            endpoint: endpoint.into(),
            collection,
            client: Client::new(),
        })
    }

    fn collection_url(&self, suffix: &str) -> Result<Url, RetrievalError> {
        let path = format!("collections/{}{}", self.collection, suffix);
        Ok(join_endpoint(&self.endpoint, &path)?)
    }

    /// Fails when the collection is missing or the server is unreachable.
    pub async fn ensure_collection(&self) -> Result<(), RetrievalError> {
        let response = self.client.get(self.collection_url("")?).send().await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(RetrievalError::NotReady(format!(
                "collection {} does not exist at {}",
                self.collection, self.endpoint
            ))),
            status => Err(RetrievalError::BackendResponse {
                backend: BACKEND.to_string(),
                details: status.to_string(),
            }),
        }
    }
}

#[async_trait]
impl VectorIndex for QdrantStore {
    async fn search_vector(
        &self,
        query_vector: &[f32],
        query: &SearchQuery,
    ) -> Result<Vec<Passage>, RetrievalError> {
        if query_vector.is_empty() {
            return Err(RetrievalError::Request("query vector is empty".to_string()));
        }

        let response = self
            .client
            .post(self.collection_url("/points/search")?)
            .json(&search_body(query_vector, query))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RetrievalError::BackendResponse {
                backend: BACKEND.to_string(),
                details: response.status().to_string(),
            });
        }

        let parsed: Value = response.json().await?;
        parse_search_response(&parsed)
    }
}

/// The index applies `score_threshold` and `limit` itself.
fn search_body(query_vector: &[f32], query: &SearchQuery) -> Value {
    json!({
        "vector": query_vector,
        "limit": query.top_k,
        "score_threshold": query.score_threshold,
        "with_payload": true,
        "with_vector": false,
    })
}

fn parse_search_response(parsed: &Value) -> Result<Vec<Passage>, RetrievalError> {
    let hits = parsed
        .pointer("/result")
        .and_then(Value::as_array)
        .ok_or_else(|| RetrievalError::BackendResponse {
            backend: BACKEND.to_string(),
            details: "search response has no result array".to_string(),
        })?;

    let empty = Map::new();
    hits.iter()
        .enumerate()
        .map(|(position, hit)| {
            let similarity = hit
                .pointer("/score")
                .and_then(Value::as_f64)
                .ok_or_else(|| RetrievalError::BackendResponse {
                    backend: BACKEND.to_string(),
                    details: format!("search hit {} has no score", position + 1),
                })?;
            let payload = hit
                .pointer("/payload")
                .and_then(Value::as_object)
                .unwrap_or(&empty);

            let mut metadata = flatten_payload(payload);
            let content = metadata.remove(CHUNK_TEXT_KEY).unwrap_or_default();
            let source_filename = metadata
                .remove(FILENAME_KEY)
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());

            Ok(Passage {
                content,
                similarity,
                source_filename,
                structured_metadata: metadata,
                rank: position + 1,
            })
        })
        .collect()
}

/// Payload values become text; nulls are dropped and nested values keep
/// their JSON rendering.
fn flatten_payload(payload: &Map<String, Value>) -> BTreeMap<String, String> {
    payload
        .iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::Null => return None,
                Value::String(text) => text.clone(),
                Value::Bool(flag) => flag.to_string(),
                Value::Number(number) => number.to_string(),
                other => other.to_string(),
            };
            Some((key.clone(), text))
        })
        .collect()
}
