use crate::http::join_endpoint;
use crate::RetrievalError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_EMBEDDING_MODEL: &str = "all-minilm";

#[async_trait]
pub trait Embedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError>;
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}

/// Embeds query text through an Ollama-style `/api/embeddings` endpoint.
pub struct HttpEmbedder {
    endpoint: Url,
    model: String,
    client: Client,
}

impl HttpEmbedder {
    pub fn new(base_url: &str, model: impl Into<String>) -> Result<Self, RetrievalError> {
        let endpoint = join_endpoint(base_url, "api/embeddings")?;
        Ok(Self {
            endpoint,
            model: model.into(),
            client: Client::new(),
        })
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&EmbeddingRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RetrievalError::Embedding(format!(
                "embedding endpoint {} returned {}",
                self.endpoint,
                response.status()
            )));
        }

        let body = response.text().await?;
        parse_embedding(&body)
    }
}

fn parse_embedding(body: &str) -> Result<Vec<f32>, RetrievalError> {
    let parsed: EmbeddingResponse = serde_json::from_str(body)?;
    if parsed.embedding.is_empty() {
        return Err(RetrievalError::Embedding(
            "embedding response had no vector".to_string(),
        ));
    }
    Ok(parsed.embedding)
}
