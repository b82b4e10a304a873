use crate::embeddings::Embedder;
use crate::traits::VectorIndex;
use crate::{Passage, RetrievalError, SearchQuery};
use tracing::debug;

/// Embeds the question and runs a thresholded similarity search.
pub struct Retriever<E, V> {
    embedder: E,
    index: V,
}

impl<E, V> Retriever<E, V>
where
    E: Embedder + Send + Sync,
    V: VectorIndex + Send + Sync,
{
    pub fn new(embedder: E, index: V) -> Self {
        Self { embedder, index }
    }

    /// Passages come back in index order. Anything under `score_threshold`
    /// or past `top_k` is dropped, and ranks are renumbered from 1.
    pub async fn search(
        &self,
        query: &str,
        top_k: usize,
        score_threshold: f64,
    ) -> Result<Vec<Passage>, RetrievalError> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let query_vector = self.embedder.embed(query).await?;
        let request = SearchQuery {
            text: query.to_string(),
            top_k,
            score_threshold,
        };

        let hits = self.index.search_vector(&query_vector, &request).await?;
        let returned = hits.len();

        let passages: Vec<Passage> = hits
            .into_iter()
            .filter(|passage| passage.similarity >= score_threshold)
            .take(top_k)
            .enumerate()
            .map(|(position, passage)| Passage {
                rank: position + 1,
                ..passage
            })
            .collect();

        debug!(
            returned,
            kept = passages.len(),
            top_k,
            score_threshold,
            "vector search finished"
        );

        Ok(passages)
    }
}
