use crate::{GenerationError, Passage, RetrievalError, SearchQuery};
use async_trait::async_trait;

#[async_trait]
pub trait VectorIndex {
    /// Returns passages ordered by descending similarity, each at or above
    /// `query.score_threshold`, at most `query.top_k` of them.
    async fn search_vector(
        &self,
        query_vector: &[f32],
        query: &SearchQuery,
    ) -> Result<Vec<Passage>, RetrievalError>;
}

#[async_trait]
pub trait TextGenerator {
    async fn generate(&self, prompt: &str, temperature: f64) -> Result<String, GenerationError>;

    fn model_identifier(&self) -> &str;
}
