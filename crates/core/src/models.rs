use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// One retrieved unit of document content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Passage {
    /// Chunk text as stored by ingestion. May be empty when the index
    /// payload only carries one of the alternative text fields.
    pub content: String,
    pub similarity: f64,
    pub source_filename: String,
    pub structured_metadata: BTreeMap<String, String>,
    /// 1-based position in the retriever's result order.
    pub rank: usize,
}

impl Passage {
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.structured_metadata
            .get(key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchQuery {
    pub text: String,
    pub top_k: usize,
    pub score_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Citation {
    pub source_filename: String,
    pub relevance_score: f64,
    pub content_preview: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Finding {
    pub source_filename: String,
    pub details: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum QueryStatus {
    Complete,
    NoPassages,
    RetrievalUnavailable,
    GenerationFailed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryResult {
    pub query_id: Uuid,
    pub question: String,
    pub answer: String,
    pub confidence: f64,
    pub sources: Vec<String>,
    pub citations: Vec<Citation>,
    pub timestamp: DateTime<Utc>,
    pub model_identifier: String,
    pub passage_count: usize,
    pub elapsed_seconds: f64,
    pub pii_findings: Vec<Finding>,
    pub compliance_findings: Vec<Finding>,
    pub status: QueryStatus,
}
