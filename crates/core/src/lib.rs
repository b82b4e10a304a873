pub mod compliance;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod generation;
mod http;
pub mod models;
pub mod orchestrator;
pub mod pii;
pub mod prompt;
pub mod retriever;
pub mod stores;
pub mod synthesizer;
pub mod traits;

pub use config::PipelineConfig;
pub use embeddings::{Embedder, HttpEmbedder, DEFAULT_EMBEDDING_MODEL};
pub use error::{ConfigError, GenerationError, RetrievalError};
pub use generation::{ChatEndpointConfig, OpenAiChatClient, DEFAULT_CHAT_MODEL};
pub use models::{Citation, Finding, Passage, QueryResult, QueryStatus, SearchQuery};
pub use orchestrator::{QueryOrchestrator, NO_PREVIEW, RETRIEVAL_UNAVAILABLE_ANSWER};
pub use pii::PiiCategory;
pub use prompt::compose;
pub use retriever::Retriever;
pub use stores::QdrantStore;
pub use synthesizer::{AnswerSynthesizer, Synthesis, GENERATION_FAILURE_ANSWER};
pub use traits::{TextGenerator, VectorIndex};
