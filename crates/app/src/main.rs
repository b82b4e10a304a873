use chrono::SecondsFormat;
use clap::{Parser, Subcommand};
use rag_answer_core::prompt::system_prompt;
use rag_answer_core::{
    ChatEndpointConfig, HttpEmbedder, OpenAiChatClient, PipelineConfig, QdrantStore,
    QueryOrchestrator, QueryResult, DEFAULT_CHAT_MODEL, DEFAULT_EMBEDDING_MODEL,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "rag-answer", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Qdrant base URL
    #[arg(long, env = "QDRANT_URL", default_value = "http://localhost:6333")]
    qdrant_url: String,

    /// Qdrant collection holding the embedded document chunks
    #[arg(long, env = "QDRANT_COLLECTION", default_value = "documents")]
    qdrant_collection: String,

    /// Embedding service base URL (Ollama-compatible)
    #[arg(long, env = "EMBEDDING_URL", default_value = "http://localhost:11434")]
    embedding_url: String,

    /// Embedding model; must match the one used at ingestion
    #[arg(long, env = "EMBEDDING_MODEL", default_value = DEFAULT_EMBEDDING_MODEL)]
    embedding_model: String,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    openai_base_url: String,

    /// API key for the generation endpoint
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// Chat model used to synthesize answers
    #[arg(long, env = "OPENAI_MODEL", default_value = DEFAULT_CHAT_MODEL)]
    model: String,
}

#[derive(Subcommand)]
enum Command {
    /// Answer a question from the indexed documents, with citations and screening.
    Ask {
        /// Question text
        #[arg(long)]
        question: String,
        /// Maximum number of passages to retrieve.
        #[arg(long, default_value = "3")]
        top_k: usize,
        /// Minimum similarity a passage needs to be used.
        #[arg(long, default_value = "0.3")]
        score_threshold: f64,
        /// Sampling temperature for the answer.
        #[arg(long, default_value = "0.1")]
        temperature: f64,
        /// Print the full result as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Check that the vector collection is reachable.
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    let store = QdrantStore::new(&cli.qdrant_url, &cli.qdrant_collection)?;

    match cli.command {
        Command::Check => {
            store.ensure_collection().await?;
            println!(
                "collection {} is reachable at {}",
                cli.qdrant_collection, cli.qdrant_url
            );
        }
        Command::Ask {
            question,
            top_k,
            score_threshold,
            temperature,
            json,
        } => {
            let config = PipelineConfig {
                top_k,
                score_threshold,
                temperature,
                model: cli.model.clone(),
                ..Default::default()
            };

            store.ensure_collection().await?;
            let embedder = HttpEmbedder::new(&cli.embedding_url, &cli.embedding_model)?;
            let generator = OpenAiChatClient::new(ChatEndpointConfig {
                base_url: cli.openai_base_url.clone(),
                api_key: cli.openai_api_key.clone(),
                model: config.model.clone(),
                system_prompt: system_prompt().to_string(),
            })?;

            let orchestrator = QueryOrchestrator::new(embedder, store, generator, config)?;
            info!(
                version = env!("CARGO_PKG_VERSION"),
                collection = %cli.qdrant_collection,
                model = %orchestrator.config().model,
                "rag-answer ready"
            );

            let result = orchestrator.answer(&question).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_summary(&result);
            }
        }
    }

    Ok(())
}

fn print_summary(result: &QueryResult) {
    println!("question: {}", result.question);
    println!("answer:\n{}", result.answer);
    println!(
        "confidence={:.2} sources={} status={:?} model={} elapsed={:.2}s at {}",
        result.confidence,
        result.passage_count,
        result.status,
        result.model_identifier,
        result.elapsed_seconds,
        result.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
    );

    for (index, citation) in result.citations.iter().enumerate() {
        println!(
            "[{}] {} relevance={:.3}\n  {}",
            index + 1,
            citation.source_filename,
            citation.relevance_score,
            citation.content_preview
        );
    }

    if result.pii_findings.is_empty() && result.compliance_findings.is_empty() {
        println!("no PII or compliance risks found");
    }
    for finding in &result.pii_findings {
        println!("pii: {} -> {}", finding.source_filename, finding.details.join("; "));
    }
    for finding in &result.compliance_findings {
        println!(
            "compliance: {} -> {}",
            finding.source_filename,
            finding.details.join(", ")
        );
    }
}
