use crate::config::PipelineConfig;
use crate::embeddings::Embedder;
use crate::prompt::{compose, passage_content};
use crate::retriever::Retriever;
use crate::synthesizer::AnswerSynthesizer;
use crate::traits::{TextGenerator, VectorIndex};
use crate::{compliance, pii};
use crate::{Citation, ConfigError, Finding, Passage, QueryResult, QueryStatus};
use chrono::Utc;
use std::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

pub const RETRIEVAL_UNAVAILABLE_ANSWER: &str =
    "Document search is currently unavailable; no answer could be produced.";
pub const NO_PREVIEW: &str = "(No preview available)";
const ELLIPSIS: &str = "...";

/// Runs retrieval, prompt composition, synthesis and screening for one
/// question at a time. Holds no per-query state, so one instance can serve
/// concurrent callers.
pub struct QueryOrchestrator<E, V, G> {
    retriever: Retriever<E, V>,
    synthesizer: AnswerSynthesizer<G>,
    config: PipelineConfig,
}

impl<E, V, G> QueryOrchestrator<E, V, G>
where
    E: Embedder + Send + Sync,
    V: VectorIndex + Send + Sync,
    G: TextGenerator + Send + Sync,
{
    /// Fails when the configuration is invalid or names a different model
    /// than the generator.
    pub fn new(
        embedder: E,
        index: V,
        generator: G,
        config: PipelineConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if generator.model_identifier() != config.model {
            return Err(ConfigError::ModelMismatch {
                configured: config.model.clone(),
                generator: generator.model_identifier().to_string(),
            });
        }

        Ok(Self {
            retriever: Retriever::new(embedder, index),
            synthesizer: AnswerSynthesizer::new(generator, config.temperature),
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Never fails: retrieval and generation errors are folded into the
    /// returned result and its `status`.
    pub async fn answer(&self, question: &str) -> QueryResult {
        let query_id = Uuid::new_v4();
        let span = info_span!("query", %query_id);
        self.run(query_id, question).instrument(span).await
    }

    async fn run(&self, query_id: Uuid, question: &str) -> QueryResult {
        info!(question, "processing question");
        let started = Instant::now();

        let passages = match self
            .retriever
            .search(question, self.config.top_k, self.config.score_threshold)
            .await
        {
            Ok(passages) => passages,
            Err(error) => {
                warn!(%error, "retrieval unavailable, returning degraded result");
                return QueryResult {
                    query_id,
                    question: question.to_string(),
                    answer: RETRIEVAL_UNAVAILABLE_ANSWER.to_string(),
                    confidence: 0.0,
                    sources: Vec::new(),
                    citations: Vec::new(),
                    timestamp: Utc::now(),
                    model_identifier: self.synthesizer.model_identifier().to_string(),
                    passage_count: 0,
                    elapsed_seconds: round_to(started.elapsed().as_secs_f64(), 2),
                    pii_findings: Vec::new(),
                    compliance_findings: Vec::new(),
                    status: QueryStatus::RetrievalUnavailable,
                };
            }
        };

        let prompt = compose(question, &passages);
        let synthesis = self.synthesizer.generate(&prompt).await;
        let generated = synthesis.is_generated();
        let answer = synthesis.into_answer();

        let citations = passages
            .iter()
            .map(|passage| citation(passage, self.config.preview_chars))
            .collect::<Vec<_>>();
        let (pii_findings, compliance_findings) = screen(&passages);

        let status = if !generated {
            QueryStatus::GenerationFailed
        } else if passages.is_empty() {
            QueryStatus::NoPassages
        } else {
            QueryStatus::Complete
        };

        let result = QueryResult {
            query_id,
            question: question.to_string(),
            answer,
            confidence: confidence(&passages),
            sources: passages
                .iter()
                .map(|passage| passage.source_filename.clone())
                .collect(),
            citations,
            timestamp: Utc::now(),
            model_identifier: self.synthesizer.model_identifier().to_string(),
            passage_count: passages.len(),
            elapsed_seconds: round_to(started.elapsed().as_secs_f64(), 2),
            pii_findings,
            compliance_findings,
            status,
        };

        info!(
            passages = result.passage_count,
            confidence = result.confidence,
            pii = result.pii_findings.len(),
            compliance = result.compliance_findings.len(),
            elapsed_seconds = result.elapsed_seconds,
            status = ?result.status,
            "query answered"
        );

        result
    }
}

/// Mean passage similarity to two decimals; zero for no passages.
pub fn confidence(passages: &[Passage]) -> f64 {
    if passages.is_empty() {
        return 0.0;
    }
    let total: f64 = passages.iter().map(|passage| passage.similarity).sum();
    round_to(total / passages.len() as f64, 2)
}

pub fn citation(passage: &Passage, preview_chars: usize) -> Citation {
    let preview: String = passage_content(passage).chars().take(preview_chars).collect();
    let content_preview = if preview.is_empty() {
        NO_PREVIEW.to_string()
    } else {
        preview + ELLIPSIS
    };

    Citation {
        source_filename: passage.source_filename.clone(),
        relevance_score: round_to(passage.similarity, 3),
        content_preview,
    }
}

/// PII and compliance findings over full passage content, in rank order.
/// Passages without matches contribute nothing.
pub fn screen(passages: &[Passage]) -> (Vec<Finding>, Vec<Finding>) {
    let mut pii_findings = Vec::new();
    let mut compliance_findings = Vec::new();

    for passage in passages {
        let content = passage_content(passage);

        let pii_matches = pii::detect(content);
        if !pii_matches.is_empty() {
            debug!(source = %passage.source_filename, categories = pii_matches.len(), "pii detected");
            pii_findings.push(Finding {
                source_filename: passage.source_filename.clone(),
                details: pii::describe(&pii_matches),
            });
        }

        let risk_terms = compliance::detect(content);
        if !risk_terms.is_empty() {
            debug!(source = %passage.source_filename, terms = ?risk_terms, "compliance terms detected");
            compliance_findings.push(Finding {
                source_filename: passage.source_filename.clone(),
                details: risk_terms.into_iter().map(str::to_string).collect(),
            });
        }
    }

    (pii_findings, compliance_findings)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GenerationError, RetrievalError, SearchQuery, GENERATION_FAILURE_ANSWER};
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    struct FixedEmbedder;

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, RetrievalError> {
            Ok(vec![1.0, 0.0])
        }
    }

    #[derive(Default)]
    struct FakeVectorIndex {
        hits: Vec<Passage>,
        unavailable: bool,
    }

    #[async_trait]
    impl VectorIndex for FakeVectorIndex {
        async fn search_vector(
            &self,
            _query_vector: &[f32],
            _query: &SearchQuery,
        ) -> Result<Vec<Passage>, RetrievalError> {
            if self.unavailable {
                return Err(RetrievalError::NotReady("connection refused".to_string()));
            }
            Ok(self.hits.clone())
        }
    }

    #[derive(Default)]
    struct FakeGenerator {
        fail: bool,
        called_at: Mutex<Option<DateTime<Utc>>>,
    }

    #[async_trait]
    impl TextGenerator for FakeGenerator {
        async fn generate(&self, _prompt: &str, _temperature: f64) -> Result<String, GenerationError> {
            *self.called_at.lock().unwrap() = Some(Utc::now());
            if self.fail {
                Err(GenerationError::BackendResponse {
                    status: 429,
                    details: "quota exceeded".to_string(),
                })
            } else {
                Ok("Two permit violations were reported.".to_string())
            }
        }

        fn model_identifier(&self) -> &str {
            "fake-model"
        }
    }

    fn passage(name: &str, similarity: f64, content: &str) -> Passage {
        Passage {
            content: content.to_string(),
            similarity,
            source_filename: name.to_string(),
            structured_metadata: BTreeMap::new(),
            rank: 0,
        }
    }

    fn orchestrator(
        index: FakeVectorIndex,
        generator: FakeGenerator,
    ) -> QueryOrchestrator<FixedEmbedder, FakeVectorIndex, FakeGenerator> {
        let config = PipelineConfig {
            top_k: 5,
            score_threshold: 0.3,
            model: "fake-model".to_string(),
            ..Default::default()
        };
        QueryOrchestrator::new(FixedEmbedder, index, generator, config).expect("valid config")
    }

    #[tokio::test]
    async fn full_pipeline_assembles_consistent_result() {
        let index = FakeVectorIndex {
            hits: vec![
                passage("permits.pdf", 0.81, "A regulatory breach was logged. Contact a@b.com."),
                passage("notes.txt", 0.65, "Nothing of interest here."),
                passage("permits.pdf", 0.40, "Penalty notice; call 555-123-4567."),
            ],
            ..Default::default()
        };
        let result = orchestrator(index, FakeGenerator::default())
            .answer("Any violations?")
            .await;

        assert_eq!(result.status, QueryStatus::Complete);
        assert_eq!(result.answer, "Two permit violations were reported.");
        assert_eq!(result.model_identifier, "fake-model");
        assert_eq!(result.passage_count, 3);
        assert_eq!(result.citations.len(), 3);
        assert_eq!(result.sources, vec!["permits.pdf", "notes.txt", "permits.pdf"]);
        assert_eq!(result.confidence, 0.62);
        assert_eq!(result.citations[0].relevance_score, 0.81);

        assert_eq!(result.pii_findings.len(), 2);
        assert_eq!(result.pii_findings[0].details, vec!["email: a@b.com"]);
        assert_eq!(result.pii_findings[1].details, vec!["phone: 555-123-4567"]);

        let compliance_sources: Vec<_> = result
            .compliance_findings
            .iter()
            .map(|finding| (finding.source_filename.as_str(), finding.details.clone()))
            .collect();
        assert_eq!(
            compliance_sources,
            vec![
                ("permits.pdf", vec!["regulatory breach".to_string()]),
                ("permits.pdf", vec!["penalty".to_string()]),
            ]
        );
        assert!(result.elapsed_seconds >= 0.0);
    }

    #[tokio::test]
    async fn no_passages_means_zero_confidence() {
        let result = orchestrator(FakeVectorIndex::default(), FakeGenerator::default())
            .answer("Unrelated question")
            .await;

        assert_eq!(result.status, QueryStatus::NoPassages);
        assert_eq!(result.passage_count, 0);
        assert_eq!(result.confidence, 0.0);
        assert!(result.citations.is_empty());
        assert!(result.sources.is_empty());
        assert!(result.pii_findings.is_empty());
        assert!(result.compliance_findings.is_empty());
    }

    #[tokio::test]
    async fn retrieval_unavailable_degrades_instead_of_failing() {
        let index = FakeVectorIndex {
            unavailable: true,
            ..Default::default()
        };
        let result = orchestrator(index, FakeGenerator::default())
            .answer("Any violations?")
            .await;

        assert_eq!(result.status, QueryStatus::RetrievalUnavailable);
        assert_eq!(result.passage_count, 0);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.answer, RETRIEVAL_UNAVAILABLE_ANSWER);
        assert!(result.citations.is_empty());
        assert!(result.pii_findings.is_empty());
    }

    #[tokio::test]
    async fn generation_failure_keeps_citations_and_screening() {
        let index = FakeVectorIndex {
            hits: vec![passage("audit.eml", 0.9, "Audit failure reported by ops@plant.io")],
            ..Default::default()
        };
        let generator = FakeGenerator {
            fail: true,
            ..Default::default()
        };
        let result = orchestrator(index, generator)
            .answer("What did the audit find?")
            .await;

        assert_eq!(result.status, QueryStatus::GenerationFailed);
        assert_eq!(result.answer, GENERATION_FAILURE_ANSWER);
        assert_eq!(result.passage_count, 1);
        assert_eq!(result.confidence, 0.9);
        assert_eq!(result.compliance_findings[0].details, vec!["audit failure"]);
        assert_eq!(result.pii_findings[0].details, vec!["email: ops@plant.io"]);
    }

    #[tokio::test]
    async fn timestamp_is_taken_when_the_result_is_assembled() {
        let index = FakeVectorIndex {
            hits: vec![passage("permits.pdf", 0.7, "Permit renewed.")],
            ..Default::default()
        };
        let pipeline = orchestrator(index, FakeGenerator::default());
        let result = pipeline.answer("Was the permit renewed?").await;

        let called_at = *pipeline.synthesizer.generator().called_at.lock().unwrap();
        let generated_at = called_at.expect("generator was called");
        assert!(result.timestamp >= generated_at);
    }

    #[test]
    fn config_model_must_match_generator_model() {
        let config = PipelineConfig {
            model: "gpt-4o".to_string(),
            ..Default::default()
        };
        let built = QueryOrchestrator::new(
            FixedEmbedder,
            FakeVectorIndex::default(),
            FakeGenerator::default(),
            config,
        );

        match built {
            Err(ConfigError::ModelMismatch { configured, generator }) => {
                assert_eq!(configured, "gpt-4o");
                assert_eq!(generator, "fake-model");
            }
            _ => panic!("expected a model mismatch"),
        }
    }

    #[tokio::test]
    async fn result_reports_the_configured_model() {
        let pipeline = orchestrator(FakeVectorIndex::default(), FakeGenerator::default());
        let result = pipeline.answer("Anything?").await;
        assert_eq!(result.model_identifier, pipeline.config().model);
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let config = PipelineConfig {
            top_k: 0,
            ..Default::default()
        };
        let built = QueryOrchestrator::new(
            FixedEmbedder,
            FakeVectorIndex::default(),
            FakeGenerator::default(),
            config,
        );
        assert!(matches!(built, Err(ConfigError::ZeroTopK)));
    }

    #[test]
    fn long_content_preview_is_truncated_with_ellipsis() {
        let content = "x".repeat(250);
        let cited = citation(&passage("long.txt", 0.12345, &content), 200);

        assert_eq!(cited.content_preview, format!("{}...", "x".repeat(200)));
        assert_eq!(cited.relevance_score, 0.123);
    }

    #[test]
    fn empty_content_uses_no_preview_marker() {
        let cited = citation(&passage("empty.txt", 0.5, ""), 200);
        assert_eq!(cited.content_preview, NO_PREVIEW);
    }

    #[test]
    fn preview_counts_characters_not_bytes() {
        let content = "é".repeat(10);
        let cited = citation(&passage("accents.txt", 0.5, &content), 4);
        assert_eq!(cited.content_preview, "éééé...");
    }

    #[test]
    fn screening_uses_full_content_beyond_preview() {
        let content = format!("{} restatement pending", "filler ".repeat(60));
        let (pii_findings, compliance_findings) = screen(&[passage("late.txt", 0.5, &content)]);

        assert!(pii_findings.is_empty());
        assert_eq!(compliance_findings[0].details, vec!["restatement"]);
    }

    #[test]
    fn confidence_is_rounded_mean() {
        let passages = vec![
            passage("a", 0.81, ""),
            passage("b", 0.65, ""),
            passage("c", 0.40, ""),
        ];
        assert_eq!(confidence(&passages), 0.62);
        assert_eq!(confidence(&[]), 0.0);
    }
}
