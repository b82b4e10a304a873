use crate::traits::TextGenerator;
use crate::GenerationError;
use tracing::error;

/// Answer text substituted when the generation backend fails.
pub const GENERATION_FAILURE_ANSWER: &str = "LLM failed to generate answer.";

/// Outcome of one generation call. Both variants turn into answer text
/// through [`Synthesis::into_answer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Synthesis {
    Generated(String),
    Failed,
}

impl Synthesis {
    pub fn is_generated(&self) -> bool {
        matches!(self, Synthesis::Generated(_))
    }

    /// The generated text, or [`GENERATION_FAILURE_ANSWER`].
    pub fn into_answer(self) -> String {
        match self {
            Synthesis::Generated(answer) => answer,
            Synthesis::Failed => GENERATION_FAILURE_ANSWER.to_string(),
        }
    }
}

pub struct AnswerSynthesizer<G> {
    generator: G,
    temperature: f64,
}

impl<G> AnswerSynthesizer<G>
where
    G: TextGenerator + Send + Sync,
{
    pub fn new(generator: G, temperature: f64) -> Self {
        Self {
            generator,
            temperature,
        }
    }

    pub fn model_identifier(&self) -> &str {
        self.generator.model_identifier()
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub async fn synthesize(&self, prompt: &str) -> Result<String, GenerationError> {
        self.generator.generate(prompt, self.temperature).await
    }

    /// Like [`synthesize`](Self::synthesize), but a failed call is logged
    /// and reported as [`Synthesis::Failed`] instead of an error.
    pub async fn generate(&self, prompt: &str) -> Synthesis {
        match self.synthesize(prompt).await {
            Ok(answer) => Synthesis::Generated(answer),
            Err(cause) => {
                error!(model = self.model_identifier(), error = %cause, "answer generation failed");
                Synthesis::Failed
            }
        }
    }
}
