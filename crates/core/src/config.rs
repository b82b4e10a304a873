use crate::generation::DEFAULT_CHAT_MODEL;
use crate::ConfigError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub top_k: usize,
    pub score_threshold: f64,
    pub temperature: f64,
    pub model: String,
    /// Characters of passage content kept in a citation preview.
    pub preview_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            score_threshold: 0.3,
            temperature: 0.1,
            model: DEFAULT_CHAT_MODEL.to_string(),
            preview_chars: 200,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_k == 0 {
            return Err(ConfigError::ZeroTopK);
        }
        if !(0.0..=1.0).contains(&self.score_threshold) {
            return Err(ConfigError::ScoreThreshold(self.score_threshold));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Temperature(self.temperature));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::Empty("model"));
        }
        Ok(())
    }
}
