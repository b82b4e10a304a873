use crate::http::join_endpoint;
use crate::traits::TextGenerator;
use crate::GenerationError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Clone)]
pub struct ChatEndpointConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub system_prompt: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatReply>,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiChatClient {
    endpoint: Url,
    api_key: Option<String>,
    model: String,
    system_prompt: String,
    client: Client,
}

impl OpenAiChatClient {
    pub fn new(config: ChatEndpointConfig) -> Result<Self, GenerationError> {
        let endpoint = join_endpoint(&config.base_url, "chat/completions")?;
        let api_key = config
            .api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        Ok(Self {
            endpoint,
            api_key,
            model: config.model,
            system_prompt: config.system_prompt,
            client: Client::new(),
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAiChatClient {
    async fn generate(&self, prompt: &str, temperature: f64) -> Result<String, GenerationError> {
        let payload = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &self.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature,
        };

        let mut request = self.client.post(self.endpoint.clone()).json(&payload);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let details = response.text().await.unwrap_or_default();
            return Err(GenerationError::BackendResponse {
                status: status.as_u16(),
                details,
            });
        }

        let body: ChatResponse = response.json().await?;
        completion_text(body)
    }

    fn model_identifier(&self) -> &str {
        &self.model
    }
}

fn completion_text(body: ChatResponse) -> Result<String, GenerationError> {
    body.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(GenerationError::EmptyCompletion)
}
