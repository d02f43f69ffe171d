use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::ai_service::{AIService, PromptRequest};
use crate::config::BackendConfig;

/// OpenAI-compatible providers reached through the same chat/completions client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Groq,
    Together,
    Mistral,
}

impl Provider {
    pub fn env_prefix(&self) -> &'static str {
        match self {
            Provider::Groq => "GROQ",
            Provider::Together => "TOGETHER",
            Provider::Mistral => "MISTRAL",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::Groq => "https://api.groq.com/openai/v1",
            Provider::Together => "https://api.together.xyz/v1",
            Provider::Mistral => "https://api.mistral.ai/v1",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Groq => "llama-3.1-8b-instant",
            Provider::Together => "mistralai/Mixtral-8x22B-Instruct-v0.1",
            Provider::Mistral => "open-mixtral-8x7b",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Provider::Groq => "Groq",
            Provider::Together => "Together AI",
            Provider::Mistral => "Mistral AI",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    #[serde(default)]
    content: Option<String>,
}

pub struct ChatCompletionsService {
    provider: Provider,
    api_key: String,
    model: String,
    endpoint: String,
    client: reqwest::Client,
}

impl ChatCompletionsService {
    pub fn new(provider: Provider, config: &BackendConfig, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            provider,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            client,
        })
    }

    fn build_request(&self, request: &PromptRequest) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: request.prompt.clone(),
        });

        ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: request.temperature,
        }
    }

    fn extract_content(&self, response: ChatResponse) -> Result<String> {
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| anyhow::anyhow!("{} returned no choices", self.provider))?;
        Ok(content)
    }
}

#[async_trait::async_trait]
impl AIService for ChatCompletionsService {
    fn name(&self) -> &str {
        self.provider.env_prefix()
    }

    async fn generate(&self, request: &PromptRequest) -> Result<String> {
        if request.image.is_some() {
            anyhow::bail!("{} backend does not accept image input", self.provider);
        }

        let body = self.build_request(request);

        log::info!("🤖 Sending request to {} with model: {}", self.provider, self.model);
        log::debug!("📤 Request payload size: {} bytes", serde_json::to_string(&body)?.len());

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        log::debug!("📥 {} response status: {}", self.provider, status);

        if !status.is_success() {
            let error_text = response.text().await?;
            log::error!("❌ {} API error ({}): {}", self.provider, status, error_text);
            anyhow::bail!("{} API error ({}): {}", self.provider, status, error_text);
        }

        let chat_response: ChatResponse = response.json().await?;
        let content = self.extract_content(chat_response)?;
        log::info!("✅ Received {} bytes from {}", content.len(), self.provider);

        Ok(content)
    }
}
