use anyhow::Result;

use crate::models::ImageUpload;

/// One prompt sent to a backend: optional system instructions, the user
/// prompt and an optional picture.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptRequest {
    pub system: Option<String>,
    pub prompt: String,
    pub image: Option<ImageUpload>,
    pub temperature: Option<f32>,
}

impl PromptRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            image: None,
            temperature: None,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_image(mut self, image: ImageUpload) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Trait for AI backends (Gemini, Groq, Together, Mistral)
#[async_trait::async_trait]
pub trait AIService: Send + Sync {
    /// Backend name used in logs.
    fn name(&self) -> &str;

    /// Sends the prompt and returns the raw response text.
    async fn generate(&self, request: &PromptRequest) -> Result<String>;
}
