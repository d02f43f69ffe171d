use std::sync::Arc;

use crate::prompts;
use crate::services::{AIService, PromptRequest};

pub const NUTRIBOT_TEMPERATURE: f32 = 0.6;
pub const NUTRIBOT_APOLOGY: &str =
    "I apologize, but I encountered an error while processing your request. Please try again later.";

/// Nutrition chatbot. Each question is answered on its own; history is kept by the caller.
pub struct NutriBot {
    ai: Arc<dyn AIService>,
}

impl NutriBot {
    pub fn new(ai: Arc<dyn AIService>) -> Self {
        Self { ai }
    }

    /// Never fails: backend errors are logged and answered with an apology.
    pub async fn ask_question(&self, question: &str) -> String {
        log::info!("💬 Processing question: {}", question);

        let prompt = PromptRequest::new(prompts::nutribot_prompt(question))
            .with_temperature(NUTRIBOT_TEMPERATURE);

        match self.ai.generate(&prompt).await {
            Ok(answer) => answer.trim().to_string(),
            Err(e) => {
                log::error!("❌ Error in processing question via {}: {:#}", self.ai.name(), e);
                NUTRIBOT_APOLOGY.to_string()
            }
        }
    }
}
