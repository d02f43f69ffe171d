use anyhow::Result;
use std::sync::Arc;

use crate::models::{AnalysisRequest, AnalysisResult};
use crate::prompts;
use crate::sectionizer;
use crate::services::{AIService, PromptRequest};

pub const FOOD_ANALYSIS_TEMPERATURE: f32 = 0.001;
pub const UNPARSEABLE_ANALYSIS_WARNING: &str = "Unable to get the nutrition value of this food item.";

pub struct FoodAnalyzer {
    ai: Arc<dyn AIService>,
}

impl FoodAnalyzer {
    pub fn new(ai: Arc<dyn AIService>) -> Self {
        Self { ai }
    }

    pub async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResult> {
        let prompt = match request {
            AnalysisRequest::Text(text) => {
                log::info!("🍽️ Analyzing text input: {}", text);
                PromptRequest::new(prompts::food_text_prompt(&text))
            }
            AnalysisRequest::Image(image) => {
                log::info!("📸 Analyzing uploaded image ({}, {} bytes)", image.mime_type, image.data.len());
                PromptRequest::new(prompts::food_image_prompt()).with_image(image)
            }
        }
        .with_temperature(FOOD_ANALYSIS_TEMPERATURE);

        let raw = self.ai.generate(&prompt).await?;
        let sections = sectionizer::split_food_analysis(&raw);
        if sections.is_none() {
            log::warn!("⚠️ Could not split food analysis from {}: {}", self.ai.name(), raw);
        }

        Ok(AnalysisResult { raw, sections })
    }
}
