use anyhow::Result;
use std::sync::Arc;

use crate::error::ValidationError;
use crate::models::{Recipe, RecipeType};
use crate::prompts;
use crate::sectionizer;
use crate::services::{AIService, PromptRequest};

pub struct RecipeGenerator {
    ai: Arc<dyn AIService>,
}

impl RecipeGenerator {
    pub fn new(ai: Arc<dyn AIService>) -> Self {
        Self { ai }
    }

    /// Generates a recipe for a dish name (or a cuisine, for `NewHealthy`).
    pub async fn generate_recipe(&self, dish_name: &str, recipe_type: RecipeType) -> Result<Recipe> {
        let dish_name = dish_name.trim();
        if dish_name.is_empty() {
            return Err(ValidationError::MissingField("dish_name").into());
        }

        log::info!("🍳 Generating {} recipe for: {}", recipe_type, dish_name);
        let prompt = PromptRequest::new(prompts::recipe_prompt(dish_name, recipe_type));
        let raw = self.ai.generate(&prompt).await?;

        let sections = sectionizer::split_recipe(&raw);
        log::debug!(
            "📄 Recipe split into {} sections, {} ingredients",
            sections.sections.len(),
            sections.ingredients.len()
        );

        Ok(Recipe { raw, sections })
    }
}
