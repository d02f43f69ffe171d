use anyhow::Result;
use std::sync::Arc;

use crate::models::{MealPlan, MealPlanPreferences};
use crate::prompts;
use crate::sectionizer;
use crate::services::{AIService, PromptRequest};

pub const MEAL_PLAN_TEMPERATURE: f32 = 0.0001;

pub struct MealPlanner {
    ai: Arc<dyn AIService>,
}

impl MealPlanner {
    pub fn new(ai: Arc<dyn AIService>) -> Self {
        Self { ai }
    }

    pub async fn create_meal_plan(&self, prefs: &MealPlanPreferences) -> Result<MealPlan> {
        log::info!(
            "📅 Creating meal plan for: gender={}, goal={}, diet={}, issue={}, gym={}, height={}, weight={}, cuisine={}",
            prefs.gender,
            prefs.goal,
            prefs.diet,
            prefs.effective_issue(),
            prefs.workout_phrase(),
            prefs.height,
            prefs.weight,
            prefs.cuisine
        );

        let prompt = PromptRequest::new(prompts::meal_plan_prompt(prefs))
            .with_temperature(MEAL_PLAN_TEMPERATURE);
        let raw = self.ai.generate(&prompt).await?;

        let sections = sectionizer::split_meal_plan(&raw);
        if sections.is_empty() {
            log::warn!("⚠️ Meal plan from {} has no recognizable sections", self.ai.name());
        }

        Ok(MealPlan { raw, sections })
    }
}
