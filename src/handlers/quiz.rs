use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::models::{AnswerFeedback, QuizQuestion, QuizScore, ScoreTier};
use crate::prompts;
use crate::sectionizer;
use crate::services::{AIService, PromptRequest};

pub const QUIZ_TEMPERATURE: f32 = 0.7;

pub struct NutritionQuiz {
    ai: Arc<dyn AIService>,
    num_questions: usize,
}

impl NutritionQuiz {
    pub fn new(ai: Arc<dyn AIService>, num_questions: usize) -> Self {
        Self { ai, num_questions }
    }

    pub async fn generate_quiz(&self) -> Result<Vec<QuizQuestion>> {
        log::info!("🧠 Generating nutrition quiz with {} questions", self.num_questions);

        let prompt = PromptRequest::new(prompts::quiz_user_prompt(self.num_questions))
            .with_system(prompts::quiz_system_prompt())
            .with_temperature(QUIZ_TEMPERATURE);
        let response = self.ai.generate(&prompt).await?;

        match sectionizer::parse_quiz(&response) {
            Ok(questions) => {
                log::info!("✅ Parsed {} quiz questions", questions.len());
                Ok(questions)
            }
            Err(e) => {
                log::error!("❌ No valid questions were generated. Raw response: {}", response);
                Err(e.context("No valid questions were generated. Please try again."))
            }
        }
    }

    pub fn check_answer(question: &QuizQuestion, user_answer: &str) -> AnswerFeedback {
        AnswerFeedback {
            is_correct: user_answer.trim().eq_ignore_ascii_case(&question.correct_answer),
            correct_answer: question.correct_answer.clone(),
            explanation: question.explanation.clone(),
        }
    }

    /// Scores a finished quiz. `answers` is keyed by question index.
    pub fn score(questions: &[QuizQuestion], answers: &BTreeMap<usize, String>) -> QuizScore {
        let correct = questions
            .iter()
            .enumerate()
            .filter(|(i, question)| {
                answers
                    .get(i)
                    .map(|answer| Self::check_answer(question, answer).is_correct)
                    .unwrap_or(false)
            })
            .count();

        let total = questions.len();
        let percentage = if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64 * 100.0
        };
        let tier = ScoreTier::from_percentage(percentage);

        QuizScore {
            correct,
            total,
            percentage,
            tier,
            message: tier.message().to_string(),
        }
    }
}
