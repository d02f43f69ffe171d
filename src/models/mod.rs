use base64::{engine::general_purpose, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// MIME types accepted for food pictures.
pub const UPLOAD_MIME_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png"];

const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];

#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl ImageUpload {
    /// Validates the declared type against the upload whitelist and the file's magic bytes.
    pub fn new(mime_type: &str, data: Vec<u8>) -> Result<Self, ValidationError> {
        let mime_type = mime_type.trim().to_lowercase();
        if !UPLOAD_MIME_TYPES.contains(&mime_type.as_str()) {
            return Err(ValidationError::UnsupportedImageType(mime_type));
        }
        if data.is_empty() {
            return Err(ValidationError::EmptyImage);
        }

        let mime_type = if mime_type == "image/jpg" {
            "image/jpeg".to_string()
        } else {
            mime_type
        };

        let magic = if mime_type == "image/png" { PNG_MAGIC } else { JPEG_MAGIC };
        if !data.starts_with(magic) {
            return Err(ValidationError::ImageContentMismatch(mime_type));
        }

        Ok(Self { mime_type, data })
    }

    pub fn from_base64(mime_type: &str, encoded: &str) -> Result<Self, ValidationError> {
        let data = general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|_| ValidationError::InvalidImageEncoding)?;
        Self::new(mime_type, data)
    }

    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(&self.data)
    }
}

/// What the user wants analysed: a short food description or a picture, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisRequest {
    Text(String),
    Image(ImageUpload),
}

impl AnalysisRequest {
    pub fn from_parts(
        text: Option<String>,
        image: Option<ImageUpload>,
    ) -> Result<Self, ValidationError> {
        let text = text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        match (text, image) {
            (Some(text), None) => Ok(AnalysisRequest::Text(text)),
            (None, Some(image)) => Ok(AnalysisRequest::Image(image)),
            _ => Err(ValidationError::AmbiguousAnalysisInput),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodAnalysisSections {
    pub items: String,
    pub total: String,
    pub verdict: String,
    pub healthy: bool,
    pub facts: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub raw: String,
    pub sections: Option<FoodAnalysisSections>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlanPreferences {
    pub gender: String,
    pub goal: String,
    pub diet: String,
    #[serde(default = "default_issue")]
    pub issue: String,
    #[serde(default)]
    pub custom_issue: Option<String>,
    pub works_out: bool,
    pub height: String,
    pub weight: String,
    pub cuisine: String,
}

fn default_issue() -> String {
    "No issue".to_string()
}

impl MealPlanPreferences {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let required = [
            ("gender", &self.gender),
            ("goal", &self.goal),
            ("diet", &self.diet),
            ("height", &self.height),
            ("weight", &self.weight),
            ("cuisine", &self.cuisine),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField(name));
            }
        }
        Ok(())
    }

    /// "Other" defers to the free-text issue, falling back to "No issue" when it is blank.
    pub fn effective_issue(&self) -> String {
        if self.issue.trim().eq_ignore_ascii_case("other") {
            return self
                .custom_issue
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or("No issue")
                .to_string();
        }
        if self.issue.trim().is_empty() {
            return default_issue();
        }
        self.issue.trim().to_string()
    }

    pub fn workout_phrase(&self) -> &'static str {
        if self.works_out {
            "do gym/workout"
        } else {
            "do not gym/workout"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealSection {
    pub name: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MealPlan {
    pub raw: String,
    pub sections: Vec<MealSection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipeType {
    Normal,
    Healthier,
    NewHealthy,
}

impl std::fmt::Display for RecipeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RecipeType::Normal => "normal",
            RecipeType::Healthier => "healthier",
            RecipeType::NewHealthy => "new_healthy",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSection {
    pub title: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecipeSections {
    pub name: Option<String>,
    pub sections: Vec<RecipeSection>,
    pub paragraphs: Vec<String>,
    pub ingredients: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recipe {
    pub raw: String,
    #[serde(flatten)]
    pub sections: RecipeSections,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    /// Always one of "A".."D" after parsing.
    pub correct_answer: String,
    pub explanation: String,
}

impl QuizQuestion {
    pub fn option_for(&self, label: &str) -> Option<&str> {
        let index = answer_index(label)?;
        self.options.get(index).map(String::as_str)
    }
}

/// Maps a label ("A".."D", case-insensitive) to an option index.
pub fn answer_index(label: &str) -> Option<usize> {
    match label.trim().to_ascii_uppercase().as_str() {
        "A" => Some(0),
        "B" => Some(1),
        "C" => Some(2),
        "D" => Some(3),
        _ => None,
    }
}

pub fn answer_label(index: usize) -> Option<&'static str> {
    ["A", "B", "C", "D"].get(index).copied()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerFeedback {
    pub is_correct: bool,
    pub correct_answer: String,
    pub explanation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTier {
    Perfect,
    Great,
    Good,
    NeedsImprovement,
}

impl ScoreTier {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 100.0 {
            ScoreTier::Perfect
        } else if percentage >= 80.0 {
            ScoreTier::Great
        } else if percentage >= 60.0 {
            ScoreTier::Good
        } else {
            ScoreTier::NeedsImprovement
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ScoreTier::Perfect => "Perfect score! You're a nutrition expert! 🏆",
            ScoreTier::Great => "Great job! You really know your food facts! 🌟",
            ScoreTier::Good => "Good effort! Keep learning about nutrition! 📚",
            ScoreTier::NeedsImprovement => {
                "There's room for improvement. Time to brush up on your nutrition knowledge! 💪"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizScore {
    pub correct: usize,
    pub total: usize,
    pub percentage: f64,
    pub tier: ScoreTier,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    ModeratelyActive,
    VeryActive,
    ExtraActive,
}

impl ActivityLevel {
    pub fn factor(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::LightlyActive => 1.375,
            ActivityLevel::ModeratelyActive => 1.55,
            ActivityLevel::VeryActive => 1.725,
            ActivityLevel::ExtraActive => 1.9,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Sedentary (little or no exercise)",
            ActivityLevel::LightlyActive => "Lightly active (light exercise/sports 1-3 days/week)",
            ActivityLevel::ModeratelyActive => {
                "Moderately active (moderate exercise/sports 3-5 days/week)"
            }
            ActivityLevel::VeryActive => "Very active (hard exercise/sports 6-7 days a week)",
            ActivityLevel::ExtraActive => {
                "Extra active (very hard exercise/sports & physical job or 2x training)"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Healthy,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn message(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "You are underweight.",
            BmiCategory::Healthy => "You are at a healthy weight.",
            BmiCategory::Overweight => "You are overweight.",
            BmiCategory::Obese => "You are obese.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BmiResult {
    pub bmi: f64,
    pub category: BmiCategory,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalorieResult {
    pub calories: f64,
    pub activity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub summary: String,
    pub content: String,
}
