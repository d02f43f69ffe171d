pub mod articles;
pub mod calculator;
pub mod food_analysis;
pub mod meal_plan;
pub mod nutribot;
pub mod quiz;
pub mod recipe;

pub use food_analysis::{FoodAnalyzer, UNPARSEABLE_ANALYSIS_WARNING};
pub use meal_plan::MealPlanner;
pub use nutribot::NutriBot;
pub use quiz::NutritionQuiz;
pub use recipe::RecipeGenerator;
