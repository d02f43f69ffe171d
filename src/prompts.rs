//! Prompt templates sent to the language models.
//!
//! Every template pins down an output format that the matching splitter in
//! `sectionizer` knows how to read back. Change both together.

use crate::models::{MealPlanPreferences, RecipeType};

const FOOD_OUTPUT_FORMAT: &str = "\
1. Item 1 (quantity) - calories, carbs, fiber, protein, fats, other details (if available)
2. Item 2 (quantity) - calories, carbs, fiber, protein, fats, other details (if available)
...

Total: calories, carbs, fiber, protein, fats
Verdict: Healthy or Not Healthy
Facts: Share 2-3 interesting, sarcastic and fun nutrition facts about the dish";

pub fn food_image_prompt() -> String {
    format!(
        "You are a fun and friendly nutritionist. Analyze the food items in the image and calculate:\n\
         - Total calories\n\
         - Nutrition values: carbs, fiber, protein, fats\n\
         - Details of each food item by proportion or quantity with calorie intake\n\
         \n\
         Format your response as follows:\n\
         \n\
         {}",
        FOOD_OUTPUT_FORMAT
    )
}

pub fn food_text_prompt(input_text: &str) -> String {
    format!(
        "You are a fun and friendly nutritionist. Calculate nutrition values for these food items or dishes: [{}]\n\
         Follow this format strictly and don't add extra information:\n\
         \n\
         {}",
        input_text.trim(),
        FOOD_OUTPUT_FORMAT
    )
}

const WORKOUT_OPTIONS: &str = "\
Pre-Workout:
- [Pre-workout option 1: with quantity or portion size: (calories in meal)]
- [Pre-workout option 2: with quantity or portion size: (calories in meal)]

Post-Workout:
- [Post-workout option 1: with quantity or portion size: (calories in meal)]
- [Post-workout option 2: with quantity or portion size: (calories in meal)]";

const NO_WORKOUT_OPTIONS: &str = "\
Pre-Workout:
- Give \"Not needed\"

Post-Workout:
- Give \"Not needed\"";

pub fn meal_plan_prompt(prefs: &MealPlanPreferences) -> String {
    let workout_options = if prefs.works_out {
        WORKOUT_OPTIONS
    } else {
        NO_WORKOUT_OPTIONS
    };
    let issue = prefs.effective_issue();

    format!(
        "You are a friendly and expert nutritionist. Create a simple home made meal-plan based on the following preferences:\n\
         \n\
         User's choice: I am a {gender}. I want to {goal} and I am {diet} in diet. I have a {issue} condition. \
         I {gym} and my height is {height} and weight is {weight}. I prefer {cuisine} of dishes.\n\
         \n\
         Strictly follow this format for your response:\n\
         \n\
         Breakfast:\n\
         - [Breakfast option 1: with quantity or portion size: (calories in meal)]\n\
         - [Breakfast option 2: with quantity or portion size: (calories in meal)]\n\
         \n\
         Lunch:\n\
         - [Lunch option 1: with quantity or portion size: (calories in meal)]\n\
         - [Lunch option 2: with quantity or portion size: (calories in meal)]\n\
         \n\
         {workout_options}\n\
         \n\
         Dinner:\n\
         - [Dinner option 1: with quantity or portion size: (calories in meal)]\n\
         - [Dinner option 2: with quantity or portion size: (calories in meal)]\n\
         \n\
         Important Rules to be followed:\n\
         1. Provide only simple home-made and healthy meal names, not recipes.\n\
         2. Adjust portion sizes and nutrient balance to support the user's goal ({goal}).\n\
         3. Adjust the calories required based on height, weight, gender, and goal.\n\
         4. Consider the user's food preferences ({cuisine} cuisine) in all meal suggestions.\n\
         5. Account for any dietary issues or allergies ({issue}) when suggesting meals.\n\
         6. Do not add any extra explanations or information outside the specified format.\n\
         7. Ensure each meal option is unique and varied.",
        gender = prefs.gender.trim(),
        goal = prefs.goal.trim(),
        diet = prefs.diet.trim(),
        issue = issue,
        gym = prefs.workout_phrase(),
        height = prefs.height.trim(),
        weight = prefs.weight.trim(),
        cuisine = prefs.cuisine.trim(),
        workout_options = workout_options,
    )
}

pub fn recipe_prompt(dish_name: &str, recipe_type: RecipeType) -> String {
    let dish_name = dish_name.trim();
    let instruction = match recipe_type {
        RecipeType::Normal => format!("Create a recipe for {}.", dish_name),
        RecipeType::Healthier => format!("Create a healthier version of {}.", dish_name),
        RecipeType::NewHealthy => format!(
            "Create a new healthy and trendy recipe inspired by {}.",
            dish_name
        ),
    };

    let mut prompt = format!(
        "{}\n\
         Format the output as follows:\n\
         \n\
         Recipe Name: [Name of the recipe]\n\
         \n\
         Ingredients:\n\
         1. [quantity] [ingredient]\n\
         2. [quantity] [ingredient]\n\
         ...\n\
         \n\
         Steps:\n\
         1. [Step description]\n\
         2. [Step description]\n\
         ...\n\
         \n\
         Ingredient List: [ingredient1, ingredient2, ...]",
        instruction
    );

    if recipe_type == RecipeType::Healthier {
        prompt.push_str("\n\nExplanation (briefly why this version is healthier):");
    }

    prompt
}

pub fn quiz_system_prompt() -> &'static str {
    "You are a quiz creator specializing in fun, interesting, and challenging multiple-choice quizzes on various topics."
}

pub fn quiz_user_prompt(num_questions: usize) -> String {
    format!(
        "Your task is to generate a quiz about food, fitness and nutrition consisting of {} number of questions in given specific format.\n\
         Each question should have either two or four answer options. Two-option questions should be formatted as true/false, \
         while four-option questions should be labeled A, B, C, and D. The questions should be engaging and include elements \
         of humor or interesting facts in either the questions or answers.\n\
         \n\
         For each question, please provide the following:\n\
         1. The question text\n\
         2. The answer options (labeled appropriately), give true and false as options according to the question\n\
         3. The correct answer\n\
         4. A brief, interesting explanation for the correct answer\n\
         \n\
         Please adhere strictly to the following format:\n\
         \n\
         Q1. [Question text only]\n\
         A. [Option A Text] (or True Option for True/False question)\n\
         B. [Option B Text] (or False Option for True/False question)\n\
         C. [Option C Text] (if applicable)\n\
         D. [Option D Text] (if applicable)\n\
         \n\
         Correct Answer: [A/B/C/D or A/B (incase of True/False)] (Give only A/B/C/D as answer not any other text)\n\
         \n\
         Explanation: [Brief, interesting explanation in 2-3 lines]\n\
         \n\
         Please repeat this format for all questions and refrain from adding any extra text or clarification.",
        num_questions
    )
}

const NUTRIBOT_SYSTEM_PROMPT: &str = "\
You are NutriBot for NutriAI site, a friendly AI assistant specializing in nutrition.
Respond to questions about diet, healthy eating, food recommendations, vitamins, and minerals.
For meal plans, recipes, or detailed food nutrition info, suggest using specific NutriAI features:
- For meal plans: \"Try NutriAI Meal Plan feature\"
- For recipes: \"Try NutriAI Recipe Recommender feature\"
- For nutrition info: \"Try NutriAI Food Analysis feature\"
If asked about non-nutrition topics, politely explain you're focused on nutrition and offer to help with diet-related questions.
Keep responses concise, fun and friendly, and informative!";

pub fn nutribot_prompt(question: &str) -> String {
    format!(
        "{}\nUser: {}\nAssistant:",
        NUTRIBOT_SYSTEM_PROMPT,
        question.trim()
    )
}
