//! Best-effort splitting of free-text model answers into display sections.
//!
//! None of this is a grammar. Each splitter looks for the literal markers the
//! matching prompt asked for and gives up (or drops the piece) when they are
//! missing.

use anyhow::Result;
use regex::Regex;
use std::sync::OnceLock;

use crate::models::{FoodAnalysisSections, MealSection, QuizQuestion, RecipeSection, RecipeSections};

pub const MEAL_SECTIONS: [&str; 5] = ["Breakfast", "Lunch", "Pre-Workout", "Post-Workout", "Dinner"];

fn cached(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static regex pattern"))
}

fn food_marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, r"(?:Total:|Verdict:|Facts:)")
}

/// Splits a food analysis into items / total / verdict / facts.
///
/// Returns `None` when fewer than three segments were found, which is the
/// "could not get the nutrition value" case.
pub fn split_food_analysis(text: &str) -> Option<FoodAnalysisSections> {
    let segments: Vec<&str> = food_marker_regex().split(text).map(str::trim).collect();
    if segments.len() < 3 {
        return None;
    }

    let verdict = segments[2].to_string();
    Some(FoodAnalysisSections {
        items: segments[0].to_string(),
        total: segments[1].to_string(),
        healthy: is_healthy_verdict(&verdict),
        verdict,
        facts: segments
            .get(3)
            .map(|s| s.to_string())
            .filter(|s| !s.is_empty()),
    })
}

/// Any "Not" in the verdict counts as unhealthy.
pub fn is_healthy_verdict(verdict: &str) -> bool {
    !verdict.contains("Not")
}

fn meal_header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, r"(?i)^(Breakfast|Lunch|Pre-Workout|Post-Workout|Dinner):$")
}

/// Groups meal plan lines under their header, in the canonical meal order.
pub fn split_meal_plan(text: &str) -> Vec<MealSection> {
    let mut buckets: Vec<Vec<String>> = vec![Vec::new(); MEAL_SECTIONS.len()];
    let mut current: Option<usize> = None;

    for line in text.lines() {
        let line = line.trim();
        if let Some(caps) = meal_header_regex().captures(line) {
            current = MEAL_SECTIONS
                .iter()
                .position(|name| name.eq_ignore_ascii_case(&caps[1]));
        } else if let Some(index) = current {
            if !line.is_empty() {
                buckets[index].push(line.replace(['[', ']'], ""));
            }
        }
    }

    MEAL_SECTIONS
        .iter()
        .zip(buckets)
        .filter(|(_, items)| !items.is_empty())
        .map(|(name, items)| MealSection {
            name: name.to_string(),
            items,
        })
        .collect()
}

fn blank_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, r"\r?\n[ \t]*\r?\n")
}

/// Splits a recipe into its blank-line separated blocks.
pub fn split_recipe(text: &str) -> RecipeSections {
    let mut recipe = RecipeSections::default();

    for block in blank_line_regex().split(text) {
        let block = block.trim();
        if block.is_empty() {
            continue;
        }

        let first_line = block.lines().next().unwrap_or_default();

        if block.contains("List") {
            recipe.ingredients = parse_ingredient_list(block);
        } else if block.contains("Name") && first_line.contains(':') {
            let (_, content) = split_title(block);
            let name = content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            if !name.is_empty() {
                recipe.name = Some(name);
            }
        } else if first_line.contains(':') {
            let (title, content) = split_title(block);
            recipe.sections.push(RecipeSection {
                title: title.to_string(),
                lines: content
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string)
                    .collect(),
            });
        } else {
            recipe.paragraphs.push(block.to_string());
        }
    }

    recipe
}

fn split_title(block: &str) -> (&str, &str) {
    match block.split_once(':') {
        Some((title, content)) => (title.trim(), content.trim()),
        None => ("", block),
    }
}

fn parse_ingredient_list(block: &str) -> Vec<String> {
    let list = match block.find("Ingredient List:") {
        Some(pos) => &block[pos + "Ingredient List:".len()..],
        None => split_title(block).1,
    };

    list.trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(title_case)
        .collect()
}

/// Upper-cases the first letter of every word and lower-cases the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_is_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_alpha = true;
        } else {
            out.push(c);
            prev_is_alpha = false;
        }
    }
    out
}

struct QuizPatterns {
    question: Regex,
    option: Regex,
    true_false: Regex,
    correct_answer: Regex,
    explanation: Regex,
}

fn quiz_patterns() -> &'static QuizPatterns {
    static PATTERNS: OnceLock<QuizPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| QuizPatterns {
        question: Regex::new(r"^Q(\d+)\.\s*(.+)$").expect("static regex pattern"),
        option: Regex::new(r"^([A-D])\.\s*(.+)$").expect("static regex pattern"),
        true_false: Regex::new(r"(?i)^(True|False):\s*(.+)$").expect("static regex pattern"),
        correct_answer: Regex::new(r"(?i)^Correct Answer:\s*([A-D]|True|False)$")
            .expect("static regex pattern"),
        explanation: Regex::new(r"^Explanation:\s*(.+)$").expect("static regex pattern"),
    })
}

#[derive(Debug, Default)]
struct QuestionDraft {
    question: String,
    options: Vec<String>,
    correct_answer: Option<String>,
    explanation: Option<String>,
}

impl QuestionDraft {
    fn new(question: &str) -> Self {
        Self {
            question: question.trim().to_string(),
            ..Default::default()
        }
    }

    fn finish(self) -> std::result::Result<QuizQuestion, String> {
        if self.question.is_empty() {
            return Err("missing question text".to_string());
        }
        if self.options.len() != 2 && self.options.len() != 4 {
            return Err(format!("expected 2 or 4 options, got {}", self.options.len()));
        }

        let label = self
            .correct_answer
            .ok_or_else(|| "missing correct answer".to_string())?;
        // True/False answers are stored against the first two options.
        let label = match label.as_str() {
            "TRUE" => "A".to_string(),
            "FALSE" => "B".to_string(),
            _ => label,
        };
        match crate::models::answer_index(&label) {
            Some(index) if index < self.options.len() => {}
            _ => return Err(format!("correct answer {} is not one of the options", label)),
        }

        let explanation = self
            .explanation
            .ok_or_else(|| "missing explanation".to_string())?;

        Ok(QuizQuestion {
            question: self.question,
            options: self.options,
            correct_answer: label,
            explanation,
        })
    }
}

fn push_valid(questions: &mut Vec<QuizQuestion>, draft: QuestionDraft) {
    let text = draft.question.clone();
    match draft.finish() {
        Ok(question) => questions.push(question),
        Err(reason) => log::warn!("⚠️ Dropping malformed quiz question '{}': {}", text, reason),
    }
}

/// Parses a `Q1. / A. / Correct Answer: / Explanation:` quiz. Malformed
/// questions are dropped; an answer with no usable question is an error.
pub fn parse_quiz(text: &str) -> Result<Vec<QuizQuestion>> {
    let patterns = quiz_patterns();
    let text = text.replace("assistant: ", "");

    let mut questions = Vec::new();
    let mut current: Option<QuestionDraft> = None;

    for line in text.lines() {
        let line = line.trim();

        if let Some(caps) = patterns.question.captures(line) {
            if let Some(draft) = current.take() {
                push_valid(&mut questions, draft);
            }
            current = Some(QuestionDraft::new(&caps[2]));
            continue;
        }

        let Some(draft) = current.as_mut() else {
            continue;
        };

        if let Some(caps) = patterns.option.captures(line) {
            draft.options.push(caps[2].trim().to_string());
        } else if let Some(caps) = patterns.true_false.captures(line) {
            draft.options.push(caps[2].trim().to_string());
        } else if let Some(caps) = patterns.correct_answer.captures(line) {
            draft.correct_answer = Some(caps[1].to_uppercase());
        } else if let Some(caps) = patterns.explanation.captures(line) {
            draft.explanation = Some(caps[1].trim().to_string());
        } else if !line.is_empty() {
            if draft.options.is_empty() {
                draft.question.push(' ');
                draft.question.push_str(line);
            } else if let Some(explanation) = draft.explanation.as_mut() {
                explanation.push(' ');
                explanation.push_str(line);
            }
        }
    }

    if let Some(draft) = current.take() {
        push_valid(&mut questions, draft);
    }

    if questions.is_empty() {
        anyhow::bail!("No valid questions were parsed from the response.");
    }

    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_food_analysis() {
        let response = "1. Pizza (2 slices) - 570 kcal, 70g carbs\n\
                        2. Apple (1) - 95 kcal\n\n\
                        Total: 665 kcal, 95g carbs, 6g fiber, 25g protein, 20g fats\n\
                        Verdict: Not Healthy\n\
                        Facts: Pizza was once a food for the poor.";
        let sections = split_food_analysis(response).unwrap();

        assert!(sections.items.starts_with("1. Pizza"));
        assert!(sections.items.ends_with("95 kcal"));
        assert_eq!(sections.total, "665 kcal, 95g carbs, 6g fiber, 25g protein, 20g fats");
        assert_eq!(sections.verdict, "Not Healthy");
        assert!(!sections.healthy);
        assert_eq!(sections.facts.as_deref(), Some("Pizza was once a food for the poor."));
    }

    #[test]
    fn test_split_food_analysis_without_facts() {
        let sections = split_food_analysis("Salad\nTotal: 120 kcal\nVerdict: Healthy").unwrap();
        assert_eq!(sections.items, "Salad");
        assert!(sections.healthy);
        assert_eq!(sections.facts, None);
    }

    #[test]
    fn test_split_food_analysis_not_enough_sections() {
        assert!(split_food_analysis("I cannot see any food in this picture.").is_none());
        assert!(split_food_analysis("Apple\nTotal: 95 kcal").is_none());
    }

    #[test]
    fn test_split_meal_plan() {
        let plan = "Here is your plan\n\
                    Breakfast:\n\
                    - [Oats with milk: 1 bowl: (300 kcal)]\n\
                    - [Poha: 1 plate: (250 kcal)]\n\
                    \n\
                    lunch:\n\
                    - Dal rice (450 kcal)\n\
                    Pre-Workout:\n\
                    - Give \"Not needed\"\n\
                    Dinner:\n\
                    - Paneer tikka (400 kcal)\n";
        let sections = split_meal_plan(plan);

        let names: Vec<&str> = sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Breakfast", "Lunch", "Pre-Workout", "Dinner"]);
        assert_eq!(
            sections[0].items,
            vec!["- Oats with milk: 1 bowl: (300 kcal)", "- Poha: 1 plate: (250 kcal)"]
        );
        assert_eq!(sections[1].items, vec!["- Dal rice (450 kcal)"]);
    }

    #[test]
    fn test_split_meal_plan_canonical_order() {
        let sections = split_meal_plan("Dinner:\n- Soup\nBreakfast:\n- Eggs");
        assert_eq!(sections[0].name, "Breakfast");
        assert_eq!(sections[1].name, "Dinner");
    }

    #[test]
    fn test_split_recipe() {
        let recipe = "Recipe Name: Oat Banana Pancakes\n\n\
                      Ingredients:\n1. 1 cup oats\n2. 2 ripe bananas\n\n\
                      Steps:\n1. Blend everything.\n2. Cook on a pan.\n\n\
                      Ingredient List: rolled oats, ripe bananas,  , greek yogurt\n\n\
                      Enjoy your breakfast!";
        let sections = split_recipe(recipe);

        assert_eq!(sections.name.as_deref(), Some("Oat Banana Pancakes"));
        assert_eq!(sections.sections.len(), 2);
        assert_eq!(sections.sections[0].title, "Ingredients");
        assert_eq!(sections.sections[0].lines, vec!["1. 1 cup oats", "2. 2 ripe bananas"]);
        assert_eq!(sections.sections[1].title, "Steps");
        assert_eq!(
            sections.ingredients,
            vec!["Rolled Oats", "Ripe Bananas", "Greek Yogurt"]
        );
        assert_eq!(sections.paragraphs, vec!["Enjoy your breakfast!"]);
    }

    #[test]
    fn test_split_recipe_name_without_colon_is_paragraph() {
        let sections = split_recipe("Name of the dish\nAvocado Toast\n\nSteps:\n1. Toast bread.");

        assert_eq!(sections.name, None);
        assert_eq!(sections.paragraphs, vec!["Name of the dish\nAvocado Toast"]);
        assert_eq!(sections.sections[0].title, "Steps");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("GREEK yogurt"), "Greek Yogurt");
        assert_eq!(title_case("extra-virgin olive oil"), "Extra-Virgin Olive Oil");
    }

    const QUIZ: &str = "assistant: Q1. Which vitamin does sunlight help\n\
                        your body make?\n\
                        A. Vitamin A\n\
                        B. Vitamin B12\n\
                        C. Vitamin C\n\
                        D. Vitamin D\n\
                        \n\
                        Correct Answer: D\n\
                        \n\
                        Explanation: Your skin makes vitamin D from UVB light.\n\
                        Ten minutes a day can help.\n\
                        \n\
                        Q2. Bananas are berries.\n\
                        A. True\n\
                        B. False\n\
                        Correct Answer: true\n\
                        Explanation: Botanically, yes!\n\
                        \n\
                        Q3. Broken question with three options\n\
                        A. One\n\
                        B. Two\n\
                        C. Three\n\
                        Correct Answer: A\n\
                        Explanation: Dropped.";

    #[test]
    fn test_parse_quiz() {
        let questions = parse_quiz(QUIZ).unwrap();
        assert_eq!(questions.len(), 2);

        let first = &questions[0];
        assert_eq!(first.question, "Which vitamin does sunlight help your body make?");
        assert_eq!(first.options.len(), 4);
        assert_eq!(first.correct_answer, "D");
        assert_eq!(
            first.explanation,
            "Your skin makes vitamin D from UVB light. Ten minutes a day can help."
        );

        let second = &questions[1];
        assert_eq!(second.options, vec!["True", "False"]);
        assert_eq!(second.correct_answer, "A");
    }

    #[test]
    fn test_parse_quiz_true_false_lines() {
        let text = "Q1. Water has calories.\nTrue: Yes it does\nFalse: No it does not\n\
                    Correct Answer: B\nExplanation: Plain water has zero calories.";
        let questions = parse_quiz(text).unwrap();
        assert_eq!(questions[0].options, vec!["Yes it does", "No it does not"]);
        assert_eq!(questions[0].correct_answer, "B");
    }

    #[test]
    fn test_parse_quiz_rejects_answer_outside_options() {
        let text = "Q1. Pick one\nA. Yes\nB. No\nCorrect Answer: D\nExplanation: Nope.";
        assert!(parse_quiz(text).is_err());
    }

    #[test]
    fn test_parse_quiz_drops_questions_missing_answer_or_explanation() {
        let text = "Q1. No answer given\nA. Yes\nB. No\nExplanation: Forgot the answer.\n\
                    Q2. No explanation\nA. Yes\nB. No\nCorrect Answer: A\n\
                    Q3. Complete one\nA. Kale\nB. Candy\nCorrect Answer: A\nExplanation: Greens win.";
        let questions = parse_quiz(text).unwrap();

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question, "Complete one");
    }

    #[test]
    fn test_parse_quiz_without_questions() {
        let err = parse_quiz("Sorry, I can't help with that.").unwrap_err();
        assert!(err.to_string().contains("No valid questions"));
    }
}
