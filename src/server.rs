use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::error::ValidationError;
use crate::handlers::{
    articles, calculator, FoodAnalyzer, MealPlanner, NutriBot, NutritionQuiz, RecipeGenerator,
    UNPARSEABLE_ANALYSIS_WARNING,
};
use crate::models::{
    answer_index, answer_label, ActivityLevel, AnalysisRequest, AnswerFeedback, Article,
    BmiResult, CalorieResult, ChatMessage, ChatRole, FoodAnalysisSections, Gender, ImageUpload,
    MealPlan, MealPlanPreferences, QuizScore, Recipe, RecipeType,
};

pub mod sessions;

use sessions::{ChatSession, ChatSessions, QuizSession, QuizSessions};

/// Shared state behind every route. A feature whose backend is not configured is `None`.
pub struct AppState {
    pub food_analyzer: Option<FoodAnalyzer>,
    pub meal_planner: Option<MealPlanner>,
    pub recipe_generator: Option<RecipeGenerator>,
    pub quiz: Option<NutritionQuiz>,
    pub nutribot: Option<NutriBot>,
    pub quiz_sessions: QuizSessions,
    pub chat_sessions: ChatSessions,
    pub articles_path: PathBuf,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

pub enum ApiError {
    Validation(ValidationError),
    NotFound(&'static str),
    Unavailable(&'static str),
    Upstream {
        message: &'static str,
        source: anyhow::Error,
    },
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation(e)
    }
}

impl ApiError {
    /// Validation errors raised inside a handler surface as 400; everything else is an upstream failure.
    fn upstream(message: &'static str, source: anyhow::Error) -> Self {
        match source.downcast::<ValidationError>() {
            Ok(validation) => ApiError::Validation(validation),
            Err(source) => ApiError::Upstream { message, source },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(ValidationError::QuizAlreadySubmitted) => (
                StatusCode::CONFLICT,
                ValidationError::QuizAlreadySubmitted.to_string(),
            ),
            ApiError::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{} not found", what)),
            ApiError::Unavailable(feature) => {
                log::warn!("⚠️ {} requested but its AI backend is not configured", feature);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    format!("{} is not available right now", feature),
                )
            }
            ApiError::Upstream { message, source } => {
                log::error!("❌ {}: {:#}", message, source);
                (StatusCode::BAD_GATEWAY, message.to_string())
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn create_router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/api/food-analysis", post(analyze_food))
        .route("/api/meal-plan", post(create_meal_plan))
        .route("/api/recipes", post(generate_recipe))
        .route("/api/quiz", post(start_quiz))
        .route("/api/quiz/:id/answers", post(answer_question))
        .route("/api/quiz/:id/submit", post(submit_quiz))
        .route("/api/chat", post(chat))
        .route("/api/chat/:id", get(chat_history))
        .route("/api/calculator/bmi", post(calculate_bmi))
        .route("/api/calculator/calories", post(calculate_calories))
        .route("/api/articles", get(list_articles))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root_handler() -> &'static str {
    "NutriAI API - your personal nutrition assistant. See /api/* endpoints."
}

async fn health_check() -> &'static str {
    "OK"
}

#[derive(Debug, Deserialize)]
struct ImageBody {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct FoodAnalysisBody {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    image: Option<ImageBody>,
}

#[derive(Debug, Serialize)]
struct FoodAnalysisResponse {
    raw: String,
    sections: Option<FoodAnalysisSections>,
    warning: Option<&'static str>,
}

async fn analyze_food(
    State(state): State<Arc<AppState>>,
    Json(body): Json<FoodAnalysisBody>,
) -> ApiResult<FoodAnalysisResponse> {
    let analyzer = state
        .food_analyzer
        .as_ref()
        .ok_or(ApiError::Unavailable("Food analysis"))?;

    let image = body
        .image
        .map(|image| ImageUpload::from_base64(&image.mime_type, &image.data))
        .transpose()?;
    let request = AnalysisRequest::from_parts(body.text, image)?;

    let result = analyzer
        .analyze(request)
        .await
        .map_err(|e| ApiError::upstream("Food analysis failed. Please try again later.", e))?;

    let warning = result.sections.is_none().then_some(UNPARSEABLE_ANALYSIS_WARNING);
    Ok(Json(FoodAnalysisResponse {
        raw: result.raw,
        sections: result.sections,
        warning,
    }))
}

async fn create_meal_plan(
    State(state): State<Arc<AppState>>,
    Json(prefs): Json<MealPlanPreferences>,
) -> ApiResult<MealPlan> {
    let planner = state
        .meal_planner
        .as_ref()
        .ok_or(ApiError::Unavailable("Meal planning"))?;
    prefs.validate()?;

    let plan = planner
        .create_meal_plan(&prefs)
        .await
        .map_err(|e| ApiError::upstream("Meal plan generation failed. Please try again later.", e))?;
    Ok(Json(plan))
}

#[derive(Debug, Deserialize)]
struct RecipeBody {
    dish_name: String,
    #[serde(default = "default_recipe_type")]
    recipe_type: RecipeType,
}

fn default_recipe_type() -> RecipeType {
    RecipeType::Normal
}

async fn generate_recipe(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RecipeBody>,
) -> ApiResult<Recipe> {
    let generator = state
        .recipe_generator
        .as_ref()
        .ok_or(ApiError::Unavailable("Recipe generation"))?;

    let recipe = generator
        .generate_recipe(&body.dish_name, body.recipe_type)
        .await
        .map_err(|e| ApiError::upstream("Recipe generation failed. Please try again later.", e))?;
    Ok(Json(recipe))
}

#[derive(Debug, Serialize)]
struct OptionView {
    label: &'static str,
    text: String,
}

#[derive(Debug, Serialize)]
struct QuestionView {
    number: usize,
    question: String,
    options: Vec<OptionView>,
}

#[derive(Debug, Serialize)]
struct QuizCreated {
    session_id: String,
    questions: Vec<QuestionView>,
}

async fn start_quiz(State(state): State<Arc<AppState>>) -> ApiResult<QuizCreated> {
    let quiz = state.quiz.as_ref().ok_or(ApiError::Unavailable("Nutrition quiz"))?;

    let questions = quiz.generate_quiz().await.map_err(|e| {
        ApiError::upstream(
            "An error occurred while generating the quiz. Please try again later.",
            e,
        )
    })?;

    let views = questions
        .iter()
        .enumerate()
        .map(|(i, q)| QuestionView {
            number: i + 1,
            question: q.question.clone(),
            options: q
                .options
                .iter()
                .enumerate()
                .filter_map(|(j, text)| {
                    answer_label(j).map(|label| OptionView {
                        label,
                        text: text.clone(),
                    })
                })
                .collect(),
        })
        .collect();

    let session_id = state.quiz_sessions.insert(QuizSession::new(questions)).await;
    log::info!("🧠 Quiz session {} started", session_id);

    Ok(Json(QuizCreated {
        session_id,
        questions: views,
    }))
}

#[derive(Debug, Deserialize)]
struct AnswerBody {
    /// One-based question number.
    question: usize,
    answer: String,
}

#[derive(Debug, Serialize)]
struct AnswerRecorded {
    answered: usize,
    total: usize,
}

async fn answer_question(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<AnswerBody>,
) -> ApiResult<AnswerRecorded> {
    let recorded = state
        .quiz_sessions
        .update(&id, |session| -> Result<AnswerRecorded, ValidationError> {
            if session.submitted {
                return Err(ValidationError::QuizAlreadySubmitted);
            }
            let index = body
                .question
                .checked_sub(1)
                .filter(|i| *i < session.questions.len())
                .ok_or(ValidationError::UnknownQuestion(body.question))?;

            let label = body.answer.trim().to_ascii_uppercase();
            match answer_index(&label) {
                Some(option) if option < session.questions[index].options.len() => {}
                _ => {
                    return Err(ValidationError::InvalidAnswer {
                        question: body.question,
                        answer: body.answer.clone(),
                    })
                }
            }

            session.answers.insert(index, label);
            Ok(AnswerRecorded {
                answered: session.answers.len(),
                total: session.questions.len(),
            })
        })
        .await
        .ok_or(ApiError::NotFound("Quiz session"))??;

    Ok(Json(recorded))
}

#[derive(Debug, Serialize)]
struct QuestionResult {
    number: usize,
    your_answer: String,
    your_option: Option<String>,
    correct_option: Option<String>,
    #[serde(flatten)]
    feedback: AnswerFeedback,
}

#[derive(Debug, Serialize)]
struct QuizResults {
    results: Vec<QuestionResult>,
    score: QuizScore,
}

async fn submit_quiz(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<QuizResults> {
    let session = state
        .quiz_sessions
        .update(&id, |session| -> Result<QuizSession, ValidationError> {
            if session.answers.len() < session.questions.len() {
                return Err(ValidationError::IncompleteQuiz);
            }
            session.submitted = true;
            Ok(session.clone())
        })
        .await
        .ok_or(ApiError::NotFound("Quiz session"))??;

    let results = session
        .questions
        .iter()
        .enumerate()
        .map(|(i, question)| {
            let your_answer = session.answers.get(&i).cloned().unwrap_or_default();
            QuestionResult {
                number: i + 1,
                your_option: question.option_for(&your_answer).map(str::to_string),
                correct_option: question
                    .option_for(&question.correct_answer)
                    .map(str::to_string),
                feedback: NutritionQuiz::check_answer(question, &your_answer),
                your_answer,
            }
        })
        .collect();

    let score = NutritionQuiz::score(&session.questions, &session.answers);
    log::info!("📊 Quiz session {} scored {}/{}", id, score.correct, score.total);

    Ok(Json(QuizResults { results, score }))
}

#[derive(Debug, Deserialize)]
struct ChatBody {
    #[serde(default)]
    session_id: Option<String>,
    message: String,
}

#[derive(Debug, Serialize)]
struct ChatReply {
    session_id: String,
    reply: String,
}

async fn chat(State(state): State<Arc<AppState>>, Json(body): Json<ChatBody>) -> ApiResult<ChatReply> {
    let bot = state.nutribot.as_ref().ok_or(ApiError::Unavailable("NutriBot"))?;

    let message = body.message.trim();
    if message.is_empty() {
        return Err(ValidationError::MissingField("message").into());
    }

    let session_id = match body.session_id {
        Some(id) => {
            if state.chat_sessions.get(&id).await.is_none() {
                return Err(ApiError::NotFound("Chat session"));
            }
            id
        }
        None => state.chat_sessions.insert(ChatSession::default()).await,
    };

    let reply = bot.ask_question(message).await;

    let user_message = ChatMessage::new(ChatRole::User, message);
    let bot_message = ChatMessage::new(ChatRole::Assistant, reply.clone());
    state
        .chat_sessions
        .update(&session_id, |session| {
            session.messages.push(user_message);
            session.messages.push(bot_message);
        })
        .await
        .ok_or(ApiError::NotFound("Chat session"))?;

    Ok(Json(ChatReply { session_id, reply }))
}

#[derive(Debug, Serialize)]
struct ChatHistory {
    session_id: String,
    messages: Vec<ChatMessage>,
}

async fn chat_history(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<ChatHistory> {
    let session = state
        .chat_sessions
        .get(&id)
        .await
        .ok_or(ApiError::NotFound("Chat session"))?;
    Ok(Json(ChatHistory {
        session_id: id,
        messages: session.messages,
    }))
}

#[derive(Debug, Deserialize)]
struct BmiBody {
    weight_kg: f64,
    height_cm: f64,
}

async fn calculate_bmi(Json(body): Json<BmiBody>) -> ApiResult<BmiResult> {
    Ok(Json(calculator::bmi(body.weight_kg, body.height_cm)?))
}

#[derive(Debug, Deserialize)]
struct CaloriesBody {
    gender: Gender,
    weight_kg: f64,
    height_cm: f64,
    age: f64,
    activity_level: ActivityLevel,
}

async fn calculate_calories(Json(body): Json<CaloriesBody>) -> ApiResult<CalorieResult> {
    let result = calculator::maintenance_calories(
        body.gender,
        body.weight_kg,
        body.height_cm,
        body.age,
        body.activity_level,
    )?;
    Ok(Json(result))
}

async fn list_articles(State(state): State<Arc<AppState>>) -> Json<Vec<Article>> {
    Json(articles::load_articles(&state.articles_path).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::nutribot::NUTRIBOT_APOLOGY;
    use crate::services::ai_service::testing::StubAIService;
    use crate::services::AIService;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request};
    use base64::{engine::general_purpose, Engine};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const QUIZ_REPLY: &str = "Q1. Spinach is rich in iron.\nA. True\nB. False\nCorrect Answer: A\n\
                              Explanation: It has lots of non-heme iron.\n\
                              Q2. Which has the most vitamin C?\nA. Guava\nB. Rice\nC. Bread\nD. Butter\n\
                              Correct Answer: A\nExplanation: Guava beats oranges.";

    fn state_with(ai: Arc<dyn AIService>) -> Arc<AppState> {
        Arc::new(AppState {
            food_analyzer: Some(FoodAnalyzer::new(ai.clone())),
            meal_planner: Some(MealPlanner::new(ai.clone())),
            recipe_generator: Some(RecipeGenerator::new(ai.clone())),
            quiz: Some(NutritionQuiz::new(ai.clone(), 2)),
            nutribot: Some(NutriBot::new(ai)),
            quiz_sessions: QuizSessions::new(),
            chat_sessions: ChatSessions::new(),
            articles_path: PathBuf::from("/nonexistent/article.yml"),
        })
    }

    fn app_replying(reply: &str) -> Router {
        create_router(state_with(Arc::new(StubAIService::replying(reply))), 1024 * 1024)
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ));
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let app = app_replying("");
        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::String("OK".into()));
    }

    #[tokio::test]
    async fn test_food_analysis_text() {
        let app = app_replying("1. Samosa - 260 kcal\nTotal: 260 kcal\nVerdict: Not Healthy\nFacts: Fried.");
        let (status, body) = send(&app, Method::POST, "/api/food-analysis", Some(json!({"text": "1 samosa"}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sections"]["total"], "260 kcal");
        assert_eq!(body["sections"]["healthy"], false);
        assert!(body["warning"].is_null());
    }

    #[tokio::test]
    async fn test_food_analysis_unparseable_gives_warning() {
        let app = app_replying("I only see a cat.");
        let (status, body) = send(&app, Method::POST, "/api/food-analysis", Some(json!({"text": "cat"}))).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["sections"].is_null());
        assert_eq!(body["warning"], UNPARSEABLE_ANALYSIS_WARNING);
    }

    #[tokio::test]
    async fn test_food_analysis_input_validation() {
        let app = app_replying("unused");
        let png = general_purpose::STANDARD.encode([0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);

        let (status, _) = send(&app, Method::POST, "/api/food-analysis", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let both = json!({"text": "rice", "image": {"mime_type": "image/png", "data": png}});
        let (status, body) = send(&app, Method::POST, "/api/food-analysis", Some(both)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("not both or neither"));

        let gif = json!({"image": {"mime_type": "image/gif", "data": png}});
        let (status, _) = send(&app, Method::POST, "/api/food-analysis", Some(gif)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let ok = json!({"image": {"mime_type": "image/png", "data": png}});
        let (status, body) = send(&app, Method::POST, "/api/food-analysis", Some(ok)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["raw"], "unused");
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let app = create_router(state_with(Arc::new(StubAIService::replying("unused"))), 1024);
        let big = json!({"text": "rice ".repeat(1024)});
        let (status, _) = send(&app, Method::POST, "/api/food-analysis", Some(big)).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_backend_failure_is_bad_gateway() {
        let app = create_router(state_with(Arc::new(StubAIService::failing("boom"))), 1024);
        let (status, body) = send(&app, Method::POST, "/api/food-analysis", Some(json!({"text": "tea"}))).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(!body["error"].as_str().unwrap().contains("boom"));
    }

    #[tokio::test]
    async fn test_unconfigured_feature_is_unavailable() {
        let state = Arc::new(AppState {
            food_analyzer: None,
            meal_planner: None,
            recipe_generator: None,
            quiz: None,
            nutribot: None,
            quiz_sessions: QuizSessions::new(),
            chat_sessions: ChatSessions::new(),
            articles_path: PathBuf::from("/nonexistent"),
        });
        let app = create_router(state, 1024);

        let (status, _) = send(&app, Method::POST, "/api/quiz", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (status, body) = send(&app, Method::GET, "/api/articles", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_meal_plan() {
        let app = app_replying("Breakfast:\n- [Upma (250 kcal)]\nDinner:\n- Khichdi (350 kcal)");
        let prefs = json!({
            "gender": "male",
            "goal": "Maintain weight",
            "diet": "Vegan",
            "issue": "Other",
            "custom_issue": "peanut allergy",
            "works_out": true,
            "height": "175cm",
            "weight": "70kg",
            "cuisine": "Indian type"
        });
        let (status, body) = send(&app, Method::POST, "/api/meal-plan", Some(prefs)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sections"][0]["name"], "Breakfast");
        assert_eq!(body["sections"][0]["items"][0], "- Upma (250 kcal)");
        assert_eq!(body["sections"][1]["name"], "Dinner");
    }

    #[tokio::test]
    async fn test_meal_plan_missing_field() {
        let app = app_replying("unused");
        let prefs = json!({
            "gender": "male", "goal": " ", "diet": "Vegan", "works_out": false,
            "height": "175cm", "weight": "70kg", "cuisine": "Continental type"
        });
        let (status, body) = send(&app, Method::POST, "/api/meal-plan", Some(prefs)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("goal"));
    }

    #[tokio::test]
    async fn test_recipe() {
        let app = app_replying("Recipe Name: Sprout Salad\n\nSteps:\n1. Mix.\n\nIngredient List: sprouts, onion");
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/recipes",
            Some(json!({"dish_name": "salad", "recipe_type": "new_healthy"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Sprout Salad");
        assert_eq!(body["ingredients"], json!(["Sprouts", "Onion"]));

        let (status, _) = send(&app, Method::POST, "/api/recipes", Some(json!({"dish_name": ""}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_quiz_flow() {
        let app = app_replying(QUIZ_REPLY);

        let (status, created) = send(&app, Method::POST, "/api/quiz", None).await;
        assert_eq!(status, StatusCode::OK);
        let id = created["session_id"].as_str().unwrap().to_string();
        assert_eq!(created["questions"].as_array().unwrap().len(), 2);
        assert_eq!(created["questions"][1]["options"][0]["label"], "A");
        assert!(created["questions"][0].get("correct_answer").is_none());

        let answers = format!("/api/quiz/{}/answers", id);
        let submit = format!("/api/quiz/{}/submit", id);

        let (status, _) = send(&app, Method::POST, &answers, Some(json!({"question": 1, "answer": "C"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, Method::POST, &answers, Some(json!({"question": 1, "answer": "a"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answered"], 1);

        let (status, _) = send(&app, Method::POST, &submit, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, Method::POST, &answers, Some(json!({"question": 2, "answer": "B"}))).await;
        assert_eq!(status, StatusCode::OK);

        let (status, results) = send(&app, Method::POST, &submit, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(results["score"]["correct"], 1);
        assert_eq!(results["score"]["total"], 2);
        assert_eq!(results["score"]["tier"], "needs_improvement");
        assert_eq!(results["results"][0]["is_correct"], true);
        assert_eq!(results["results"][1]["your_option"], "Rice");
        assert_eq!(results["results"][1]["correct_option"], "Guava");

        let (status, _) = send(&app, Method::POST, &answers, Some(json!({"question": 2, "answer": "A"}))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send(&app, Method::POST, "/api/quiz/unknown/submit", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_chat_keeps_history() {
        let app = app_replying("Drink water!");

        let (status, first) = send(&app, Method::POST, "/api/chat", Some(json!({"message": "Tips?"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["reply"], "Drink water!");
        let id = first["session_id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/chat",
            Some(json!({"session_id": id, "message": "More?"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, history) = send(&app, Method::GET, &format!("/api/chat/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        let messages = history["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[3]["role"], "assistant");

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/chat",
            Some(json!({"session_id": "nope", "message": "hi"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_chat_backend_failure_still_replies() {
        let app = create_router(state_with(Arc::new(StubAIService::failing("down"))), 1024);
        let (status, body) = send(&app, Method::POST, "/api/chat", Some(json!({"message": "hi"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reply"], NUTRIBOT_APOLOGY);
    }

    #[tokio::test]
    async fn test_calculators() {
        let app = app_replying("unused");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/calculator/bmi",
            Some(json!({"weight_kg": 70.0, "height_cm": 175.0})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["category"], "healthy");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/calculator/calories",
            Some(json!({
                "gender": "female", "weight_kg": 60.0, "height_cm": 165.0,
                "age": 25.0, "activity_level": "sedentary"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!((body["calories"].as_f64().unwrap() - 1345.25 * 1.2).abs() < 1e-6);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/calculator/bmi",
            Some(json!({"weight_kg": 0.0, "height_cm": 175.0})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
