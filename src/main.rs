mod config;
mod error;
mod handlers;
mod models;
mod prompts;
mod sectionizer;
mod services;

#[cfg(feature = "web-server")]
mod server;

use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;
use std::time::Duration;

use config::{BackendConfig, Config};
use services::{AIService, ChatCompletionsService, GeminiService, Provider};

fn chat_backend(
    provider: Provider,
    config: Option<&BackendConfig>,
    timeout: Duration,
) -> Result<Option<Arc<dyn AIService>>> {
    match config {
        Some(config) => {
            let service: Arc<dyn AIService> =
                Arc::new(ChatCompletionsService::new(provider, config, timeout)?);
            log::info!("✅ {} backend initialized with model: {}", provider, config.model);
            Ok(Some(service))
        }
        None => {
            log::warn!("⚠️ {}_API_KEY not set, features using {} are disabled", provider.env_prefix(), provider);
            Ok(None)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init();

    log::info!("🚀 Starting NutriAI...");

    let config = Config::from_env()?;

    let gemini: Option<Arc<dyn AIService>> = match &config.gemini {
        Some(gemini) => {
            let service: Arc<dyn AIService> = Arc::new(GeminiService::new(gemini, config.ai_timeout)?);
            log::info!(
                "✅ Gemini backend initialized with model: {} (vision: {})",
                gemini.model,
                gemini.vision_model
            );
            Some(service)
        }
        None => {
            log::warn!("⚠️ GOOGLE_API_KEY not set, food analysis is disabled");
            None
        }
    };
    let groq = chat_backend(Provider::Groq, config.groq.as_ref(), config.ai_timeout)?;
    let together = chat_backend(Provider::Together, config.together.as_ref(), config.ai_timeout)?;
    let mistral = chat_backend(Provider::Mistral, config.mistral.as_ref(), config.ai_timeout)?;

    run(config, gemini, groq, together, mistral).await
}

#[cfg(feature = "web-server")]
async fn run(
    config: Config,
    gemini: Option<Arc<dyn AIService>>,
    groq: Option<Arc<dyn AIService>>,
    together: Option<Arc<dyn AIService>>,
    mistral: Option<Arc<dyn AIService>>,
) -> Result<()> {
    use handlers::{FoodAnalyzer, MealPlanner, NutriBot, NutritionQuiz, RecipeGenerator};
    use server::{create_router, sessions::SessionStore, AppState};

    let state = Arc::new(AppState {
        food_analyzer: gemini.map(FoodAnalyzer::new),
        meal_planner: together.clone().map(MealPlanner::new),
        recipe_generator: mistral.map(RecipeGenerator::new),
        quiz: groq.map(|ai| NutritionQuiz::new(ai, config.quiz_num_questions)),
        nutribot: together.map(NutriBot::new),
        quiz_sessions: SessionStore::new(),
        chat_sessions: SessionStore::new(),
        articles_path: config.articles_path.clone(),
    });

    let app = create_router(state, config.max_upload_bytes);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    log::info!("🌐 HTTP server listening on {}", config.bind_addr);
    log::info!("🎉 NutriAI is ready!");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            log::info!("🛑 Shutting down...");
        })
        .await?;

    Ok(())
}

#[cfg(not(feature = "web-server"))]
async fn run(
    _config: Config,
    _gemini: Option<Arc<dyn AIService>>,
    _groq: Option<Arc<dyn AIService>>,
    _together: Option<Arc<dyn AIService>>,
    _mistral: Option<Arc<dyn AIService>>,
) -> Result<()> {
    log::warn!("⚠️ Built without the web-server feature, nothing to serve");
    Ok(())
}
