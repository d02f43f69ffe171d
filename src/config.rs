use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::services::Provider;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_QUIZ_NUM_QUESTIONS: usize = 5;
pub const DEFAULT_ARTICLES_PATH: &str = "yaml/article.yml";

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const GEMINI_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Clone, PartialEq)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub vision_model: String,
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

/// Runtime settings, read from the environment (and `.env` via dotenv).
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub ai_timeout: Duration,
    pub max_upload_bytes: usize,
    pub quiz_num_questions: usize,
    pub articles_path: PathBuf,
    pub gemini: Option<GeminiConfig>,
    pub groq: Option<BackendConfig>,
    pub together: Option<BackendConfig>,
    pub mistral: Option<BackendConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. A backend without an API key is left out.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let gemini = get("GOOGLE_API_KEY").map(|api_key| {
            let model = get("GEMINI_MODEL").unwrap_or_else(|| GEMINI_MODEL.to_string());
            GeminiConfig {
                api_key,
                vision_model: get("GEMINI_VISION_MODEL").unwrap_or_else(|| model.clone()),
                model,
                base_url: get("GEMINI_BASE_URL").unwrap_or_else(|| GEMINI_BASE_URL.to_string()),
            }
        });

        let backend = |provider: Provider| {
            let prefix = provider.env_prefix();
            get(&format!("{}_API_KEY", prefix)).map(|api_key| BackendConfig {
                api_key,
                model: get(&format!("{}_MODEL", prefix))
                    .unwrap_or_else(|| provider.default_model().to_string()),
                base_url: get(&format!("{}_BASE_URL", prefix))
                    .unwrap_or_else(|| provider.default_base_url().to_string()),
            })
        };

        let ai_timeout_secs: u64 = parse_or(get("AI_TIMEOUT_SECS"), "AI_TIMEOUT_SECS", DEFAULT_AI_TIMEOUT_SECS)?;
        let quiz_num_questions: usize =
            parse_or(get("QUIZ_NUM_QUESTIONS"), "QUIZ_NUM_QUESTIONS", DEFAULT_QUIZ_NUM_QUESTIONS)?;
        if quiz_num_questions == 0 {
            anyhow::bail!("QUIZ_NUM_QUESTIONS must be at least 1");
        }

        Ok(Self {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            ai_timeout: Duration::from_secs(ai_timeout_secs),
            max_upload_bytes: parse_or(get("MAX_UPLOAD_BYTES"), "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            quiz_num_questions,
            articles_path: get("ARTICLES_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ARTICLES_PATH)),
            gemini,
            groq: backend(Provider::Groq),
            together: backend(Provider::Together),
            mistral: backend(Provider::Mistral),
        })
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{} must be a number, got '{}'", key, raw)),
        None => Ok(default),
    }
}
