pub mod ai_service;
pub mod chat_completions; // Groq, Together AI, Mistral AI
pub mod gemini; // Google Generative AI

pub use ai_service::{AIService, PromptRequest};
pub use chat_completions::{ChatCompletionsService, Provider};
pub use gemini::GeminiService;
