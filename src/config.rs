use anyhow::{Context, Result};

pub const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_GOOGLE_TRANSLATE_API_URL: &str =
    "https://translation.googleapis.com/language/translate/v2";

#[derive(Debug, Clone)]
pub struct Config {
    // Environment
    pub environment: String,

    // OpenAI (structured product translation)
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_api_url: String,

    // Google Cloud Translation (plain text)
    pub google_translate_api_key: Option<String>,
    pub google_translate_api_url: String,

    // Server
    pub port: u16,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// Upstream credentials are optional here: each endpoint checks for its own
    /// key per request and answers with a configuration error when it is absent.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),

            // OpenAI
            openai_api_key: non_empty_var("OPENAI_API_KEY"),
            openai_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-3.5-turbo".to_string()),
            openai_api_url: std::env::var("OPENAI_API_URL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_API_URL.to_string()),

            // Google Translate
            google_translate_api_key: non_empty_var("GOOGLE_TRANSLATE_API_KEY"),
            google_translate_api_url: std::env::var("GOOGLE_TRANSLATE_API_URL")
                .unwrap_or_else(|_| DEFAULT_GOOGLE_TRANSLATE_API_URL.to_string()),

            // Server
            port: match std::env::var("PORT") {
                Ok(value) => value
                    .parse()
                    .context(format!("PORT is not a valid port number: {}", value))?,
                Err(_) => 8080,
            },
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
