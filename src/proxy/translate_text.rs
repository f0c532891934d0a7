use crate::config::Config;
use crate::proxy::ProxyError;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

const DEFAULT_TARGET_LANG: &str = "ar";
const GENERIC_FAILURE: &str = "Failed to translate text";

/// A single string or an ordered list of strings. Responses keep the shape
/// of the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextPayload {
    Scalar(String),
    Sequence(Vec<String>),
}

impl TextPayload {
    pub fn is_empty(&self) -> bool {
        match self {
            TextPayload::Scalar(text) => text.is_empty(),
            TextPayload::Sequence(items) => items.is_empty(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TextPayload::Scalar(_) => 1,
            TextPayload::Sequence(items) => items.len(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextTranslationRequest {
    #[serde(default)]
    pub text: Option<TextPayload>,
    #[serde(default = "default_target_lang")]
    pub target_lang: String,
}

fn default_target_lang() -> String {
    DEFAULT_TARGET_LANG.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextTranslationResponse {
    #[serde(rename = "translatedText")]
    pub translated_text: TextPayload,
}

#[derive(Debug, Serialize)]
struct GoogleRequest<'a> {
    q: &'a TextPayload,
    target: &'a str,
    format: &'static str,
}

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    data: GoogleData,
}

#[derive(Debug, Deserialize)]
struct GoogleData {
    translations: Vec<GoogleTranslation>,
}

#[derive(Debug, Deserialize)]
struct GoogleTranslation {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: Option<GoogleErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorDetail {
    message: Option<String>,
}

/// Translate plain text with the Cloud Translation v2 API.
pub async fn translate_text(
    client: &reqwest::Client,
    config: &Config,
    request: TextTranslationRequest,
) -> Result<TextTranslationResponse, ProxyError> {
    let text = request
        .text
        .filter(|text| !text.is_empty())
        .ok_or(ProxyError::MissingInput("Missing or empty \"text\" parameter"))?;

    let api_key = config.google_translate_api_key.as_deref().ok_or_else(|| {
        error!("GOOGLE_TRANSLATE_API_KEY is not configured");
        ProxyError::Configuration("Server configuration error: Missing API Key")
    })?;

    debug!(
        "Translating {} text item(s) to '{}'",
        text.len(),
        request.target_lang
    );

    let response = client
        .post(&config.google_translate_api_url)
        .query(&[("key", api_key)])
        .json(&GoogleRequest {
            q: &text,
            target: &request.target_lang,
            format: "text",
        })
        .send()
        .await
        .map_err(|e| {
            // URL carries the key
            error!("Failed to send request to Google Translate: {}", e.without_url());
            ProxyError::Upstream(GENERIC_FAILURE.to_string())
        })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| {
        error!("Failed to read Google Translate response: {}", e.without_url());
        ProxyError::Upstream(GENERIC_FAILURE.to_string())
    })?;

    if !status.is_success() {
        error!("Google Translate API error ({}): {}", status, body);
        let message = serde_json::from_str::<GoogleErrorBody>(&body)
            .ok()
            .and_then(|b| b.error)
            .and_then(|e| e.message)
            .unwrap_or_else(|| GENERIC_FAILURE.to_string());
        return Err(ProxyError::Upstream(message));
    }

    let parsed: GoogleResponse = serde_json::from_str(&body).map_err(|e| {
        error!("Failed to parse Google Translate response: {} (body: {})", e, body);
        ProxyError::Upstream(GENERIC_FAILURE.to_string())
    })?;

    let mut translations = parsed
        .data
        .translations
        .into_iter()
        .map(|t| t.translated_text);

    let translated_text = match text {
        TextPayload::Scalar(_) => TextPayload::Scalar(translations.next().ok_or_else(|| {
            error!("Google Translate returned no translations");
            ProxyError::Upstream(GENERIC_FAILURE.to_string())
        })?),
        TextPayload::Sequence(items) => {
            let translated: Vec<String> = translations.collect();
            if translated.len() != items.len() {
                error!(
                    "Google Translate returned {} translations for {} inputs",
                    translated.len(),
                    items.len()
                );
                return Err(ProxyError::Upstream(GENERIC_FAILURE.to_string()));
            }
            TextPayload::Sequence(translated)
        }
    };

    Ok(TextTranslationResponse { translated_text })
}
