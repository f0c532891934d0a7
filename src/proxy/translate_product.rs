use crate::catalog::DetailsOverride;
use crate::config::Config;
use crate::proxy::ProxyError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::{debug, error};

const SYSTEM_PROMPT: &str = "You are a professional automotive translator. \
Translate the JSON object you receive (with 'name', 'description' and 'details') into Arabic. \
Reply with ONLY a JSON object with the keys 'name_ar', 'description_ar' and 'details_ar'. \
'details_ar' must hold the translated 'mileage', 'transmission' and 'fuel' strings. \
Keep the original structure and do not add any other text.";

const TEMPERATURE: f32 = 0.3;

/// Body of a structured translation request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductTranslationRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Forwarded to the model as-is.
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

impl ProductTranslationRequest {
    fn has_text(&self) -> bool {
        let present = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.is_empty());
        present(&self.name) || present(&self.description)
    }
}

/// Arabic fields returned by the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductTranslation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_ar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_ar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details_ar: Option<DetailsOverride>,
}

/// The supplied English fields, as sent to the model.
#[derive(Debug, Serialize)]
struct SourceFields<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct UpstreamError {
    error: UpstreamErrorDetail,
}

#[derive(Debug, Deserialize)]
struct UpstreamErrorDetail {
    message: String,
}

/// Translate a product's English fields into Arabic with the chat completion API.
///
/// Input is validated before the credential check, and neither failure makes
/// an upstream call.
pub async fn translate_product(
    client: &reqwest::Client,
    config: &Config,
    request: ProductTranslationRequest,
) -> Result<ProductTranslation, ProxyError> {
    if !request.has_text() {
        return Err(ProxyError::MissingInput("No text provided to translate."));
    }

    let api_key = config.openai_api_key.as_deref().ok_or_else(|| {
        error!("OPENAI_API_KEY is not configured");
        ProxyError::Configuration("OPENAI_API_KEY environment variable not set.")
    })?;

    let source = SourceFields {
        name: request.name.as_deref(),
        description: request.description.as_deref(),
        details: request.details.as_ref(),
    };
    let user_content = serde_json::to_string(&source)
        .map_err(|e| ProxyError::InvalidBody(e.to_string()))?;

    let chat_request = ChatRequest {
        model: config.openai_model.clone(),
        messages: vec![
            Message {
                role: "system".to_string(),
                content: SYSTEM_PROMPT.to_string(),
            },
            Message {
                role: "user".to_string(),
                content: user_content,
            },
        ],
        temperature: TEMPERATURE,
    };

    let response = client
        .post(&config.openai_api_url)
        .header("Authorization", format!("Bearer {}", api_key))
        .header("Content-Type", "application/json")
        .json(&chat_request)
        .send()
        .await
        .map_err(|e| {
            error!("Failed to send translation request to OpenAI API: {}", e);
            ProxyError::Upstream("Failed to reach the translation service.".to_string())
        })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| {
        error!("Failed to read OpenAI response body: {}", e);
        ProxyError::Upstream("Failed to read the translation response.".to_string())
    })?;

    if let Ok(upstream) = serde_json::from_str::<UpstreamError>(&body) {
        error!("OpenAI API error ({}): {}", status, body);
        return Err(ProxyError::Upstream(format!(
            "OpenAI Error: {}",
            upstream.error.message
        )));
    }

    if !status.is_success() {
        error!("OpenAI API error ({}): {}", status, body);
        return Err(ProxyError::Upstream(format!(
            "OpenAI request failed with status {}",
            status.as_u16()
        )));
    }

    let chat_response: ChatResponse = serde_json::from_str(&body).map_err(|e| {
        error!("Failed to parse OpenAI response: {} (body: {})", e, body);
        ProxyError::Upstream("Unexpected response from the translation service.".to_string())
    })?;

    let content = chat_response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or_else(|| ProxyError::Upstream("OpenAI response contained no choices".to_string()))?;

    extract_translation(&content)
}

/// Parse the model's reply into a [`ProductTranslation`].
///
/// Strict parse first; if that fails, parse the span from the first `{` to the
/// last `}` so replies wrapped in prose or a markdown fence still work.
pub fn extract_translation(content: &str) -> Result<ProductTranslation, ProxyError> {
    match serde_json::from_str(content.trim()) {
        Ok(translation) => return Ok(translation),
        Err(e) => debug!("Strict parse of model reply failed: {}", e),
    }

    let span = object_span(content).ok_or(ProxyError::Parse)?;
    serde_json::from_str(span).map_err(|e| {
        debug!("Recovered span did not parse: {}", e);
        ProxyError::Parse
    })
}

fn object_span(content: &str) -> Option<&str> {
    static OBJECT_SPAN: OnceLock<Regex> = OnceLock::new();
    OBJECT_SPAN
        .get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("object span pattern is valid"))
        .find(content)
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{body_partial_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn create_test_config(api_url: &str) -> Config {
        Config {
            environment: "test".to_string(),
            openai_api_key: Some("test-openai-key".to_string()),
            openai_model: "gpt-3.5-turbo".to_string(),
            openai_api_url: api_url.to_string(),
            google_translate_api_key: None,
            google_translate_api_url: "http://unused.test".to_string(),
            port: 8080,
        }
    }

    fn create_openai_response(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "choices": [
                {
                    "index": 0,
                    "message": {"role": "assistant", "content": content},
                    "finish_reason": "stop"
                }
            ]
        })
    }

    fn create_request() -> ProductTranslationRequest {
        ProductTranslationRequest {
            name: Some("Toyota Land Cruiser".to_string()),
            description: Some("Reliable off-road SUV".to_string()),
            details: Some(serde_json::json!({
                "mileage": "20,000 km",
                "transmission": "Automatic",
                "fuel": "Petrol"
            })),
        }
    }

    // ==================== Extraction Tests ====================

    #[test]
    fn test_extract_plain_json() {
        let translation = extract_translation(
            r#"{"name_ar": "تويوتا", "description_ar": "سيارة", "details_ar": {"fuel": "بنزين"}}"#,
        )
        .expect("Should parse");

        assert_eq!(translation.name_ar.as_deref(), Some("تويوتا"));
        assert_eq!(translation.description_ar.as_deref(), Some("سيارة"));
        assert_eq!(
            translation.details_ar.and_then(|d| d.fuel).as_deref(),
            Some("بنزين")
        );
    }

    #[test]
    fn test_extract_markdown_fenced_json() {
        let content = "```json\n{\"name_ar\":\"x\",\"description_ar\":\"y\",\"details_ar\":{\"mileage\":\"z\"}}\n```";
        let translation = extract_translation(content).expect("Should recover");

        assert_eq!(translation.name_ar.as_deref(), Some("x"));
        assert_eq!(translation.description_ar.as_deref(), Some("y"));
        assert_eq!(
            translation.details_ar.and_then(|d| d.mileage).as_deref(),
            Some("z")
        );
    }

    #[test]
    fn test_extract_json_wrapped_in_prose() {
        let content = "Sure! Here is the translation:\n{\"name_ar\": \"لاند كروزر\"}\nLet me know if you need more.";
        let translation = extract_translation(content).expect("Should recover");
        assert_eq!(translation.name_ar.as_deref(), Some("لاند كروزر"));
        assert_eq!(translation.details_ar, None);
    }

    #[test]
    fn test_extract_without_object_fails() {
        let err = extract_translation("I cannot translate this.").unwrap_err();
        assert!(matches!(err, ProxyError::Parse));
        assert_eq!(err.to_string(), "Failed to parse AI response as JSON.");
    }

    #[test]
    fn test_extract_unparseable_span_fails() {
        let err = extract_translation("Here: {name_ar: broken}").unwrap_err();
        assert!(matches!(err, ProxyError::Parse));
    }

    #[test]
    fn test_extract_rejects_wrong_field_types() {
        let err = extract_translation(r#"{"name_ar": 42}"#).unwrap_err();
        assert!(matches!(err, ProxyError::Parse));
    }

    // ==================== Validation Tests ====================

    #[tokio::test]
    async fn test_missing_name_and_description_fails_fast() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let config = create_test_config(&format!("{}/v1/chat/completions", mock_server.uri()));
        let client = reqwest::Client::new();
        let request = ProductTranslationRequest {
            name: Some(String::new()),
            description: None,
            details: create_request().details,
        };

        let err = translate_product(&client, &config, request)
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::MissingInput(_)));
        assert_eq!(err.to_string(), "No text provided to translate.");
    }

    #[tokio::test]
    async fn test_missing_credential_makes_no_upstream_call() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let mut config = create_test_config(&format!("{}/v1/chat/completions", mock_server.uri()));
        config.openai_api_key = None;
        let client = reqwest::Client::new();

        let err = translate_product(&client, &config, create_request())
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::Configuration(_)));
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    // ==================== Upstream Tests ====================

    #[tokio::test]
    async fn test_translate_product_success() {
        let mock_server = MockServer::start().await;

        let reply = "```json\n{\"name_ar\": \"تويوتا لاند كروزر\", \"description_ar\": \"سيارة دفع رباعي موثوقة\", \"details_ar\": {\"mileage\": \"٢٠٬٠٠٠ كم\", \"transmission\": \"أوتوماتيك\", \"fuel\": \"بنزين\"}}\n```";

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-openai-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-3.5-turbo",
                "temperature": 0.3
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(create_openai_response(reply)))
            .expect(1)
            .mount(&mock_server)
            .await;

        let config = create_test_config(&format!("{}/v1/chat/completions", mock_server.uri()));
        let client = reqwest::Client::new();

        let translation = translate_product(&client, &config, create_request())
            .await
            .expect("Should succeed");

        assert_eq!(translation.name_ar.as_deref(), Some("تويوتا لاند كروزر"));
        let details = translation.details_ar.expect("details_ar present");
        assert_eq!(details.transmission.as_deref(), Some("أوتوماتيك"));
    }

    #[tokio::test]
    async fn test_upstream_error_message_is_passed_through() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
            })))
            .mount(&mock_server)
            .await;

        let config = create_test_config(&format!("{}/v1/chat/completions", mock_server.uri()));
        let client = reqwest::Client::new();

        let err = translate_product(&client, &config, create_request())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "OpenAI Error: Incorrect API key provided");
    }

    #[tokio::test]
    async fn test_upstream_raw_body_is_not_leaked() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>secret gateway page</html>"))
            .mount(&mock_server)
            .await;

        let config = create_test_config(&format!("{}/v1/chat/completions", mock_server.uri()));
        let client = reqwest::Client::new();

        let err = translate_product(&client, &config, create_request())
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::Upstream(_)));
        assert!(!err.to_string().contains("secret"));
        assert!(err.to_string().contains("502"));
    }

    #[tokio::test]
    async fn test_empty_choices_is_upstream_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&mock_server)
            .await;

        let config = create_test_config(&format!("{}/v1/chat/completions", mock_server.uri()));
        let client = reqwest::Client::new();

        let err = translate_product(&client, &config, create_request())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no choices"));
    }

    #[tokio::test]
    async fn test_unparseable_model_reply_is_parse_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(create_openai_response("Sorry, I can't help with that.")),
            )
            .mount(&mock_server)
            .await;

        let config = create_test_config(&format!("{}/v1/chat/completions", mock_server.uri()));
        let client = reqwest::Client::new();

        let err = translate_product(&client, &config, create_request())
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::Parse));
    }

    // ==================== Request Structure Tests ====================

    #[test]
    fn test_source_fields_omit_absent_values() {
        let source = SourceFields {
            name: Some("Car"),
            description: None,
            details: None,
        };
        let json = serde_json::to_string(&source).expect("Should serialize");
        assert_eq!(json, r#"{"name":"Car"}"#);
    }

    #[test]
    fn test_chat_request_serialization() {
        let request = ChatRequest {
            model: "gpt-3.5-turbo".to_string(),
            messages: vec![Message {
                role: "system".to_string(),
                content: SYSTEM_PROMPT.to_string(),
            }],
            temperature: TEMPERATURE,
        };

        let json = serde_json::to_string(&request).expect("Should serialize");
        assert!(json.contains("gpt-3.5-turbo"));
        assert!(json.contains("0.3"));
        assert!(json.contains("name_ar"));
        assert!(json.contains("details_ar"));
    }

    #[test]
    fn test_request_accepts_any_details_json() {
        let request: ProductTranslationRequest = serde_json::from_str(
            r#"{"name": "Car", "details": {"mileage": 12000, "transmission": null, "doors": 4}}"#,
        )
        .expect("Should parse");

        let source = SourceFields {
            name: request.name.as_deref(),
            description: None,
            details: request.details.as_ref(),
        };
        let json = serde_json::to_value(&source).expect("Should serialize");
        assert_eq!(json["details"]["mileage"], 12000);
        assert_eq!(json["details"]["doors"], 4);
    }

    #[tokio::test]
    async fn test_numeric_details_are_forwarded_to_model() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(create_openai_response(r#"{"name_ar": "سيارة"}"#)),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let config = create_test_config(&format!("{}/v1/chat/completions", mock_server.uri()));
        let client = reqwest::Client::new();
        let request: ProductTranslationRequest =
            serde_json::from_str(r#"{"name": "Car", "details": {"mileage": 12000}}"#)
                .expect("Should parse");

        let translation = translate_product(&client, &config, request)
            .await
            .expect("Should succeed");
        assert_eq!(translation.name_ar.as_deref(), Some("سيارة"));

        let received = mock_server.received_requests().await.expect("recording enabled");
        let body: serde_json::Value =
            serde_json::from_slice(&received[0].body).expect("JSON body");
        let user_content = body["messages"][1]["content"].as_str().expect("user message");
        assert!(user_content.contains(r#""mileage":12000"#));
    }
}
