//! HTTP proxy in front of the two translation providers.
//!
//! `POST /functions/v1/translate-product` turns English product fields into
//! Arabic ones through a chat-completion model. `POST /functions/v1/translate-text`
//! translates a string or a list of strings through Cloud Translation. Both
//! answer `OPTIONS` preflights, and every response carries the CORS headers.

mod translate_product;
mod translate_text;

pub use translate_product::{
    extract_translation, translate_product, ProductTranslation, ProductTranslationRequest,
};
pub use translate_text::{
    translate_text, TextPayload, TextTranslationRequest, TextTranslationResponse,
};

use crate::config::Config;
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub const TRANSLATE_PRODUCT_PATH: &str = "/functions/v1/translate-product";
pub const TRANSLATE_TEXT_PATH: &str = "/functions/v1/translate-text";
pub const ALLOWED_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("{0}")]
    MissingInput(&'static str),

    #[error("{0}")]
    Configuration(&'static str),

    #[error("{0}")]
    Upstream(String),

    #[error("Failed to parse AI response as JSON.")]
    Parse,
}

/// JSON error payload: `{"error": "<message>"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ProxyError {
    fn into_response_with(self, status: StatusCode) -> Response {
        warn!("Request failed ({}): {}", status.as_u16(), self);
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub client: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            client: reqwest::Client::new(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            TRANSLATE_PRODUCT_PATH,
            post(translate_product_handler).options(preflight),
        )
        .route(
            TRANSLATE_TEXT_PATH,
            post(translate_text_handler).options(preflight),
        )
        .route("/health", get(health))
        .layer(middleware::map_response(with_cors_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind to `0.0.0.0:<port>` and serve until the process stops.
pub async fn serve(config: Config) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind {}", addr))?;

    info!("Translation proxy listening on {}", addr);
    axum::serve(listener, router(AppState::new(config)))
        .await
        .context("Server error")?;

    Ok(())
}

async fn preflight() -> &'static str {
    "ok"
}

async fn health() -> &'static str {
    "OK"
}

async fn with_cors_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    response
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ProxyError> {
    serde_json::from_slice(body).map_err(|e| ProxyError::InvalidBody(e.to_string()))
}

async fn translate_product_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let result = match parse_body::<ProductTranslationRequest>(&body) {
        Ok(request) => translate_product(&state.client, &state.config, request).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(translation) => Json(translation).into_response(),
        Err(e) => e.into_response_with(StatusCode::BAD_REQUEST),
    }
}

async fn translate_text_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let result = match parse_body::<TextTranslationRequest>(&body) {
        Ok(request) => translate_text(&state.client, &state.config, request).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            let status = match e {
                ProxyError::MissingInput(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            e.into_response_with(status)
        }
    }
}
