//! REST client for the hosted backend (PostgREST tables plus edge functions).

use crate::catalog::{
    ArabicFields, Inquiry, NewInquiry, Product, ProductDraft, ProductForm, ProductPayload,
};
use crate::proxy::TextPayload;
use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to send {operation} request: {source}")]
    Request {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{operation} failed ({status}): {message}")]
    Http {
        operation: &'static str,
        status: u16,
        message: String,
    },

    #[error("Failed to decode {operation} response: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("No active session: {0} requires a signed-in user")]
    MissingSession(&'static str),

    #[error("Unexpected {0} response shape")]
    UnexpectedShape(&'static str),
}

/// Read access the catalog needs from the backend.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All products, newest first. No pagination.
    async fn fetch_products(&self) -> Result<Vec<Product>, StoreError>;

    /// Value of the `settings` row keyed `key`, or `None` when the row is missing.
    async fn fetch_setting(&self, key: &str) -> Result<Option<String>, StoreError>;
}

#[derive(Debug, Deserialize)]
struct SettingRow {
    value: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct SettingUpsert<'a> {
    key: &'a str,
    value: &'a str,
}

#[derive(Debug, Serialize)]
struct TranslateTextBody<'a> {
    text: &'a TextPayload,
    target_lang: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateTextReply {
    translated_text: TextPayload,
}

#[derive(Debug, Deserialize)]
struct FunctionError {
    error: String,
}

/// Result of an admin save. The row is written even when translation fails.
#[derive(Debug)]
pub struct SavedProduct {
    pub arabic: ArabicFields,
    pub translation_error: Option<StoreError>,
}

/// Client for the hosted backend's REST and function endpoints.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(client: reqwest::Client, base_url: &str, anon_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn function_url(&self, name: &str) -> String {
        format!("{}/functions/v1/{}", self.base_url, name)
    }

    fn authorize(&self, request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .header(
                "Authorization",
                format!("Bearer {}", token.unwrap_or(&self.anon_key)),
            )
    }

    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<reqwest::Response, StoreError> {
        let response = request
            .send()
            .await
            .map_err(|source| StoreError::Request { operation, source })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<FunctionError>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(StoreError::Http {
                operation,
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<T, StoreError> {
        self.send(operation, request)
            .await?
            .json()
            .await
            .map_err(|source| StoreError::Decode { operation, source })
    }

    /// Insert or replace a settings row.
    pub async fn upsert_setting(
        &self,
        key: &str,
        value: &str,
        access_token: Option<&str>,
    ) -> Result<(), StoreError> {
        let request = self
            .authorize(self.client.post(self.table_url("settings")), access_token)
            .header("Prefer", "resolution=merge-duplicates")
            .json(&SettingUpsert { key, value });
        self.send("settings upsert", request).await?;
        debug!("Upserted setting {}", key);
        Ok(())
    }

    /// Contact-form submissions, newest first.
    pub async fn list_inquiries(
        &self,
        access_token: Option<&str>,
    ) -> Result<Vec<Inquiry>, StoreError> {
        let request = self
            .authorize(self.client.get(self.table_url("inquiries")), access_token)
            .query(&[("select", "*"), ("order", "created_at.desc")]);
        self.send_json("inquiries fetch", request).await
    }

    pub async fn submit_inquiry(&self, inquiry: &NewInquiry) -> Result<(), StoreError> {
        let request = self
            .authorize(self.client.post(self.table_url("inquiries")), None)
            .header("Prefer", "return=minimal")
            .json(inquiry);
        self.send("inquiry insert", request).await?;
        Ok(())
    }

    /// Invoke the plain-text translation function as a signed-in user.
    /// Without a token no request is made.
    pub async fn translate_text(
        &self,
        text: &TextPayload,
        target_lang: &str,
        access_token: Option<&str>,
    ) -> Result<TextPayload, StoreError> {
        let token = access_token.ok_or(StoreError::MissingSession("translate-text"))?;
        let request = self
            .authorize(self.client.post(self.function_url("translate-text")), Some(token))
            .json(&TranslateTextBody { text, target_lang });
        let reply: TranslateTextReply = self.send_json("translate-text", request).await?;
        Ok(reply.translated_text)
    }

    /// Translate an admin draft in one batched call and map the result back
    /// onto the Arabic fields.
    pub async fn translate_draft(
        &self,
        draft: &ProductDraft,
        access_token: Option<&str>,
    ) -> Result<ArabicFields, StoreError> {
        let batch = TextPayload::Sequence(draft.translation_batch());
        match self.translate_text(&batch, "ar", access_token).await? {
            TextPayload::Sequence(translated) => Ok(draft.apply_translations(&translated)),
            TextPayload::Scalar(_) => Err(StoreError::UnexpectedShape("translate-text")),
        }
    }

    pub async fn insert_product(
        &self,
        product: &ProductPayload,
        access_token: Option<&str>,
    ) -> Result<(), StoreError> {
        let request = self
            .authorize(self.client.post(self.table_url("products")), access_token)
            .header("Prefer", "return=minimal")
            .json(product);
        self.send("product insert", request).await?;
        Ok(())
    }

    pub async fn update_product(
        &self,
        id: i64,
        product: &ProductPayload,
        access_token: Option<&str>,
    ) -> Result<(), StoreError> {
        let filter = format!("eq.{}", id);
        let request = self
            .authorize(self.client.patch(self.table_url("products")), access_token)
            .query(&[("id", filter.as_str())])
            .header("Prefer", "return=minimal")
            .json(product);
        self.send("product update", request).await?;
        Ok(())
    }

    pub async fn delete_product(&self, id: i64, access_token: Option<&str>) -> Result<(), StoreError> {
        let filter = format!("eq.{}", id);
        let request = self
            .authorize(self.client.delete(self.table_url("products")), access_token)
            .query(&[("id", filter.as_str())]);
        self.send("product delete", request).await?;
        info!("Deleted product {}", id);
        Ok(())
    }

    /// Translate the form's English fields, then insert a new row or update
    /// `editing_id`. A failed translation is logged and reported in the
    /// result; the row is saved without Arabic fields.
    pub async fn save_product(
        &self,
        form: &ProductForm,
        editing_id: Option<i64>,
        access_token: Option<&str>,
    ) -> Result<SavedProduct, StoreError> {
        let (arabic, translation_error) = if form.draft.has_text() {
            match self.translate_draft(&form.draft, access_token).await {
                Ok(arabic) => (arabic, None),
                Err(e) => {
                    warn!("Translation failed, saving without Arabic fields: {}", e);
                    (ArabicFields::default(), Some(e))
                }
            }
        } else {
            (ArabicFields::default(), None)
        };

        let payload = form.payload(arabic.clone(), editing_id.is_none());
        match editing_id {
            Some(id) => self.update_product(id, &payload, access_token).await?,
            None => self.insert_product(&payload, access_token).await?,
        }

        Ok(SavedProduct {
            arabic,
            translation_error,
        })
    }
}

#[async_trait]
impl CatalogStore for SupabaseClient {
    async fn fetch_products(&self) -> Result<Vec<Product>, StoreError> {
        let request = self
            .authorize(self.client.get(self.table_url("products")), None)
            .query(&[("select", "*"), ("order", "created_at.desc")]);
        self.send_json("products fetch", request).await
    }

    async fn fetch_setting(&self, key: &str) -> Result<Option<String>, StoreError> {
        let filter = format!("eq.{}", key);
        let request = self
            .authorize(self.client.get(self.table_url("settings")), None)
            .query(&[("select", "value"), ("key", filter.as_str())]);
        let rows: Vec<SettingRow> = self.send_json("settings fetch", request).await?;

        Ok(rows.into_iter().next().and_then(|row| match row.value {
            serde_json::Value::Null => None,
            serde_json::Value::String(value) => Some(value),
            other => Some(other.to_string()),
        }))
    }
}
