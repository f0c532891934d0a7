//! Catalog records as stored in the hosted backend.
//!
//! - `localize`: per-field English/Arabic resolution for display
//! - `draft`: admin-side translation batch and save payload for a product being edited

mod draft;
mod localize;

pub use draft::{
    ArabicFields, ProductDraft, ProductForm, ProductPayload, BATCH_LEN, PLACEHOLDER_IMAGE_URL,
};
pub use localize::{resolve, DisplayContent};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Read a JSON `null` as the type's default value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Vehicle specification fields in the primary language.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Details {
    #[serde(default, deserialize_with = "null_as_default")]
    pub mileage: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub transmission: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fuel: String,
}

/// Partial secondary-language override of [`Details`]. Any subset may be present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailsOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mileage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transmission: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel: Option<String>,
}

impl DetailsOverride {
    pub fn is_empty(&self) -> bool {
        self.mileage.is_none() && self.transmission.is_none() && self.fuel.is_none()
    }
}

/// A vehicle listing (row of the `products` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub name_ar: Option<String>,
    #[serde(default)]
    pub description_ar: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub details: Details,
    #[serde(default)]
    pub details_ar: Option<DetailsOverride>,
    pub price_usd: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub category_ar: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub featured: bool,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub gallery: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A contact-form submission (row of the `inquiries` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inquiry {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub vehicle_name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Payload for inserting an inquiry; the store assigns `id` and `created_at`.
#[derive(Debug, Clone, Serialize)]
pub struct NewInquiry {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
