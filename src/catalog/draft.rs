use crate::catalog::{Details, DetailsOverride};
use serde::{Deserialize, Serialize};

/// English fields of a product being edited in the admin panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub details: Details,
}

/// Arabic fields produced by translating a [`ProductDraft`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArabicFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_ar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_ar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_ar: Option<String>,
    #[serde(default, skip_serializing_if = "DetailsOverride::is_empty")]
    pub details_ar: DetailsOverride,
}

/// Number of entries in a translation batch.
pub const BATCH_LEN: usize = 6;

impl ProductDraft {
    /// Ordered batch sent to the plain-text translation endpoint:
    /// name, description, category, mileage, transmission, fuel.
    /// Absent values are sent as empty strings so positions stay stable.
    pub fn translation_batch(&self) -> Vec<String> {
        vec![
            self.name.clone().unwrap_or_default(),
            self.description.clone().unwrap_or_default(),
            self.category.clone().unwrap_or_default(),
            self.details.mileage.clone(),
            self.details.transmission.clone(),
            self.details.fuel.clone(),
        ]
    }

    /// Whether the draft has anything worth translating.
    pub fn has_text(&self) -> bool {
        self.translation_batch()
            .iter()
            .any(|value| !value.trim().is_empty())
    }

    /// Map a translated batch back onto Arabic fields by position.
    /// Missing or empty entries leave the field absent.
    pub fn apply_translations(&self, translated: &[String]) -> ArabicFields {
        let at = |index: usize| {
            translated
                .get(index)
                .filter(|value| !value.trim().is_empty())
                .cloned()
        };

        ArabicFields {
            name_ar: at(0),
            description_ar: at(1),
            category_ar: at(2),
            details_ar: DetailsOverride {
                mileage: at(3),
                transmission: at(4),
                fuel: at(5),
            },
        }
    }
}

/// Image stored for new products saved without an upload.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://placehold.co/600x400?text=No+Image";

/// The admin product form: translatable draft plus listing metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductForm {
    #[serde(flatten)]
    pub draft: ProductDraft,
    #[serde(default)]
    pub price_usd: f64,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Row written to the `products` table when the admin saves.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPayload {
    pub name: String,
    pub price_usd: f64,
    pub category: String,
    pub featured: bool,
    pub description: String,
    pub details: Details,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gallery: Option<Vec<String>>,
    #[serde(flatten)]
    pub arabic: ArabicFields,
}

impl ProductForm {
    /// Build the row to write, merging in whatever Arabic fields are available.
    ///
    /// An uploaded image replaces `image_url`; a new product also starts its
    /// gallery with it. A new product without an image gets the placeholder
    /// and an empty gallery. Edits without an image leave both untouched.
    pub fn payload(&self, arabic: ArabicFields, is_new: bool) -> ProductPayload {
        let image = self.image_url.as_deref().filter(|url| !url.trim().is_empty());
        let (image_url, gallery) = match (image, is_new) {
            (Some(url), true) => (Some(url.to_string()), Some(vec![url.to_string()])),
            (Some(url), false) => (Some(url.to_string()), None),
            (None, true) => (Some(PLACEHOLDER_IMAGE_URL.to_string()), Some(Vec::new())),
            (None, false) => (None, None),
        };

        ProductPayload {
            name: self.draft.name.clone().unwrap_or_default(),
            price_usd: self.price_usd,
            category: self.draft.category.clone().unwrap_or_default(),
            featured: self.featured,
            description: self.draft.description.clone().unwrap_or_default(),
            details: self.draft.details.clone(),
            image_url,
            gallery,
            arabic,
        }
    }
}
