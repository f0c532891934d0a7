use crate::catalog::{Details, Product};
use crate::i18n::Language;
use serde::Serialize;

/// Display-ready content for one product in one language.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayContent {
    pub name: String,
    pub description: String,
    pub category: Option<String>,
    pub details: Details,
}

/// Resolve a product's display content for `language`.
///
/// Each field falls back to English on its own: a product may carry an Arabic
/// name with an untranslated description, or translate only the fuel type.
/// Blank Arabic values count as missing.
pub fn resolve(product: &Product, language: Language) -> DisplayContent {
    if language.is_primary() {
        return DisplayContent {
            name: product.name.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            details: product.details.clone(),
        };
    }

    let details_ar = product.details_ar.as_ref();

    DisplayContent {
        name: pick(&product.name, product.name_ar.as_deref()),
        description: pick(&product.description, product.description_ar.as_deref()),
        category: product
            .category
            .as_deref()
            .map(|category| pick(category, product.category_ar.as_deref())),
        details: Details {
            mileage: pick(
                &product.details.mileage,
                details_ar.and_then(|d| d.mileage.as_deref()),
            ),
            transmission: pick(
                &product.details.transmission,
                details_ar.and_then(|d| d.transmission.as_deref()),
            ),
            fuel: pick(
                &product.details.fuel,
                details_ar.and_then(|d| d.fuel.as_deref()),
            ),
        },
    }
}

fn pick(primary: &str, secondary: Option<&str>) -> String {
    match secondary {
        Some(value) if !value.trim().is_empty() => value.to_string(),
        _ => primary.to_string(),
    }
}
