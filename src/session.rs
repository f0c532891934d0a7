//! Per-visitor catalog session.
//!
//! A [`Session`] owns everything that changes while someone browses: their
//! preferences, the exchange rate and the loaded product list. Views are
//! computed from that state on demand, so a toggle shows up in the next view.

use crate::catalog::{resolve, DisplayContent, Product};
use crate::i18n::{Language, LanguageStrings};
use crate::preferences::{PreferenceStorage, Preferences, Theme};
use crate::pricing::{format_price, Currency};
use crate::rate::ExchangeRate;
use crate::store::CatalogStore;
use anyhow::Result;
use serde::Serialize;
use tracing::{info, warn};

/// Number of featured products shown on the home view.
pub const FEATURED_LIMIT: usize = 3;

/// A product as shown to the visitor in their current language and currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductView {
    pub id: i64,
    #[serde(flatten)]
    pub content: DisplayContent,
    pub price: String,
    pub image_url: Option<String>,
    pub gallery: Vec<String>,
    pub is_favorite: bool,
}

#[derive(Debug)]
pub struct Session {
    preferences: Preferences,
    rate: ExchangeRate,
    products: Vec<Product>,
}

impl Session {
    /// Restore preferences, refresh the rate once and load the catalog.
    ///
    /// A failed product fetch is logged and leaves the catalog empty.
    pub async fn start<S: CatalogStore + ?Sized>(
        store: &S,
        storage: PreferenceStorage,
        fallback_rate: f64,
    ) -> Self {
        let preferences = Preferences::load(storage);

        let mut rate = ExchangeRate::new(fallback_rate);
        rate.refresh(store).await;

        let products = load_products(store).await;
        Self::from_parts(preferences, rate, products)
    }

    pub fn from_parts(preferences: Preferences, rate: ExchangeRate, products: Vec<Product>) -> Self {
        Self {
            preferences,
            rate,
            products,
        }
    }

    /// Re-read the exchange rate. Failures keep the current value.
    pub async fn refresh_rate<S: CatalogStore + ?Sized>(&mut self, store: &S) -> f64 {
        self.rate.refresh(store).await
    }

    pub fn language(&self) -> Language {
        self.preferences.language()
    }

    pub fn theme(&self) -> Theme {
        self.preferences.theme()
    }

    pub fn currency(&self) -> Currency {
        self.preferences.currency()
    }

    pub fn rate(&self) -> f64 {
        self.rate.value()
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn strings(&self) -> &'static LanguageStrings {
        self.language().strings()
    }

    pub fn view(&self, product: &Product) -> ProductView {
        let language = self.language();
        ProductView {
            id: product.id,
            content: resolve(product, language),
            price: format_price(product.price_usd, self.currency(), self.rate(), language),
            image_url: product.image_url.clone(),
            gallery: product.gallery.clone(),
            is_favorite: self.preferences.is_favorite(product.id),
        }
    }

    /// The first three featured products, in catalog order.
    pub fn featured(&self) -> Vec<ProductView> {
        self.products
            .iter()
            .filter(|p| p.featured)
            .take(FEATURED_LIMIT)
            .map(|p| self.view(p))
            .collect()
    }

    /// Products whose primary name contains `term` (case-insensitive), limited
    /// to `category` when one is given. An empty category means all.
    pub fn inventory(&self, term: &str, category: Option<&str>) -> Vec<ProductView> {
        let term = term.to_lowercase();
        let category = category.filter(|c| !c.is_empty());

        self.products
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&term))
            .filter(|p| match category {
                Some(wanted) => p.category.as_deref() == Some(wanted),
                None => true,
            })
            .map(|p| self.view(p))
            .collect()
    }

    pub fn favorites(&self) -> Vec<ProductView> {
        self.products
            .iter()
            .filter(|p| self.preferences.is_favorite(p.id))
            .map(|p| self.view(p))
            .collect()
    }

    /// Details for `id`, fetching the catalog first when none is loaded.
    pub async fn open_details<S: CatalogStore + ?Sized>(
        &mut self,
        store: &S,
        id: i64,
    ) -> Option<ProductView> {
        if self.products.is_empty() {
            warn!("Products list empty, re-fetching before showing product {}", id);
            self.products = load_products(store).await;
        }
        self.details(id)
    }

    pub fn details(&self, id: i64) -> Option<ProductView> {
        self.products
            .iter()
            .find(|p| p.id == id)
            .map(|p| self.view(p))
    }

    pub fn toggle_language(&mut self) -> Result<Language> {
        self.preferences.toggle_language()
    }

    pub fn toggle_theme(&mut self) -> Result<Theme> {
        self.preferences.toggle_theme()
    }

    pub fn toggle_currency(&mut self) -> Result<Currency> {
        self.preferences.toggle_currency()
    }

    pub fn toggle_favorite(&mut self, id: i64) -> Result<bool> {
        self.preferences.toggle_favorite(id)
    }
}

/// Fetch the catalog. A failure is logged and yields an empty list.
async fn load_products<S: CatalogStore + ?Sized>(store: &S) -> Vec<Product> {
    match store.fetch_products().await {
        Ok(products) => {
            info!("Loaded {} products", products.len());
            products
        }
        Err(e) => {
            warn!("Failed to load products: {}", e);
            Vec::new()
        }
    }
}
