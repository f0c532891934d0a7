//! Persisted visitor preferences: language, theme, currency and favorites.
//!
//! Values live in a flat key-value file, one string per key, the same shape a
//! browser's local storage has. Each key is read on its own, so a bad value
//! only resets that one preference.

use crate::i18n::Language;
use crate::pricing::Currency;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const LANGUAGE_KEY: &str = "lang";
pub const THEME_KEY: &str = "theme";
pub const CURRENCY_KEY: &str = "currency";
pub const FAVORITES_KEY: &str = "favorites";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn from_code(code: &str) -> Result<Theme> {
        match code {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => bail!("Unknown theme: '{}'", code),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(&self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// File-backed string key-value storage.
#[derive(Debug)]
pub struct PreferenceStorage {
    path: PathBuf,
    items: BTreeMap<String, String>,
}

impl PreferenceStorage {
    /// Open storage at `path`. A missing file is empty storage; an unreadable
    /// or malformed file is logged and treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let items = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!("Ignoring malformed preferences file {}: {}", path.display(), e);
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!("Failed to read preferences file {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };

        Self { path, items }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get_item(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }

    /// Store `value` under `key` and write the file. On failure the stored
    /// items are left as they were.
    pub fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        let mut items = self.items.clone();
        items.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .context(format!("Failed to create directory {}", parent.display()))?;
        }
        let contents =
            serde_json::to_string_pretty(&items).context("Failed to encode preferences")?;
        fs::write(&self.path, contents)
            .context(format!("Failed to write preferences to {}", self.path.display()))?;

        self.items = items;
        Ok(())
    }
}

/// Restored preferences, written back on every change.
#[derive(Debug)]
pub struct Preferences {
    storage: PreferenceStorage,
    language: Language,
    theme: Theme,
    currency: Currency,
    favorites: Vec<i64>,
}

impl Preferences {
    /// Restore preferences from storage, using defaults for missing or
    /// unrecognized values.
    pub fn load(storage: PreferenceStorage) -> Self {
        let language = read_or_default(&storage, LANGUAGE_KEY, Language::from_code);
        let theme = read_or_default(&storage, THEME_KEY, Theme::from_code);
        let currency = read_or_default(&storage, CURRENCY_KEY, Currency::from_code);
        let favorites = read_or_default(&storage, FAVORITES_KEY, |raw| {
            serde_json::from_str::<Vec<i64>>(raw).context("favorites is not a list of ids")
        });

        Self {
            storage,
            language,
            theme,
            currency,
            favorites,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn favorites(&self) -> &[i64] {
        &self.favorites
    }

    pub fn is_favorite(&self, id: i64) -> bool {
        self.favorites.contains(&id)
    }

    pub fn set_language(&mut self, language: Language) -> Result<()> {
        self.storage.set_item(LANGUAGE_KEY, language.code())?;
        self.language = language;
        Ok(())
    }

    pub fn toggle_language(&mut self) -> Result<Language> {
        self.set_language(self.language.toggled())?;
        Ok(self.language)
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        self.storage.set_item(THEME_KEY, theme.code())?;
        self.theme = theme;
        Ok(())
    }

    pub fn toggle_theme(&mut self) -> Result<Theme> {
        self.set_theme(self.theme.toggled())?;
        Ok(self.theme)
    }

    pub fn set_currency(&mut self, currency: Currency) -> Result<()> {
        self.storage.set_item(CURRENCY_KEY, currency.code())?;
        self.currency = currency;
        Ok(())
    }

    pub fn toggle_currency(&mut self) -> Result<Currency> {
        self.set_currency(self.currency.toggled())?;
        Ok(self.currency)
    }

    /// Add or remove `id` from favorites. Returns whether it is now a favorite.
    pub fn toggle_favorite(&mut self, id: i64) -> Result<bool> {
        let mut favorites = self.favorites.clone();
        let now_favorite = match favorites.iter().position(|&f| f == id) {
            Some(index) => {
                favorites.remove(index);
                false
            }
            None => {
                favorites.push(id);
                true
            }
        };

        let encoded = serde_json::to_string(&favorites).context("Failed to encode favorites")?;
        self.storage.set_item(FAVORITES_KEY, &encoded)?;
        self.favorites = favorites;
        Ok(now_favorite)
    }
}

fn read_or_default<T, F>(storage: &PreferenceStorage, key: &str, parse: F) -> T
where
    T: Default,
    F: FnOnce(&str) -> Result<T>,
{
    match storage.get_item(key) {
        Some(raw) => parse(raw).unwrap_or_else(|e| {
            warn!("Ignoring stored {} preference: {}", key, e);
            T::default()
        }),
        None => T::default(),
    }
}
