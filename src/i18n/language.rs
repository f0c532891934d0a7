//! Language type: the two display languages of the site.
//!
//! English is the primary language and is always populated on every record.
//! Arabic is the secondary language and may be partially translated.

use crate::i18n::strings::{LanguageStrings, ARABIC_STRINGS, ENGLISH_STRINGS};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// A display language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "ar")]
    Arabic,
}

impl Language {
    /// Parse a language from its ISO 639-1 code.
    ///
    /// # Example
    /// ```ignore
    /// let arabic = Language::from_code("ar")?;
    /// ```
    pub fn from_code(code: &str) -> Result<Language> {
        match code {
            "en" => Ok(Language::English),
            "ar" => Ok(Language::Arabic),
            _ => bail!("Unknown language code: '{}'", code),
        }
    }

    /// ISO 639-1 language code (e.g., "en", "ar").
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Arabic => "ar",
        }
    }

    /// English name of the language.
    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Arabic => "Arabic",
        }
    }

    /// Native name of the language.
    pub fn native_name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Arabic => "العربية",
        }
    }

    /// Whether this is the primary language every record is authored in.
    pub fn is_primary(&self) -> bool {
        matches!(self, Language::English)
    }

    /// Text direction for the page (`dir` attribute).
    pub fn direction(&self) -> &'static str {
        match self {
            Language::English => "ltr",
            Language::Arabic => "rtl",
        }
    }

    /// The other language.
    pub fn toggled(&self) -> Language {
        match self {
            Language::English => Language::Arabic,
            Language::Arabic => Language::English,
        }
    }

    /// Built-in label table for this language.
    pub fn strings(&self) -> &'static LanguageStrings {
        match self {
            Language::English => &ENGLISH_STRINGS,
            Language::Arabic => &ARABIC_STRINGS,
        }
    }
}
