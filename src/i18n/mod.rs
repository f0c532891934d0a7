//! Internationalization (i18n) for the catalog.
//!
//! # Architecture
//!
//! - `language`: the two display languages (English primary, Arabic secondary)
//! - `strings`: built-in label tables, including the currency labels the price
//!   formatter looks up
//!
//! # Example
//!
//! ```rust,ignore
//! use showroom::i18n::Language;
//!
//! let arabic = Language::from_code("ar")?;
//! assert_eq!(arabic.strings().price_egp, "ج.م");
//! ```

mod language;
mod strings;

pub use language::Language;
pub use strings::{LanguageStrings, ARABIC_STRINGS, ENGLISH_STRINGS};
