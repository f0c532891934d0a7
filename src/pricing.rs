use crate::i18n::{Language, LanguageStrings};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Label used when no table provides one for US dollars.
const FALLBACK_USD_LABEL: &str = "USD";

/// Label used when no table provides one for the local currency.
const FALLBACK_LOCAL_LABEL: &str = "L.E";

/// Digits the site's number formatter keeps after the decimal point.
const MAX_FRACTION_DIGITS: usize = 3;

/// Display currency. Prices are stored in USD; `Egp` is the local currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[serde(rename = "USD")]
    Usd,
    #[default]
    #[serde(rename = "EGP")]
    Egp,
}

impl Currency {
    pub fn from_code(code: &str) -> Result<Currency> {
        match code {
            "USD" => Ok(Currency::Usd),
            "EGP" => Ok(Currency::Egp),
            _ => bail!("Unknown currency code: '{}'", code),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Egp => "EGP",
        }
    }

    pub fn toggled(&self) -> Currency {
        match self {
            Currency::Usd => Currency::Egp,
            Currency::Egp => Currency::Usd,
        }
    }

    /// Label for this currency in `labels`, or the literal fallback.
    pub fn label(&self, labels: Option<&LanguageStrings>) -> &'static str {
        match (self, labels) {
            (Currency::Usd, Some(labels)) => labels.price_usd,
            (Currency::Egp, Some(labels)) => labels.price_egp,
            (Currency::Usd, None) => FALLBACK_USD_LABEL,
            (Currency::Egp, None) => FALLBACK_LOCAL_LABEL,
        }
    }
}

/// Format a USD amount for display using the built-in label table of `language`.
///
/// ```ignore
/// assert_eq!(format_price(1000.0, Currency::Usd, 50.0, Language::English), "$1,000");
/// assert_eq!(format_price(1000.0, Currency::Egp, 50.0, Language::English), "50,000 L.E");
/// ```
pub fn format_price(amount_usd: f64, currency: Currency, rate: f64, language: Language) -> String {
    format_price_with_labels(amount_usd, currency, rate, language, Some(language.strings()))
}

/// Format a USD amount with an explicit label table (`None` when the table
/// could not be loaded).
pub fn format_price_with_labels(
    amount_usd: f64,
    currency: Currency,
    rate: f64,
    language: Language,
    labels: Option<&LanguageStrings>,
) -> String {
    let symbol = currency.label(labels);
    match currency {
        Currency::Usd if language.is_primary() && symbol == FALLBACK_USD_LABEL => {
            format!("${}", group_thousands(amount_usd))
        }
        Currency::Usd => format!("{} {}", group_thousands(amount_usd), symbol),
        Currency::Egp => format!("{} {}", group_thousands(amount_usd * rate), symbol),
    }
}

/// Render a number with comma thousands separators.
///
/// The fractional part keeps at most three digits, rounded half away from
/// zero, with trailing zeros dropped. This matches how the site's number
/// formatter renders the raw product of price and rate. No currency rounding
/// is applied.
pub fn group_thousands(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-∞" } else { "∞" }.to_string();
    }

    let (integer, fraction) = round_half_away(value.abs());
    let fraction = fraction.trim_end_matches('0');

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3 + fraction.len() + 2);
    let is_zero = integer.bytes().all(|b| b == b'0') && fraction.is_empty();
    if value < 0.0 && !is_zero {
        grouped.push('-');
    }

    let len = integer.len();
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    if !fraction.is_empty() {
        grouped.push('.');
        grouped.push_str(fraction);
    }

    grouped
}

/// Round a non-negative finite value to [`MAX_FRACTION_DIGITS`] places, ties
/// away from zero. Returns the integer and fraction digits.
///
/// Rounding works on the shortest decimal that round-trips to `value`, so
/// `1.0005` is a tie even though the stored double is slightly below it.
fn round_half_away(value: f64) -> (String, String) {
    let shortest = value.to_string();
    let (integer, fraction) = shortest.split_once('.').unwrap_or((shortest.as_str(), ""));

    let mut digits: Vec<u8> = integer
        .bytes()
        .chain(
            fraction
                .bytes()
                .chain(std::iter::repeat(b'0'))
                .take(MAX_FRACTION_DIGITS),
        )
        .collect();

    let round_up = fraction
        .as_bytes()
        .get(MAX_FRACTION_DIGITS)
        .is_some_and(|&next| next >= b'5');
    if round_up {
        let mut carried = true;
        for digit in digits.iter_mut().rev() {
            if *digit == b'9' {
                *digit = b'0';
            } else {
                *digit += 1;
                carried = false;
                break;
            }
        }
        if carried {
            digits.insert(0, b'1');
        }
    }

    let split = digits.len() - MAX_FRACTION_DIGITS;
    let to_string = |bytes: &[u8]| bytes.iter().map(|&b| char::from(b)).collect::<String>();
    (to_string(&digits[..split]), to_string(&digits[split..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::{ARABIC_STRINGS, ENGLISH_STRINGS};

    // ==================== Grouping Tests ====================

    #[test]
    fn test_group_thousands_integers() {
        assert_eq!(group_thousands(0.0), "0");
        assert_eq!(group_thousands(999.0), "999");
        assert_eq!(group_thousands(1000.0), "1,000");
        assert_eq!(group_thousands(50000.0), "50,000");
        assert_eq!(group_thousands(1234567.0), "1,234,567");
        assert_eq!(group_thousands(100000000.0), "100,000,000");
    }

    #[test]
    fn test_group_thousands_fractions() {
        assert_eq!(group_thousands(12345.5), "12,345.5");
        assert_eq!(group_thousands(0.25), "0.25");
        assert_eq!(group_thousands(1.23456), "1.235");
        assert_eq!(group_thousands(1999.9999), "2,000");
    }

    #[test]
    fn test_group_thousands_ties_round_away_from_zero() {
        assert_eq!(group_thousands(47.0625), "47.063");
        assert_eq!(group_thousands(0.0625), "0.063");
        assert_eq!(group_thousands(0.0005), "0.001");
        assert_eq!(group_thousands(-2.0625), "-2.063");
        assert_eq!(group_thousands(999.9995), "1,000");
        assert_eq!(
            format_price(1.0, Currency::Egp, 47.0625, Language::English),
            "47.063 L.E"
        );
    }

    #[test]
    fn test_group_thousands_rounds_shortest_decimal() {
        // stored just below 1.0005, still rendered as a tie
        assert_eq!(group_thousands(1.0005), "1.001");
        assert_eq!(group_thousands(2.0624), "2.062");
        assert_eq!(group_thousands(0.0000001), "0");
    }

    #[test]
    fn test_group_thousands_negative_and_non_finite() {
        assert_eq!(group_thousands(-1500.0), "-1,500");
        assert_eq!(group_thousands(-0.0001), "0");
        assert_eq!(group_thousands(f64::NAN), "NaN");
        assert_eq!(group_thousands(f64::INFINITY), "∞");
    }

    // ==================== USD Tests ====================

    #[test]
    fn test_usd_primary_uses_dollar_glyph() {
        assert_eq!(
            format_price(1000.0, Currency::Usd, 50.0, Language::English),
            "$1,000"
        );
        assert_eq!(
            format_price(180000.0, Currency::Usd, 47.02, Language::English),
            "$180,000"
        );
    }

    #[test]
    fn test_usd_ignores_rate() {
        let a = format_price(2500.0, Currency::Usd, 1.0, Language::English);
        let b = format_price(2500.0, Currency::Usd, 99.0, Language::English);
        assert_eq!(a, b);
    }

    #[test]
    fn test_usd_secondary_uses_label() {
        assert_eq!(
            format_price(1000.0, Currency::Usd, 50.0, Language::Arabic),
            format!("1,000 {}", ARABIC_STRINGS.price_usd)
        );
    }

    #[test]
    fn test_usd_without_table_falls_back_to_label() {
        assert_eq!(
            format_price_with_labels(1000.0, Currency::Usd, 50.0, Language::English, None),
            "$1,000"
        );
        assert_eq!(
            format_price_with_labels(1000.0, Currency::Usd, 50.0, Language::Arabic, None),
            "1,000 USD"
        );
    }

    #[test]
    fn test_usd_primary_with_non_literal_label() {
        let labels = LanguageStrings {
            price_usd: "US$",
            ..ENGLISH_STRINGS
        };
        assert_eq!(
            format_price_with_labels(1000.0, Currency::Usd, 50.0, Language::English, Some(&labels)),
            "1,000 US$"
        );
    }

    // ==================== Local Currency Tests ====================

    #[test]
    fn test_local_multiplies_by_rate() {
        assert_eq!(
            format_price(1000.0, Currency::Egp, 50.0, Language::English),
            "50,000 L.E"
        );
        assert_eq!(format_price(10.0, Currency::Egp, 50.0, Language::English), "500 L.E");
        assert_eq!(format_price(10.0, Currency::Egp, 55.5, Language::English), "555 L.E");
    }

    #[test]
    fn test_local_keeps_fractional_result() {
        assert_eq!(
            format_price(1000.0, Currency::Egp, 47.02, Language::English),
            "47,020 L.E"
        );
        assert_eq!(
            format_price(3.0, Currency::Egp, 0.5, Language::English),
            "1.5 L.E"
        );
    }

    #[test]
    fn test_local_secondary_label() {
        assert_eq!(
            format_price(1000.0, Currency::Egp, 50.0, Language::Arabic),
            format!("50,000 {}", ARABIC_STRINGS.price_egp)
        );
    }

    #[test]
    fn test_local_without_table_uses_literal_label() {
        assert_eq!(
            format_price_with_labels(1000.0, Currency::Egp, 50.0, Language::Arabic, None),
            "50,000 L.E"
        );
    }

    // ==================== Currency Tests ====================

    #[test]
    fn test_currency_codes() {
        assert_eq!(Currency::from_code("USD").ok(), Some(Currency::Usd));
        assert_eq!(Currency::from_code("EGP").ok(), Some(Currency::Egp));
        assert!(Currency::from_code("usd").is_err());
        assert_eq!(Currency::Usd.toggled(), Currency::Egp);
        assert_eq!(Currency::default(), Currency::Egp);
    }
}
