use crate::store::CatalogStore;
use tracing::{info, warn};

/// Settings row holding the USD→EGP rate.
pub const RATE_SETTING_KEY: &str = "USD_TO_EGP";

/// Rate used until a refresh from the settings store succeeds.
pub const FALLBACK_USD_TO_EGP: f64 = 50.0;

/// Session-scoped USD→EGP exchange rate.
///
/// Starts at a fallback constant and is only replaced by a successful
/// [`refresh`](ExchangeRate::refresh). Failed refreshes keep the last known
/// good value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExchangeRate {
    value: f64,
}

impl ExchangeRate {
    pub fn new(fallback: f64) -> Self {
        Self { value: fallback }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Read the rate from the settings store once.
    ///
    /// Returns the rate in effect afterwards. Missing rows, unparseable values
    /// and store errors are logged and leave the current value in place.
    pub async fn refresh<S: CatalogStore + ?Sized>(&mut self, store: &S) -> f64 {
        match store.fetch_setting(RATE_SETTING_KEY).await {
            Ok(Some(raw)) => match parse_rate(&raw) {
                Some(rate) => {
                    info!("Exchange rate refreshed: {} -> {}", self.value, rate);
                    self.value = rate;
                }
                None => warn!(
                    "Ignoring malformed {} value {:?}, keeping {}",
                    RATE_SETTING_KEY, raw, self.value
                ),
            },
            Ok(None) => warn!(
                "No {} setting found, keeping {}",
                RATE_SETTING_KEY, self.value
            ),
            Err(e) => warn!("Failed to fetch exchange rate, keeping {}: {}", self.value, e),
        }

        self.value
    }
}

impl Default for ExchangeRate {
    fn default() -> Self {
        Self::new(FALLBACK_USD_TO_EGP)
    }
}

fn parse_rate(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|rate| rate.is_finite())
}
