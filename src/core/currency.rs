use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Number of fractional digits carried by amounts in the base unit.
pub const AMOUNT_SCALE: u32 = 2;

/// Number of fractional digits carried by exchange rates.
pub const RATE_SCALE: u32 = 4;

/// ISO 4217-style currency code.
///
/// Supports standard fiat currencies (EUR, USD, CZK, etc.) as well as
/// arbitrary identifiers for informal units a group may want to track.
///
/// # Examples
///
/// ```
/// use expense_clearing::core::currency::CurrencyCode;
///
/// let eur = CurrencyCode::new("EUR");
/// let usd = CurrencyCode::new("USD");
/// assert_ne!(eur, usd);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Errors arising from currency rate operations.
#[derive(Debug, Error)]
pub enum RateError {
    #[error("no rate registered for currency {code}")]
    UnknownCurrency { code: CurrencyCode },
    #[error("rate must be positive, got {rate} for {code}")]
    InvalidRate { code: CurrencyCode, rate: Decimal },
}

/// A currency code together with its resolved conversion rate.
///
/// `rate_to_base` is the value of one unit of the currency expressed in
/// the base unit of account. Rates are group-scoped: two groups may
/// register the same code at different rates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyRate {
    pub code: CurrencyCode,
    pub rate_to_base: Decimal,
}

impl CurrencyRate {
    /// Create a resolved rate. The rate is normalized to [`RATE_SCALE`].
    pub fn new(code: CurrencyCode, rate_to_base: Decimal) -> Self {
        Self {
            code,
            rate_to_base: rate_to_base.round_dp(RATE_SCALE),
        }
    }

    /// Convert an amount in this currency to the base unit,
    /// rounded to [`AMOUNT_SCALE`].
    pub fn to_base(&self, amount: Decimal) -> Decimal {
        (amount * self.rate_to_base).round_dp(AMOUNT_SCALE)
    }
}

impl fmt::Display for CurrencyRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.code, self.rate_to_base)
    }
}

/// Group-scoped rate table for converting currencies to the base unit.
///
/// Each group carries its own table; tables are independent values and
/// never shared. Used to resolve an expense's currency code into a
/// [`CurrencyRate`] before the balance calculation runs.
///
/// # Examples
///
/// ```
/// use expense_clearing::core::currency::{CurrencyCode, RateTable};
/// use rust_decimal_macros::dec;
///
/// let mut rates = RateTable::new();
/// rates.set_rate(CurrencyCode::new("USD"), dec!(0.9200)).unwrap();
///
/// let converted = rates.convert(dec!(100), &CurrencyCode::new("USD")).unwrap();
/// assert_eq!(converted, dec!(92.00));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RateTable {
    /// code -> value of one unit in the base unit.
    rates: HashMap<CurrencyCode, Decimal>,
}

impl RateTable {
    /// Create an empty rate table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rate: 1 unit of `code` = `rate_to_base` base units.
    ///
    /// The rate is normalized to [`RATE_SCALE`]. Re-registering a code
    /// replaces its rate.
    pub fn set_rate(&mut self, code: CurrencyCode, rate_to_base: Decimal) -> Result<(), RateError> {
        if rate_to_base <= Decimal::ZERO {
            return Err(RateError::InvalidRate {
                code,
                rate: rate_to_base,
            });
        }
        self.rates.insert(code, rate_to_base.round_dp(RATE_SCALE));
        Ok(())
    }

    /// Get the registered rate for a currency code.
    pub fn rate(&self, code: &CurrencyCode) -> Result<Decimal, RateError> {
        self.rates
            .get(code)
            .copied()
            .ok_or_else(|| RateError::UnknownCurrency { code: code.clone() })
    }

    /// Resolve a code into a [`CurrencyRate`] carrying its rate.
    pub fn resolve(&self, code: &CurrencyCode) -> Result<CurrencyRate, RateError> {
        Ok(CurrencyRate {
            code: code.clone(),
            rate_to_base: self.rate(code)?,
        })
    }

    /// Convert an amount denominated in `code` to the base unit.
    pub fn convert(&self, amount: Decimal, code: &CurrencyCode) -> Result<Decimal, RateError> {
        Ok(self.resolve(code)?.to_base(amount))
    }

    /// All registered codes, sorted.
    pub fn codes(&self) -> Vec<CurrencyCode> {
        let mut codes: Vec<CurrencyCode> = self.rates.keys().cloned().collect();
        codes.sort();
        codes
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}
