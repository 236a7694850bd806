use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A field scraped from a product page that may legitimately be missing.
///
/// `Unavailable` is an explicit sentinel, distinct from an empty string.
/// Callers decide what absence means for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "value")]
pub enum Extracted<T> {
    Found(T),
    Unavailable,
}

impl<T> Extracted<T> {
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Extracted::Found(_))
    }

    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Extracted::Unavailable)
    }

    #[must_use]
    pub fn as_found(&self) -> Option<&T> {
        match self {
            Extracted::Found(value) => Some(value),
            Extracted::Unavailable => None,
        }
    }

    #[must_use]
    pub fn into_option(self) -> Option<T> {
        match self {
            Extracted::Found(value) => Some(value),
            Extracted::Unavailable => None,
        }
    }
}

impl<T> From<Option<T>> for Extracted<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Extracted::Unavailable, Extracted::Found)
    }
}

impl<T: fmt::Display> fmt::Display for Extracted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extracted::Found(value) => value.fmt(f),
            Extracted::Unavailable => f.write_str(Extracted::<T>::SENTINEL),
        }
    }
}

impl<T> Extracted<T> {
    /// Text rendered in place of a missing field.
    pub const SENTINEL: &'static str = "unavailable";
}

/// An exact monetary amount in a single currency.
///
/// Equality is numeric on the decimal amount (`1234.56 == 1234.560`) and
/// exact on the ISO 4217 currency code. Comparisons across currencies are
/// never equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PriceValue {
    pub amount: Decimal,
    /// ISO 4217 currency code, upper-case (e.g. `"EUR"`).
    pub currency: String,
}

impl PriceValue {
    #[must_use]
    pub fn new(amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into().to_ascii_uppercase(),
        }
    }

    /// Currency symbol used when rendering for humans, falling back to the code.
    #[must_use]
    pub fn symbol(&self) -> &str {
        match self.currency.as_str() {
            "EUR" => "€",
            "USD" => "$",
            "GBP" => "£",
            "JPY" => "¥",
            "INR" => "₹",
            other => other,
        }
    }
}

/// Renders as `1234,56 €`: comma decimal separator, two fraction digits,
/// symbol suffix. This is the format users of the bot are used to seeing.
impl fmt::Display for PriceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.amount.round_dp(2);
        let text = format!("{rounded:.2}").replace('.', ",");
        write!(f, "{text} {}", self.symbol())
    }
}
