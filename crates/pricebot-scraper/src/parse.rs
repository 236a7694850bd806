//! Locale-aware price parsing.
//!
//! Turns the human-readable price strings found on product pages
//! (`"1.234,56 €"`, `"$1,234.56"`, `"12,99"`) into a [`PriceValue`]. Anything
//! the parser cannot read with confidence becomes [`Extracted::Unavailable`]
//! rather than a guessed amount. See [`crate::parse_helpers`] for the
//! separator rules.

use std::str::FromStr;

use pricebot_core::{Extracted, PriceValue};
use rust_decimal::Decimal;

use crate::parse_helpers::{canonical_number, symbol_currency, tokenize};

#[derive(Debug, Clone)]
pub struct PriceParser {
    default_currency: String,
}

impl PriceParser {
    /// `default_currency` applies when the text carries no symbol or code.
    #[must_use]
    pub fn new(default_currency: impl Into<String>) -> Self {
        Self {
            default_currency: default_currency.into().to_ascii_uppercase(),
        }
    }

    #[must_use]
    pub fn default_currency(&self) -> &str {
        &self.default_currency
    }

    /// Parses `raw` into an amount and currency.
    ///
    /// Returns [`Extracted::Unavailable`] for empty or non-numeric text,
    /// negative amounts, text holding more than one number, conflicting
    /// currency markers and malformed digit grouping.
    #[must_use]
    pub fn parse(&self, raw: &str) -> Extracted<PriceValue> {
        let Some(tokens) = tokenize(raw) else {
            tracing::debug!(raw, "price text not recognised");
            return Extracted::Unavailable;
        };
        let Some(canonical) = canonical_number(&tokens.number) else {
            tracing::debug!(raw, number = %tokens.number, "price digits not recognised");
            return Extracted::Unavailable;
        };
        let Ok(amount) = Decimal::from_str(&canonical) else {
            return Extracted::Unavailable;
        };

        let currency = tokens
            .currency
            .unwrap_or_else(|| self.default_currency.clone());
        Extracted::Found(PriceValue::new(amount, currency))
    }

    /// Maps a page's currency marker (`"€"`, `"USD"`) to an ISO code, falling
    /// back to the default currency for anything unknown.
    #[must_use]
    pub fn resolve_currency(&self, marker: &str) -> String {
        let marker = marker.trim();
        let mut chars = marker.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if let Some(code) = symbol_currency(c) {
                return code.to_owned();
            }
        }
        if marker.len() == 3 && marker.bytes().all(|b| b.is_ascii_alphabetic()) {
            return marker.to_ascii_uppercase();
        }
        self.default_currency.clone()
    }
}

impl Default for PriceParser {
    fn default() -> Self {
        Self::new("EUR")
    }
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
