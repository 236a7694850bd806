//! Price-change detection on structured values.

use crate::price::{Extracted, PriceValue};
use crate::product::ProductInfo;

/// Result of comparing a fresh extraction against the last stored price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceCheck {
    /// No history yet; the current price should be recorded silently.
    FirstObservation(PriceValue),
    Unchanged,
    Changed {
        previous: PriceValue,
        current: PriceValue,
    },
    /// The page yielded no price. Nothing is recorded or sent.
    Degraded,
}

impl PriceCheck {
    /// `true` when the new price must be appended to history.
    #[must_use]
    pub fn should_record(&self) -> bool {
        matches!(self, PriceCheck::FirstObservation(_) | PriceCheck::Changed { .. })
    }

    /// `true` when the owner should be told.
    #[must_use]
    pub fn should_notify(&self) -> bool {
        matches!(self, PriceCheck::Changed { .. })
    }
}

/// Compares `info.price` against `last`.
///
/// Only the price field matters here: a missing product name does not stop a
/// valid price from being compared, but a missing price never counts as a change.
#[must_use]
pub fn detect_price_change(last: Option<&PriceValue>, info: &ProductInfo) -> PriceCheck {
    let Extracted::Found(current) = &info.price else {
        return PriceCheck::Degraded;
    };

    match last {
        None => PriceCheck::FirstObservation(current.clone()),
        Some(previous) if previous == current => PriceCheck::Unchanged,
        Some(previous) => PriceCheck::Changed {
            previous: previous.clone(),
            current: current.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::*;

    fn eur(amount: &str) -> PriceValue {
        PriceValue::new(Decimal::from_str(amount).unwrap(), "EUR")
    }

    fn info_with(price: Extracted<PriceValue>) -> ProductInfo {
        ProductInfo {
            name: Extracted::Found("Kettle".to_owned()),
            price,
            extracted_at: Utc::now(),
        }
    }

    #[test]
    fn first_observation_is_recorded_but_not_notified() {
        let check = detect_price_change(None, &info_with(Extracted::Found(eur("29.99"))));
        assert_eq!(check, PriceCheck::FirstObservation(eur("29.99")));
        assert!(check.should_record());
        assert!(!check.should_notify());
    }

    #[test]
    fn numerically_equal_prices_are_unchanged() {
        let last = eur("29.9");
        let check = detect_price_change(Some(&last), &info_with(Extracted::Found(eur("29.90"))));
        assert_eq!(check, PriceCheck::Unchanged);
        assert!(!check.should_record());
    }

    #[test]
    fn different_price_is_changed() {
        let last = eur("29.99");
        let check = detect_price_change(Some(&last), &info_with(Extracted::Found(eur("24.99"))));
        assert_eq!(
            check,
            PriceCheck::Changed {
                previous: eur("29.99"),
                current: eur("24.99"),
            }
        );
        assert!(check.should_notify());
    }

    #[test]
    fn currency_switch_is_a_change() {
        let last = eur("12.00");
        let current = PriceValue::new(Decimal::from_str("12.00").unwrap(), "USD");
        let check = detect_price_change(Some(&last), &info_with(Extracted::Found(current.clone())));
        assert_eq!(
            check,
            PriceCheck::Changed {
                previous: last,
                current,
            }
        );
    }

    #[test]
    fn missing_price_is_degraded_not_changed() {
        let last = eur("29.99");
        let check = detect_price_change(Some(&last), &info_with(Extracted::Unavailable));
        assert_eq!(check, PriceCheck::Degraded);
        assert!(!check.should_record());
        assert!(!check.should_notify());
    }

    #[test]
    fn missing_name_still_compares_price() {
        let info = ProductInfo {
            name: Extracted::Unavailable,
            price: Extracted::Found(eur("10.00")),
            extracted_at: Utc::now(),
        };
        assert_eq!(detect_price_change(Some(&eur("10")), &info), PriceCheck::Unchanged);
    }
}
