//! Pure currency conversion for consolidated balances. FX policy is
//! fallback-only (spec §4.9): a missing rate is not an error, it's a
//! signal to use the raw balance and record a warning.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Converts a minor-unit amount at `rate`, or passes it through
/// unconverted when no rate is available. The caller is responsible
/// for recording a warning when `rate` is `None`.
pub fn convert_minor(amount_minor: i64, rate: Option<Decimal>) -> i64 {
    match rate {
        Some(rate) => (Decimal::from(amount_minor) * rate)
            .round()
            .to_i64()
            .unwrap_or(amount_minor),
        None => amount_minor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_at_the_given_rate_and_rounds_to_the_nearest_minor_unit() {
        let converted = convert_minor(10_000_00, Some(Decimal::new(92, 2))); // 0.92
        assert_eq!(converted, 9_200_00);
    }

    #[test]
    fn passes_the_amount_through_unconverted_when_no_rate_is_available() {
        assert_eq!(convert_minor(10_000_00, None), 10_000_00);
    }

    #[test]
    fn an_identity_rate_leaves_the_amount_unchanged() {
        assert_eq!(convert_minor(4_250_00, Some(Decimal::ONE)), 4_250_00);
    }
}
