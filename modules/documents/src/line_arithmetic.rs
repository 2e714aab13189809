//! Line and document total arithmetic, used by every document kind.
//!
//! Intermediate sums stay at full `Decimal` precision; rounding to two
//! fractional digits, half-away-from-zero, happens only once — at the
//! edge where a persisted or posted amount is produced.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineAmounts {
    pub net: Decimal,
    pub tax_amt: Decimal,
    pub line_total: Decimal,
}

pub fn compute_line(
    qty: Decimal,
    unit_price: Decimal,
    discount_pct: Decimal,
    tax_pct: Decimal,
) -> LineAmounts {
    let hundred = Decimal::from(100);
    let net = qty * unit_price * (Decimal::ONE - discount_pct / hundred);
    let tax_amt = net * tax_pct / hundred;
    let line_total = net + tax_amt;

    LineAmounts {
        net,
        tax_amt,
        line_total,
    }
}

pub struct DocumentTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

pub fn sum_totals(lines: &[LineAmounts]) -> DocumentTotals {
    let subtotal = lines.iter().map(|l| l.net).sum();
    let tax = lines.iter().map(|l| l.tax_amt).sum();
    let total = lines.iter().map(|l| l.line_total).sum();

    DocumentTotals {
        subtotal,
        tax,
        total,
    }
}

/// Half-away-from-zero rounding to 2 decimal places, applied only at
/// persistence. `Decimal`'s default `round_dp` already rounds half away
/// from zero, but this is spelled out explicitly since money rounding
/// policy is exactly the kind of thing that silently drifts if the
/// underlying default ever changes.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert a rounded 2dp `Decimal` to minor units (cents) for
/// persistence and GL posting.
pub fn to_minor_units(value: Decimal) -> i64 {
    (round2(value) * Decimal::from(100))
        .to_i64()
        .expect("document totals fit in i64 minor units")
}

/// Inverse of `to_minor_units` — used to compare a persisted total
/// against freshly summed payments/allocations.
pub fn from_minor_units(value: i64) -> Decimal {
    Decimal::from(value) / Decimal::from(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_net_tax_and_total_for_a_discounted_taxed_line() {
        let amounts = compute_line(
            Decimal::new(10, 0),
            Decimal::new(5000, 2),
            Decimal::new(10, 0),
            Decimal::new(15, 0),
        );

        assert_eq!(amounts.net, Decimal::new(45000, 2));
        assert_eq!(amounts.tax_amt, Decimal::new(675000, 4));
        assert_eq!(amounts.line_total, Decimal::new(45000, 2) + Decimal::new(675000, 4));
    }

    #[test]
    fn sum_totals_adds_across_lines() {
        let a = compute_line(Decimal::new(2, 0), Decimal::new(1000, 2), Decimal::ZERO, Decimal::ZERO);
        let b = compute_line(Decimal::new(3, 0), Decimal::new(500, 2), Decimal::ZERO, Decimal::ZERO);
        let totals = sum_totals(&[a, b]);

        assert_eq!(totals.subtotal, Decimal::new(3500, 2));
        assert_eq!(totals.total, Decimal::new(3500, 2));
    }

    #[test]
    fn round2_rounds_half_away_from_zero() {
        assert_eq!(round2(Decimal::new(1005, 3)), Decimal::new(101, 2));
        assert_eq!(round2(Decimal::new(-1005, 3)), Decimal::new(-101, 2));
    }

    #[test]
    fn to_minor_units_converts_a_rounded_total_to_cents() {
        assert_eq!(to_minor_units(Decimal::new(4500, 2)), 450000);
    }
}
