use consolidation::{BalanceSheet, ProfitAndLoss};
use rust_decimal::Decimal;

#[test]
fn fx_conversion_is_identity_when_currencies_match() {
    assert_eq!(consolidation::services::fx::convert_minor(12_345_00, Some(Decimal::ONE)), 12_345_00);
}

#[test]
fn fx_conversion_falls_back_to_the_raw_amount_without_a_rate() {
    assert_eq!(consolidation::services::fx::convert_minor(12_345_00, None), 12_345_00);
}

#[test]
fn profit_and_loss_and_balance_sheet_shapes_are_independent_sections() {
    let pl = ProfitAndLoss { lines: Vec::new(), net_profit_minor: 0 };
    let bs = BalanceSheet { assets: Vec::new(), liabilities: Vec::new(), equity: Vec::new() };
    assert_eq!(pl.lines.len(), 0);
    assert_eq!(bs.assets.len(), 0);
}
