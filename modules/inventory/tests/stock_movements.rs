use inventory::contracts::StockTxType;
use inventory::services::movement_service::apply_movement;
use rust_decimal::Decimal;

#[test]
fn transfer_legs_share_the_source_average_cost_as_unit_cost() {
    let source_avg = Decimal::new(275, 2);

    let (out_qty, out_avg) = apply_movement(
        Decimal::new(20, 0),
        source_avg,
        Decimal::new(-5, 0),
        Decimal::ZERO,
        StockTxType::TransferOut,
        false,
        "wh-source",
        "prod-1",
    )
    .unwrap();
    assert_eq!(out_qty, Decimal::new(15, 0));
    assert_eq!(out_avg, source_avg);

    let (in_qty, in_avg) = apply_movement(
        Decimal::ZERO,
        Decimal::ZERO,
        Decimal::new(5, 0),
        source_avg,
        StockTxType::TransferIn,
        false,
        "wh-dest",
        "prod-1",
    )
    .unwrap();
    assert_eq!(in_qty, Decimal::new(5, 0));
    assert_eq!(in_avg, source_avg);
}

#[test]
fn zeroing_out_a_balance_preserves_the_average_cost() {
    let (qty, avg) = apply_movement(
        Decimal::new(5, 0),
        Decimal::new(300, 2),
        Decimal::new(-5, 0),
        Decimal::ZERO,
        StockTxType::Outbound,
        false,
        "wh-1",
        "prod-1",
    )
    .unwrap();

    assert_eq!(qty, Decimal::ZERO);
    assert_eq!(avg, Decimal::new(300, 2));
}
