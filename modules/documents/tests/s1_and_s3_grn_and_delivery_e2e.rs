//! Scenario S1 (GRN posting updates GL and stock) chained into scenario S3
//! (partial delivery then completion): a PO for 10 units is received in
//! full, which stocks the warehouse deliveries draw down from, then a sales
//! order for the same 10 units is fulfilled by two deliveries.

mod common;

use chrono::NaiveDate;
use common::{cleanup_company, get_test_pool, setup_account, setup_account_mapping, setup_period};
use documents::engines::{delivery_order, goods_receipt, purchase_order, sales_order};
use documents::{DocumentError, DocumentStatus, NewLine};
use rust_decimal::Decimal;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn full_receipt_then_two_part_delivery_completes_the_sales_order() {
    let pool = get_test_pool().await;
    let company_id = "s1_s3_receipt_and_delivery";
    cleanup_company(&pool, company_id).await;

    setup_account(&pool, company_id, "1400", "Inventory", "asset", "debit").await;
    setup_account(&pool, company_id, "2100", "GR/IR", "liability", "credit").await;
    setup_account_mapping(&pool, company_id, "GRN", "inventory", "1400").await;
    setup_account_mapping(&pool, company_id, "GRN", "gr_ir", "2100").await;
    setup_period(
        &pool,
        company_id,
        NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
        NaiveDate::from_ymd_opt(2026, 4, 30).unwrap(),
        "open",
    )
    .await;

    let effective_date = NaiveDate::from_ymd_opt(2026, 4, 5).unwrap();
    let warehouse_id = "wh-main";

    let (po, _) = purchase_order::create(
        &pool,
        company_id,
        "supplier-1",
        None,
        vec![NewLine {
            product_id: "WIDGET".to_string(),
            qty: Decimal::new(10, 0),
            unit_price: Decimal::new(5000, 2),
            discount_pct: Decimal::ZERO,
            tax_pct: Decimal::ZERO,
        }],
        "tester",
        effective_date,
        "USD",
    )
    .await
    .unwrap();

    let (grn, _) = goods_receipt::create(
        &pool,
        company_id,
        "supplier-1",
        warehouse_id,
        po.id,
        vec![NewLine {
            product_id: "WIDGET".to_string(),
            qty: Decimal::new(10, 0),
            unit_price: Decimal::new(5000, 2),
            discount_pct: Decimal::ZERO,
            tax_pct: Decimal::ZERO,
        }],
        "tester",
        effective_date,
        "USD",
    )
    .await
    .unwrap();

    let (grn, _) = goods_receipt::post(&pool, company_id, grn.id, "tester", effective_date).await.unwrap();
    assert_eq!(grn.status, DocumentStatus::Posted);

    let balance: (Decimal, Decimal) = sqlx::query_as(
        "SELECT qty_on_hand, avg_cost FROM stock_balances WHERE company_id = $1 AND warehouse_id = $2 AND product_id = $3",
    )
    .bind(company_id)
    .bind(warehouse_id)
    .bind("WIDGET")
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(balance.0, Decimal::new(10, 0));
    assert_eq!(balance.1, Decimal::new(5000, 2));

    let journal_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM journal_entries WHERE company_id = $1 AND source_module = 'GRN'",
    )
    .bind(company_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(journal_count, 1);

    let (so, _) = sales_order::create(
        &pool,
        company_id,
        "cust-1",
        None,
        vec![NewLine {
            product_id: "WIDGET".to_string(),
            qty: Decimal::new(10, 0),
            unit_price: Decimal::new(8000, 2),
            discount_pct: Decimal::ZERO,
            tax_pct: Decimal::ZERO,
        }],
        "tester",
        effective_date,
        "USD",
    )
    .await
    .unwrap();
    let (so, _) = sales_order::confirm(&pool, company_id, so.id, "tester").await.unwrap();
    assert_eq!(so.status, DocumentStatus::Confirmed);

    let (do1, _) = delivery_order::create(
        &pool,
        company_id,
        "cust-1",
        warehouse_id,
        so.id,
        vec![NewLine {
            product_id: "WIDGET".to_string(),
            qty: Decimal::new(6, 0),
            unit_price: Decimal::new(8000, 2),
            discount_pct: Decimal::ZERO,
            tax_pct: Decimal::ZERO,
        }],
        "tester",
        effective_date,
        "USD",
    )
    .await
    .unwrap();
    delivery_order::confirm(&pool, company_id, do1.id, "tester").await.unwrap();

    let (so, so_lines) = sales_order::get(&pool, company_id, so.id).await.unwrap().unwrap();
    assert_eq!(so.status, DocumentStatus::Processing, "60 of 100 delivered must land on Processing, not Completed");
    assert_eq!(so_lines[0].qty_delivered, Decimal::new(6, 0));

    let (do2, _) = delivery_order::create(
        &pool,
        company_id,
        "cust-1",
        warehouse_id,
        so.id,
        vec![NewLine {
            product_id: "WIDGET".to_string(),
            qty: Decimal::new(4, 0),
            unit_price: Decimal::new(8000, 2),
            discount_pct: Decimal::ZERO,
            tax_pct: Decimal::ZERO,
        }],
        "tester",
        effective_date,
        "USD",
    )
    .await
    .unwrap();
    delivery_order::confirm(&pool, company_id, do2.id, "tester").await.unwrap();

    let (so, so_lines) = sales_order::get(&pool, company_id, so.id).await.unwrap().unwrap();
    assert_eq!(so.status, DocumentStatus::Completed);
    assert_eq!(so_lines[0].qty_delivered, Decimal::new(10, 0));

    let (do3, _) = delivery_order::create(
        &pool,
        company_id,
        "cust-1",
        warehouse_id,
        so.id,
        vec![NewLine {
            product_id: "WIDGET".to_string(),
            qty: Decimal::ONE,
            unit_price: Decimal::new(8000, 2),
            discount_pct: Decimal::ZERO,
            tax_pct: Decimal::ZERO,
        }],
        "tester",
        effective_date,
        "USD",
    )
    .await
    .unwrap();
    let third_delivery = delivery_order::confirm(&pool, company_id, do3.id, "tester").await;
    assert!(
        matches!(third_delivery, Err(DocumentError::QuantityExceedsRemaining { .. })),
        "the sales order is already fully delivered, a third delivery has nothing left to draw on"
    );

    cleanup_company(&pool, company_id).await;
}
