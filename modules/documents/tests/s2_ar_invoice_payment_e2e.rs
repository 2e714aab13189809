//! Scenario S2: an AR invoice posted for 1000.00, paid down in two
//! instalments. The first payment only partially settles it; the second
//! drives its balance to zero and must flip it `Posted -> Paid` in the same
//! transaction as the payment, not as a separate step.

mod common;

use chrono::NaiveDate;
use common::{cleanup_company, get_test_pool, setup_account, setup_account_mapping, setup_period};
use documents::engines::{ar_invoice, ar_payment};
use documents::{DocumentStatus, NewLine};
use rust_decimal::Decimal;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn second_payment_settles_the_invoice_and_flips_it_to_paid() {
    let pool = get_test_pool().await;
    let company_id = "s2_ar_partial_payment";
    cleanup_company(&pool, company_id).await;

    setup_account(&pool, company_id, "1100", "Accounts Receivable", "asset", "debit").await;
    setup_account(&pool, company_id, "4000", "Revenue", "revenue", "credit").await;
    setup_account(&pool, company_id, "1000", "Cash", "asset", "debit").await;
    setup_account_mapping(&pool, company_id, "ARInvoice", "ar", "1100").await;
    setup_account_mapping(&pool, company_id, "ARInvoice", "revenue", "4000").await;
    setup_account_mapping(&pool, company_id, "ARPayment", "ar", "1100").await;
    setup_account_mapping(&pool, company_id, "ARPayment", "cash", "1000").await;
    setup_period(
        &pool,
        company_id,
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
        "open",
    )
    .await;

    let effective_date = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();

    let (invoice, _) = ar_invoice::create(
        &pool,
        company_id,
        "cust-1",
        None,
        vec![NewLine {
            product_id: "WIDGET".to_string(),
            qty: Decimal::ONE,
            unit_price: Decimal::new(100000, 2),
            discount_pct: Decimal::ZERO,
            tax_pct: Decimal::ZERO,
        }],
        "tester",
        effective_date,
        "USD",
    )
    .await
    .unwrap();
    assert_eq!(invoice.total_minor, 100_000);

    let (invoice, _) = ar_invoice::post(&pool, company_id, invoice.id, "tester", effective_date).await.unwrap();
    assert_eq!(invoice.status, DocumentStatus::Posted);

    ar_payment::create(
        &pool,
        company_id,
        "cust-1",
        Decimal::new(60000, 2),
        vec![ar_payment::Allocation { invoice_id: invoice.id, amount: Decimal::new(60000, 2) }],
        "tester",
        effective_date,
        "USD",
    )
    .await
    .unwrap();

    let (invoice, _) = ar_invoice::get(&pool, company_id, invoice.id).await.unwrap().unwrap();
    assert_eq!(invoice.status, DocumentStatus::Posted, "a 600.00 payment on a 1000.00 invoice must not settle it");

    ar_payment::create(
        &pool,
        company_id,
        "cust-1",
        Decimal::new(40000, 2),
        vec![ar_payment::Allocation { invoice_id: invoice.id, amount: Decimal::new(40000, 2) }],
        "tester",
        effective_date,
        "USD",
    )
    .await
    .unwrap();

    let (invoice, _) = ar_invoice::get(&pool, company_id, invoice.id).await.unwrap().unwrap();
    assert_eq!(invoice.status, DocumentStatus::Paid, "the second payment brings allocations to 1000.00, settling the invoice");

    let over_allocation = ar_payment::create(
        &pool,
        company_id,
        "cust-1",
        Decimal::new(100, 2),
        vec![ar_payment::Allocation { invoice_id: invoice.id, amount: Decimal::new(100, 2) }],
        "tester",
        effective_date,
        "USD",
    )
    .await;
    assert!(
        matches!(over_allocation, Err(documents::DocumentError::AllocationExceedsInvoiceBalance { .. })),
        "a fully paid invoice has zero balance left to allocate against"
    );

    cleanup_company(&pool, company_id).await;
}
