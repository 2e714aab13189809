//! Scenario S6: posting into a period that isn't Open fails outright, and
//! leaves nothing behind — `post_journal` rolls the whole transaction back
//! rather than leaving a half-written entry when the period check fails.

mod common;

use chrono::NaiveDate;
use common::{cleanup_company, get_test_pool, setup_account, setup_account_mapping, setup_period};
use gl::contracts::posting_request::{GlPostingRequest, JournalLine};
use gl::repos::period_repo::PeriodError;
use gl::{post_journal, JournalError};
use serial_test::serial;

fn posting_request(source_id: &str) -> GlPostingRequest {
    GlPostingRequest {
        posting_date: "2026-02-15".to_string(),
        currency: "USD".to_string(),
        source_module: "ApInvoice".to_string(),
        source_id: source_id.to_string(),
        description: "AP invoice posting".to_string(),
        lines: vec![
            JournalLine {
                account_code: "5000".to_string(),
                debit_minor: 25000,
                credit_minor: 0,
                memo: None,
                dimensions: None,
            },
            JournalLine {
                account_code: "2000".to_string(),
                debit_minor: 0,
                credit_minor: 25000,
                memo: None,
                dimensions: None,
            },
        ],
    }
}

#[tokio::test]
#[serial]
async fn posting_into_a_locked_period_is_rejected_with_no_partial_write() {
    let pool = get_test_pool().await;
    let company_id = "s6_locked_period";
    cleanup_company(&pool, company_id).await;

    setup_account(&pool, company_id, "5000", "Expense", "expense", "debit").await;
    setup_account(&pool, company_id, "2000", "Accounts Payable", "liability", "credit").await;
    setup_account_mapping(&pool, Some(company_id), "APInvoice", "ap", "2000").await;
    setup_period(
        &pool,
        company_id,
        NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
        NaiveDate::from_ymd_opt(2026, 2, 28).unwrap(),
        "locked",
    )
    .await;

    let request = posting_request("ap_invoice:s6-1");
    let result = post_journal(&pool, company_id, &request).await;

    match result {
        Err(JournalError::Period(PeriodError::PeriodNotOpen { .. })) => {}
        other => panic!("expected PeriodNotOpen, got {other:?}"),
    }

    let entry_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM journal_entries WHERE company_id = $1")
        .bind(company_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(entry_count, 0, "a rejected posting must not leave a journal entry behind");

    cleanup_company(&pool, company_id).await;
}

#[tokio::test]
#[serial]
async fn posting_into_an_open_period_succeeds_and_is_idempotent_on_retry() {
    let pool = get_test_pool().await;
    let company_id = "s6_open_period";
    cleanup_company(&pool, company_id).await;

    setup_account(&pool, company_id, "5000", "Expense", "expense", "debit").await;
    setup_account(&pool, company_id, "2000", "Accounts Payable", "liability", "credit").await;
    setup_account_mapping(&pool, Some(company_id), "APInvoice", "ap", "2000").await;
    setup_period(
        &pool,
        company_id,
        NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
        NaiveDate::from_ymd_opt(2026, 2, 28).unwrap(),
        "open",
    )
    .await;

    let request = posting_request("ap_invoice:s6-2");
    let first = post_journal(&pool, company_id, &request).await.unwrap();
    let second = post_journal(&pool, company_id, &request).await.unwrap();
    assert_eq!(first, second, "retrying the same source_id must return the existing entry, not post twice");

    let entry_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM journal_entries WHERE company_id = $1")
        .bind(company_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(entry_count, 1);

    cleanup_company(&pool, company_id).await;
}
