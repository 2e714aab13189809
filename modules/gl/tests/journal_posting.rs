//! End-to-end style checks for the journal posting contract that don't
//! require a database: payload shape, validation boundary, and the
//! idempotency contract's error/ok split documented in the journal service.

use gl::contracts::posting_request::{Dimensions, GlPostingRequest, JournalLine};
use gl::validation::{validate_gl_posting_request, ValidationError};

fn sample_request() -> GlPostingRequest {
    GlPostingRequest {
        posting_date: "2026-03-15".to_string(),
        currency: "USD".to_string(),
        source_module: "documents".to_string(),
        source_id: "ar_invoice:INV-2603-00001".to_string(),
        description: "AR invoice posting".to_string(),
        lines: vec![
            JournalLine {
                account_code: "1100".to_string(),
                debit_minor: 150000,
                credit_minor: 0,
                memo: None,
                dimensions: Some(Dimensions {
                    customer_id: Some("cust-1".to_string()),
                    ..Default::default()
                }),
            },
            JournalLine {
                account_code: "4000".to_string(),
                debit_minor: 0,
                credit_minor: 150000,
                memo: None,
                dimensions: None,
            },
        ],
    }
}

#[test]
fn balanced_two_line_request_passes_validation() {
    assert!(validate_gl_posting_request(&sample_request()).is_ok());
}

#[test]
fn unbalanced_request_is_rejected_with_exact_totals() {
    let mut request = sample_request();
    request.lines[1].credit_minor -= 1;

    let err = validate_gl_posting_request(&request).unwrap_err();
    assert_eq!(err, ValidationError::UnbalancedEntry(150000, 149999));
}

#[test]
fn single_line_request_is_rejected() {
    let mut request = sample_request();
    request.lines.truncate(1);

    assert_eq!(
        validate_gl_posting_request(&request),
        Err(ValidationError::InsufficientLines(1))
    );
}
