//! Validation logic for GL posting requests.

use crate::contracts::posting_request::{GlPostingRequest, JournalLine};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Currency must be a 3-letter uppercase code (ISO 4217), got: {0}")]
    InvalidCurrency(String),

    #[error("Description must be between 1 and 500 characters, got {0} characters")]
    InvalidDescriptionLength(usize),

    #[error("Lines must have at least 2 items, got {0}")]
    InsufficientLines(usize),

    #[error("Line {0}: account_code cannot be empty")]
    EmptyAccountCode(usize),

    #[error("Line {0}: debit_minor must be non-negative, got {1}")]
    NegativeDebit(usize, i64),

    #[error("Line {0}: credit_minor must be non-negative, got {1}")]
    NegativeCredit(usize, i64),

    #[error("Line {0}: exactly one of debit_minor/credit_minor must be positive, got debit={1}, credit={2}")]
    NotExactlyOneSided(usize, i64, i64),

    #[error("Line {0}: memo exceeds 500 characters, got {1}")]
    MemoTooLong(usize, usize),

    #[error("Total debits ({0}) must equal total credits ({1})")]
    UnbalancedEntry(i64, i64),

    #[error("Line {0}: account '{1}' not found in Chart of Accounts for company '{2}'")]
    AccountNotFound(usize, String, String),

    #[error("Line {0}: account '{1}' is inactive for company '{2}'")]
    AccountInactive(usize, String, String),
}

/// Validate a GL posting request payload.
///
/// - `currency`: 3-letter uppercase ISO 4217 code
/// - `description`: 1-500 characters
/// - `lines`: at least 2, each non-negative with exactly one of
///   debit/credit positive, memo <= 500 chars
/// - total debits must equal total credits exactly in minor units (no epsilon
///   needed once amounts are integers — see spec's 0.005 major-unit tolerance,
///   which this exact-equality check subsumes since minor units are integral cents)
pub fn validate_gl_posting_request(payload: &GlPostingRequest) -> Result<(), ValidationError> {
    if !is_valid_currency(&payload.currency) {
        return Err(ValidationError::InvalidCurrency(payload.currency.clone()));
    }

    let desc_len = payload.description.len();
    if desc_len == 0 || desc_len > 500 {
        return Err(ValidationError::InvalidDescriptionLength(desc_len));
    }

    if payload.lines.len() < 2 {
        return Err(ValidationError::InsufficientLines(payload.lines.len()));
    }

    let mut total_debits: i64 = 0;
    let mut total_credits: i64 = 0;

    for (idx, line) in payload.lines.iter().enumerate() {
        validate_journal_line(line, idx)?;
        total_debits += line.debit_minor;
        total_credits += line.credit_minor;
    }

    if total_debits != total_credits {
        return Err(ValidationError::UnbalancedEntry(total_debits, total_credits));
    }

    Ok(())
}

fn validate_journal_line(line: &JournalLine, index: usize) -> Result<(), ValidationError> {
    if line.account_code.is_empty() {
        return Err(ValidationError::EmptyAccountCode(index));
    }

    if line.debit_minor < 0 {
        return Err(ValidationError::NegativeDebit(index, line.debit_minor));
    }

    if line.credit_minor < 0 {
        return Err(ValidationError::NegativeCredit(index, line.credit_minor));
    }

    if (line.debit_minor > 0) == (line.credit_minor > 0) {
        return Err(ValidationError::NotExactlyOneSided(index, line.debit_minor, line.credit_minor));
    }

    if let Some(ref memo) = line.memo {
        if memo.len() > 500 {
            return Err(ValidationError::MemoTooLong(index, memo.len()));
        }
    }

    Ok(())
}

fn is_valid_currency(currency: &str) -> bool {
    currency.len() == 3 && currency.chars().all(|c| c.is_ascii_uppercase())
}

/// Validate account codes against the Chart of Accounts. Must run inside the
/// same transaction as the posting insert so a concurrent deactivation can't
/// race past this check.
pub async fn validate_accounts_against_coa(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    company_id: &str,
    payload: &GlPostingRequest,
) -> Result<(), ValidationError> {
    use crate::repos::account_repo::{self, AccountError};

    for (idx, line) in payload.lines.iter().enumerate() {
        match account_repo::find_active_by_code_tx(tx, company_id, &line.account_code).await {
            Ok(_account) => {
                tracing::debug!(
                    line_index = idx,
                    account_code = %line.account_code,
                    company_id = %company_id,
                    "account validated against COA"
                );
            }
            Err(AccountError::NotFound { code, .. }) => {
                return Err(ValidationError::AccountNotFound(
                    idx,
                    code,
                    company_id.to_string(),
                ));
            }
            Err(AccountError::Inactive { code, .. }) => {
                return Err(ValidationError::AccountInactive(
                    idx,
                    code,
                    company_id.to_string(),
                ));
            }
            Err(AccountError::Database(e)) => {
                return Err(ValidationError::AccountNotFound(
                    idx,
                    line.account_code.clone(),
                    format!("database error: {}", e),
                ));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_payload() -> GlPostingRequest {
        GlPostingRequest {
            posting_date: "2024-02-11".to_string(),
            currency: "USD".to_string(),
            source_module: "documents".to_string(),
            source_id: "ar_invoice:inv_123".to_string(),
            description: "Test invoice".to_string(),
            lines: vec![
                JournalLine {
                    account_code: "1100".to_string(),
                    debit_minor: 10000,
                    credit_minor: 0,
                    memo: None,
                    dimensions: None,
                },
                JournalLine {
                    account_code: "4000".to_string(),
                    debit_minor: 0,
                    credit_minor: 10000,
                    memo: None,
                    dimensions: None,
                },
            ],
        }
    }

    #[test]
    fn accepts_valid_payload() {
        assert!(validate_gl_posting_request(&valid_payload()).is_ok());
    }

    #[test]
    fn rejects_short_currency() {
        let mut payload = valid_payload();
        payload.currency = "US".to_string();
        assert_eq!(
            validate_gl_posting_request(&payload),
            Err(ValidationError::InvalidCurrency("US".to_string()))
        );
    }

    #[test]
    fn rejects_lowercase_currency() {
        let mut payload = valid_payload();
        payload.currency = "usd".to_string();
        assert_eq!(
            validate_gl_posting_request(&payload),
            Err(ValidationError::InvalidCurrency("usd".to_string()))
        );
    }

    #[test]
    fn rejects_empty_description() {
        let mut payload = valid_payload();
        payload.description = "".to_string();
        assert_eq!(
            validate_gl_posting_request(&payload),
            Err(ValidationError::InvalidDescriptionLength(0))
        );
    }

    #[test]
    fn rejects_description_over_500_chars() {
        let mut payload = valid_payload();
        payload.description = "x".repeat(501);
        assert_eq!(
            validate_gl_posting_request(&payload),
            Err(ValidationError::InvalidDescriptionLength(501))
        );
    }

    #[test]
    fn rejects_single_line_entry() {
        let mut payload = valid_payload();
        payload.lines.truncate(1);
        assert_eq!(
            validate_gl_posting_request(&payload),
            Err(ValidationError::InsufficientLines(1))
        );
    }

    #[test]
    fn rejects_empty_account_code() {
        let mut payload = valid_payload();
        payload.lines[0].account_code = "".to_string();
        assert_eq!(
            validate_gl_posting_request(&payload),
            Err(ValidationError::EmptyAccountCode(0))
        );
    }

    #[test]
    fn rejects_negative_debit() {
        let mut payload = valid_payload();
        payload.lines[0].debit_minor = -50;
        assert_eq!(
            validate_gl_posting_request(&payload),
            Err(ValidationError::NegativeDebit(0, -50))
        );
    }

    #[test]
    fn rejects_negative_credit() {
        let mut payload = valid_payload();
        payload.lines[1].credit_minor = -50;
        assert_eq!(
            validate_gl_posting_request(&payload),
            Err(ValidationError::NegativeCredit(1, -50))
        );
    }

    #[test]
    fn rejects_line_with_both_debit_and_credit_positive() {
        let mut payload = valid_payload();
        payload.lines[0].credit_minor = 10000;
        assert_eq!(
            validate_gl_posting_request(&payload),
            Err(ValidationError::NotExactlyOneSided(0, 10000, 10000))
        );
    }

    #[test]
    fn rejects_line_with_neither_debit_nor_credit_positive() {
        let mut payload = valid_payload();
        payload.lines[0].debit_minor = 0;
        assert_eq!(
            validate_gl_posting_request(&payload),
            Err(ValidationError::NotExactlyOneSided(0, 0, 0))
        );
    }

    #[test]
    fn rejects_oversized_memo() {
        let mut payload = valid_payload();
        payload.lines[0].memo = Some("x".repeat(501));
        assert_eq!(
            validate_gl_posting_request(&payload),
            Err(ValidationError::MemoTooLong(0, 501))
        );
    }

    #[test]
    fn rejects_unbalanced_entry() {
        let mut payload = valid_payload();
        payload.lines[1].credit_minor = 5000;
        assert_eq!(
            validate_gl_posting_request(&payload),
            Err(ValidationError::UnbalancedEntry(10000, 5000))
        );
    }

    #[test]
    fn accepts_balanced_entry_with_more_than_two_lines() {
        let mut payload = valid_payload();
        payload.lines.push(JournalLine {
            account_code: "5000".to_string(),
            debit_minor: 5000,
            credit_minor: 0,
            memo: None,
            dimensions: None,
        });
        payload.lines.push(JournalLine {
            account_code: "6000".to_string(),
            debit_minor: 0,
            credit_minor: 5000,
            memo: None,
            dimensions: None,
        });
        assert!(validate_gl_posting_request(&payload).is_ok());
    }
}
