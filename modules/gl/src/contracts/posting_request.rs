//! GL posting request types.
//!
//! This is the payload shape accepted by [`crate::services::journal_service::post_journal`].
//! It is called directly by the Document Engine's integration hooks and by the
//! Elimination Engine — never carried over a message bus — so the type here is a
//! plain Rust struct rather than a wire contract with its own JSON schema doc.

use serde::{Deserialize, Serialize};

/// A request to post one balanced journal entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlPostingRequest {
    /// Accounting date for the journal entry (YYYY-MM-DD).
    pub posting_date: String,

    /// ISO 4217 currency code (e.g., "USD", "EUR").
    pub currency: String,

    /// Module that originated this posting (`documents`, `inventory`, `elimination`, ...).
    pub source_module: String,

    /// Identifier of the source document/movement/run within `source_module`.
    /// Combined with `source_module` this forms the dedupe key (spec's idempotency
    /// surface for journal postings): posting twice with the same pair is a no-op.
    pub source_id: String,

    /// Human-readable description for the journal entry (1-500 chars).
    pub description: String,

    /// Journal entry lines (must have at least 2 items, must balance).
    pub lines: Vec<JournalLine>,
}

/// A single line in a journal entry, in minor currency units ("cents").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JournalLine {
    /// Account code in the chart of accounts.
    pub account_code: String,

    /// Debit amount in minor units (must be >= 0).
    pub debit_minor: i64,

    /// Credit amount in minor units (must be >= 0).
    pub credit_minor: i64,

    /// Optional line-level memo (<= 500 chars).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,

    /// Optional analytical dimensions for reporting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
}

/// Analytical dimensions for reporting and analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Dimensions {
    /// The operating company this line is attributed to, when it differs
    /// from the journal's own posting company (elimination entries post
    /// both sides of an intercompany pair into one entry and use this to
    /// record which company each line actually belongs to).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_valid_payload() {
        let json = r#"{
            "posting_date": "2024-02-11",
            "currency": "USD",
            "source_module": "documents",
            "source_id": "ar_invoice:inv_01HPQW9K7J4M6N8P2R5T7V9W1X",
            "description": "Invoice for customer services",
            "lines": [
                { "account_code": "1100", "debit_minor": 259900, "credit_minor": 0,
                  "memo": "Accounts Receivable",
                  "dimensions": { "customer_id": "cus_01HPQW8Z5N7P9Q2R4T6V8W1X3Y" } },
                { "account_code": "4000", "debit_minor": 0, "credit_minor": 259900,
                  "memo": "Revenue" }
            ]
        }"#;

        let payload: GlPostingRequest = serde_json::from_str(json).unwrap();
        assert_eq!(payload.currency, "USD");
        assert_eq!(payload.lines.len(), 2);
        assert_eq!(payload.lines[0].debit_minor, 259900);
        assert_eq!(payload.lines[1].credit_minor, 259900);
    }

    #[test]
    fn omits_optional_fields_when_minimal() {
        let json = r#"{
            "posting_date": "2024-02-11",
            "currency": "USD",
            "source_module": "documents",
            "source_id": "ar_payment:pay_123",
            "description": "Payment received",
            "lines": [
                { "account_code": "1000", "debit_minor": 10000, "credit_minor": 0 },
                { "account_code": "1100", "debit_minor": 0, "credit_minor": 10000 }
            ]
        }"#;

        let payload: GlPostingRequest = serde_json::from_str(json).unwrap();
        assert_eq!(payload.lines[0].memo, None);
        assert_eq!(payload.lines[0].dimensions, None);
    }
}
