use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Journal entry header, as read back from the database.
#[derive(Debug, Clone)]
pub struct JournalEntry {
    pub id: Uuid,
    pub company_id: String,
    pub source_module: String,
    pub source_id: String,
    pub posted_at: DateTime<Utc>,
    pub currency: String,
    pub description: Option<String>,
    pub reverses_entry_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct JournalLine {
    pub id: Uuid,
    pub journal_entry_id: Uuid,
    pub line_no: i32,
    pub account_code: String,
    pub debit_minor: i64,
    pub credit_minor: i64,
    pub memo: Option<String>,
}

/// Look up an existing entry by its dedupe key: `(company_id, source_module,
/// source_id)`. This is the journal-posting idempotency surface (spec §4.5).
pub async fn find_by_source_tx(
    tx: &mut Transaction<'_, Postgres>,
    company_id: &str,
    source_module: &str,
    source_id: &str,
) -> Result<Option<Uuid>, sqlx::Error> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        SELECT id FROM journal_entries
        WHERE company_id = $1 AND source_module = $2 AND source_id = $3
        "#,
    )
    .bind(company_id)
    .bind(source_module)
    .bind(source_id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(row.map(|r| r.0))
}

pub async fn fetch_entry_with_lines(
    pool: &PgPool,
    entry_id: Uuid,
) -> Result<Option<(JournalEntry, Vec<JournalLine>)>, sqlx::Error> {
    let entry = sqlx::query_as::<
        _,
        (
            Uuid,
            String,
            String,
            String,
            DateTime<Utc>,
            String,
            Option<String>,
            Option<Uuid>,
            DateTime<Utc>,
        ),
    >(
        r#"
        SELECT id, company_id, source_module, source_id,
               posted_at, currency, description, reverses_entry_id, created_at
        FROM journal_entries
        WHERE id = $1
        "#,
    )
    .bind(entry_id)
    .fetch_optional(pool)
    .await?;

    let Some(row) = entry else {
        return Ok(None);
    };

    let entry = JournalEntry {
        id: row.0,
        company_id: row.1,
        source_module: row.2,
        source_id: row.3,
        posted_at: row.4,
        currency: row.5,
        description: row.6,
        reverses_entry_id: row.7,
        created_at: row.8,
    };

    let lines = sqlx::query_as::<_, (Uuid, Uuid, i32, String, i64, i64, Option<String>)>(
        r#"
        SELECT id, journal_entry_id, line_no, account_code, debit_minor, credit_minor, memo
        FROM journal_lines
        WHERE journal_entry_id = $1
        ORDER BY line_no
        "#,
    )
    .bind(entry_id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|row| JournalLine {
        id: row.0,
        journal_entry_id: row.1,
        line_no: row.2,
        account_code: row.3,
        debit_minor: row.4,
        credit_minor: row.5,
        memo: row.6,
    })
    .collect();

    Ok(Some((entry, lines)))
}

/// Insert a journal entry header, optionally marking it as a reversal of
/// another entry.
#[allow(clippy::too_many_arguments)]
pub async fn insert_entry(
    tx: &mut Transaction<'_, Postgres>,
    entry_id: Uuid,
    company_id: &str,
    source_module: &str,
    source_id: &str,
    posted_at: DateTime<Utc>,
    currency: &str,
    description: Option<&str>,
    reverses_entry_id: Option<Uuid>,
) -> Result<Uuid, sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO journal_entries
            (id, company_id, source_module, source_id, posted_at, currency,
             description, reverses_entry_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(entry_id)
    .bind(company_id)
    .bind(source_module)
    .bind(source_id)
    .bind(posted_at)
    .bind(currency)
    .bind(description)
    .bind(reverses_entry_id)
    .execute(&mut **tx)
    .await?;

    Ok(entry_id)
}

pub async fn bulk_insert_lines(
    tx: &mut Transaction<'_, Postgres>,
    journal_entry_id: Uuid,
    lines: Vec<JournalLineInsert>,
) -> Result<(), sqlx::Error> {
    for line in lines {
        sqlx::query(
            r#"
            INSERT INTO journal_lines
                (id, journal_entry_id, line_no, account_code, debit_minor, credit_minor, memo)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(line.id)
        .bind(journal_entry_id)
        .bind(line.line_no)
        .bind(&line.account_code)
        .bind(line.debit_minor)
        .bind(line.credit_minor)
        .bind(&line.memo)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

#[derive(Debug, Clone)]
pub struct JournalLineInsert {
    pub id: Uuid,
    pub line_no: i32,
    pub account_code: String,
    pub debit_minor: i64,
    pub credit_minor: i64,
    pub memo: Option<String>,
}
