use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::Connection;
use std::path::Path;

/// Open the SQLite database at `path` (":memory:" for a throwaway store)
/// with foreign keys enforced, and apply the schema.
pub fn open_database(path: &str) -> Result<Connection> {
    let conn = if path == ":memory:" {
        Connection::open_in_memory()?
    } else {
        Connection::open(Path::new(path))
            .with_context(|| format!("Failed to open database at {}", path))?
    };

    setup_database(&conn)?;
    Ok(conn)
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Cascades and references are only enforced with this on, per connection
    conn.pragma_update(None, "foreign_keys", "ON")?;

    // Enable WAL mode for crash recovery (in-memory stores stay on "memory")
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // ==========================================================================
    // Companies
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS companies (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            inn TEXT NOT NULL,
            description TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT,
            CONSTRAINT unique_company_inn UNIQUE (inn)
        )",
        [],
    )?;

    // ==========================================================================
    // Banks
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS banks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            bik TEXT NOT NULL,
            correspondent_account TEXT,
            address TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT,
            CONSTRAINT unique_bank_bik UNIQUE (bik)
        )",
        [],
    )?;

    // ==========================================================================
    // Bank accounts (account number is unique within one bank only)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS bank_accounts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            account_number TEXT NOT NULL,
            company_id INTEGER NOT NULL
                REFERENCES companies(id) ON DELETE CASCADE,
            bank_id INTEGER NOT NULL
                REFERENCES banks(id) ON DELETE CASCADE,
            currency TEXT NOT NULL DEFAULT 'RUB',
            is_active TEXT NOT NULL DEFAULT 'Y',
            created_at TEXT NOT NULL,
            updated_at TEXT,
            CONSTRAINT unique_account_per_bank UNIQUE (account_number, bank_id)
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_companies_name ON companies(name)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_banks_name ON banks(name)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_bank_accounts_account_number ON bank_accounts(account_number)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_bank_accounts_company ON bank_accounts(company_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_bank_accounts_bank ON bank_accounts(bank_id)",
        [],
    )?;

    Ok(())
}

/// Row counts per table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableCounts {
    pub companies: i64,
    pub banks: i64,
    pub bank_accounts: i64,
}

pub fn table_counts(conn: &Connection) -> Result<TableCounts> {
    let count = |table: &str| -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        Ok(conn.query_row(&sql, [], |row| row.get(0))?)
    };

    Ok(TableCounts {
        companies: count("companies")?,
        banks: count("banks")?,
        bank_accounts: count("bank_accounts")?,
    })
}

// ============================================================================
// TIMESTAMP COLUMNS (RFC 3339 text)
// ============================================================================

pub(crate) fn timestamp_to_sql(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

pub(crate) fn timestamp_from_sql(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn read_timestamp(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    timestamp_from_sql(idx, &raw)
}

pub(crate) fn read_optional_timestamp(
    row: &rusqlite::Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| timestamp_from_sql(idx, &s)).transpose()
}
