use super::Page;
use crate::db::timestamp_to_sql;
use crate::entities::{Bank, BankCreate, BankDetail, BankUpdate};
use crate::error::{map_constraint, Result};
use crate::repository::bank_accounts;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

pub const DUPLICATE_BIK: &str = "Bank with this BIK already exists";

pub fn create(conn: &Connection, input: &BankCreate) -> Result<Bank> {
    let now = Utc::now();
    let tx = conn.unchecked_transaction()?;

    tx.execute(
        "INSERT INTO banks (name, bik, correspondent_account, address, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            input.name,
            input.bik,
            input.correspondent_account,
            input.address,
            timestamp_to_sql(&now),
        ],
    )
    .map_err(|e| map_constraint(e, DUPLICATE_BIK))?;
    let id = tx.last_insert_rowid();
    tx.commit()?;

    Ok(Bank {
        id,
        name: input.name.clone(),
        bik: input.bik.clone(),
        correspondent_account: input.correspondent_account.clone(),
        address: input.address.clone(),
        created_at: now,
        updated_at: None,
    })
}

pub fn find(conn: &Connection, id: i64) -> Result<Option<Bank>> {
    let sql = format!("SELECT {} FROM banks WHERE id = ?1", Bank::COLUMNS);
    Ok(conn.query_row(&sql, [id], Bank::from_row).optional()?)
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<BankDetail>> {
    find(conn, id)?
        .map(|bank| with_accounts(conn, bank))
        .transpose()
}

pub fn get_by_bik(conn: &Connection, bik: &str) -> Result<Option<Bank>> {
    let sql = format!("SELECT {} FROM banks WHERE bik = ?1", Bank::COLUMNS);
    Ok(conn.query_row(&sql, [bik], Bank::from_row).optional()?)
}

pub fn list(conn: &Connection, page: Page) -> Result<Vec<BankDetail>> {
    let sql = format!(
        "SELECT {} FROM banks ORDER BY id LIMIT ?1 OFFSET ?2",
        Bank::COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let banks = stmt
        .query_map(params![page.limit, page.skip], Bank::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    banks
        .into_iter()
        .map(|bank| with_accounts(conn, bank))
        .collect()
}

pub fn update(conn: &Connection, mut bank: Bank, patch: BankUpdate) -> Result<Bank> {
    patch.apply_to(&mut bank);
    bank.updated_at = Some(Utc::now());

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "UPDATE banks
         SET name = ?1, bik = ?2, correspondent_account = ?3, address = ?4, updated_at = ?5
         WHERE id = ?6",
        params![
            bank.name,
            bank.bik,
            bank.correspondent_account,
            bank.address,
            bank.updated_at.as_ref().map(timestamp_to_sql),
            bank.id,
        ],
    )
    .map_err(|e| map_constraint(e, DUPLICATE_BIK))?;
    tx.commit()?;

    Ok(bank)
}

/// Remove a bank; its accounts go with it
pub fn delete(conn: &Connection, id: i64) -> Result<Option<Bank>> {
    let Some(bank) = find(conn, id)? else {
        return Ok(None);
    };

    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM banks WHERE id = ?1", [id])?;
    tx.commit()?;

    Ok(Some(bank))
}

fn with_accounts(conn: &Connection, bank: Bank) -> Result<BankDetail> {
    let bank_accounts = bank_accounts::for_bank(conn, bank.id)?;
    Ok(BankDetail {
        bank,
        bank_accounts,
    })
}
