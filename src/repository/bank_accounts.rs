use super::Page;
use crate::db::timestamp_to_sql;
use crate::entities::{BankAccount, BankAccountCreate, BankAccountDetail, BankAccountUpdate};
use crate::error::{map_constraint, Result};
use crate::repository::{banks, companies};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

pub const DUPLICATE_ACCOUNT: &str = "Account with this number already exists in this bank";

pub fn create(conn: &Connection, input: &BankAccountCreate) -> Result<BankAccount> {
    let now = Utc::now();
    let tx = conn.unchecked_transaction()?;

    tx.execute(
        "INSERT INTO bank_accounts
            (account_number, company_id, bank_id, currency, is_active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            input.account_number,
            input.company_id,
            input.bank_id,
            input.currency,
            input.is_active,
            timestamp_to_sql(&now),
        ],
    )
    .map_err(|e| map_constraint(e, DUPLICATE_ACCOUNT))?;
    let id = tx.last_insert_rowid();
    tx.commit()?;

    Ok(BankAccount {
        id,
        account_number: input.account_number.clone(),
        company_id: input.company_id,
        bank_id: input.bank_id,
        currency: input.currency.clone(),
        is_active: input.is_active.clone(),
        created_at: now,
        updated_at: None,
    })
}

pub fn find(conn: &Connection, id: i64) -> Result<Option<BankAccount>> {
    let sql = format!("SELECT {} FROM bank_accounts WHERE id = ?1", BankAccount::COLUMNS);
    Ok(conn.query_row(&sql, [id], BankAccount::from_row).optional()?)
}

/// Account with its company and bank loaded
pub fn get(conn: &Connection, id: i64) -> Result<Option<BankAccountDetail>> {
    find(conn, id)?
        .map(|account| with_owners(conn, account))
        .transpose()
}

pub fn get_by_account_and_bank(
    conn: &Connection,
    account_number: &str,
    bank_id: i64,
) -> Result<Option<BankAccount>> {
    let sql = format!(
        "SELECT {} FROM bank_accounts WHERE account_number = ?1 AND bank_id = ?2",
        BankAccount::COLUMNS
    );
    Ok(conn
        .query_row(&sql, params![account_number, bank_id], BankAccount::from_row)
        .optional()?)
}

pub fn list(conn: &Connection, page: Page) -> Result<Vec<BankAccountDetail>> {
    let sql = format!(
        "SELECT {} FROM bank_accounts ORDER BY id LIMIT ?1 OFFSET ?2",
        BankAccount::COLUMNS
    );
    let accounts = query(conn, &sql, params![page.limit, page.skip])?;

    accounts
        .into_iter()
        .map(|account| with_owners(conn, account))
        .collect()
}

/// All accounts of one company, with company and bank loaded
pub fn list_by_company(conn: &Connection, company_id: i64) -> Result<Vec<BankAccountDetail>> {
    for_company(conn, company_id)?
        .into_iter()
        .map(|account| with_owners(conn, account))
        .collect()
}

/// Flat account rows of one company
pub fn for_company(conn: &Connection, company_id: i64) -> Result<Vec<BankAccount>> {
    let sql = format!(
        "SELECT {} FROM bank_accounts WHERE company_id = ?1 ORDER BY id",
        BankAccount::COLUMNS
    );
    query(conn, &sql, params![company_id])
}

/// Flat account rows of one bank
pub fn for_bank(conn: &Connection, bank_id: i64) -> Result<Vec<BankAccount>> {
    let sql = format!(
        "SELECT {} FROM bank_accounts WHERE bank_id = ?1 ORDER BY id",
        BankAccount::COLUMNS
    );
    query(conn, &sql, params![bank_id])
}

pub fn update(
    conn: &Connection,
    mut account: BankAccount,
    patch: BankAccountUpdate,
) -> Result<BankAccount> {
    patch.apply_to(&mut account);
    account.updated_at = Some(Utc::now());

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "UPDATE bank_accounts
         SET account_number = ?1, company_id = ?2, bank_id = ?3, currency = ?4,
             is_active = ?5, updated_at = ?6
         WHERE id = ?7",
        params![
            account.account_number,
            account.company_id,
            account.bank_id,
            account.currency,
            account.is_active,
            account.updated_at.as_ref().map(timestamp_to_sql),
            account.id,
        ],
    )
    .map_err(|e| map_constraint(e, DUPLICATE_ACCOUNT))?;
    tx.commit()?;

    Ok(account)
}

pub fn delete(conn: &Connection, id: i64) -> Result<Option<BankAccount>> {
    let Some(account) = find(conn, id)? else {
        return Ok(None);
    };

    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM bank_accounts WHERE id = ?1", [id])?;
    tx.commit()?;

    Ok(Some(account))
}

fn query(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> Result<Vec<BankAccount>> {
    let mut stmt = conn.prepare(sql)?;
    let accounts = stmt
        .query_map(params, BankAccount::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(accounts)
}

/// Both owners exist while the account does (foreign keys), so a missing row
/// here is a store inconsistency and surfaces as a database error.
pub(crate) fn with_owners(conn: &Connection, account: BankAccount) -> Result<BankAccountDetail> {
    let company =
        companies::find(conn, account.company_id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;
    let bank = banks::find(conn, account.bank_id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;

    Ok(BankAccountDetail {
        account,
        company,
        bank,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_database;
    use crate::entities::{BankCreate, CompanyCreate};
    use crate::error::RegistryError;

    const NUMBER: &str = "40702810200000000001";

    /// One company and two banks
    fn seeded() -> Connection {
        let conn = open_database(":memory:").unwrap();
        companies::create(
            &conn,
            &CompanyCreate {
                name: "Co".to_string(),
                inn: "7707083893".to_string(),
                description: None,
            },
        )
        .unwrap();
        for (name, bik) in [("Bank A", "044525225"), ("Bank B", "044525974")] {
            banks::create(
                &conn,
                &BankCreate {
                    name: name.to_string(),
                    bik: bik.to_string(),
                    correspondent_account: None,
                    address: None,
                },
            )
            .unwrap();
        }
        conn
    }

    fn account(number: &str, company_id: i64, bank_id: i64) -> BankAccountCreate {
        BankAccountCreate {
            account_number: number.to_string(),
            company_id,
            bank_id,
            currency: "RUB".to_string(),
            is_active: "Y".to_string(),
        }
    }

    #[test]
    fn test_same_number_in_same_bank_fails() {
        let conn = seeded();
        create(&conn, &account(NUMBER, 1, 1)).unwrap();

        let err = create(&conn, &account(NUMBER, 1, 1)).unwrap_err();
        assert!(matches!(err, RegistryError::ConstraintViolation(ref m) if m == DUPLICATE_ACCOUNT));
    }

    #[test]
    fn test_same_number_in_different_banks_succeeds() {
        let conn = seeded();
        create(&conn, &account(NUMBER, 1, 1)).unwrap();
        create(&conn, &account(NUMBER, 1, 2)).unwrap();

        assert!(get_by_account_and_bank(&conn, NUMBER, 1).unwrap().is_some());
        assert!(get_by_account_and_bank(&conn, NUMBER, 2).unwrap().is_some());
        assert_eq!(for_company(&conn, 1).unwrap().len(), 2);
    }

    #[test]
    fn test_dangling_reference_is_constraint_violation() {
        let conn = seeded();
        let err = create(&conn, &account(NUMBER, 1, 99)).unwrap_err();
        assert!(matches!(err, RegistryError::ConstraintViolation(_)));
    }

    #[test]
    fn test_get_loads_company_and_bank() {
        let conn = seeded();
        let created = create(&conn, &account(NUMBER, 1, 2)).unwrap();

        let detail = get(&conn, created.id).unwrap().unwrap();
        assert_eq!(detail.account, created);
        assert_eq!(detail.company.inn, "7707083893");
        assert_eq!(detail.bank.name, "Bank B");
    }

    #[test]
    fn test_company_detail_embeds_accounts() {
        let conn = seeded();
        create(&conn, &account(NUMBER, 1, 1)).unwrap();

        let company = companies::get(&conn, 1).unwrap().unwrap();
        assert_eq!(company.bank_accounts.len(), 1);

        let bank_b = banks::get(&conn, 2).unwrap().unwrap();
        assert!(bank_b.bank_accounts.is_empty());
    }

    #[test]
    fn test_deleting_bank_cascades_to_accounts() {
        let conn = seeded();
        let on_a = create(&conn, &account(NUMBER, 1, 1)).unwrap();
        let on_b = create(&conn, &account(NUMBER, 1, 2)).unwrap();

        banks::delete(&conn, 1).unwrap().unwrap();

        assert!(find(&conn, on_a.id).unwrap().is_none());
        assert!(find(&conn, on_b.id).unwrap().is_some());
    }

    #[test]
    fn test_deleting_company_cascades_to_accounts() {
        let conn = seeded();
        create(&conn, &account(NUMBER, 1, 1)).unwrap();
        create(&conn, &account("40702810200000000002", 1, 2)).unwrap();

        companies::delete(&conn, 1).unwrap().unwrap();

        assert!(list(&conn, Page::default()).unwrap().is_empty());
        assert!(banks::find(&conn, 1).unwrap().is_some());
    }

    #[test]
    fn test_update_moves_account_to_other_bank() {
        let conn = seeded();
        let created = create(&conn, &account(NUMBER, 1, 1)).unwrap();

        let patch = BankAccountUpdate {
            bank_id: Some(2),
            ..Default::default()
        };
        let updated = update(&conn, created, patch).unwrap();

        assert_eq!(updated.bank_id, 2);
        assert_eq!(updated.account_number, NUMBER);
        assert!(get_by_account_and_bank(&conn, NUMBER, 1).unwrap().is_none());
    }

    #[test]
    fn test_update_collision_is_constraint_violation() {
        let conn = seeded();
        create(&conn, &account(NUMBER, 1, 1)).unwrap();
        let other = create(&conn, &account("40702810200000000002", 1, 1)).unwrap();

        let patch = BankAccountUpdate {
            account_number: Some(NUMBER.to_string()),
            ..Default::default()
        };
        let err = update(&conn, other, patch).unwrap_err();
        assert!(matches!(err, RegistryError::ConstraintViolation(_)));
    }

    #[test]
    fn test_list_by_company() {
        let conn = seeded();
        create(&conn, &account(NUMBER, 1, 1)).unwrap();
        create(&conn, &account(NUMBER, 1, 2)).unwrap();

        let accounts = list_by_company(&conn, 1).unwrap();
        let banks: Vec<&str> = accounts.iter().map(|a| a.bank.name.as_str()).collect();
        assert_eq!(banks, vec!["Bank A", "Bank B"]);
        assert!(list_by_company(&conn, 2).unwrap().is_empty());
    }
}
