use super::Page;
use crate::db::timestamp_to_sql;
use crate::entities::{Company, CompanyCreate, CompanyDetail, CompanyUpdate};
use crate::error::{map_constraint, Result};
use crate::repository::bank_accounts;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

pub const DUPLICATE_INN: &str = "Company with this INN already exists";

pub fn create(conn: &Connection, input: &CompanyCreate) -> Result<Company> {
    let now = Utc::now();
    let tx = conn.unchecked_transaction()?;

    tx.execute(
        "INSERT INTO companies (name, inn, description, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![input.name, input.inn, input.description, timestamp_to_sql(&now)],
    )
    .map_err(|e| map_constraint(e, DUPLICATE_INN))?;
    let id = tx.last_insert_rowid();
    tx.commit()?;

    Ok(Company {
        id,
        name: input.name.clone(),
        inn: input.inn.clone(),
        description: input.description.clone(),
        created_at: now,
        updated_at: None,
    })
}

/// Company row without its accounts
pub fn find(conn: &Connection, id: i64) -> Result<Option<Company>> {
    let sql = format!("SELECT {} FROM companies WHERE id = ?1", Company::COLUMNS);
    Ok(conn.query_row(&sql, [id], Company::from_row).optional()?)
}

/// Company with its bank accounts loaded
pub fn get(conn: &Connection, id: i64) -> Result<Option<CompanyDetail>> {
    find(conn, id)?
        .map(|company| with_accounts(conn, company))
        .transpose()
}

pub fn get_by_inn(conn: &Connection, inn: &str) -> Result<Option<Company>> {
    let sql = format!("SELECT {} FROM companies WHERE inn = ?1", Company::COLUMNS);
    Ok(conn.query_row(&sql, [inn], Company::from_row).optional()?)
}

/// Companies in insertion order, each with its accounts
pub fn list(conn: &Connection, page: Page) -> Result<Vec<CompanyDetail>> {
    let sql = format!(
        "SELECT {} FROM companies ORDER BY id LIMIT ?1 OFFSET ?2",
        Company::COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let companies = stmt
        .query_map(params![page.limit, page.skip], Company::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    companies
        .into_iter()
        .map(|company| with_accounts(conn, company))
        .collect()
}

/// Apply `patch` to `company` and persist every column
pub fn update(conn: &Connection, mut company: Company, patch: CompanyUpdate) -> Result<Company> {
    patch.apply_to(&mut company);
    company.updated_at = Some(Utc::now());

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "UPDATE companies SET name = ?1, inn = ?2, description = ?3, updated_at = ?4
         WHERE id = ?5",
        params![
            company.name,
            company.inn,
            company.description,
            company.updated_at.as_ref().map(timestamp_to_sql),
            company.id,
        ],
    )
    .map_err(|e| map_constraint(e, DUPLICATE_INN))?;
    tx.commit()?;

    Ok(company)
}

/// Remove a company and, through the foreign key, its accounts
pub fn delete(conn: &Connection, id: i64) -> Result<Option<Company>> {
    let Some(company) = find(conn, id)? else {
        return Ok(None);
    };

    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM companies WHERE id = ?1", [id])?;
    tx.commit()?;

    Ok(Some(company))
}

fn with_accounts(conn: &Connection, company: Company) -> Result<CompanyDetail> {
    let bank_accounts = bank_accounts::for_company(conn, company.id)?;
    Ok(CompanyDetail {
        company,
        bank_accounts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_database;
    use crate::error::RegistryError;

    fn input(name: &str, inn: &str) -> CompanyCreate {
        CompanyCreate {
            name: name.to_string(),
            inn: inn.to_string(),
            description: Some("test".to_string()),
        }
    }

    #[test]
    fn test_create_and_get() {
        let conn = open_database(":memory:").unwrap();

        let created = create(&conn, &input("Co", "7707083893")).unwrap();
        assert_eq!(created.id, 1);

        let detail = get(&conn, created.id).unwrap().unwrap();
        assert_eq!(detail.company, created);
        assert!(detail.bank_accounts.is_empty());

        assert!(get(&conn, 99).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_inn_is_constraint_violation() {
        let conn = open_database(":memory:").unwrap();
        create(&conn, &input("Co", "7707083893")).unwrap();

        let err = create(&conn, &input("Other", "7707083893")).unwrap_err();
        match err {
            RegistryError::ConstraintViolation(msg) => assert_eq!(msg, DUPLICATE_INN),
            other => panic!("expected constraint violation, got {:?}", other),
        }
    }

    #[test]
    fn test_get_by_inn() {
        let conn = open_database(":memory:").unwrap();
        create(&conn, &input("Co", "7707083893")).unwrap();

        assert_eq!(
            get_by_inn(&conn, "7707083893").unwrap().unwrap().name,
            "Co"
        );
        assert!(get_by_inn(&conn, "500100732259").unwrap().is_none());
    }

    #[test]
    fn test_list_is_paginated_in_insertion_order() {
        let conn = open_database(":memory:").unwrap();
        for (i, inn) in ["1000000001", "1000000002", "1000000003"].iter().enumerate() {
            create(&conn, &input(&format!("Co {}", i), inn)).unwrap();
        }

        let all = list(&conn, Page::default()).unwrap();
        let ids: Vec<i64> = all.iter().map(|c| c.company.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let window = list(&conn, Page::new(1, 1)).unwrap();
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].company.inn, "1000000002");
    }

    #[test]
    fn test_update_persists_only_patched_fields() {
        let conn = open_database(":memory:").unwrap();
        let created = create(&conn, &input("Co", "7707083893")).unwrap();

        let patch = CompanyUpdate {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };
        let updated = update(&conn, created, patch).unwrap();
        assert!(updated.updated_at.is_some());

        let stored = find(&conn, updated.id).unwrap().unwrap();
        assert_eq!(stored.name, "Renamed");
        assert_eq!(stored.inn, "7707083893");
        assert_eq!(stored.description.as_deref(), Some("test"));
        assert_eq!(stored.updated_at, updated.updated_at);
    }

    #[test]
    fn test_update_to_taken_inn_fails_and_rolls_back() {
        let conn = open_database(":memory:").unwrap();
        create(&conn, &input("First", "1000000001")).unwrap();
        let second = create(&conn, &input("Second", "1000000002")).unwrap();

        let patch = CompanyUpdate {
            name: Some("Changed".to_string()),
            inn: Some("1000000001".to_string()),
            ..Default::default()
        };
        assert!(update(&conn, second, patch).is_err());

        let stored = find(&conn, 2).unwrap().unwrap();
        assert_eq!(stored.name, "Second");
        assert_eq!(stored.inn, "1000000002");
    }

    #[test]
    fn test_delete_returns_removed_row() {
        let conn = open_database(":memory:").unwrap();
        let created = create(&conn, &input("Co", "7707083893")).unwrap();

        assert_eq!(delete(&conn, created.id).unwrap(), Some(created));
        assert_eq!(delete(&conn, 1).unwrap(), None);
        assert!(find(&conn, 1).unwrap().is_none());
    }
}
