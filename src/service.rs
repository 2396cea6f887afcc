// Request orchestration
//
// Each mutating operation validates its input, then checks existence and
// uniqueness before writing, so callers get a descriptive error instead of a
// bare constraint failure. The store's constraints stay authoritative: a
// concurrent writer that slips past a pre-check still fails at commit with
// the same ConstraintViolation.

use crate::entities::{
    BankAccountCreate, BankAccountDetail, BankAccountUpdate, BankCreate, BankDetail, BankUpdate,
    CompanyCreate, CompanyDetail, CompanyUpdate,
};
use crate::error::{RegistryError, Result};
use crate::repository::{bank_accounts, banks, companies, Page};
use rusqlite::Connection;
use tracing::{info, warn};

const COMPANY: &str = "Company";
const BANK: &str = "Bank";
const BANK_ACCOUNT: &str = "Bank account";

fn conflict(message: &str) -> RegistryError {
    RegistryError::ConstraintViolation(message.to_string())
}

// ============================================================================
// COMPANIES
// ============================================================================

pub fn create_company(conn: &Connection, input: CompanyCreate) -> Result<CompanyDetail> {
    let input = input.validate()?;

    if companies::get_by_inn(conn, &input.inn)?.is_some() {
        warn!(inn = %input.inn, "Company create rejected: INN already registered");
        return Err(conflict(companies::DUPLICATE_INN));
    }

    let company = companies::create(conn, &input)?;
    info!(company_id = company.id, inn = %company.inn, "Company created");

    Ok(CompanyDetail {
        company,
        bank_accounts: Vec::new(),
    })
}

pub fn list_companies(conn: &Connection, page: Page) -> Result<Vec<CompanyDetail>> {
    companies::list(conn, page)
}

pub fn get_company(conn: &Connection, id: i64) -> Result<CompanyDetail> {
    companies::get(conn, id)?.ok_or(RegistryError::NotFound {
        entity: COMPANY,
        id,
    })
}

pub fn update_company(conn: &Connection, id: i64, patch: CompanyUpdate) -> Result<CompanyDetail> {
    let patch = patch.validate()?;
    let existing = get_company(conn, id)?.company;

    if let Some(inn) = patch.inn.as_deref().filter(|inn| *inn != existing.inn) {
        if companies::get_by_inn(conn, inn)?.is_some() {
            warn!(company_id = id, inn, "Company update rejected: INN already registered");
            return Err(conflict(companies::DUPLICATE_INN));
        }
    }

    let company = companies::update(conn, existing, patch)?;
    info!(company_id = id, "Company updated");
    get_company(conn, company.id)
}

pub fn delete_company(conn: &Connection, id: i64) -> Result<()> {
    companies::delete(conn, id)?.ok_or(RegistryError::NotFound {
        entity: COMPANY,
        id,
    })?;
    info!(company_id = id, "Company deleted with its bank accounts");
    Ok(())
}

// ============================================================================
// BANKS
// ============================================================================

pub fn create_bank(conn: &Connection, input: BankCreate) -> Result<BankDetail> {
    let input = input.validate()?;

    if banks::get_by_bik(conn, &input.bik)?.is_some() {
        warn!(bik = %input.bik, "Bank create rejected: BIK already registered");
        return Err(conflict(banks::DUPLICATE_BIK));
    }

    let bank = banks::create(conn, &input)?;
    info!(bank_id = bank.id, bik = %bank.bik, "Bank created");

    Ok(BankDetail {
        bank,
        bank_accounts: Vec::new(),
    })
}

pub fn list_banks(conn: &Connection, page: Page) -> Result<Vec<BankDetail>> {
    banks::list(conn, page)
}

pub fn get_bank(conn: &Connection, id: i64) -> Result<BankDetail> {
    banks::get(conn, id)?.ok_or(RegistryError::NotFound { entity: BANK, id })
}

pub fn update_bank(conn: &Connection, id: i64, patch: BankUpdate) -> Result<BankDetail> {
    let patch = patch.validate()?;
    let existing = get_bank(conn, id)?.bank;

    if let Some(bik) = patch.bik.as_deref().filter(|bik| *bik != existing.bik) {
        if banks::get_by_bik(conn, bik)?.is_some() {
            warn!(bank_id = id, bik, "Bank update rejected: BIK already registered");
            return Err(conflict(banks::DUPLICATE_BIK));
        }
    }

    let bank = banks::update(conn, existing, patch)?;
    info!(bank_id = id, "Bank updated");
    get_bank(conn, bank.id)
}

pub fn delete_bank(conn: &Connection, id: i64) -> Result<()> {
    banks::delete(conn, id)?.ok_or(RegistryError::NotFound { entity: BANK, id })?;
    info!(bank_id = id, "Bank deleted with its bank accounts");
    Ok(())
}

// ============================================================================
// BANK ACCOUNTS
// ============================================================================

pub fn create_bank_account(
    conn: &Connection,
    input: BankAccountCreate,
) -> Result<BankAccountDetail> {
    let input = input.validate()?;

    // 1. Company, 2. bank, 3. (number, bank) pair, 4. write
    let company = companies::find(conn, input.company_id)?.ok_or(
        RegistryError::InvalidReference {
            entity: COMPANY,
            id: input.company_id,
        },
    )?;
    let bank = banks::find(conn, input.bank_id)?.ok_or(RegistryError::InvalidReference {
        entity: BANK,
        id: input.bank_id,
    })?;

    if bank_accounts::get_by_account_and_bank(conn, &input.account_number, input.bank_id)?
        .is_some()
    {
        warn!(
            bank_id = input.bank_id,
            account_number = %input.account_number,
            "Bank account create rejected: number already used in bank"
        );
        return Err(conflict(bank_accounts::DUPLICATE_ACCOUNT));
    }

    let account = bank_accounts::create(conn, &input)?;
    info!(
        account_id = account.id,
        company_id = account.company_id,
        bank_id = account.bank_id,
        "Bank account created"
    );

    Ok(BankAccountDetail {
        account,
        company,
        bank,
    })
}

pub fn list_bank_accounts(conn: &Connection, page: Page) -> Result<Vec<BankAccountDetail>> {
    bank_accounts::list(conn, page)
}

pub fn get_bank_account(conn: &Connection, id: i64) -> Result<BankAccountDetail> {
    bank_accounts::get(conn, id)?.ok_or(RegistryError::NotFound {
        entity: BANK_ACCOUNT,
        id,
    })
}

/// Accounts of one company; the company itself must exist
pub fn list_company_bank_accounts(
    conn: &Connection,
    company_id: i64,
) -> Result<Vec<BankAccountDetail>> {
    if companies::find(conn, company_id)?.is_none() {
        return Err(RegistryError::NotFound {
            entity: COMPANY,
            id: company_id,
        });
    }
    bank_accounts::list_by_company(conn, company_id)
}

pub fn update_bank_account(
    conn: &Connection,
    id: i64,
    patch: BankAccountUpdate,
) -> Result<BankAccountDetail> {
    let patch = patch.validate()?;
    let existing = bank_accounts::find(conn, id)?.ok_or(RegistryError::NotFound {
        entity: BANK_ACCOUNT,
        id,
    })?;

    // Only references that actually change are re-checked
    if let Some(company_id) = patch.company_change(&existing) {
        if companies::find(conn, company_id)?.is_none() {
            return Err(RegistryError::InvalidReference {
                entity: COMPANY,
                id: company_id,
            });
        }
    }
    if let Some(bank_id) = patch.bank_change(&existing) {
        if banks::find(conn, bank_id)?.is_none() {
            return Err(RegistryError::InvalidReference {
                entity: BANK,
                id: bank_id,
            });
        }
    }

    if let Some((number, bank_id)) = patch.changed_key(&existing) {
        let taken = bank_accounts::get_by_account_and_bank(conn, &number, bank_id)?
            .is_some_and(|other| other.id != existing.id);
        if taken {
            warn!(
                account_id = id,
                bank_id,
                account_number = %number,
                "Bank account update rejected: number already used in bank"
            );
            return Err(conflict(bank_accounts::DUPLICATE_ACCOUNT));
        }
    }

    let account = bank_accounts::update(conn, existing, patch)?;
    info!(account_id = id, "Bank account updated");
    bank_accounts::with_owners(conn, account)
}

pub fn delete_bank_account(conn: &Connection, id: i64) -> Result<()> {
    bank_accounts::delete(conn, id)?.ok_or(RegistryError::NotFound {
        entity: BANK_ACCOUNT,
        id,
    })?;
    info!(account_id = id, "Bank account deleted");
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
