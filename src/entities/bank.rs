// 🏦 Bank Entity
//
// A bank is identified by its BIK routing code, unique across the store, and
// owns zero or more bank accounts. Deleting a bank removes its accounts.

use crate::db::{read_optional_timestamp, read_timestamp};
use crate::entities::BankAccount;
use crate::validation::{self, ValidationError};
use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

// ============================================================================
// BANK ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bank {
    pub id: i64,
    pub name: String,

    /// Bank identification code, exactly 9 digits
    pub bik: String,

    /// Settlement account at the central clearing authority, 20 digits
    pub correspondent_account: Option<String>,

    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Bank {
    pub(crate) const COLUMNS: &'static str =
        "id, name, bik, correspondent_account, address, created_at, updated_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Bank {
            id: row.get(0)?,
            name: row.get(1)?,
            bik: row.get(2)?,
            correspondent_account: row.get(3)?,
            address: row.get(4)?,
            created_at: read_timestamp(row, 5)?,
            updated_at: read_optional_timestamp(row, 6)?,
        })
    }
}

/// Bank with its bank accounts loaded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BankDetail {
    #[serde(flatten)]
    pub bank: Bank,
    pub bank_accounts: Vec<BankAccount>,
}

// ============================================================================
// INPUTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BankCreate {
    pub name: String,
    pub bik: String,
    #[serde(default)]
    pub correspondent_account: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl BankCreate {
    pub fn validate(self) -> Result<Self, ValidationError> {
        Ok(BankCreate {
            name: validation::validate_name(&self.name)?,
            bik: validation::validate_bik(&self.bik)?,
            correspondent_account: validation::validate_correspondent_account(
                self.correspondent_account.as_deref(),
            )?,
            address: validation::validate_address(self.address.as_deref())?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BankUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bik: Option<String>,
    #[serde(default, deserialize_with = "crate::entities::nullable")]
    pub correspondent_account: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::entities::nullable")]
    pub address: Option<Option<String>>,
}

impl BankUpdate {
    pub fn validate(self) -> Result<Self, ValidationError> {
        let correspondent_account = match self.correspondent_account {
            Some(value) => Some(validation::validate_correspondent_account(value.as_deref())?),
            None => None,
        };
        let address = match self.address {
            Some(value) => Some(validation::validate_address(value.as_deref())?),
            None => None,
        };

        Ok(BankUpdate {
            name: self.name.as_deref().map(validation::validate_name).transpose()?,
            bik: self.bik.as_deref().map(validation::validate_bik).transpose()?,
            correspondent_account,
            address,
        })
    }

    pub fn apply_to(self, bank: &mut Bank) {
        if let Some(name) = self.name {
            bank.name = name;
        }
        if let Some(bik) = self.bik {
            bank.bik = bik;
        }
        if let Some(correspondent_account) = self.correspondent_account {
            bank.correspondent_account = correspondent_account;
        }
        if let Some(address) = self.address {
            bank.address = address;
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Bank {
        Bank {
            id: 1,
            name: "Bank A".to_string(),
            bik: "044525225".to_string(),
            correspondent_account: Some("30101810400000000225".to_string()),
            address: Some("Moscow".to_string()),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_bank_create_defaults_optional_fields() {
        let input: BankCreate =
            serde_json::from_str(r#"{"name": "Bank A", "bik": "044525225"}"#).unwrap();

        let input = input.validate().unwrap();
        assert_eq!(input.correspondent_account, None);
        assert_eq!(input.address, None);
    }

    #[test]
    fn test_bank_create_rejects_short_correspondent_account() {
        let input = BankCreate {
            name: "Bank A".to_string(),
            bik: "044525225".to_string(),
            correspondent_account: Some("301018104".to_string()),
            address: None,
        };

        let err = input.validate().unwrap_err();
        assert_eq!(err.field(), "correspondent_account");
    }

    #[test]
    fn test_bank_update_only_touches_supplied_fields() {
        let mut bank = sample();
        let patch: BankUpdate = serde_json::from_str(r#"{"bik": "044525974"}"#).unwrap();

        patch.validate().unwrap().apply_to(&mut bank);

        assert_eq!(bank.bik, "044525974");
        assert_eq!(bank.name, "Bank A");
        assert_eq!(
            bank.correspondent_account.as_deref(),
            Some("30101810400000000225")
        );
        assert_eq!(bank.address.as_deref(), Some("Moscow"));
    }

    #[test]
    fn test_bank_update_clears_nullable_fields() {
        let mut bank = sample();
        let patch: BankUpdate =
            serde_json::from_str(r#"{"correspondent_account": null, "address": null}"#).unwrap();

        patch.validate().unwrap().apply_to(&mut bank);

        assert_eq!(bank.correspondent_account, None);
        assert_eq!(bank.address, None);
    }

    #[test]
    fn test_bank_update_rejects_bad_bik() {
        let patch = BankUpdate {
            bik: Some("04452522".to_string()),
            ..Default::default()
        };
        assert_eq!(patch.validate().unwrap_err().field(), "bik");
    }
}
