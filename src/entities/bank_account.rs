// 💳 Bank Account Entity
//
// Links exactly one company to exactly one bank. The account number is
// unique within a bank; the same number may exist at another bank.

use crate::db::{read_optional_timestamp, read_timestamp};
use crate::entities::{Bank, Company};
use crate::validation::{self, ValidationError};
use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CURRENCY: &str = "RUB";
pub const DEFAULT_ACTIVE_FLAG: &str = "Y";

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_active_flag() -> String {
    DEFAULT_ACTIVE_FLAG.to_string()
}

// ============================================================================
// BANK ACCOUNT ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankAccount {
    pub id: i64,

    /// 20 digits
    pub account_number: String,

    pub company_id: i64,
    pub bank_id: i64,

    /// 3-character currency code
    pub currency: String,

    /// "Y" or "N"
    pub is_active: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl BankAccount {
    pub(crate) const COLUMNS: &'static str =
        "id, account_number, company_id, bank_id, currency, is_active, created_at, updated_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(BankAccount {
            id: row.get(0)?,
            account_number: row.get(1)?,
            company_id: row.get(2)?,
            bank_id: row.get(3)?,
            currency: row.get(4)?,
            is_active: row.get(5)?,
            created_at: read_timestamp(row, 6)?,
            updated_at: read_optional_timestamp(row, 7)?,
        })
    }

    pub fn is_active(&self) -> bool {
        self.is_active == "Y"
    }
}

/// Account with its owning company and bank.
///
/// The embedded company and bank are plain rows: they do not carry their own
/// account lists, so the shape never recurses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BankAccountDetail {
    #[serde(flatten)]
    pub account: BankAccount,
    pub company: Company,
    pub bank: Bank,
}

// ============================================================================
// INPUTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BankAccountCreate {
    pub account_number: String,
    pub company_id: i64,
    pub bank_id: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_active_flag")]
    pub is_active: String,
}

impl BankAccountCreate {
    pub fn validate(self) -> Result<Self, ValidationError> {
        Ok(BankAccountCreate {
            account_number: validation::validate_account_number(&self.account_number)?,
            company_id: self.company_id,
            bank_id: self.bank_id,
            currency: validation::validate_currency(&self.currency)?,
            is_active: validation::validate_active_flag(&self.is_active)?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BankAccountUpdate {
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub company_id: Option<i64>,
    #[serde(default)]
    pub bank_id: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub is_active: Option<String>,
}

impl BankAccountUpdate {
    pub fn validate(self) -> Result<Self, ValidationError> {
        Ok(BankAccountUpdate {
            account_number: self
                .account_number
                .as_deref()
                .map(validation::validate_account_number)
                .transpose()?,
            company_id: self.company_id,
            bank_id: self.bank_id,
            currency: self
                .currency
                .as_deref()
                .map(validation::validate_currency)
                .transpose()?,
            is_active: self
                .is_active
                .as_deref()
                .map(validation::validate_active_flag)
                .transpose()?,
        })
    }

    /// Company id this patch moves the account to, if it changes
    pub fn company_change(&self, account: &BankAccount) -> Option<i64> {
        self.company_id.filter(|id| *id != account.company_id)
    }

    /// Bank id this patch moves the account to, if it changes
    pub fn bank_change(&self, account: &BankAccount) -> Option<i64> {
        self.bank_id.filter(|id| *id != account.bank_id)
    }

    /// The (account_number, bank_id) pair after the patch, when either half
    /// changes. None means the uniqueness key is untouched.
    pub fn changed_key(&self, account: &BankAccount) -> Option<(String, i64)> {
        let number_changes = self
            .account_number
            .as_ref()
            .is_some_and(|n| *n != account.account_number);
        let bank_changes = self.bank_change(account).is_some();

        if !number_changes && !bank_changes {
            return None;
        }

        let number = self
            .account_number
            .clone()
            .unwrap_or_else(|| account.account_number.clone());
        let bank_id = self.bank_id.unwrap_or(account.bank_id);
        Some((number, bank_id))
    }

    pub fn apply_to(self, account: &mut BankAccount) {
        if let Some(account_number) = self.account_number {
            account.account_number = account_number;
        }
        if let Some(company_id) = self.company_id {
            account.company_id = company_id;
        }
        if let Some(bank_id) = self.bank_id {
            account.bank_id = bank_id;
        }
        if let Some(currency) = self.currency {
            account.currency = currency;
        }
        if let Some(is_active) = self.is_active {
            account.is_active = is_active;
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BankAccount {
        BankAccount {
            id: 7,
            account_number: "40702810200000000001".to_string(),
            company_id: 1,
            bank_id: 1,
            currency: "RUB".to_string(),
            is_active: "Y".to_string(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_create_applies_defaults() {
        let input: BankAccountCreate = serde_json::from_str(
            r#"{"account_number": "40702810200000000001", "company_id": 1, "bank_id": 1}"#,
        )
        .unwrap();

        assert_eq!(input.currency, "RUB");
        assert_eq!(input.is_active, "Y");
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_create_rejects_bad_active_flag() {
        let input = BankAccountCreate {
            account_number: "40702810200000000001".to_string(),
            company_id: 1,
            bank_id: 1,
            currency: "USD".to_string(),
            is_active: "maybe".to_string(),
        };
        assert_eq!(input.validate().unwrap_err().field(), "is_active");
    }

    #[test]
    fn test_changed_key() {
        let account = sample();

        // Same values as stored: key untouched
        let patch = BankAccountUpdate {
            account_number: Some(account.account_number.clone()),
            bank_id: Some(1),
            ..Default::default()
        };
        assert_eq!(patch.changed_key(&account), None);

        // New bank keeps the stored number
        let patch = BankAccountUpdate {
            bank_id: Some(2),
            ..Default::default()
        };
        assert_eq!(
            patch.changed_key(&account),
            Some(("40702810200000000001".to_string(), 2))
        );

        // New number keeps the stored bank
        let patch = BankAccountUpdate {
            account_number: Some("40702810200000000002".to_string()),
            ..Default::default()
        };
        assert_eq!(
            patch.changed_key(&account),
            Some(("40702810200000000002".to_string(), 1))
        );

        // Currency alone never touches the key
        let patch = BankAccountUpdate {
            currency: Some("USD".to_string()),
            ..Default::default()
        };
        assert_eq!(patch.changed_key(&account), None);
    }

    #[test]
    fn test_apply_keeps_unsupplied_fields() {
        let mut account = sample();
        let patch: BankAccountUpdate = serde_json::from_str(r#"{"is_active": "N"}"#).unwrap();

        patch.validate().unwrap().apply_to(&mut account);

        assert!(!account.is_active());
        assert_eq!(account.account_number, "40702810200000000001");
        assert_eq!(account.currency, "RUB");
        assert_eq!(account.company_id, 1);
        assert_eq!(account.bank_id, 1);
    }

    #[test]
    fn test_company_and_bank_change_ignore_same_ids() {
        let account = sample();
        let patch = BankAccountUpdate {
            company_id: Some(1),
            bank_id: Some(3),
            ..Default::default()
        };

        assert_eq!(patch.company_change(&account), None);
        assert_eq!(patch.bank_change(&account), Some(3));
    }
}
