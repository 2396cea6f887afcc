// Company Entity
//
// A company is identified by its tax number (INN), unique across the store,
// and owns zero or more bank accounts.

use crate::db::{read_optional_timestamp, read_timestamp};
use crate::entities::BankAccount;
use crate::validation::{self, ValidationError};
use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

// ============================================================================
// COMPANY ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: i64,
    pub name: String,
    /// Tax identifier, 10 or 12 digits
    pub inn: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    /// None until the first update
    pub updated_at: Option<DateTime<Utc>>,
}

impl Company {
    pub(crate) const COLUMNS: &'static str =
        "id, name, inn, description, created_at, updated_at";

    /// Map a row selected with `COLUMNS`
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Company {
            id: row.get(0)?,
            name: row.get(1)?,
            inn: row.get(2)?,
            description: row.get(3)?,
            created_at: read_timestamp(row, 4)?,
            updated_at: read_optional_timestamp(row, 5)?,
        })
    }
}

/// Company with its bank accounts loaded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub bank_accounts: Vec<BankAccount>,
}

// ============================================================================
// INPUTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompanyCreate {
    pub name: String,
    pub inn: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl CompanyCreate {
    pub fn validate(self) -> Result<Self, ValidationError> {
        Ok(CompanyCreate {
            name: validation::validate_name(&self.name)?,
            inn: validation::validate_inn(&self.inn)?,
            description: validation::validate_description(self.description.as_deref())?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CompanyUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub inn: Option<String>,
    #[serde(default, deserialize_with = "crate::entities::nullable")]
    pub description: Option<Option<String>>,
}

impl CompanyUpdate {
    /// Validates only the fields that are present
    pub fn validate(self) -> Result<Self, ValidationError> {
        Ok(CompanyUpdate {
            name: self.name.as_deref().map(validation::validate_name).transpose()?,
            inn: self.inn.as_deref().map(validation::validate_inn).transpose()?,
            description: match self.description {
                Some(value) => Some(validation::validate_description(value.as_deref())?),
                None => None,
            },
        })
    }

    /// Overwrite the fields present in this patch; everything else is kept.
    pub fn apply_to(self, company: &mut Company) {
        if let Some(name) = self.name {
            company.name = name;
        }
        if let Some(inn) = self.inn {
            company.inn = inn;
        }
        if let Some(description) = self.description {
            company.description = description;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Company {
        Company {
            id: 1,
            name: "Co".to_string(),
            inn: "7707083893".to_string(),
            description: Some("first".to_string()),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_create_validation() {
        let input = CompanyCreate {
            name: "Co".to_string(),
            inn: "7707083893".to_string(),
            description: None,
        };
        assert!(input.clone().validate().is_ok());

        let bad = CompanyCreate {
            inn: "123".to_string(),
            ..input
        };
        assert_eq!(bad.validate().unwrap_err().field(), "inn");
    }

    #[test]
    fn test_partial_update_keeps_missing_fields() {
        let mut company = sample();
        let patch: CompanyUpdate = serde_json::from_str(r#"{"name": "Renamed"}"#).unwrap();

        patch.validate().unwrap().apply_to(&mut company);

        assert_eq!(company.name, "Renamed");
        assert_eq!(company.inn, "7707083893");
        assert_eq!(company.description.as_deref(), Some("first"));
    }

    #[test]
    fn test_explicit_null_clears_description() {
        let mut company = sample();
        let patch: CompanyUpdate = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(patch.description, Some(None));

        patch.validate().unwrap().apply_to(&mut company);
        assert_eq!(company.description, None);
    }

    #[test]
    fn test_null_inn_is_ignored() {
        let mut company = sample();
        let patch: CompanyUpdate = serde_json::from_str(r#"{"inn": null}"#).unwrap();

        patch.validate().unwrap().apply_to(&mut company);
        assert_eq!(company.inn, "7707083893");
    }

    #[test]
    fn test_update_validates_present_fields_only() {
        let patch = CompanyUpdate {
            inn: Some("12345".to_string()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
        assert!(CompanyUpdate::default().validate().is_ok());
    }

    #[test]
    fn test_detail_serializes_flat() {
        let detail = CompanyDetail {
            company: sample(),
            bank_accounts: vec![],
        };
        let json = serde_json::to_value(&detail).unwrap();

        assert_eq!(json["id"], 1);
        assert_eq!(json["inn"], "7707083893");
        assert!(json["bank_accounts"].as_array().unwrap().is_empty());
        assert!(json["updated_at"].is_null());
    }
}
