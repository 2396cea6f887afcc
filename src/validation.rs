// Field Validators
// Format rules for tax IDs, routing codes, account numbers and flags
//
// Every validator takes the raw input and returns the value to store, or a
// ValidationError naming the field and the rule it broke.

use regex::Regex;
use std::sync::LazyLock;

// ============================================================================
// VALIDATION ERROR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field}: {rule}")]
    InvalidFormat {
        field: &'static str,
        rule: &'static str,
    },

    #[error("{field}: length must be between {min} and {max} characters, got {actual}")]
    InvalidLength {
        field: &'static str,
        min: usize,
        max: usize,
        actual: usize,
    },
}

impl ValidationError {
    /// Name of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::InvalidFormat { field, .. } => field,
            ValidationError::InvalidLength { field, .. } => field,
        }
    }
}

// ============================================================================
// PATTERNS
// ============================================================================

static INN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[0-9]{10}|[0-9]{12})$").expect("invalid INN pattern"));

static BIK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{9}$").expect("invalid BIK pattern"));

/// Shared by account numbers and correspondent accounts
static ACCOUNT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{20}$").expect("invalid account pattern"));

static ACTIVE_FLAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[YN]$").expect("invalid active flag pattern"));

// ============================================================================
// INPUT BOUNDS
// ============================================================================

pub const NAME_MAX_LEN: usize = 255;
pub const DESCRIPTION_MAX_LEN: usize = 1000;
pub const ADDRESS_MAX_LEN: usize = 500;
pub const CURRENCY_LEN: usize = 3;

// ============================================================================
// FIELD VALIDATORS
// ============================================================================

/// Company tax identifier (INN): exactly 10 or 12 digits
pub fn validate_inn(value: &str) -> Result<String, ValidationError> {
    matches(&INN_PATTERN, "inn", "must contain exactly 10 or 12 digits", value)
}

/// Bank identification code (BIK): exactly 9 digits
pub fn validate_bik(value: &str) -> Result<String, ValidationError> {
    matches(&BIK_PATTERN, "bik", "must contain exactly 9 digits", value)
}

/// Correspondent account: optional, but 20 digits when given
pub fn validate_correspondent_account(
    value: Option<&str>,
) -> Result<Option<String>, ValidationError> {
    value
        .map(|v| {
            matches(
                &ACCOUNT_PATTERN,
                "correspondent_account",
                "must contain exactly 20 digits",
                v,
            )
        })
        .transpose()
}

/// Bank account number: exactly 20 digits
pub fn validate_account_number(value: &str) -> Result<String, ValidationError> {
    matches(
        &ACCOUNT_PATTERN,
        "account_number",
        "must contain exactly 20 digits",
        value,
    )
}

/// Active flag: "Y" or "N"
pub fn validate_active_flag(value: &str) -> Result<String, ValidationError> {
    matches(&ACTIVE_FLAG_PATTERN, "is_active", "must be \"Y\" or \"N\"", value)
}

/// Currency code: a 3-character token, no ISO lookup
pub fn validate_currency(value: &str) -> Result<String, ValidationError> {
    bounded("currency", CURRENCY_LEN, CURRENCY_LEN, value)
}

pub fn validate_name(value: &str) -> Result<String, ValidationError> {
    bounded("name", 1, NAME_MAX_LEN, value)
}

pub fn validate_description(value: Option<&str>) -> Result<Option<String>, ValidationError> {
    value
        .map(|v| bounded("description", 0, DESCRIPTION_MAX_LEN, v))
        .transpose()
}

pub fn validate_address(value: Option<&str>) -> Result<Option<String>, ValidationError> {
    value
        .map(|v| bounded("address", 0, ADDRESS_MAX_LEN, v))
        .transpose()
}

fn matches(
    pattern: &Regex,
    field: &'static str,
    rule: &'static str,
    value: &str,
) -> Result<String, ValidationError> {
    if pattern.is_match(value) {
        Ok(value.to_string())
    } else {
        Err(ValidationError::InvalidFormat { field, rule })
    }
}

/// Length is counted in characters, not bytes (names are often Cyrillic)
fn bounded(
    field: &'static str,
    min: usize,
    max: usize,
    value: &str,
) -> Result<String, ValidationError> {
    let actual = value.chars().count();
    if actual < min || actual > max {
        return Err(ValidationError::InvalidLength {
            field,
            min,
            max,
            actual,
        });
    }
    Ok(value.to_string())
}

// ============================================================================
// TESTS
// ============================================================================
