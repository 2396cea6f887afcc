// Entity Models
// Companies, banks and the bank accounts linking them
//
// Each entity has:
// - A stored row type (id assigned by the store, timestamps)
// - A create input with `validate()`
// - A partial update where every field is optional, merged with `apply_to()`
// - A detail shape for responses; nesting stops after one level

pub mod bank;
pub mod bank_account;
pub mod company;

pub use bank::{Bank, BankCreate, BankDetail, BankUpdate};
pub use bank_account::{BankAccount, BankAccountCreate, BankAccountDetail, BankAccountUpdate};
pub use company::{Company, CompanyCreate, CompanyDetail, CompanyUpdate};

use serde::{Deserialize, Deserializer};

/// Deserializer for nullable patch fields.
///
/// Paired with `#[serde(default)]`: an absent key stays `None` (leave as is),
/// an explicit `null` becomes `Some(None)` (clear), a value becomes
/// `Some(Some(v))`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
