// Banking Registry - Core Library
// Companies, banks and the bank accounts linking them, stored in SQLite.
// Exposes all modules for use in the CLI, the API server, and tests.

pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod logging;
pub mod repository;
pub mod service;
pub mod validation;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use config::{AppConfig, ConfigError};
pub use db::{open_database, setup_database, table_counts, TableCounts};
pub use entities::{
    Bank, BankAccount, BankAccountCreate, BankAccountDetail, BankAccountUpdate, BankCreate,
    BankDetail, BankUpdate, Company, CompanyCreate, CompanyDetail, CompanyUpdate,
};
pub use error::{RegistryError, Result};
pub use logging::init_logging;
pub use repository::Page;
pub use validation::ValidationError;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
