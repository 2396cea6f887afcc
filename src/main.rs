// Banking Registry - maintenance CLI
//
//   banking-registry migrate   create tables and indexes (idempotent)
//   banking-registry stats     print row counts per table

use anyhow::{bail, Result};
use banking_registry::{init_logging, open_database, table_counts, AppConfig};
use std::env;
use tracing::info;

fn main() -> Result<()> {
    let config = AppConfig::from_env()?;
    init_logging(&config);

    let args: Vec<String> = env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("migrate") => run_migrate(&config),
        Some("stats") => run_stats(&config),
        Some(other) => bail!("unknown command {other:?}, expected \"migrate\" or \"stats\""),
        None => bail!("usage: banking-registry <migrate|stats>"),
    }
}

fn run_migrate(config: &AppConfig) -> Result<()> {
    // open_database runs the schema setup
    open_database(&config.database_path)?;
    info!(path = %config.database_path, "Schema is up to date");
    println!("✓ Database ready: {}", config.database_path);
    Ok(())
}

fn run_stats(config: &AppConfig) -> Result<()> {
    let conn = open_database(&config.database_path)?;
    let counts = table_counts(&conn)?;

    println!("📊 {}", config.database_path);
    println!("   companies:     {}", counts.companies);
    println!("   banks:         {}", counts.banks);
    println!("   bank_accounts: {}", counts.bank_accounts);
    Ok(())
}
