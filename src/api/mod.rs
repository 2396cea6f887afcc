// HTTP API
// JSON routes over the service layer, sharing one SQLite connection

mod bank_accounts;
mod banks;
mod companies;
mod error;

pub use error::ApiError;

use crate::error::{RegistryError, Result as RegistryResult};
use crate::repository::Page;
use axum::{routing::get, Json, Router};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
}

impl AppState {
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
        }
    }

    /// Run `f` while holding the connection lock
    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> RegistryResult<T>,
    ) -> Result<T, ApiError> {
        let conn = self
            .db
            .lock()
            .map_err(|_| RegistryError::ConnectionPoisoned)?;
        Ok(f(&conn)?)
    }
}

/// `?skip=&limit=` on list endpoints
#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    skip: u32,
    #[serde(default = "default_limit")]
    limit: u32,
}

fn default_limit() -> u32 {
    Page::DEFAULT_LIMIT
}

impl Pagination {
    fn page(&self) -> Page {
        Page::new(self.skip, self.limit)
    }
}

#[derive(Serialize)]
struct Banner {
    name: &'static str,
    version: &'static str,
}

async fn root() -> Json<Banner> {
    Json(Banner {
        name: "Banking Registry API",
        version: crate::VERSION,
    })
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Build the router. Every collection answers with and without the
/// trailing slash.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        // Companies
        .route("/companies", get(companies::list).post(companies::create))
        .route("/companies/", get(companies::list).post(companies::create))
        .route(
            "/companies/:company_id",
            get(companies::get)
                .put(companies::update)
                .delete(companies::delete),
        )
        // Banks
        .route("/banks", get(banks::list).post(banks::create))
        .route("/banks/", get(banks::list).post(banks::create))
        .route(
            "/banks/:bank_id",
            get(banks::get).put(banks::update).delete(banks::delete),
        )
        // Bank accounts
        .route(
            "/bank-accounts",
            get(bank_accounts::list).post(bank_accounts::create),
        )
        .route(
            "/bank-accounts/",
            get(bank_accounts::list).post(bank_accounts::create),
        )
        .route(
            "/bank-accounts/company/:company_id",
            get(bank_accounts::list_for_company),
        )
        .route(
            "/bank-accounts/:account_id",
            get(bank_accounts::get)
                .put(bank_accounts::update)
                .delete(bank_accounts::delete),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
