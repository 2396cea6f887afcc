use super::{ApiError, AppState, Pagination};
use crate::entities::{BankAccountCreate, BankAccountDetail, BankAccountUpdate};
use crate::service;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

/// POST /bank-accounts/
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<BankAccountCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<BankAccountDetail>), ApiError> {
    let Json(input) = payload?;
    let account = state.with_conn(|conn| service::create_bank_account(conn, input))?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// GET /bank-accounts/?skip=&limit=
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<Pagination>, QueryRejection>,
) -> Result<Json<Vec<BankAccountDetail>>, ApiError> {
    let Query(pagination) = query?;
    let accounts = state.with_conn(|conn| service::list_bank_accounts(conn, pagination.page()))?;
    Ok(Json(accounts))
}

/// GET /bank-accounts/:account_id
pub async fn get(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<BankAccountDetail>, ApiError> {
    let Path(id) = id?;
    let account = state.with_conn(|conn| service::get_bank_account(conn, id))?;
    Ok(Json(account))
}

/// GET /bank-accounts/company/:company_id
pub async fn list_for_company(
    State(state): State<AppState>,
    company_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<BankAccountDetail>>, ApiError> {
    let Path(company_id) = company_id?;
    let accounts =
        state.with_conn(|conn| service::list_company_bank_accounts(conn, company_id))?;
    Ok(Json(accounts))
}

/// PUT /bank-accounts/:account_id
pub async fn update(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<BankAccountUpdate>, JsonRejection>,
) -> Result<Json<BankAccountDetail>, ApiError> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    let account = state.with_conn(|conn| service::update_bank_account(conn, id, patch))?;
    Ok(Json(account))
}

/// DELETE /bank-accounts/:account_id
pub async fn delete(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    state.with_conn(|conn| service::delete_bank_account(conn, id))?;
    Ok(StatusCode::NO_CONTENT)
}
