use super::{ApiError, AppState, Pagination};
use crate::entities::{BankCreate, BankDetail, BankUpdate};
use crate::service;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

/// POST /banks/
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<BankCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<BankDetail>), ApiError> {
    let Json(input) = payload?;
    let bank = state.with_conn(|conn| service::create_bank(conn, input))?;
    Ok((StatusCode::CREATED, Json(bank)))
}

/// GET /banks/?skip=&limit=
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<Pagination>, QueryRejection>,
) -> Result<Json<Vec<BankDetail>>, ApiError> {
    let Query(pagination) = query?;
    let banks = state.with_conn(|conn| service::list_banks(conn, pagination.page()))?;
    Ok(Json(banks))
}

/// GET /banks/:bank_id
pub async fn get(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<BankDetail>, ApiError> {
    let Path(id) = id?;
    let bank = state.with_conn(|conn| service::get_bank(conn, id))?;
    Ok(Json(bank))
}

/// PUT /banks/:bank_id
pub async fn update(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<BankUpdate>, JsonRejection>,
) -> Result<Json<BankDetail>, ApiError> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    let bank = state.with_conn(|conn| service::update_bank(conn, id, patch))?;
    Ok(Json(bank))
}

/// DELETE /banks/:bank_id
pub async fn delete(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    state.with_conn(|conn| service::delete_bank(conn, id))?;
    Ok(StatusCode::NO_CONTENT)
}
