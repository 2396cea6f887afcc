use super::{ApiError, AppState, Pagination};
use crate::entities::{CompanyCreate, CompanyDetail, CompanyUpdate};
use crate::service;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

/// POST /companies/
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CompanyCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<CompanyDetail>), ApiError> {
    let Json(input) = payload?;
    let company = state.with_conn(|conn| service::create_company(conn, input))?;
    Ok((StatusCode::CREATED, Json(company)))
}

/// GET /companies/?skip=&limit=
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<Pagination>, QueryRejection>,
) -> Result<Json<Vec<CompanyDetail>>, ApiError> {
    let Query(pagination) = query?;
    let companies = state.with_conn(|conn| service::list_companies(conn, pagination.page()))?;
    Ok(Json(companies))
}

/// GET /companies/:company_id
pub async fn get(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<CompanyDetail>, ApiError> {
    let Path(id) = id?;
    let company = state.with_conn(|conn| service::get_company(conn, id))?;
    Ok(Json(company))
}

/// PUT /companies/:company_id
pub async fn update(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CompanyUpdate>, JsonRejection>,
) -> Result<Json<CompanyDetail>, ApiError> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    let company = state.with_conn(|conn| service::update_company(conn, id, patch))?;
    Ok(Json(company))
}

/// DELETE /companies/:company_id
pub async fn delete(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    state.with_conn(|conn| service::delete_company(conn, id))?;
    Ok(StatusCode::NO_CONTENT)
}
