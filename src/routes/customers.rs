//! Customer CRUD and list routes.

use axum::{
    extract::{rejection::JsonRejection, OriginalUri, Path, State},
    Json,
};

use crate::errors::{ApiFailure, ApiResponse, AppError, ForRequest, ParamProblem};
use crate::middleware::context::RequestContext;
use crate::models::customer::{CustomerResponse, StoreCustomer, UpdateCustomer};
use crate::pagination::{ListParams, RawListParams};
use crate::services::customer as customer_service;
use crate::AppState;

/// Parse the `{id}` path segment as a 64-bit customer id.
fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|e| AppError::InvalidPathParam(ParamProblem::from(&e)))
}

/// POST /api/v1/customer
pub async fn store(
    State(state): State<AppState>,
    ctx: RequestContext,
    body: Result<Json<StoreCustomer>, JsonRejection>,
) -> Result<Json<ApiResponse<CustomerResponse>>, ApiFailure> {
    let Json(body) = body.for_request(&ctx)?;
    let customer = customer_service::store(state.customers.as_ref(), body)
        .await
        .for_request(&ctx)?;
    Ok(ApiResponse::success(&ctx, customer))
}

/// GET /api/v1/customer/{id}
pub async fn find_by_id(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<CustomerResponse>>, ApiFailure> {
    let id = parse_id(&id).for_request(&ctx)?;
    let customer = customer_service::find_by_id(state.customers.as_ref(), id)
        .await
        .for_request(&ctx)?;
    Ok(ApiResponse::success(&ctx, customer))
}

/// PUT /api/v1/customer/{id}
///
/// Replaces the profile fields; the password only when a new one is sent.
pub async fn update(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<String>,
    body: Result<Json<UpdateCustomer>, JsonRejection>,
) -> Result<Json<ApiResponse<CustomerResponse>>, ApiFailure> {
    let id = parse_id(&id).for_request(&ctx)?;
    let Json(body) = body.for_request(&ctx)?;
    let customer = customer_service::update(state.customers.as_ref(), id, body)
        .await
        .for_request(&ctx)?;
    Ok(ApiResponse::success(&ctx, customer))
}

/// DELETE /api/v1/customer/{id}
pub async fn delete(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiFailure> {
    let id = parse_id(&id).for_request(&ctx)?;
    customer_service::delete(state.customers.as_ref(), id)
        .await
        .for_request(&ctx)?;
    Ok(ApiResponse::empty(&ctx))
}

/// GET /api/v1/customers?page=&size=&search=&orderBy=
pub async fn list(
    State(state): State<AppState>,
    ctx: RequestContext,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<ApiResponse<Vec<CustomerResponse>>>, ApiFailure> {
    let raw = RawListParams::from_query(uri.query());
    let params = ListParams::try_from(raw).for_request(&ctx)?;

    let page = customer_service::list(state.customers.as_ref(), &params, &uri)
        .await
        .for_request(&ctx)?;
    Ok(ApiResponse::paginated(&ctx, page.records, page.pagination))
}
