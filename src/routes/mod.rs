//! Route definitions for the customer API.

pub mod customers;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use crate::middleware::request_id::{
    request_id_layer, request_id_propagation_layer, trace_layer,
};
use crate::AppState;

/// Largest accepted request body.
pub const BODY_LIMIT_BYTES: usize = 1024 * 1024;

fn cors_layer(allowed_origin: Option<&str>) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match allowed_origin.and_then(|origin| origin.parse::<HeaderValue>().ok()) {
        Some(origin) => cors.allow_origin(origin),
        None => cors.allow_origin(Any),
    }
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let customer_routes = Router::new()
        .route("/customer", post(customers::store))
        .route(
            "/customer/{id}",
            get(customers::find_by_id)
                .put(customers::update)
                .delete(customers::delete),
        )
        .route("/customers", get(customers::list));

    let cors = cors_layer(state.config.cors_allowed_origin.as_deref());

    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .nest("/api/v1", customer_routes)
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(trace_layer())
                .layer(request_id_propagation_layer())
                .layer(cors),
        )
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .with_state(state)
}
