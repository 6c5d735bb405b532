pub mod config;
pub mod db;
pub mod errors;
pub mod i18n;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod repository;
pub mod routes;
pub mod services;

use std::sync::Arc;

use repository::CustomerRepository;

/// Shared application state passed to all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub customers: Arc<dyn CustomerRepository>,
    pub config: config::AppConfig,
}
