//! Router builder for the invoice and session routes

use crate::server::handlers::{
    create_invoice, delete_invoice, health_check, login, logout, update_invoice,
};
use crate::server::host::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Build all routes from the state's route configuration
///
/// With the default listing path `/dashboard/invoices`:
/// - POST /dashboard/invoices/create - Create an invoice
/// - POST /dashboard/invoices/{id}/edit - Update an invoice
/// - POST /dashboard/invoices/{id}/delete - Delete an invoice
/// - POST /login - Sign in with credentials
/// - POST /logout - Sign out
/// - GET /health, GET /healthz - Liveness
pub fn build_routes(state: AppState) -> Router {
    let listing = state.routes.invoices.trim_end_matches('/').to_string();

    Router::new()
        .route(&format!("{}/create", listing), post(create_invoice))
        .route(&format!("{}/{{id}}/edit", listing), post(update_invoice))
        .route(&format!("{}/{{id}}/delete", listing), post(delete_invoice))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .merge(health_routes())
        .with_state(state)
}

/// Build health check routes
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
}
