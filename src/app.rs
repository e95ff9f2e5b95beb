//! Shared application state and the HTTP router.

use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::{handlers, middleware, storage::BankStore};

/// State shared with every handler via `State` extraction.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BankStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn BankStore>) -> Self {
        Self { store }
    }
}

/// Build the full router: public health check plus authenticated API routes.
pub fn router(state: AppState) -> Router {
    let authenticated_routes = Router::new()
        // User routes
        .route(
            "/api/users",
            post(handlers::users::create_user).get(handlers::users::list_users),
        )
        .route("/api/users/{id}", get(handlers::users::get_user))
        // Bank account routes
        .route(
            "/api/bankaccounts",
            post(handlers::accounts::create_account).get(handlers::accounts::list_accounts),
        )
        .route(
            "/api/bankaccounts/{id}",
            get(handlers::accounts::get_account),
        )
        // Transfer and history routes
        .route(
            "/api/bankaccounts/{id}/make_transfer",
            post(handlers::transfers::make_transfer),
        )
        .route(
            "/api/bankaccounts/{id}/history",
            get(handlers::transfers::get_history),
        )
        // Apply authentication middleware to all routes in this group
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    Router::new()
        // Public routes (no authentication required)
        .route("/health", get(handlers::health::health_check))
        .merge(authenticated_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
