//! Application routing
//!
//! This module defines all HTTP routes for the application.

use axum::{middleware, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{exchange, health};
use crate::middleware::logging::{log_request, TRACE_ID_HEADER};
use crate::openapi::{ApiDoc, DOCS_PATH};
use crate::server::state::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    // Health check routes
    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness))
        .route("/liveness", get(health::liveness));

    // Exchange market routes, serving the headless client's cache
    let exchange_routes = Router::new()
        .route("/market", get(exchange::market))
        .route("/market/lastPrice", get(exchange::last_price))
        .route("/market/buyOffers", get(exchange::buy_offers))
        .route("/market/sellOffers", get(exchange::sell_offers));

    Router::new()
        .nest("/exchange", exchange_routes)
        .merge(health_routes)
        // OpenAPI document and its Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url(DOCS_PATH, ApiDoc::openapi()))
        // Layer order: first added = outermost = runs first
        .layer(create_cors_layer())
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// Create CORS layer with permissive settings (the API is public)
fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([TRACE_ID_HEADER.parse().unwrap()])
}
