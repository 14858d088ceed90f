use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::auth::require_auth;
use super::handlers;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Public routes — the webhook authenticates with its body signature
    let public = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::render))
        .route("/api/payments/webhook", post(handlers::webhook::payment_webhook));

    // Protected API routes — require Bearer token when API_TOKEN is set
    let protected = Router::new()
        // Offers
        .route("/api/offers", post(handlers::offers::create))
        .route("/api/offers/:id", get(handlers::offers::detail))
        .route("/api/offers/:id/accept", post(handlers::offers::accept))
        .route("/api/offers/:id/decline", post(handlers::offers::decline))
        // Bouts
        .route("/api/bouts/:id", get(handlers::bouts::detail))
        .route("/api/bouts/:id/offers", get(handlers::bouts::offers))
        .layer(middleware::from_fn(require_auth));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    public
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
