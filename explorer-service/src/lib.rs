pub mod auth_middleware;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod state;
pub mod types;
pub mod watcher;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth_middleware::admin_auth;
use crate::handlers::*;
pub use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let admin = Router::new()
        .route("/admin/stats", get(get_admin_stats))
        .route_layer(middleware::from_fn_with_state(state.clone(), admin_auth));

    Router::new()
        .route("/healthz", get(health_check))
        .route("/meta", get(get_meta))
        .route("/refresh", post(post_refresh))
        .route("/activity", get(get_activity))
        .route("/transactions", get(get_transactions))
        .route("/blocks", get(get_blocks))
        .route("/stats", get(get_stats))
        .route("/votings", get(get_votings))
        .route("/votings/{id}", get(get_voting))
        .merge(admin)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
