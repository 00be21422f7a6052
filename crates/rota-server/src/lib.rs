//! Rota HTTP server: configuration, first-start seeding, and the top-level
//! router that mounts [`rota_api`] under `/api`.

pub mod bootstrap;
pub mod config;

use axum::Router;
use rota_api::{AppState, api_router};
use rota_core::store::RosterStore;
use tower_http::trace::TraceLayer;

pub use config::{Backend, ServerConfig};

/// The full application: the JSON API under `/api`, with request tracing.
pub fn app<S>(state: AppState<S>) -> Router
where
  S: RosterStore + 'static,
{
  Router::new()
    .nest("/api", api_router(state))
    .layer(TraceLayer::new_for_http())
}
