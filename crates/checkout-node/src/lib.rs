//! HTTP boundary for the checkout ledger.

pub mod catalog;
pub mod constants;
pub mod routes;

use axum::{
    routing::{get, post},
    Router,
};
use checkout_core::Blockchain;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler. The chain is built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub chain: Arc<Blockchain>,
}

impl AppState {
    pub fn new(chain: Blockchain) -> Self {
        Self {
            chain: Arc::new(chain),
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::get_chain).post(routes::append_checkout))
        .route("/block", post(routes::commit_block))
        .route("/chain/head", get(routes::head))
        .route("/validate", get(routes::validate))
        .route("/health", get(routes::health))
        .route("/healthz", get(routes::health))
        .route("/new", post(catalog::new_book))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
