//! # till-api
//!
//! HTTP service for the restaurant's daily cash counter.
//!
//! ## Routes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /cash-counter/open          open today's (or `date`'s) counter   │
//! │  POST /cash-counter/close         count the drawer and reconcile       │
//! │  POST /cash-counter/verify/{id}   owner sign-off (password)            │
//! │  POST /cash-counter/reopen/{id}   owner undo of a closing (password)   │
//! │  GET  /cash-counter/today         today's business date and counter    │
//! │  GET  /cash-counter/history       paginated, most recent first         │
//! │  GET  /cash-counter/{id}          one counter                          │
//! │  GET  /cash-counter/{id}/events   audit trail                          │
//! │                                                                         │
//! │  GET  /health                     liveness                             │
//! │  GET  /health/ready               database reachable, schema current   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every `/cash-counter` route requires an `X-Staff-Id` header.

pub mod collaborators;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod service;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use till_db::Database;

use crate::handlers::{cash_counter, health};

pub use config::TillConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use service::CashCounterService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: CashCounterService,
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database, service: CashCounterService) -> Self {
        AppState { service, db }
    }
}

/// Builds the router with all routes and the request tracing layer.
pub fn router(state: AppState) -> Router {
    let counter_routes = Router::new()
        .route("/open", post(cash_counter::open_counter))
        .route("/close", post(cash_counter::close_counter))
        .route("/verify/{id}", post(cash_counter::verify_counter))
        .route("/reopen/{id}", post(cash_counter::reopen_counter))
        .route("/today", get(cash_counter::get_today))
        .route("/history", get(cash_counter::list_history))
        .route("/{id}", get(cash_counter::get_counter))
        .route("/{id}/events", get(cash_counter::list_events));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .nest("/cash-counter", counter_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
