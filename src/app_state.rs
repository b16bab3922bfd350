//! Application state for the Actix-web relay server
//!
//! This module defines the shared state used across all HTTP handlers.
//! The `AppState` struct is wrapped in `web::Data` and provides access to
//! the upstream HTTP client, configuration and metrics tracker. Nothing in
//! it is mutated per-request, so no locking discipline is needed beyond
//! the tracker's own internal mutex.

use reqwest::Client;

/// Shared application state for the relay handlers.
pub struct AppState {
    /// Plain reqwest client used to forward relay traffic.
    pub client: Client,
    /// Application configuration.
    pub config: crate::config::Config,
    /// Per-endpoint request metrics.
    pub metrics: crate::metrics::MetricsTracker,
}
