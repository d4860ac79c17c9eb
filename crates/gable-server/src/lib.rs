//! # gable-server
//!
//! HTTP entry point for the Gable tenancy agent. Exposes the messaging
//! gateway webhook, a liveness probe, and the Prometheus scrape endpoint,
//! and owns process wiring: settings, store, tools, provider, runner.
//!
//! ## Crate Position
//!
//! Depends on every other gable crate. Nothing depends on it.

#![deny(unsafe_code)]

pub mod app;
pub mod routes;
pub mod settings;
pub mod telemetry;

pub use app::build_app;
pub use routes::{AppState, build_router};
pub use settings::{GableSettings, load_settings};
