//! Core Service Layer
//!
//! Shared infrastructure for the hackathon server: authentication, data
//! models, configuration, persistence and routing.

pub mod auth;
pub mod config;
pub mod ctx;
pub mod db;
pub mod error;
pub mod models;
pub mod router;

// Re-exports for convenience
pub use config::{AppState, HackathonConfig};
pub use ctx::Ctx;
pub use error::{Error, Result};
pub use router::router;
