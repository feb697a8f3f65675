//! # LiftLog HTTP Server Module
//!
//! HTTP API server exposing the exercise record store.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/ejercicios` - Exercise record CRUD
//! - `/api/exercises` - Filtered reads by muscle group

pub mod config;
pub mod errors;
pub mod exercise_routes;
pub mod server;

pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use server::HttpServer;
