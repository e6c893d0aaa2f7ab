//! HTTP server module
//!
//! This module handles HTTP request routing and handling:
//! - Axum router with the conversion and status endpoints
//! - Upload size limit and CORS middleware
//! - Mapping of conversion errors to status codes

pub mod handlers;
pub mod routes;

pub use routes::create_router;
