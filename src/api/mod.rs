//! API Module
//!
//! HTTP handlers and routing for the cache REST API.
//!
//! # Endpoints
//! - `GET /cache/object/:key` - Retrieve a value by key
//! - `POST /cache/object/:key` - Store a value, evicting if the cache is full
//! - `DELETE /cache/object/:key/delete` - Delete a key
//! - `PUT /cache/config` - Reconfigure the store connection and policy
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
