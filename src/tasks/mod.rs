//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Expiry sweep: reaps expired values from the in-memory store

mod cleanup;

pub use cleanup::spawn_expiry_sweep;
