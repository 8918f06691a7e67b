//! Modules layer - Infrastructure components for external integrations
//!
//! Contains clients and adapters for external services like the storage
//! backend.

pub mod backend;
