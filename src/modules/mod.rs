//! Modules layer - Infrastructure components for external integrations
//!
//! Contains the blob store adapters used by the file lifecycle.

pub mod storage;
