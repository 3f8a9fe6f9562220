pub mod config;
pub mod database;
pub mod error;
pub mod extractor;
pub mod memory_db;
pub mod middleware;
pub mod openapi;
