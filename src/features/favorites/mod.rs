//! Per-user favorites on files.
//!
//! A favorite is keyed by `(user, org, file)` and only ever created or
//! removed through a toggle. Purging a file removes its favorites.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use services::FavoriteService;
