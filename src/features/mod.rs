pub mod access;
pub mod admin;
pub mod auth;
pub mod favorites;
pub mod files;
pub mod users;
