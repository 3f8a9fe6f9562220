//! Users, organization memberships and identity resolution.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/users/me` | Current user, memberships and active organization |
//! | GET | `/api/users/{id}/profile` | Public profile of an uploader |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use services::IdentityService;
