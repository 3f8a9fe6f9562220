//! Operator endpoints behind basic auth.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | PUT | `/api/admin/users` | Create or update a user from the identity provider |
//! | POST | `/api/admin/memberships` | Add a user to an organization |
//! | PATCH | `/api/admin/memberships` | Change a member's role |
//! | POST | `/api/admin/purge` | Run a purge sweep now |

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::AdminService;
