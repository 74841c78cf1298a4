//! REST API layer.
//!
//! Routes are nested under `/api/v1` and protected by a middleware
//! stack: Identity → Audit → Handler. Identity resolves the bearer
//! token into a role-tagged caller once per request; the handlers and
//! access rules never look at the token again.
//!
//! The router is composable — `api_router()` returns a `Router` that
//! can be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod types;

pub use router::api_router;
pub use types::ApiContext;
