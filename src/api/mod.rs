//! API module
//!
//! HTTP surface: routes, org-access middleware, request logging.

pub mod middleware;
pub mod routes;

pub use routes::create_router;
