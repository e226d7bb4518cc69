//! Server module exposing the actions over HTTP
//!
//! This module provides a `ServerBuilder` that wires the actions to their
//! collaborators and registers:
//! - invoice create/edit/delete routes under the configured listing path
//! - sign-in and sign-out routes
//! - health check routes

pub mod builder;
pub mod handlers;
pub mod host;
pub mod router;

pub use builder::ServerBuilder;
pub use host::{AppState, SESSION_COOKIE};
pub use router::build_routes;
