//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`merge`] - Video concatenation
//! - [`system`] - Health and OpenAPI

mod merge;
mod system;

// Re-export all handlers so `routes::function_name` continues to work
pub use merge::*;
pub use system::*;
