//! restkit-core: router-agnostic CORS bookkeeping
//!
//! The [`cors::CorsRegistry`] tracks which HTTP methods were registered for
//! every route path and answers preflight requests from that table. It talks
//! to the actual HTTP router only through the [`cors::RouteSink`] and
//! [`cors::MatchedPathResolver`] traits, so this crate never depends on a
//! concrete router.

pub mod checkers;
pub mod cors;
pub mod error;

pub use checkers::{check_floats, check_items, Mismatch, Order};
pub use cors::{
    CorsHeaders, CorsPolicy, CorsRegistry, CorsTable, MatchedPathResolver, RouteCorsEntry,
    RouteSink,
};
pub use error::{RestkitError, Result};
