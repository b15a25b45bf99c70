//! CORS route bookkeeping
//!
//! Header contract written by this module:
//!
//! - `Access-Control-Allow-Origin: <origin>` on every response of a
//!   registered route (and on preflight responses)
//! - `Access-Control-Allow-Headers: *` on the same responses
//! - `Access-Control-Allow-Methods: OPTIONS,GET,...` on preflight responses
//!   only, comma-separated without spaces, in first-registration order

mod policy;
mod registry;
mod table;

pub use policy::{CorsHeaders, CorsPolicy};
pub use registry::{CorsRegistry, MatchedPathResolver, RouteSink};
pub use table::{CorsTable, RouteCorsEntry};

/// Origin value that allows any origin
pub const ANY_ORIGIN: &str = "*";

/// Value written into `Access-Control-Allow-Headers`
pub const ALLOW_ALL_HEADER_VALUES: &str = "*";

/// Separator used when joining methods for `Access-Control-Allow-Methods`
pub const METHOD_SEPARATOR: &str = ",";
