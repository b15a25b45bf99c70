//! restkit-db: database helpers over sqlx
//!
//! - Connection strings per [`SqlDialect`]
//! - Open / create / check / drop databases through the dialect's system database
//! - Pagination for list queries
//!
//! Postgres, MySQL and SQLite are opened through sqlx. SQL Server connection
//! strings can be built and rewritten, but opening one reports
//! [`DbError::UnsupportedDialect`].

pub mod collation;
pub mod conn_str;
pub mod context;
pub mod dialect;
pub mod error;
pub mod pagination;
pub mod validation;

pub use collation::{create_database_statement, Collation};
pub use conn_str::{build_connection_string, system_connection_string, ConnectionParams};
pub use context::{
    check_db, create_random_db, drop_db, drop_db_on_system, open_db, open_db_with_conn_str,
    random_database_name, DbConnection, OpenOptions,
};
pub use dialect::SqlDialect;
pub use error::{DbError, DbResult};
pub use pagination::{next_table_id, Paginated, Pagination, PaginationParams};
pub use validation::ValidationError;
