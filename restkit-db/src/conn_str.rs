//! Connection strings per dialect
//!
//! Templates (user and password are percent-encoded):
//!
//! - postgres: `postgres://{user}:{password}@{host}:{port}/{database}[?sslmode={ssl_mode}]`
//! - mysql:    `mysql://{user}:{password}@{host}:{port}/{database}?charset=utf8mb4`
//! - mssql:    `sqlserver://{user}:{password}@{host}:{port}?database={database}`
//! - sqlite:   `sqlite://{database}` where `database` is a file path

use serde::{Deserialize, Serialize};
use url::Url;

use crate::dialect::SqlDialect;
use crate::error::{DbError, DbResult};

const MYSQL_CHARSET: &str = "utf8mb4";
const MSSQL_DATABASE_PARAM: &str = "database";

/// Individual connection parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionParams {
    pub host: String,
    pub port: u16,
    /// Database name, or file path for SQLite
    pub database: String,
    pub user: String,
    pub password: String,
    /// Postgres `sslmode` (e.g. `disable`, `require`); ignored by other dialects
    #[serde(default)]
    pub ssl_mode: Option<String>,
}

impl ConnectionParams {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            database: database.into(),
            user: user.into(),
            password: password.into(),
            ssl_mode: None,
        }
    }

    pub fn with_ssl_mode(mut self, ssl_mode: impl Into<String>) -> Self {
        self.ssl_mode = Some(ssl_mode.into());
        self
    }

    /// Same server and credentials, another database.
    pub fn with_database(&self, database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..self.clone()
        }
    }
}

/// Build a connection string for `dialect` from individual parameters.
pub fn build_connection_string(dialect: SqlDialect, params: &ConnectionParams) -> String {
    let user = urlencoding::encode(&params.user);
    let password = urlencoding::encode(&params.password);
    let ConnectionParams {
        host,
        port,
        database,
        ..
    } = params;

    match dialect {
        SqlDialect::Postgres => {
            let mut conn_str = format!("postgres://{user}:{password}@{host}:{port}/{database}");
            if let Some(ssl_mode) = params.ssl_mode.as_deref().filter(|m| !m.is_empty()) {
                conn_str.push_str("?sslmode=");
                conn_str.push_str(ssl_mode);
            }
            conn_str
        }
        SqlDialect::Mysql => format!(
            "mysql://{user}:{password}@{host}:{port}/{database}?charset={MYSQL_CHARSET}"
        ),
        SqlDialect::Mssql => format!(
            "sqlserver://{user}:{password}@{host}:{port}?{MSSQL_DATABASE_PARAM}={database}"
        ),
        SqlDialect::Sqlite => format!("sqlite://{database}"),
    }
}

/// Swap the target database of `conn_str` for the dialect's system database.
///
/// Returns `(system_conn_str, target_database_name)`. SQLite has no system
/// database.
pub fn system_connection_string(dialect: SqlDialect, conn_str: &str) -> DbResult<(String, String)> {
    let system_db = dialect
        .system_database()
        .ok_or_else(|| DbError::unsupported(dialect, "system database"))?;
    let mut url =
        Url::parse(conn_str).map_err(|e| DbError::invalid_conn_str(dialect, e.to_string()))?;

    let name = match dialect {
        SqlDialect::Postgres | SqlDialect::Mysql => {
            let name = decode(dialect, url.path().trim_start_matches('/'))?;
            url.set_path(&format!("/{system_db}"));
            name
        }
        SqlDialect::Mssql => {
            let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
            let name = pairs
                .iter()
                .find(|(key, _)| key == MSSQL_DATABASE_PARAM)
                .map(|(_, value)| value.clone())
                .unwrap_or_default();
            url.query_pairs_mut().clear().extend_pairs(pairs.iter().map(|(key, value)| {
                if key == MSSQL_DATABASE_PARAM {
                    (key.as_str(), system_db)
                } else {
                    (key.as_str(), value.as_str())
                }
            }));
            name
        }
        SqlDialect::Sqlite => return Err(DbError::unsupported(dialect, "system database")),
    };

    if name.is_empty() {
        return Err(DbError::invalid_conn_str(dialect, "no database name"));
    }

    Ok((url.to_string(), name))
}

/// Database name (or SQLite file path) a connection string points at.
pub fn database_name(dialect: SqlDialect, conn_str: &str) -> DbResult<String> {
    match dialect {
        SqlDialect::Sqlite => Ok(conn_str
            .strip_prefix("sqlite://")
            .or_else(|| conn_str.strip_prefix("sqlite:"))
            .unwrap_or(conn_str)
            .to_owned()),
        _ => system_connection_string(dialect, conn_str).map(|(_, name)| name),
    }
}

fn decode(dialect: SqlDialect, raw: &str) -> DbResult<String> {
    urlencoding::decode(raw)
        .map(|name| name.into_owned())
        .map_err(|e| DbError::invalid_conn_str(dialect, e.to_string()))
}
