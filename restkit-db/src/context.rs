//! Open, create, check and drop databases
//!
//! Creating or dropping a server database goes through the dialect's system
//! database (`postgres`, `mysql`, `master`). SQLite databases are files:
//! creating one creates the file, dropping one removes it.

use std::path::PathBuf;
use std::str::FromStr;

use sqlx::mysql::{MySqlConnection, MySqlPool, MySqlPoolOptions};
use sqlx::postgres::{PgConnection, PgPool, PgPoolOptions};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions};
use sqlx::Connection;
use uuid::Uuid;

use crate::collation::{create_database_statement, Collation};
use crate::conn_str::{
    build_connection_string, database_name, system_connection_string, ConnectionParams,
};
use crate::dialect::SqlDialect;
use crate::error::{DbError, DbResult};
use crate::validation::validate_identifier;

/// Default maximum connections for the pool.
/// Kept low for single-service tooling.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Prefix of databases made by [`create_random_db`]
pub const TMP_DATABASE_PREFIX: &str = "restkit_tmp_db_";

/// How [`open_db`] treats a database that may not exist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    /// Create the database when it is not known to exist
    pub create: bool,
    /// Probe for existence first; with `create == false` a missing database
    /// is an error instead of a failed connect
    pub check: bool,
    pub max_connections: u32,
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(mut self, create: bool) -> Self {
        self.create = create;
        self
    }

    pub fn check(mut self, check: bool) -> Self {
        self.check = check;
        self
    }

    pub fn max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            create: false,
            check: true,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

/// Open connection pool for one of the sqlx-backed dialects
#[derive(Debug, Clone)]
pub enum DbConnection {
    Postgres(PgPool),
    Mysql(MySqlPool),
    Sqlite(SqlitePool),
}

impl DbConnection {
    pub fn dialect(&self) -> SqlDialect {
        match self {
            Self::Postgres(_) => SqlDialect::Postgres,
            Self::Mysql(_) => SqlDialect::Mysql,
            Self::Sqlite(_) => SqlDialect::Sqlite,
        }
    }

    /// Run raw SQL, returning the affected row count.
    pub async fn execute(&self, sql: &str) -> DbResult<u64> {
        let rows = match self {
            Self::Postgres(pool) => sqlx::raw_sql(sql).execute(pool).await?.rows_affected(),
            Self::Mysql(pool) => sqlx::raw_sql(sql).execute(pool).await?.rows_affected(),
            Self::Sqlite(pool) => sqlx::raw_sql(sql).execute(pool).await?.rows_affected(),
        };
        Ok(rows)
    }

    /// Round-trip a trivial query.
    pub async fn ping(&self) -> DbResult<()> {
        self.execute("SELECT 1").await.map(|_| ())
    }

    /// Close every pooled connection.
    pub async fn close(self) {
        match self {
            Self::Postgres(pool) => pool.close().await,
            Self::Mysql(pool) => pool.close().await,
            Self::Sqlite(pool) => pool.close().await,
        }
    }

    pub fn as_postgres(&self) -> Option<&PgPool> {
        match self {
            Self::Postgres(pool) => Some(pool),
            _ => None,
        }
    }

    pub fn as_mysql(&self) -> Option<&MySqlPool> {
        match self {
            Self::Mysql(pool) => Some(pool),
            _ => None,
        }
    }

    pub fn as_sqlite(&self) -> Option<&SqlitePool> {
        match self {
            Self::Sqlite(pool) => Some(pool),
            _ => None,
        }
    }
}

/// Open (and optionally create) a database from individual parameters.
pub async fn open_db(
    dialect: SqlDialect,
    params: &ConnectionParams,
    options: OpenOptions,
    collation: Option<&Collation>,
) -> DbResult<DbConnection> {
    let conn_str = build_connection_string(dialect, params);
    open_db_with_conn_str(dialect, &conn_str, options, collation).await
}

/// Open (and optionally create) a database from a full connection string.
///
/// | check | create | database missing          | database present |
/// |-------|--------|---------------------------|------------------|
/// | yes   | no     | `DbError::DatabaseMissing` | open             |
/// | yes   | yes    | create, open              | open             |
/// | no    | no     | open (driver error)       | open             |
/// | no    | yes    | create, open              | create fails (logged), open |
pub async fn open_db_with_conn_str(
    dialect: SqlDialect,
    conn_str: &str,
    options: OpenOptions,
    collation: Option<&Collation>,
) -> DbResult<DbConnection> {
    let exists = options.check && check_db(dialect, conn_str).await;

    if options.check && !exists && !options.create {
        return Err(DbError::DatabaseMissing {
            name: database_name(dialect, conn_str)?,
        });
    }
    if options.create && !exists {
        create_db(dialect, conn_str, collation).await?;
    }

    connect(dialect, conn_str, options.max_connections).await
}

/// `true` when a connection to the database can be established.
pub async fn check_db(dialect: SqlDialect, conn_str: &str) -> bool {
    match probe(dialect, conn_str).await {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(%dialect, error = %e, "database probe failed");
            false
        }
    }
}

/// Create a database with a random name (for tests).
///
/// `params.database` is ignored for server dialects; for SQLite it is the
/// directory the database file is created in. Returns the connection and
/// its connection string.
pub async fn create_random_db(
    dialect: SqlDialect,
    params: &ConnectionParams,
    options: OpenOptions,
    collation: Option<&Collation>,
) -> DbResult<(DbConnection, String)> {
    let name = random_database_name();
    let database = match dialect {
        SqlDialect::Sqlite => PathBuf::from(&params.database)
            .join(format!("{name}.db"))
            .display()
            .to_string(),
        _ => name,
    };

    let conn_str = build_connection_string(dialect, &params.with_database(database));
    let options = options.create(true).check(false);
    let conn = open_db_with_conn_str(dialect, &conn_str, options, collation).await?;
    Ok((conn, conn_str))
}

/// `restkit_tmp_db_` followed by a dash-less v4 UUID.
pub fn random_database_name() -> String {
    format!("{TMP_DATABASE_PREFIX}{}", Uuid::new_v4().simple())
}

/// Drop the database `conn_str` points at (`DROP DATABASE IF EXISTS`).
///
/// Open pools on that database should be closed first.
pub async fn drop_db(dialect: SqlDialect, conn_str: &str) -> DbResult<()> {
    if dialect == SqlDialect::Sqlite {
        let path = sqlite_options(conn_str)?.get_filename().to_path_buf();
        return match tokio::fs::remove_file(&path).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => {
                tracing::info!(path = %path.display(), "dropped sqlite database");
                Ok(())
            }
        };
    }

    let (system_conn_str, name) = system_connection_string(dialect, conn_str)?;
    drop_db_on_system(dialect, &system_conn_str, &name).await
}

/// Drop `name` through an already built system database connection string.
pub async fn drop_db_on_system(
    dialect: SqlDialect,
    system_conn_str: &str,
    name: &str,
) -> DbResult<()> {
    let statement = format!(
        "DROP DATABASE IF EXISTS {}",
        validate_identifier("database", name)?
    );
    run_on_system(dialect, system_conn_str, &statement).await?;
    tracing::info!(%dialect, database = name, "dropped database");
    Ok(())
}

async fn create_db(
    dialect: SqlDialect,
    conn_str: &str,
    collation: Option<&Collation>,
) -> DbResult<()> {
    if dialect == SqlDialect::Sqlite {
        let options = sqlite_options(conn_str)?.create_if_missing(true);
        SqliteConnection::connect_with(&options).await?.close().await?;
        return Ok(());
    }

    let (system_conn_str, name) = system_connection_string(dialect, conn_str)?;
    let statement = create_database_statement(dialect, &name, collation)?;

    // An existing database makes CREATE fail; the open that follows decides.
    match run_on_system(dialect, &system_conn_str, &statement).await {
        Ok(()) => tracing::info!(%dialect, database = %name, "created database"),
        Err(e) => tracing::warn!(%dialect, database = %name, error = %e, "CREATE DATABASE failed"),
    }
    Ok(())
}

async fn run_on_system(dialect: SqlDialect, system_conn_str: &str, statement: &str) -> DbResult<()> {
    match dialect {
        SqlDialect::Postgres => {
            let mut conn = PgConnection::connect(system_conn_str).await?;
            let result = sqlx::raw_sql(statement).execute(&mut conn).await;
            conn.close().await?;
            result?;
        }
        SqlDialect::Mysql => {
            let mut conn = MySqlConnection::connect(system_conn_str).await?;
            let result = sqlx::raw_sql(statement).execute(&mut conn).await;
            conn.close().await?;
            result?;
        }
        SqlDialect::Mssql | SqlDialect::Sqlite => {
            return Err(DbError::unsupported(dialect, "system database statements"));
        }
    }
    Ok(())
}

async fn probe(dialect: SqlDialect, conn_str: &str) -> DbResult<()> {
    match dialect {
        SqlDialect::Postgres => PgConnection::connect(conn_str).await?.close().await?,
        SqlDialect::Mysql => MySqlConnection::connect(conn_str).await?.close().await?,
        SqlDialect::Sqlite => SqliteConnection::connect_with(&sqlite_options(conn_str)?)
            .await?
            .close()
            .await?,
        SqlDialect::Mssql => return Err(DbError::unsupported(dialect, "opening a connection")),
    }
    Ok(())
}

async fn connect(dialect: SqlDialect, conn_str: &str, max_connections: u32) -> DbResult<DbConnection> {
    let conn = match dialect {
        SqlDialect::Postgres => DbConnection::Postgres(
            PgPoolOptions::new()
                .max_connections(max_connections)
                .connect(conn_str)
                .await?,
        ),
        SqlDialect::Mysql => DbConnection::Mysql(
            MySqlPoolOptions::new()
                .max_connections(max_connections)
                .connect(conn_str)
                .await?,
        ),
        SqlDialect::Sqlite => DbConnection::Sqlite(
            SqlitePoolOptions::new()
                .max_connections(max_connections)
                .connect_with(sqlite_options(conn_str)?)
                .await?,
        ),
        SqlDialect::Mssql => return Err(DbError::unsupported(dialect, "opening a connection")),
    };
    tracing::debug!(%dialect, max_connections, "database pool opened");
    Ok(conn)
}

fn sqlite_options(conn_str: &str) -> DbResult<SqliteConnectOptions> {
    Ok(SqliteConnectOptions::from_str(conn_str)?)
}
