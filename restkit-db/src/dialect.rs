//! SQL dialects

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DbError;

/// Database engine family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    Postgres,
    Mysql,
    Mssql,
    Sqlite,
}

impl SqlDialect {
    pub const ALL: [SqlDialect; 4] = [Self::Postgres, Self::Mysql, Self::Mssql, Self::Sqlite];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Mysql => "mysql",
            Self::Mssql => "mssql",
            Self::Sqlite => "sqlite",
        }
    }

    /// Usual server port; `None` for file-based SQLite.
    pub fn default_port(&self) -> Option<u16> {
        match self {
            Self::Postgres => Some(5432),
            Self::Mysql => Some(3306),
            Self::Mssql => Some(1433),
            Self::Sqlite => None,
        }
    }

    /// Database that always exists on a server and is used to create or
    /// drop other databases.
    pub fn system_database(&self) -> Option<&'static str> {
        match self {
            Self::Postgres => Some("postgres"),
            Self::Mysql => Some("mysql"),
            Self::Mssql => Some("master"),
            Self::Sqlite => None,
        }
    }
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SqlDialect {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "mysql" | "mariadb" => Ok(Self::Mysql),
            "mssql" | "sqlserver" => Ok(Self::Mssql),
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            other => Err(DbError::UnknownDialect(other.to_owned())),
        }
    }
}
