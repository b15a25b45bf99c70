//! Charset / collation options for `CREATE DATABASE`
//!
//! One struct covers every dialect:
//!
//! - Postgres: `Collation::new("UTF8")` with `LC_COLLATE` / `LC_CTYPE` parameters
//!   -> `ENCODING 'UTF8' LC_COLLATE = 'en_US.utf8' LC_CTYPE = 'en_US.utf8'`
//! - MySQL: `Collation::new("utf8mb4")` with a `COLLATE` parameter
//!   -> `CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci`
//! - SQL Server: `Collation::new("Latin1_General_100_CS_AS_SC")` -> `COLLATE Latin1_General_100_CS_AS_SC`

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dialect::SqlDialect;
use crate::error::DbResult;
use crate::validation::{validate_identifier, validate_token};

const MYSQL_COLLATE_PARAM: &str = "COLLATE";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collation {
    pub encoding: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

impl Collation {
    pub fn new(encoding: impl Into<String>) -> Self {
        Self {
            encoding: encoding.into(),
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

/// `CREATE DATABASE` statement for `name`, with collation clauses when given.
pub fn create_database_statement(
    dialect: SqlDialect,
    name: &str,
    collation: Option<&Collation>,
) -> DbResult<String> {
    let mut statement = format!("CREATE DATABASE {}", validate_identifier("database", name)?);
    let Some(collation) = collation else {
        return Ok(statement);
    };

    match dialect {
        SqlDialect::Postgres => {
            if !collation.encoding.is_empty() {
                let encoding = validate_token("encoding", &collation.encoding)?;
                statement.push_str(&format!(" ENCODING '{encoding}'"));
            }
            for (key, value) in &collation.parameters {
                let key = validate_identifier("collation parameter", key)?;
                let value = validate_token("collation value", value)?;
                statement.push_str(&format!(" {key} = '{value}'"));
            }
        }
        SqlDialect::Mysql => {
            if !collation.encoding.is_empty() {
                let encoding = validate_token("encoding", &collation.encoding)?;
                statement.push_str(&format!(" CHARACTER SET {encoding}"));
            }
            if let Some(collate) = collation.parameters.get(MYSQL_COLLATE_PARAM) {
                let collate = validate_token("collation value", collate)?;
                statement.push_str(&format!(" COLLATE {collate}"));
            }
        }
        SqlDialect::Mssql => {
            if !collation.encoding.is_empty() {
                let encoding = validate_token("encoding", &collation.encoding)?;
                statement.push_str(&format!(" COLLATE {encoding}"));
            }
        }
        SqlDialect::Sqlite => {}
    }

    Ok(statement)
}
