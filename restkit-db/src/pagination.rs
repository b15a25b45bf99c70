//! Pagination for list queries

use serde::{Deserialize, Serialize};
use sqlx::{Database, QueryBuilder};

use crate::context::DbConnection;
use crate::error::DbResult;
use crate::validation::validate_identifier;

/// Maximum items per page
const MAX_PER_PAGE: u32 = 100;

/// Default items per page
const DEFAULT_PER_PAGE: u32 = 25;

/// Pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Page number (1-indexed)
    pub page: u32,
    /// Items per page (max 100)
    pub per_page: u32,
}

impl Pagination {
    /// Create pagination with validation.
    ///
    /// - Page is clamped to minimum of 1
    /// - Per page of 0 means the default (25), larger values cap at 100
    pub fn new(page: u32, per_page: u32) -> Self {
        let per_page = match per_page {
            0 => DEFAULT_PER_PAGE,
            n => n.min(MAX_PER_PAGE),
        };
        Self {
            page: page.max(1),
            per_page,
        }
    }

    /// Calculate SQL OFFSET value.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }

    /// Get LIMIT value.
    pub fn limit(&self) -> u32 {
        self.per_page
    }

    /// Append ` LIMIT n OFFSET m` to a query under construction.
    pub fn apply<DB: Database>(&self, query: &mut QueryBuilder<'_, DB>) {
        query
            .push(" LIMIT ")
            .push(self.limit())
            .push(" OFFSET ")
            .push(self.offset());
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Items for current page
    pub items: Vec<T>,
    /// Total count across all pages
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, pagination: Pagination) -> Self {
        Self {
            items,
            total,
            page: pagination.page,
            per_page: pagination.per_page,
        }
    }

    /// Calculate total number of pages.
    pub fn total_pages(&self) -> u32 {
        if self.total <= 0 || self.per_page == 0 {
            return 1;
        }
        let pages = (self.total as u64).div_ceil(u64::from(self.per_page));
        u32::try_from(pages).unwrap_or(u32::MAX).max(1)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

/// Query parameters for pagination
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl From<PaginationParams> for Pagination {
    fn from(params: PaginationParams) -> Self {
        Self::new(params.page.unwrap_or(1), params.per_page.unwrap_or(0))
    }
}

/// Next free integer id of `table`: `MAX(id) + 1`, or 1 when the table is empty.
pub async fn next_table_id(conn: &DbConnection, table: &str) -> DbResult<i64> {
    let table = validate_identifier("table", table)?;
    let id = match conn {
        DbConnection::Postgres(pool) => {
            let sql = format!("SELECT CAST(COALESCE(MAX(id), 0) + 1 AS BIGINT) FROM {table}");
            sqlx::query_scalar::<_, i64>(&sql).fetch_one(pool).await?
        }
        DbConnection::Mysql(pool) => {
            let sql = format!("SELECT CAST(COALESCE(MAX(id), 0) + 1 AS SIGNED) FROM {table}");
            sqlx::query_scalar::<_, i64>(&sql).fetch_one(pool).await?
        }
        DbConnection::Sqlite(pool) => {
            let sql = format!("SELECT CAST(COALESCE(MAX(id), 0) + 1 AS INTEGER) FROM {table}");
            sqlx::query_scalar::<_, i64>(&sql).fetch_one(pool).await?
        }
    };
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conn_str::{build_connection_string, ConnectionParams};
    use crate::context::{open_db_with_conn_str, OpenOptions};
    use crate::dialect::SqlDialect;
    use crate::error::DbError;
    use sqlx::Sqlite;
    use tempfile::TempDir;

    #[test]
    fn offset_calculation() {
        let p = Pagination::new(1, 10);
        assert_eq!(p.offset(), 0);

        let p = Pagination::new(2, 10);
        assert_eq!(p.offset(), 10);

        let p = Pagination::new(3, 25);
        assert_eq!(p.offset(), 50);
    }

    #[test]
    fn clamps_page() {
        let p = Pagination::new(0, 10);
        assert_eq!(p.page, 1);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn per_page_defaults_and_caps() {
        let p = Pagination::new(1, 0);
        assert_eq!(p.per_page, 25);

        let p = Pagination::new(1, 999);
        assert_eq!(p.per_page, 100);

        let p: Pagination = PaginationParams::default().into();
        assert_eq!(p, Pagination::default());
    }

    #[test]
    fn appends_limit_and_offset() {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM items ORDER BY id");
        Pagination::new(3, 10).apply(&mut query);
        assert_eq!(query.sql(), "SELECT * FROM items ORDER BY id LIMIT 10 OFFSET 20");
    }

    #[test]
    fn total_pages() {
        let paginated: Paginated<()> = Paginated {
            items: vec![],
            total: 0,
            page: 1,
            per_page: 10,
        };
        assert_eq!(paginated.total_pages(), 1);
        assert!(!paginated.has_next());

        let paginated: Paginated<()> = Paginated::new(vec![], 25, Pagination::new(2, 10));
        assert_eq!(paginated.total_pages(), 3);
        assert!(paginated.has_next());
        assert!(paginated.has_prev());
    }

    #[tokio::test]
    async fn next_id_on_sqlite() {
        let dir = TempDir::new().unwrap();
        let params = ConnectionParams::new("", 0, dir.path().join("ids.db").display().to_string(), "", "");
        let conn_str = build_connection_string(SqlDialect::Sqlite, &params);
        let conn = open_db_with_conn_str(
            SqlDialect::Sqlite,
            &conn_str,
            OpenOptions::new().create(true),
            None,
        )
        .await
        .unwrap();

        conn.execute("CREATE TABLE things (id INTEGER PRIMARY KEY, label TEXT)")
            .await
            .unwrap();
        assert_eq!(next_table_id(&conn, "things").await.unwrap(), 1);

        conn.execute("INSERT INTO things (id, label) VALUES (1, 'a'), (7, 'b')")
            .await
            .unwrap();
        assert_eq!(next_table_id(&conn, "things").await.unwrap(), 8);

        let result = next_table_id(&conn, "things; DROP TABLE things").await;
        assert!(matches!(result, Err(DbError::Validation(_))));
        conn.close().await;
    }
}
