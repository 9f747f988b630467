//! SQLite connection pool for the application store.

use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PoolError, PooledConnection};
use diesel::sqlite::SqliteConnection;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Pragmas run on every connection handed out by the pool.
#[derive(Debug, Clone)]
pub struct SqlitePragmas {
    /// WAL journal with `synchronous = NORMAL`.
    pub write_ahead_log: bool,
    pub foreign_keys: bool,
    pub busy_timeout: Duration,
}

impl Default for SqlitePragmas {
    fn default() -> Self {
        Self {
            write_ahead_log: true,
            foreign_keys: true,
            busy_timeout: Duration::from_secs(30),
        }
    }
}

impl SqlitePragmas {
    fn batch(&self) -> String {
        let mut sql = String::new();
        if self.write_ahead_log {
            sql.push_str("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL; ");
        }
        if self.foreign_keys {
            sql.push_str("PRAGMA foreign_keys = ON; ");
        }
        sql.push_str(&format!(
            "PRAGMA busy_timeout = {};",
            self.busy_timeout.as_millis()
        ));
        sql
    }
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&self.batch())
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Builds the pool with the default pragmas.
pub fn establish_connection_pool(database_url: &str) -> Result<DbPool, PoolError> {
    establish_connection_pool_with(database_url, SqlitePragmas::default())
}

pub fn establish_connection_pool_with(
    database_url: &str,
    pragmas: SqlitePragmas,
) -> Result<DbPool, PoolError> {
    log::debug!("Opening SQLite pool at {database_url} with {pragmas:?}");
    Pool::builder()
        .connection_customizer(Box::new(pragmas))
        .build(ConnectionManager::<SqliteConnection>::new(database_url))
}

pub fn get_connection(pool: &DbPool) -> Result<DbConnection, PoolError> {
    pool.get().map_err(|e| {
        log::error!("Failed to get connection from pool: {e}");
        e
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pragmas_enable_wal_and_foreign_keys() {
        let sql = SqlitePragmas::default().batch();
        assert!(sql.contains("journal_mode = WAL"));
        assert!(sql.contains("foreign_keys = ON"));
        assert!(sql.ends_with("PRAGMA busy_timeout = 30000;"));
    }

    #[test]
    fn disabled_pragmas_keep_only_the_timeout() {
        let pragmas = SqlitePragmas {
            write_ahead_log: false,
            foreign_keys: false,
            busy_timeout: Duration::from_millis(250),
        };
        assert_eq!(pragmas.batch(), "PRAGMA busy_timeout = 250;");
    }
}
