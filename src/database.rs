//! Fixture database reset.
//!
//! Scripts call `(db-reset)` from a prepare action to empty every table of the
//! configured database between tests. The connection is opened lazily on first
//! use and kept for the rest of the process.

use rusqlite::Connection;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::DatabaseConfig;

/// Never emptied by a reset.
pub const SCHEMA_MIGRATIONS: &str = "schema_migrations";

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("no database configured (set database.url)")]
    NotConfigured,
    #[error("unsupported database url `{0}`: only sqlite:// is supported")]
    UnsupportedScheme(String),
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

#[derive(Debug)]
pub struct Database {
    config: DatabaseConfig,
    connection: Option<Connection>,
}

impl Database {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            connection: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Opens the configured database if not already open.
    pub fn connect(&mut self) -> Result<&Connection, DatabaseError> {
        if self.connection.is_none() {
            let url = self.config.url.as_deref().ok_or(DatabaseError::NotConfigured)?;
            let path = url
                .strip_prefix("sqlite://")
                .ok_or_else(|| DatabaseError::UnsupportedScheme(url.to_string()))?;
            debug!(url, "connecting to fixture database");
            self.connection = Some(Connection::open(path)?);
        }
        self.connection.as_ref().ok_or(DatabaseError::NotConfigured)
    }

    /// Deletes every row of every table not ignored, with foreign-key checks
    /// disabled for the duration. Returns the number of tables emptied.
    pub fn reset(&mut self) -> Result<usize, DatabaseError> {
        let ignored = self.ignored_tables();
        let connection = self.connect()?;

        let tables = {
            let mut statement = connection.prepare(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
            )?;
            let names = statement
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            names
        };

        connection.execute_batch("PRAGMA foreign_keys = OFF")?;
        let mut emptied = 0;
        let outcome = tables
            .iter()
            .filter(|table| !ignored.contains(table))
            .try_for_each(|table| {
                connection.execute(&format!("DELETE FROM \"{}\"", table.replace('"', "\"\"")), [])?;
                emptied += 1;
                Ok::<_, rusqlite::Error>(())
            });
        connection.execute_batch("PRAGMA foreign_keys = ON")?;
        outcome?;

        info!(tables = emptied, "fixture database reset");
        Ok(emptied)
    }

    fn ignored_tables(&self) -> Vec<String> {
        let mut ignored = vec![SCHEMA_MIGRATIONS.to_string()];
        ignored.extend(self.config.ignore_tables.iter().cloned());
        ignored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn database(path: &std::path::Path, ignore: &[&str]) -> Database {
        Database::new(DatabaseConfig {
            url: Some(format!("sqlite://{}", path.display())),
            ignore_tables: ignore.iter().map(|t| t.to_string()).collect(),
        })
    }

    fn count(db: &mut Database, table: &str) -> i64 {
        db.connect()
            .unwrap()
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_reset_empties_tables_except_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = database(&dir.path().join("fixtures.db"), &["countries"]);
        db.connect()
            .unwrap()
            .execute_batch(
                "CREATE TABLE users (id INTEGER PRIMARY KEY);
                 CREATE TABLE posts (id INTEGER PRIMARY KEY, user_id INTEGER REFERENCES users(id));
                 CREATE TABLE countries (code TEXT);
                 CREATE TABLE schema_migrations (version TEXT);
                 PRAGMA foreign_keys = ON;
                 INSERT INTO users VALUES (1);
                 INSERT INTO posts VALUES (1, 1);
                 INSERT INTO countries VALUES ('uy');
                 INSERT INTO schema_migrations VALUES ('001');",
            )
            .unwrap();

        assert_eq!(db.reset().unwrap(), 2);
        assert_eq!(count(&mut db, "users"), 0);
        assert_eq!(count(&mut db, "posts"), 0);
        assert_eq!(count(&mut db, "countries"), 1);
        assert_eq!(count(&mut db, "schema_migrations"), 1);
    }

    #[test]
    fn test_missing_url() {
        let mut db = Database::new(DatabaseConfig::default());
        assert!(matches!(db.reset(), Err(DatabaseError::NotConfigured)));
        assert!(!db.is_connected());
    }

    #[test]
    fn test_unsupported_scheme() {
        let mut db = Database::new(DatabaseConfig {
            url: Some("postgres://localhost/test".into()),
            ignore_tables: vec![],
        });
        assert!(matches!(db.connect(), Err(DatabaseError::UnsupportedScheme(_))));
    }
}
