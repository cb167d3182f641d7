pub mod schema;
pub mod migrations;

use rusqlite::{Connection, Result};
use std::path::Path;

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_database_opens() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let _db = Database::open(&db_path).unwrap();
        assert!(db_path.exists());
    }

    #[test]
    fn test_all_tables_created() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(&db_path).unwrap();
        migrations::run(db.connection()).unwrap();

        let expected_tables = ["blocked_apps", "settings", "schedules", "visits"];
        for table in &expected_tables {
            let count: i32 = db.connection()
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                    |row| row.get(0)
                ).unwrap();
            assert_eq!(count, 1, "Table {} should exist", table);
        }
    }

    #[test]
    fn test_default_settings_seeded() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(&db_path).unwrap();
        migrations::run(db.connection()).unwrap();

        let count: i32 = db.connection()
            .query_row("SELECT COUNT(*) FROM settings", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 3, "Should have 3 default settings");

        let enabled: String = db.connection()
            .query_row(
                "SELECT value FROM settings WHERE key='enforcement_enabled'",
                [],
                |row| row.get(0)
            ).unwrap();
        assert_eq!(enabled, "false", "Enforcement should default to off");
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(&db_path).unwrap();

        migrations::run(db.connection()).unwrap();

        // Flip a setting, re-run, and check the value survives
        db.connection()
            .execute("UPDATE settings SET value='true' WHERE key='enforcement_enabled'", [])
            .unwrap();
        migrations::run(db.connection()).unwrap();

        let enabled: String = db.connection()
            .query_row(
                "SELECT value FROM settings WHERE key='enforcement_enabled'",
                [],
                |row| row.get(0)
            ).unwrap();
        assert_eq!(enabled, "true", "Re-running migrations should not reset settings");
    }
}
