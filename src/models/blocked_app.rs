use rusqlite::{Connection, Result, params};

#[derive(Debug, Clone)]
pub struct BlockedApp {
    pub package: String,
}

impl BlockedApp {
    pub fn find_all(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT package FROM blocked_apps ORDER BY package")?;

        let rows = stmt.query_map([], |row| {
            Ok(Self { package: row.get(0)? })
        })?;

        rows.collect()
    }

    pub fn count(conn: &Connection) -> Result<usize> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM blocked_apps", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn contains(conn: &Connection, package: &str) -> Result<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM blocked_apps WHERE package = ?1",
            params![package],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Wholesale replacement of the restriction list. Callers run this
    /// inside a transaction so readers never see the list half-applied.
    pub fn replace_all(conn: &Connection, packages: &[String]) -> Result<()> {
        conn.execute("DELETE FROM blocked_apps", [])?;
        let mut stmt = conn.prepare("INSERT OR IGNORE INTO blocked_apps (package) VALUES (?1)")?;
        for package in packages {
            stmt.execute(params![package])?;
        }
        Ok(())
    }
}
