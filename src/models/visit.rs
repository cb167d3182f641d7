use rusqlite::{Connection, Result, params};

/// A URL observed in the browser's address bar.
#[derive(Debug, Clone)]
pub struct Visit {
    pub id: Option<i64>,
    pub url: String,
    pub visited_at: i64,
}

impl Visit {
    pub fn new(url: &str, visited_at: i64) -> Self {
        Self {
            id: None,
            url: url.to_string(),
            visited_at,
        }
    }

    pub fn save(&mut self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO visits (url, visited_at) VALUES (?1, ?2)",
            params![self.url, self.visited_at],
        )?;
        self.id = Some(conn.last_insert_rowid());
        Ok(())
    }

    /// Most recent visits, newest first.
    pub fn find_recent(conn: &Connection, limit: usize) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, url, visited_at FROM visits ORDER BY visited_at DESC, id DESC LIMIT ?1"
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(Self {
                id: Some(row.get(0)?),
                url: row.get(1)?,
                visited_at: row.get(2)?,
            })
        })?;

        rows.collect()
    }
}
