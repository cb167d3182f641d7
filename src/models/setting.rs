use rusqlite::{Connection, Result, params};

/// Key/value settings row. Values are stored as strings; booleans as
/// "true"/"false".
pub struct Setting;

impl Setting {
    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        let mut stmt = conn.prepare("SELECT value FROM settings WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;

        if let Some(row) = rows.next()? {
            Ok(Some(row.get(0)?))
        } else {
            Ok(None)
        }
    }

    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn get_bool(conn: &Connection, key: &str) -> Result<bool> {
        Ok(Self::get(conn, key)?.map(|v| v == "true").unwrap_or(false))
    }

    pub fn set_bool(conn: &Connection, key: &str, value: bool) -> Result<()> {
        Self::set(conn, key, if value { "true" } else { "false" })
    }
}
