use rusqlite::{Connection, Result, params};

/// A recurring window during which enforcement is active.
#[derive(Debug, Clone)]
pub struct Schedule {
    pub id: Option<i64>,
    /// Comma-separated day numbers (1=Monday, 7=Sunday). E.g., "1,2,3,4,5" for weekdays.
    pub days_of_week: String,
    /// Start time in HH:MM format (24-hour).
    pub start_time: String,
    /// End time in HH:MM format (24-hour).
    pub end_time: String,
    /// Whether this schedule is enabled.
    pub enabled: bool,
}

impl Schedule {
    /// Create a new schedule (not yet saved to database).
    pub fn new(days_of_week: &str, start_time: &str, end_time: &str) -> Self {
        Self {
            id: None,
            days_of_week: days_of_week.to_string(),
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            enabled: true,
        }
    }

    /// Save the schedule to the database.
    pub fn save(&mut self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO schedules (days_of_week, start_time, end_time, enabled)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                self.days_of_week,
                self.start_time,
                self.end_time,
                self.enabled as i32,
            ],
        )?;
        self.id = Some(conn.last_insert_rowid());
        Ok(())
    }

    /// Find all schedules.
    pub fn find_all(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, days_of_week, start_time, end_time, enabled
             FROM schedules ORDER BY start_time"
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(Self {
                id: Some(row.get(0)?),
                days_of_week: row.get(1)?,
                start_time: row.get(2)?,
                end_time: row.get(3)?,
                enabled: row.get::<_, i32>(4)? != 0,
            })
        })?;

        rows.collect()
    }

    /// Find all enabled schedules.
    pub fn find_enabled(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, days_of_week, start_time, end_time, enabled
             FROM schedules WHERE enabled = 1 ORDER BY start_time"
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(Self {
                id: Some(row.get(0)?),
                days_of_week: row.get(1)?,
                start_time: row.get(2)?,
                end_time: row.get(3)?,
                enabled: row.get::<_, i32>(4)? != 0,
            })
        })?;

        rows.collect()
    }

    /// Delete a schedule from the database.
    pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
        let rows_affected = conn.execute(
            "DELETE FROM schedules WHERE id = ?1",
            params![id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Check if this schedule applies to the given day of week (1=Monday, 7=Sunday).
    pub fn applies_to_day(&self, day: u32) -> bool {
        self.days_of_week
            .split(',')
            .filter_map(|s| s.trim().parse::<u32>().ok())
            .any(|d| d == day)
    }

    /// Check if the given time (HH:MM format) is within this schedule's time range.
    pub fn is_time_in_range(&self, time: &str) -> bool {
        time >= self.start_time.as_str() && time < self.end_time.as_str()
    }

    /// Check if this schedule is active at the given day and time.
    pub fn is_active_at(&self, day: u32, time: &str) -> bool {
        self.enabled && self.applies_to_day(day) && self.is_time_in_range(time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;

    #[test]
    fn test_new_creates_schedule() {
        let schedule = Schedule::new("1,2,3,4,5", "09:00", "12:00");

        assert!(schedule.id.is_none());
        assert_eq!(schedule.days_of_week, "1,2,3,4,5");
        assert_eq!(schedule.start_time, "09:00");
        assert_eq!(schedule.end_time, "12:00");
        assert!(schedule.enabled);
    }

    #[test]
    fn test_save_assigns_id() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        let mut schedule = Schedule::new("1,2,3,4,5", "09:00", "12:00");
        assert!(schedule.id.is_none());

        schedule.save(conn).unwrap();
        assert!(schedule.id.is_some());
    }

    #[test]
    fn test_find_enabled_skips_disabled() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        let mut on = Schedule::new("1,2,3", "09:00", "12:00");
        on.save(conn).unwrap();

        let mut off = Schedule::new("4,5", "13:00", "17:00");
        off.enabled = false;
        off.save(conn).unwrap();

        let enabled = Schedule::find_enabled(conn).unwrap();
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].days_of_week, "1,2,3");
    }

    #[test]
    fn test_delete_removes_schedule() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        let mut schedule = Schedule::new("1", "09:00", "12:00");
        schedule.save(conn).unwrap();

        assert!(Schedule::delete(conn, schedule.id.unwrap()).unwrap());
        assert!(Schedule::find_all(conn).unwrap().is_empty());
        assert!(!Schedule::delete(conn, 999).unwrap());
    }

    #[test]
    fn test_applies_to_day() {
        let schedule = Schedule::new("1,3,5", "09:00", "12:00");

        assert!(schedule.applies_to_day(1));
        assert!(!schedule.applies_to_day(2));
        assert!(schedule.applies_to_day(5));
        assert!(!schedule.applies_to_day(7));
    }

    #[test]
    fn test_is_time_in_range() {
        let schedule = Schedule::new("1", "09:00", "12:00");

        assert!(schedule.is_time_in_range("09:00"));
        assert!(schedule.is_time_in_range("11:59"));
        assert!(!schedule.is_time_in_range("12:00"));
        assert!(!schedule.is_time_in_range("08:59"));
    }

    #[test]
    fn test_is_active_at_requires_enabled() {
        let mut schedule = Schedule::new("1", "09:00", "12:00");
        assert!(schedule.is_active_at(1, "10:00"));

        schedule.enabled = false;
        assert!(!schedule.is_active_at(1, "10:00"));
    }
}
