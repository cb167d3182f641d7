use crate::db::Database;
use crate::error::AppError;
use crate::models::{BlockedApp, Schedule, Setting, Visit};
use log::{info, warn};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const SETTING_ENABLED: &str = "enforcement_enabled";
pub const SETTING_SUB_SCREEN: &str = "sub_screen_blocked";
pub const SETTING_MONITOR_RUNNING: &str = "monitor_running";

/// One consistent read of the whole policy, taken at decision time.
#[derive(Debug, Clone)]
pub struct PolicySnapshot {
    pub restricted: HashSet<String>,
    pub sub_screen_enabled: bool,
    /// Manual switch or an active schedule window.
    pub enforcement_active: bool,
}

/// Durable policy storage shared by the monitor and the configuration
/// channel. Writes replace whole values inside a transaction, so a
/// snapshot never observes a half-applied restriction list.
pub struct PolicyStore {
    db: Arc<Mutex<Database>>,
}

impl PolicyStore {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }

    fn lock_db(&self) -> MutexGuard<'_, Database> {
        match self.db.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("PolicyStore: database mutex was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Read the whole policy in a single transaction.
    pub fn snapshot(&self) -> Result<PolicySnapshot, AppError> {
        let db = self.lock_db();
        let conn = db.connection();

        let tx = conn.unchecked_transaction()?;
        let restricted: HashSet<String> = BlockedApp::find_all(&tx)?
            .into_iter()
            .map(|app| app.package)
            .collect();
        let sub_screen_enabled = Setting::get_bool(&tx, SETTING_SUB_SCREEN)?;
        let manual = Setting::get_bool(&tx, SETTING_ENABLED)?;
        let schedules = Schedule::find_enabled(&tx)?;
        tx.commit()?;

        let (day, time) = current_day_and_time();
        let scheduled = schedules.iter().any(|s| s.is_active_at(day, &time));

        Ok(PolicySnapshot {
            restricted,
            sub_screen_enabled,
            enforcement_active: manual || scheduled,
        })
    }

    /// Replace the restriction list wholesale.
    pub fn set_restricted_apps(&self, packages: &[String]) -> Result<(), AppError> {
        let db = self.lock_db();
        let conn = db.connection();

        let tx = conn.unchecked_transaction()?;
        BlockedApp::replace_all(&tx, packages)?;
        tx.commit()?;

        info!("restriction list replaced: {} apps", packages.len());
        Ok(())
    }

    pub fn blocked_app_count(&self) -> Result<usize, AppError> {
        let db = self.lock_db();
        Ok(BlockedApp::count(db.connection())?)
    }

    pub fn set_sub_screen_enabled(&self, enabled: bool) -> Result<(), AppError> {
        let db = self.lock_db();
        Setting::set_bool(db.connection(), SETTING_SUB_SCREEN, enabled)?;
        info!("sub-screen blocking {}", if enabled { "enabled" } else { "disabled" });
        Ok(())
    }

    pub fn set_enforcement_enabled(&self, enabled: bool) -> Result<(), AppError> {
        let db = self.lock_db();
        Setting::set_bool(db.connection(), SETTING_ENABLED, enabled)?;
        info!("enforcement {}", if enabled { "enabled" } else { "disabled" });
        Ok(())
    }

    /// Recorded by the monitor on connect/disconnect so the host process
    /// can answer status queries.
    pub fn set_monitor_running(&self, running: bool) -> Result<(), AppError> {
        let db = self.lock_db();
        Setting::set_bool(db.connection(), SETTING_MONITOR_RUNNING, running)?;
        Ok(())
    }

    pub fn monitor_running(&self) -> Result<bool, AppError> {
        let db = self.lock_db();
        Ok(Setting::get_bool(db.connection(), SETTING_MONITOR_RUNNING)?)
    }

    pub fn add_schedule(&self, days_of_week: &str, start_time: &str, end_time: &str) -> Result<i64, AppError> {
        let db = self.lock_db();
        let mut schedule = Schedule::new(days_of_week, start_time, end_time);
        schedule.save(db.connection())?;
        schedule.id.ok_or(AppError::NotFound { entity: "schedule" })
    }

    pub fn remove_schedule(&self, id: i64) -> Result<bool, AppError> {
        let db = self.lock_db();
        Ok(Schedule::delete(db.connection(), id)?)
    }

    pub fn schedules(&self) -> Result<Vec<Schedule>, AppError> {
        let db = self.lock_db();
        Ok(Schedule::find_all(db.connection())?)
    }

    pub fn record_visit(&self, url: &str) -> Result<(), AppError> {
        let db = self.lock_db();
        let now = unix_now() as i64;
        Visit::new(url, now).save(db.connection())?;
        Ok(())
    }

    pub fn recent_visits(&self, limit: usize) -> Result<Vec<String>, AppError> {
        let db = self.lock_db();
        let visits = Visit::find_recent(db.connection(), limit)?;
        Ok(visits.into_iter().map(|v| v.url).collect())
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
        .as_secs()
}

/// Get the current day of week (1=Monday, 7=Sunday) and time (HH:MM format).
fn current_day_and_time() -> (u32, String) {
    let now = unix_now();

    // Unix epoch (Jan 1, 1970) was a Thursday (day 4 in ISO weekday)
    let days_since_epoch = now / 86400;
    let day_of_week = ((days_since_epoch + 3) % 7) + 1; // 1=Monday, 7=Sunday

    let seconds_today = now % 86400;
    let hours = (seconds_today / 3600) as u32;
    let minutes = ((seconds_today % 3600) / 60) as u32;

    (day_of_week as u32, format!("{:02}:{:02}", hours, minutes))
}
