pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS blocked_apps (
    package TEXT PRIMARY KEY
);

CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS schedules (
    id INTEGER PRIMARY KEY,
    days_of_week TEXT NOT NULL,
    start_time TEXT NOT NULL,
    end_time TEXT NOT NULL,
    enabled INTEGER DEFAULT 1
);

CREATE TABLE IF NOT EXISTS visits (
    id INTEGER PRIMARY KEY,
    url TEXT NOT NULL,
    visited_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_visits_time ON visits(visited_at);
"#;

pub const DEFAULT_SETTINGS: &[(&str, &str)] = &[
    ("enforcement_enabled", "false"),
    ("sub_screen_blocked", "false"),
    ("monitor_running", "false"),
];
