// src/constants.rs

/// Delay before a deferred content probe inspects the UI tree, letting
/// transient updates settle first.
pub const SETTLE_DELAY_MS: u64 = 150;

/// Minimum interval between repeated sub-screen block actions.
pub const BLOCK_COOLDOWN_MS: u64 = 1000;

/// Node-count ceiling for UI tree traversals.
pub const MAX_TREE_NODES: usize = 2000;

/// Interval between schedule checks in the monitor loop.
pub const SCHEDULE_POLL_SECS: u64 = 60;

/// Maximum size of a configuration-channel message (1MB).
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Maximum number of packages accepted in a restriction list.
pub const MAX_BLOCKED_APPS: usize = 500;

/// Maximum package identifier length.
pub const MAX_PACKAGE_LEN: usize = 256;

/// Number of visited URLs returned by a recent-visits query.
pub const RECENT_VISITS_LIMIT: usize = 50;
