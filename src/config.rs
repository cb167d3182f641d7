use std::collections::HashSet;
use std::time::Duration;

use crate::constants::{BLOCK_COOLDOWN_MS, MAX_TREE_NODES, SCHEDULE_POLL_SECS, SETTLE_DELAY_MS};

/// Home-screen packages. Blocking the launcher would trap the user, so
/// these are never blocked even when listed.
const LAUNCHER_PACKAGES: &[&str] = &[
    "com.google.android.apps.nexuslauncher",
    "com.android.launcher3",
    "com.sec.android.app.launcher",
    "com.huawei.android.launcher",
    "com.miui.home",
    "com.oneplus.launcher",
    "com.oppo.launcher",
    "com.vivo.launcher",
];

/// Transient system surfaces (notification shade, permission dialogs,
/// settings). Focus moving to one of these does not mean the user left a
/// blocked app, so an active block stays up. The list is a heuristic with
/// no completeness guarantee; override it per device as needed.
const SYSTEM_PACKAGES: &[&str] = &[
    "com.android.systemui",
    "com.google.android.apps.wellbeing",
    "com.google.android.packageinstaller",
    "com.android.settings",
    "android",
];

/// A specific in-app surface watched independently of full-app blocks,
/// e.g. one tab of an otherwise allowed app.
#[derive(Debug, Clone)]
pub struct SubScreenTarget {
    /// Package hosting the watched surface.
    pub package: String,
    /// Accessible description of the surface's entry point.
    pub description: String,
    /// Suffix of the view id naming the surface, when the app exposes one.
    pub view_id_suffix: String,
}

/// Where to find the browser's URL bar for the visit log.
#[derive(Debug, Clone)]
pub struct UrlBarTarget {
    pub package: String,
    pub view_id_suffix: String,
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Our own package; events it originates are always ignored.
    pub own_package: String,
    /// Never-blocked home-screen packages.
    pub launcher_packages: HashSet<String>,
    /// System surfaces that must not clear an active block.
    pub system_packages: HashSet<String>,
    pub sub_screen: SubScreenTarget,
    pub url_bar: UrlBarTarget,
    pub settle_delay: Duration,
    pub block_cooldown: Duration,
    pub max_tree_nodes: usize,
    pub schedule_poll: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        let launcher_packages: HashSet<String> =
            LAUNCHER_PACKAGES.iter().map(|p| (*p).to_string()).collect();

        // Launchers are transient surfaces too: returning home must not
        // drop a block that navigate-away itself triggered.
        let mut system_packages: HashSet<String> =
            SYSTEM_PACKAGES.iter().map(|p| (*p).to_string()).collect();
        system_packages.extend(launcher_packages.iter().cloned());

        Self {
            own_package: "app.vigil".to_string(),
            launcher_packages,
            system_packages,
            sub_screen: SubScreenTarget {
                package: "com.instagram.android".to_string(),
                description: "Reels".to_string(),
                view_id_suffix: "clips_tab".to_string(),
            },
            url_bar: UrlBarTarget {
                package: "com.android.chrome".to_string(),
                view_id_suffix: "url_bar".to_string(),
            },
            settle_delay: Duration::from_millis(SETTLE_DELAY_MS),
            block_cooldown: Duration::from_millis(BLOCK_COOLDOWN_MS),
            max_tree_nodes: MAX_TREE_NODES,
            schedule_poll: Duration::from_secs(SCHEDULE_POLL_SECS),
        }
    }
}
