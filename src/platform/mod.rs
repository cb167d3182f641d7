pub mod types;

pub use types::{
    EventKind, FocusEvent, Navigator, OverlayPresenter, PermissionProbe, TreeProvider, UiNode,
};

use crate::error::AppError;
use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};

// Stub implementations used where no native backend is wired in. They log
// what a real backend would do, so the full pipeline can run headless.

/// Logging presenter. Tracks shown state so show/hide stay idempotent.
#[derive(Default)]
pub struct LogPresenter {
    shown: AtomicBool,
}

impl OverlayPresenter for LogPresenter {
    fn show(&self) -> Result<(), AppError> {
        if self.shown.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        info!("overlay shown");
        Ok(())
    }

    fn hide(&self) -> Result<(), AppError> {
        if !self.shown.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        info!("overlay hidden");
        Ok(())
    }
}

pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate_to_safe_screen(&self) {
        debug!("navigating to safe screen");
    }
}

/// Provider with no live window; probes see no tree.
pub struct EmptyTreeProvider;

impl TreeProvider for EmptyTreeProvider {
    fn current_tree(&self) -> Option<UiNode> {
        None
    }
}

/// Permission probe that reports everything granted and logs requests to
/// open the OS settings surfaces.
pub struct StubPermissions;

impl PermissionProbe for StubPermissions {
    fn overlay_granted(&self) -> bool {
        true
    }

    fn open_overlay_settings(&self) {
        info!("open overlay permission settings requested");
    }

    fn open_monitor_settings(&self) {
        info!("open monitor permission settings requested");
    }
}
