use crate::error::AppError;

/// A node in a UI tree snapshot.
#[derive(Debug, Clone, Default)]
pub struct UiNode {
    /// Stable view id, when the toolkit exposes one.
    pub view_id: Option<String>,
    /// Accessible description.
    pub description: Option<String>,
    /// Visible text content.
    pub text: Option<String>,
    /// Whether the element is currently selected.
    pub selected: bool,
    pub children: Vec<UiNode>,
}

/// Kind of UI change notification delivered by the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    FocusChanged,
    ContentChanged,
    Interaction,
}

/// A single UI change notification.
///
/// The attached tree is only valid for the duration of the delivery
/// callback; the OS may recycle it afterwards. Deferred work re-reads the
/// live tree through [`TreeProvider`] instead of holding on to this one.
#[derive(Debug, Clone)]
pub struct FocusEvent {
    pub package: String,
    pub kind: EventKind,
    pub tree: Option<UiNode>,
}

impl FocusEvent {
    pub fn focus(package: &str) -> Self {
        Self {
            package: package.to_string(),
            kind: EventKind::FocusChanged,
            tree: None,
        }
    }

    pub fn content(package: &str) -> Self {
        Self {
            package: package.to_string(),
            kind: EventKind::ContentChanged,
            tree: None,
        }
    }

    pub fn interaction(package: &str) -> Self {
        Self {
            package: package.to_string(),
            kind: EventKind::Interaction,
            tree: None,
        }
    }
}

/// Full-screen blocking surface. Both calls must be idempotent: showing
/// while shown or hiding while hidden is a no-op.
pub trait OverlayPresenter: Send + Sync {
    fn show(&self) -> Result<(), AppError>;
    fn hide(&self) -> Result<(), AppError>;
}

/// Global navigation facility.
pub trait Navigator: Send + Sync {
    /// Fire-and-forget gesture that leaves the current screen (back/home).
    fn navigate_to_safe_screen(&self);
}

/// Access to the live UI tree of the active window.
pub trait TreeProvider: Send + Sync {
    fn current_tree(&self) -> Option<UiNode>;
}

/// Permission status and the OS surfaces where the user can grant them.
pub trait PermissionProbe: Send + Sync {
    fn overlay_granted(&self) -> bool;
    fn open_overlay_settings(&self);
    fn open_monitor_settings(&self);
}
