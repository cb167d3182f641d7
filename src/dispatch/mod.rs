use crate::engine::Command;
use crate::platform::{Navigator, OverlayPresenter};
use log::error;
use std::sync::Arc;

/// Turns engine commands into presenter and navigator calls.
///
/// All commands are fire-and-forget: there is no feedback channel to
/// confirm an effect, and a presentation failure is not recoverable
/// here. Failures are logged; the next state-driven command re-attempts
/// naturally because show/hide are idempotent.
pub struct Dispatcher {
    presenter: Arc<dyn OverlayPresenter>,
    navigator: Arc<dyn Navigator>,
}

impl Dispatcher {
    pub fn new(presenter: Arc<dyn OverlayPresenter>, navigator: Arc<dyn Navigator>) -> Self {
        Self { presenter, navigator }
    }

    pub fn apply(&self, command: Command) {
        match command {
            Command::BlockApp => {
                // Leave the blocked screen before covering it, keeping the
                // window in which its content is visible as small as possible.
                self.navigator.navigate_to_safe_screen();
                self.show();
            }
            Command::BlockSubScreen => self.show(),
            Command::Unblock => self.hide(),
        }
    }

    fn show(&self) {
        if let Err(e) = self.presenter.show() {
            error!("overlay show failed: {}", e);
        }
    }

    fn hide(&self) {
        if let Err(e) = self.presenter.hide() {
            error!("overlay hide failed: {}", e);
        }
    }
}
