use crate::config::MonitorConfig;
use crate::policy::{PolicySnapshot, PolicyStore};
use crate::tracker::Transition;
use log::{debug, error, info};
use std::sync::Arc;
use std::time::Instant;

/// What the engine currently believes is enforced on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    Idle,
    AppBlocked,
    SubScreenBlocked,
}

/// Command handed to the dispatcher. Commands are idempotent at the
/// presenter, so re-emitting on a repeated genuine transition is safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Leave the app, then cover the screen.
    BlockApp,
    /// Cover the screen in place.
    BlockSubScreen,
    /// Remove the cover.
    Unblock,
}

/// Decides what enforcement the current foreground context requires.
///
/// The policy is read from the store at every decision, never cached
/// across decisions, so configuration writes from the host channel take
/// effect on the next cycle. A failed policy read skips enforcement for
/// that cycle and nothing else.
pub struct DecisionEngine {
    config: Arc<MonitorConfig>,
    policy: Arc<PolicyStore>,
    state: BlockState,
    last_sub_screen_block: Option<Instant>,
}

impl DecisionEngine {
    pub fn new(config: Arc<MonitorConfig>, policy: Arc<PolicyStore>) -> Self {
        Self {
            config,
            policy,
            state: BlockState::Idle,
            last_sub_screen_block: None,
        }
    }

    pub fn state(&self) -> BlockState {
        self.state
    }

    /// Focus moved to a new app.
    pub fn on_transition(&mut self, transition: &Transition) -> Option<Command> {
        let snapshot = self.read_policy()?;
        self.classify(&transition.to, &snapshot)
    }

    /// Re-evaluate the current foreground without a fresh transition.
    /// Used when the monitor (re)connects and on schedule ticks, so a
    /// policy or schedule change takes effect without waiting for the
    /// next focus change.
    pub fn refresh(&mut self, foreground: Option<&str>) -> Option<Command> {
        let snapshot = self.read_policy()?;
        match foreground {
            Some(package) => self.classify(package, &snapshot),
            None => self.clear_if_blocked(),
        }
    }

    /// Deferred sub-screen probe result. `foreground` is the tracker's
    /// view at delivery time; the monitor already drops results whose
    /// generation is stale, and the guard here re-checks the package.
    pub fn on_sub_screen(&mut self, active: bool, foreground: Option<&str>) -> Option<Command> {
        if !active {
            if self.state == BlockState::SubScreenBlocked {
                self.state = BlockState::Idle;
                info!("sub-screen left, unblocking");
                return Some(Command::Unblock);
            }
            return None;
        }

        // A full-app block outranks the sub-screen path.
        if self.state == BlockState::AppBlocked {
            return None;
        }

        let snapshot = self.read_policy()?;
        if !snapshot.enforcement_active || !snapshot.sub_screen_enabled {
            return None;
        }
        if foreground != Some(self.config.sub_screen.package.as_str()) {
            return None;
        }
        if self.state == BlockState::SubScreenBlocked {
            // Already covered; content bursts re-detect the same condition.
            return None;
        }
        if let Some(last) = self.last_sub_screen_block {
            if last.elapsed() < self.config.block_cooldown {
                debug!("sub-screen block suppressed inside cool-down");
                return None;
            }
        }

        self.state = BlockState::SubScreenBlocked;
        self.last_sub_screen_block = Some(Instant::now());
        info!("blocking {} sub-screen", self.config.sub_screen.package);
        Some(Command::BlockSubScreen)
    }

    fn classify(&mut self, package: &str, snapshot: &PolicySnapshot) -> Option<Command> {
        if !snapshot.enforcement_active {
            return self.clear_if_blocked();
        }

        // A restricted app always wins over the allowlist and the
        // sub-screen path. Launchers and our own surface are exempt:
        // blocking either would trap the user.
        if snapshot.restricted.contains(package)
            && !self.config.launcher_packages.contains(package)
            && package != self.config.own_package
        {
            self.state = BlockState::AppBlocked;
            info!("blocking {}", package);
            return Some(Command::BlockApp);
        }

        if self.config.system_packages.contains(package) {
            // Transient system surface: the user has not left the blocked
            // app's task, so an active block stays up.
            debug!("ignoring system surface {}", package);
            return None;
        }

        self.clear_if_blocked()
    }

    fn clear_if_blocked(&mut self) -> Option<Command> {
        if self.state == BlockState::Idle {
            return None;
        }
        self.state = BlockState::Idle;
        info!("unblocking");
        Some(Command::Unblock)
    }

    fn read_policy(&self) -> Option<PolicySnapshot> {
        match self.policy.snapshot() {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                error!("policy read failed, skipping enforcement this cycle: {}", e);
                None
            }
        }
    }
}
