use crate::platform::{EventKind, FocusEvent};
use log::debug;

/// A genuine foreground change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: Option<String>,
    pub to: String,
}

/// Deduplicating edge detector over the raw event stream.
///
/// Keeps the current foreground package and reports only actual
/// transitions. Knows nothing about the restriction policy.
pub struct ContextTracker {
    own_package: String,
    foreground: Option<String>,
    generation: u64,
}

impl ContextTracker {
    pub fn new(own_package: &str) -> Self {
        Self {
            own_package: own_package.to_string(),
            foreground: None,
            generation: 0,
        }
    }

    /// Current foreground package, once an event has established one.
    pub fn foreground(&self) -> Option<&str> {
        self.foreground.as_deref()
    }

    /// Token that changes on every transition. Deferred work captures it
    /// at schedule time; a mismatch at delivery means the user has moved
    /// on and the result is stale.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn observe(&mut self, event: &FocusEvent) -> Option<Transition> {
        if event.package == self.own_package {
            return None;
        }
        if event.kind != EventKind::FocusChanged {
            return None;
        }
        if self.foreground.as_deref() == Some(event.package.as_str()) {
            return None;
        }

        let from = self.foreground.replace(event.package.clone());
        self.generation += 1;
        debug!("foreground changed: {:?} -> {}", from, event.package);
        Some(Transition {
            from,
            to: event.package.clone(),
        })
    }
}
