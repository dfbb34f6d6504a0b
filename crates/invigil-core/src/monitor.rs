//! Integrity monitoring for a running session.
//!
//! The host forwards raw environment signals (surface visibility, window
//! focus); the monitor turns level changes into edges so a sustained
//! condition is reported exactly once until it toggles back. It observes
//! only while a session is in the running state.

use std::fmt;

/// Raw signals a host environment can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentSignal {
    /// The quiz surface became hidden (tab switch, minimise, app suspend).
    Hidden,
    /// The quiz surface became visible again.
    Visible,
    /// The window lost input focus.
    FocusLost,
    /// The window regained input focus.
    FocusGained,
}

/// A detected integrity violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// The quiz surface was hidden while the session ran.
    TabHidden,
    /// The window lost focus while the session ran.
    FocusLost,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::TabHidden => write!(f, "left the quiz screen"),
            ViolationKind::FocusLost => write!(f, "switched focus away"),
        }
    }
}

/// Edge detector over the two watched conditions.
///
/// Inactive until the owning session enters the running state; the session
/// deactivates it in the same transition that leaves running, so no signal
/// can count against a terminal state.
#[derive(Debug, Default, Clone)]
pub struct IntegrityMonitor {
    active: bool,
    hidden: bool,
    unfocused: bool,
}

impl IntegrityMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts observing. Level state resets so a condition that predates the
    /// session does not fire retroactively.
    pub(crate) fn enter_running(&mut self) {
        self.active = true;
        self.hidden = false;
        self.unfocused = false;
    }

    /// Stops observing. Signals received while inactive are dropped.
    pub(crate) fn exit_running(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Feeds one signal; returns a violation on a qualifying edge.
    pub(crate) fn observe(&mut self, signal: EnvironmentSignal) -> Option<ViolationKind> {
        if !self.active {
            return None;
        }
        match signal {
            EnvironmentSignal::Hidden if !self.hidden => {
                self.hidden = true;
                Some(ViolationKind::TabHidden)
            }
            EnvironmentSignal::Hidden => None,
            EnvironmentSignal::Visible => {
                self.hidden = false;
                None
            }
            EnvironmentSignal::FocusLost if !self.unfocused => {
                self.unfocused = true;
                Some(ViolationKind::FocusLost)
            }
            EnvironmentSignal::FocusLost => None,
            EnvironmentSignal::FocusGained => {
                self.unfocused = false;
                None
            }
        }
    }
}
