//! The schedule gate: decides whether a quiz may be started right now.
//!
//! Hosts evaluate the gate at render time to disable the begin action, and
//! the session evaluates it again inside the start transition, because the
//! click can land after the window has closed.

use chrono::{DateTime, Utc};

use crate::model::Quiz;

/// Outcome of evaluating a quiz's availability window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleStatus {
    /// The quiz may be started now.
    Open,
    /// The window has not opened yet.
    NotStarted { opens_at: DateTime<Utc> },
    /// The window has already closed.
    Expired { closed_at: DateTime<Utc> },
}

impl ScheduleStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, ScheduleStatus::Open)
    }

    /// Blocking message for the non-open variants.
    pub fn message(&self) -> Option<String> {
        match self {
            ScheduleStatus::Open => None,
            ScheduleStatus::NotStarted { opens_at } => Some(format!(
                "This quiz is not open yet. It opens at {}.",
                format_instant(*opens_at)
            )),
            ScheduleStatus::Expired { closed_at } => Some(format!(
                "This quiz is no longer available. It closed at {}.",
                format_instant(*closed_at)
            )),
        }
    }
}

/// Evaluates the availability window against `now`.
///
/// Boundaries are inclusive: the quiz is open at exactly `opens_at` and at
/// exactly `closes_at`. A quiz with no window configured is always open.
pub fn evaluate_schedule(quiz: &Quiz, now: DateTime<Utc>) -> ScheduleStatus {
    if let Some(opens_at) = quiz.opens_at {
        if now < opens_at {
            return ScheduleStatus::NotStarted { opens_at };
        }
    }
    if let Some(closes_at) = quiz.closes_at {
        if now > closes_at {
            return ScheduleStatus::Expired { closed_at: closes_at };
        }
    }
    ScheduleStatus::Open
}

fn format_instant(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M UTC").to_string()
}
