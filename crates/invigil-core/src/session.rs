//! The quiz session state machine.
//!
//! A [`Session`] is the single active attempt for one student and one quiz.
//! Hosts feed it [`SessionEvent`]s through [`Session::apply`] and execute the
//! returned [`Effect`]s before feeding the next event. The reducer is total:
//! events that do not apply to the current state are silently ignored, so a
//! stale tick or a double-clicked button can never corrupt state.
//!
//! Running-scoped resources are released by the transition that leaves the
//! running state itself: the integrity monitor is deactivated and the
//! `StopTimer`/`ExitFullscreen` effects are emitted before `apply` returns,
//! never from a separate cleanup step.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use uuid::Uuid;

use crate::model::{Question, Quiz, QuizResult, SessionAnswer};
use crate::monitor::{EnvironmentSignal, IntegrityMonitor};
use crate::schedule::evaluate_schedule;
use crate::score;

/// Violations that force a disqualified submission.
pub const MAX_VIOLATIONS: u32 = 3;

/// Who is taking the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    /// A student: the schedule gate applies and submission emits a record.
    Student { name: String, nis: String },
    /// An operator previewing the quiz: no gate, no emitted record.
    Operator,
}

impl Actor {
    pub fn is_student(&self) -> bool {
        matches!(self, Actor::Student { .. })
    }
}

/// Remaining time for a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBudget {
    /// No limit; the session ends only by submission.
    Unlimited,
    /// Seconds left before the forced submission.
    Finite(u64),
}

impl TimeBudget {
    pub fn is_finite(&self) -> bool {
        matches!(self, TimeBudget::Finite(_))
    }
}

impl fmt::Display for TimeBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeBudget::Unlimited => write!(f, "unlimited"),
            TimeBudget::Finite(secs) => write!(f, "{:02}:{:02}", secs / 60, secs % 60),
        }
    }
}

/// Transient warning emitted each time a violation is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViolationWarning {
    /// Violations recorded so far in this session.
    pub count: u32,
    /// The limit that forces a disqualified submission.
    pub max: u32,
}

impl fmt::Display for ViolationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Integrity warning {}/{}: stay on the quiz screen",
            self.count, self.max
        )
    }
}

/// Events a host feeds into [`Session::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Begin the attempt (gated by the schedule for students).
    Start,
    /// Jump to a position in the shuffled sequence.
    Navigate { position: usize },
    /// Record or overwrite a response for one question.
    Answer { question_id: String, response: String },
    /// One second of wall clock elapsed; hosts send these while a timer runs.
    Tick,
    /// Raw environment signal for the integrity monitor.
    Signal(EnvironmentSignal),
    /// Deliberate submission.
    Submit,
    /// Discard a completed practice attempt to allow a retake.
    Reset,
}

/// Side effects a transition asks its host to perform.
///
/// Effects come back in execution order and should run before the host
/// feeds the next event.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Arrange a once-per-second [`SessionEvent::Tick`] source.
    StartTimer,
    /// Cancel the tick source.
    StopTimer,
    /// Bring the host surface to full screen, best effort. Hosts log and
    /// ignore failure; the session never depends on it succeeding.
    EnterFullscreen,
    /// Leave full screen, best effort.
    ExitFullscreen,
    /// Show a transient integrity warning.
    Warn(ViolationWarning),
    /// The start precondition failed; show the reason, nothing changed.
    Blocked { reason: String },
    /// Persist the emitted record, fire and forget.
    Dispatch(QuizResult),
}

/// Live state while running.
#[derive(Debug, Clone, PartialEq)]
pub struct RunningState {
    /// Shuffled presentation order: indices into the canonical question list.
    pub order: Vec<usize>,
    /// Current position within `order`.
    pub position: usize,
    /// Captured responses keyed by question id.
    pub answers: HashMap<String, String>,
    /// Remaining time.
    pub remaining: TimeBudget,
    /// Violations recorded so far; never decreases within an attempt.
    pub violations: u32,
}

impl RunningState {
    /// Counts down one second; true when the budget just ran out.
    fn tick(&mut self) -> bool {
        match &mut self.remaining {
            TimeBudget::Finite(secs) => {
                *secs = secs.saturating_sub(1);
                *secs == 0
            }
            TimeBudget::Unlimited => false,
        }
    }
}

/// Terminal result of an attempt, kept on the session for display.
///
/// Distinct from the emitted [`QuizResult`]: an operator preview produces an
/// outcome but never a record.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Per-question sheet in canonical question order.
    pub answers: Vec<SessionAnswer>,
    /// Normalized total; forced to 0 when disqualified.
    pub total: u32,
    /// Violations recorded before submission.
    pub violations: u32,
    /// Whether the violation limit ended the attempt.
    pub disqualified: bool,
    /// When the attempt was submitted.
    pub submitted_at: DateTime<Utc>,
}

/// Lifecycle of a session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Created but not started; the begin action is gated by the schedule.
    Idle,
    /// Actively taking the quiz.
    Running(RunningState),
    /// Submitted normally, by hand or by timer expiry.
    Completed(Outcome),
    /// Submitted forcibly after the violation limit.
    Disqualified(Outcome),
}

/// A view of the question at the current shuffled position.
#[derive(Debug, Clone, Copy)]
pub struct CurrentQuestion<'a> {
    pub question: &'a Question,
    /// Zero-based position within the shuffled sequence.
    pub position: usize,
    /// Number of questions in the session.
    pub total: usize,
    /// Previously captured response, if any.
    pub answer: Option<&'a str>,
}

/// One attempt at one quiz by one actor.
pub struct Session {
    module_title: String,
    quiz: Quiz,
    actor: Actor,
    state: SessionState,
    monitor: IntegrityMonitor,
    shuffle_seed: Option<u64>,
}

impl Session {
    pub fn new(module_title: impl Into<String>, quiz: Quiz, actor: Actor) -> Self {
        Self {
            module_title: module_title.into(),
            quiz,
            actor,
            state: SessionState::Idle,
            monitor: IntegrityMonitor::new(),
            shuffle_seed: None,
        }
    }

    /// Fixes the shuffle seed for reproducible runs. The shuffled order is
    /// still a uniform permutation; only its randomness source changes.
    pub fn with_shuffle_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn module_title(&self) -> &str {
        &self.module_title
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, SessionState::Running(_))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.state,
            SessionState::Completed(_) | SessionState::Disqualified(_)
        )
    }

    /// The question under the cursor, while running.
    pub fn current_question(&self) -> Option<CurrentQuestion<'_>> {
        let SessionState::Running(running) = &self.state else {
            return None;
        };
        let index = *running.order.get(running.position)?;
        let question = self.quiz.questions.get(index)?;
        Some(CurrentQuestion {
            question,
            position: running.position,
            total: running.order.len(),
            answer: running.answers.get(&question.id).map(String::as_str),
        })
    }

    /// Remaining time, while running.
    pub fn remaining(&self) -> Option<TimeBudget> {
        match &self.state {
            SessionState::Running(running) => Some(running.remaining),
            _ => None,
        }
    }

    /// Violations recorded so far (frozen in terminal states).
    pub fn violations(&self) -> u32 {
        match &self.state {
            SessionState::Idle => 0,
            SessionState::Running(running) => running.violations,
            SessionState::Completed(outcome) | SessionState::Disqualified(outcome) => {
                outcome.violations
            }
        }
    }

    /// Number of questions answered so far, while running.
    pub fn answered_count(&self) -> usize {
        match &self.state {
            SessionState::Running(running) => running.answers.len(),
            _ => 0,
        }
    }

    /// Terminal outcome, once submitted.
    pub fn outcome(&self) -> Option<&Outcome> {
        match &self.state {
            SessionState::Completed(outcome) | SessionState::Disqualified(outcome) => {
                Some(outcome)
            }
            _ => None,
        }
    }

    /// Applies one event and returns the effects the host must execute.
    pub fn apply(&mut self, event: SessionEvent, now: DateTime<Utc>) -> Vec<Effect> {
        match event {
            SessionEvent::Start => self.start(now),
            SessionEvent::Navigate { position } => {
                if let SessionState::Running(running) = &mut self.state {
                    if position < running.order.len() {
                        running.position = position;
                    }
                }
                Vec::new()
            }
            SessionEvent::Answer { question_id, response } => {
                if let SessionState::Running(running) = &mut self.state {
                    running.answers.insert(question_id, response);
                }
                Vec::new()
            }
            SessionEvent::Tick => {
                let expired = match &mut self.state {
                    SessionState::Running(running) => running.tick(),
                    _ => false,
                };
                if expired {
                    tracing::debug!(quiz = %self.quiz.title, "time budget exhausted");
                    self.finish(now, false)
                } else {
                    Vec::new()
                }
            }
            SessionEvent::Signal(signal) => self.observe_signal(signal, now),
            SessionEvent::Submit => self.finish(now, false),
            SessionEvent::Reset => {
                if matches!(self.state, SessionState::Completed(_))
                    && self.quiz.kind.allows_retry()
                {
                    tracing::debug!(quiz = %self.quiz.title, "session reset for retake");
                    self.state = SessionState::Idle;
                }
                Vec::new()
            }
        }
    }

    fn start(&mut self, now: DateTime<Utc>) -> Vec<Effect> {
        if !matches!(self.state, SessionState::Idle) {
            return Vec::new();
        }
        // Render-time checks can go stale; the transition re-checks the gate.
        if self.actor.is_student() {
            if let Some(reason) = evaluate_schedule(&self.quiz, now).message() {
                tracing::debug!(quiz = %self.quiz.title, "start blocked by schedule gate");
                return vec![Effect::Blocked { reason }];
            }
        }

        let mut order: Vec<usize> = (0..self.quiz.questions.len()).collect();
        match self.shuffle_seed {
            Some(seed) => order.shuffle(&mut StdRng::seed_from_u64(seed)),
            None => order.shuffle(&mut rand::rng()),
        }

        let remaining = match self.quiz.time_budget_secs() {
            Some(secs) => TimeBudget::Finite(secs),
            None => TimeBudget::Unlimited,
        };
        let timed = remaining.is_finite();

        self.monitor.enter_running();
        self.state = SessionState::Running(RunningState {
            order,
            position: 0,
            answers: HashMap::new(),
            remaining,
            violations: 0,
        });
        tracing::debug!(quiz = %self.quiz.title, timed, "session started");

        let mut effects = vec![Effect::EnterFullscreen];
        if timed {
            effects.push(Effect::StartTimer);
        }
        effects
    }

    fn observe_signal(&mut self, signal: EnvironmentSignal, now: DateTime<Utc>) -> Vec<Effect> {
        let SessionState::Running(running) = &mut self.state else {
            return Vec::new();
        };
        let Some(kind) = self.monitor.observe(signal) else {
            return Vec::new();
        };
        running.violations += 1;
        let count = running.violations;
        tracing::debug!(%kind, count, "integrity violation recorded");

        let mut effects = vec![Effect::Warn(ViolationWarning { count, max: MAX_VIOLATIONS })];
        if count >= MAX_VIOLATIONS {
            effects.extend(self.finish(now, true));
        }
        effects
    }

    /// Leaves the running state: deactivates the monitor, scores the sheet,
    /// and emits the record for student actors. No-op unless running.
    fn finish(&mut self, now: DateTime<Utc>, disqualified: bool) -> Vec<Effect> {
        let state = std::mem::replace(&mut self.state, SessionState::Idle);
        let running = match state {
            SessionState::Running(running) => running,
            other => {
                self.state = other;
                return Vec::new();
            }
        };

        self.monitor.exit_running();

        let sheet = score::grade(&self.quiz.questions, &running.answers);
        let total = if disqualified { 0 } else { sheet.total };
        let outcome = Outcome {
            answers: sheet.answers,
            total,
            violations: running.violations,
            disqualified,
            submitted_at: now,
        };

        let mut effects = Vec::new();
        if running.remaining.is_finite() {
            effects.push(Effect::StopTimer);
        }
        effects.push(Effect::ExitFullscreen);
        if let Actor::Student { name, nis } = &self.actor {
            effects.push(Effect::Dispatch(QuizResult {
                id: Uuid::new_v4(),
                student_name: name.clone(),
                student_nis: nis.clone(),
                module_title: self.module_title.clone(),
                quiz_title: self.quiz.title.clone(),
                score: outcome.total,
                submitted_at: now,
                answers: outcome.answers.clone(),
                violations: outcome.violations,
                is_disqualified: disqualified,
            }));
        }

        tracing::info!(
            quiz = %self.quiz.title,
            total = outcome.total,
            violations = outcome.violations,
            disqualified,
            "session submitted"
        );

        self.state = if disqualified {
            SessionState::Disqualified(outcome)
        } else {
            SessionState::Completed(outcome)
        };
        effects
    }
}
