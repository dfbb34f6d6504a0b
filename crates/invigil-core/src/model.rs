//! Core data model types for invigil.
//!
//! These types represent quizzes and their questions, the records a finished
//! session emits, and the roster the gradebook aggregates over. Serialized
//! field names are part of the persisted-record contract and must not drift.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A single quiz question.
///
/// Questions are immutable once a session starts: the session works on a
/// snapshot, and scoring always walks the canonical order defined by the
/// owning [`Quiz`], never the shuffled presentation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Unique identifier within the quiz.
    pub id: String,
    /// The prompt shown to the student.
    pub prompt: String,
    /// Optional illustration reference (path or URL, host-defined).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Kind-specific payload, tagged `type` in serialized form.
    #[serde(flatten)]
    pub kind: QuestionKind,
}

impl Question {
    /// Whether this question is scored automatically at submission.
    pub fn is_auto_graded(&self) -> bool {
        matches!(self.kind, QuestionKind::MultipleChoice { .. })
    }
}

/// The two supported question kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionKind {
    /// Auto-graded by exact comparison against the stored answer string.
    #[serde(rename_all = "camelCase")]
    MultipleChoice {
        /// Ordered answer options; a well-formed question has at least two.
        options: Vec<String>,
        /// The exact string a response must equal to earn the points.
        correct_answer: String,
    },
    /// Free text, scored 0 until an operator grades it.
    Essay {
        /// Grading reference for the operator.
        #[serde(default)]
        rubric: String,
    },
}

impl QuestionKind {
    /// Human-readable label for console output.
    pub fn label(&self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice { .. } => "multiple choice",
            QuestionKind::Essay { .. } => "essay",
        }
    }
}

/// Governs retry rules and result visibility after submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuizKind {
    /// Results shown immediately; completed sessions may be retaken.
    Practice,
    /// Single attempt; results and answer key withheld from the student.
    Exam,
}

impl QuizKind {
    /// Whether a completed (not disqualified) session may be reset.
    pub fn allows_retry(self) -> bool {
        matches!(self, QuizKind::Practice)
    }

    /// Whether the student sees the scored sheet right after submitting.
    pub fn reveals_results(self) -> bool {
        matches!(self, QuizKind::Practice)
    }
}

impl fmt::Display for QuizKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizKind::Practice => write!(f, "practice"),
            QuizKind::Exam => write!(f, "exam"),
        }
    }
}

impl FromStr for QuizKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "practice" => Ok(QuizKind::Practice),
            "exam" => Ok(QuizKind::Exam),
            other => Err(format!("unknown quiz kind: {other}")),
        }
    }
}

/// A quiz definition: ordered questions plus the rules a session runs under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    /// Human-readable title, copied into emitted results.
    pub title: String,
    /// Kind, serialized as `type`.
    #[serde(rename = "type")]
    pub kind: QuizKind,
    /// Time budget in whole minutes; 0 means unlimited.
    #[serde(default)]
    pub duration_minutes: u32,
    /// Start of the availability window; absent means no lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opens_at: Option<DateTime<Utc>>,
    /// End of the availability window; absent means no upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closes_at: Option<DateTime<Utc>>,
    /// Questions in canonical (authored) order.
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Quiz {
    /// Session time budget in seconds, or `None` for an untimed quiz.
    pub fn time_budget_secs(&self) -> Option<u64> {
        (self.duration_minutes > 0).then(|| u64::from(self.duration_minutes) * 60)
    }
}

/// A content unit owning one quiz.
///
/// The module body (learning material) lives in an external system; only
/// the title travels into emitted results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    /// Module title, copied into emitted results as `moduleTitle`.
    pub title: String,
    /// The quiz this module carries.
    pub quiz: Quiz,
}

/// A roster entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    /// Student number; results and grades are matched on this.
    pub nis: String,
    /// Display name.
    pub name: String,
    /// Class labels (e.g. "8A") used for filtering.
    #[serde(default)]
    pub classes: Vec<String>,
}

/// One captured answer inside a [`QuizResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionAnswer {
    /// The canonical question this answers.
    pub question_id: String,
    /// The response exactly as captured; empty means unanswered.
    #[serde(default)]
    pub answer: String,
    /// Points earned, in `0..=max_score`.
    pub score: u32,
    /// Points available for this question.
    pub max_score: u32,
}

/// The record emitted exactly once when a session submits.
///
/// After emission the record is only ever mutated by a manual grading
/// correction, which recomputes and overwrites `score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    /// Record id, assigned at emission.
    pub id: Uuid,
    pub student_name: String,
    pub student_nis: String,
    pub module_title: String,
    pub quiz_title: String,
    /// Normalized total in `0..=100`; forced to 0 when disqualified.
    pub score: u32,
    /// Submission time (ISO-8601 in serialized form).
    pub submitted_at: DateTime<Utc>,
    /// Per-question sheet in canonical question order.
    pub answers: Vec<SessionAnswer>,
    /// Integrity violations accumulated during the session.
    pub violations: u32,
    /// Whether the session ended by hitting the violation limit.
    pub is_disqualified: bool,
}

/// A grade entered by an operator outside any quiz session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualGrade {
    /// Record id.
    pub id: Uuid,
    /// Student number this grade belongs to.
    pub student_nis: String,
    /// The module this grade is linked to.
    pub module_id: String,
    /// What was graded (e.g. "Essay review, week 3").
    pub title: String,
    /// Score in `0..=100`.
    pub score: u32,
    /// Grading date.
    pub date: NaiveDate,
}

/// Per-student aggregate, derived on demand and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeSummary {
    pub student_nis: String,
    pub student_name: String,
    /// Number of quiz results on record.
    pub quiz_count: usize,
    /// Rounded mean of quiz result scores; 0 when there are none.
    pub quiz_average: u32,
    /// Number of manual grades on record.
    pub manual_count: usize,
    /// Rounded mean of manual grade scores; 0 when there are none.
    pub manual_average: u32,
    /// Combined final score per the gradebook rule.
    pub final_score: u32,
}
