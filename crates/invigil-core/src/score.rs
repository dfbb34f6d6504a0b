//! The scoring function: pure, fixed-weight, canonical-order.
//!
//! Every question is worth the same fixed number of points. Multiple-choice
//! answers are compared by exact string equality (no trimming, no case
//! folding); essays score 0 at submission and are corrected later by an
//! operator. Scoring always walks the canonical question order, never the
//! shuffled order a session presented.

use std::collections::HashMap;

use crate::error::CorrectionError;
use crate::model::{Question, QuestionKind, QuizResult, SessionAnswer};

/// Points available per question, regardless of kind.
pub const POINTS_PER_QUESTION: u32 = 10;

/// A scored answer sheet: per-question entries plus the normalized total.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSheet {
    /// One entry per canonical question, in canonical order.
    pub answers: Vec<SessionAnswer>,
    /// Normalized total in `0..=100`.
    pub total: u32,
}

/// Scores a response map against the canonical question list.
///
/// Unanswered questions produce an entry with an empty answer string and a
/// score of 0. Responses for ids that are not canonical questions are
/// ignored. Essays earn 0 here but keep their weight in the denominator, so
/// a quiz with ungraded essays cannot reach 100.
pub fn grade(questions: &[Question], responses: &HashMap<String, String>) -> ScoreSheet {
    let answers: Vec<SessionAnswer> = questions
        .iter()
        .map(|question| {
            let answer = responses.get(&question.id).cloned().unwrap_or_default();
            let score = match &question.kind {
                QuestionKind::MultipleChoice { correct_answer, .. }
                    if answer == *correct_answer =>
                {
                    POINTS_PER_QUESTION
                }
                _ => 0,
            };
            SessionAnswer {
                question_id: question.id.clone(),
                answer,
                score,
                max_score: POINTS_PER_QUESTION,
            }
        })
        .collect();
    let total = normalized_total(&answers);
    ScoreSheet { answers, total }
}

/// Recomputes the normalized total from a per-question sheet.
///
/// `round(100 × earned / max)`, or 0 for an empty sheet. Manual corrections
/// reuse this so the formula cannot drift between call sites.
pub fn normalized_total(answers: &[SessionAnswer]) -> u32 {
    let max_sum: u32 = answers.iter().map(|a| a.max_score).sum();
    if max_sum == 0 {
        return 0;
    }
    let earned_sum: u32 = answers.iter().map(|a| a.score).sum();
    (f64::from(earned_sum) * 100.0 / f64::from(max_sum)).round() as u32
}

/// Applies a manual grading correction to a stored result.
///
/// The new per-question score is clamped into `[0, maxScore]` and the
/// result's total is recomputed with [`normalized_total`]. A disqualified
/// record keeps its forced 0 total; the per-question entry still updates so
/// the sheet reflects the operator's judgement.
pub fn apply_correction(
    result: &mut QuizResult,
    question_id: &str,
    points: u32,
) -> Result<(), CorrectionError> {
    let entry = result
        .answers
        .iter_mut()
        .find(|a| a.question_id == question_id)
        .ok_or_else(|| CorrectionError::UnknownQuestion(question_id.to_string()))?;
    entry.score = points.min(entry.max_score);
    result.score = if result.is_disqualified {
        0
    } else {
        normalized_total(&result.answers)
    };
    Ok(())
}
