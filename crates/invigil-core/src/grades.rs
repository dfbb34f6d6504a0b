//! Gradebook aggregation.
//!
//! Derives per-student summaries from the full record set on every call.
//! There is no caching layer, so a changed or deleted record can never
//! leave a stale average behind.

use crate::model::{GradeSummary, ManualGrade, QuizResult, Student};

/// Builds one [`GradeSummary`] per roster student, in roster order.
pub fn summarize(
    students: &[Student],
    results: &[QuizResult],
    manual_grades: &[ManualGrade],
) -> Vec<GradeSummary> {
    students
        .iter()
        .map(|student| summarize_student(student, results, manual_grades))
        .collect()
}

/// Summary for a single student.
///
/// Records are matched on the student number. Quiz results contribute their
/// normalized scores as-is: a disqualified result is a 0 in the mean, not an
/// exclusion. The final score averages the two kinds when both exist,
/// otherwise takes whichever exists, otherwise 0.
pub fn summarize_student(
    student: &Student,
    results: &[QuizResult],
    manual_grades: &[ManualGrade],
) -> GradeSummary {
    let quiz_scores: Vec<u32> = results
        .iter()
        .filter(|r| r.student_nis == student.nis)
        .map(|r| r.score)
        .collect();
    let manual_scores: Vec<u32> = manual_grades
        .iter()
        .filter(|g| g.student_nis == student.nis)
        .map(|g| g.score)
        .collect();

    let quiz_average = rounded_mean(&quiz_scores);
    let manual_average = rounded_mean(&manual_scores);
    let final_score = match (quiz_scores.is_empty(), manual_scores.is_empty()) {
        (false, false) => (f64::from(quiz_average + manual_average) / 2.0).round() as u32,
        (false, true) => quiz_average,
        (true, false) => manual_average,
        (true, true) => 0,
    };

    GradeSummary {
        student_nis: student.nis.clone(),
        student_name: student.name.clone(),
        quiz_count: quiz_scores.len(),
        quiz_average,
        manual_count: manual_scores.len(),
        manual_average,
        final_score,
    }
}

/// Mean rounded to the nearest integer; 0 for an empty slice.
fn rounded_mean(scores: &[u32]) -> u32 {
    if scores.is_empty() {
        return 0;
    }
    let sum: u32 = scores.iter().sum();
    (f64::from(sum) / scores.len() as f64).round() as u32
}
