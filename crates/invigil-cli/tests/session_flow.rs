//! End-to-end quiz sessions driven over scripted stdin.
//!
//! The quiz fixtures list the correct answer as option 1 on every
//! multiple-choice question, so a script that always answers "1" earns the
//! same score under any shuffle.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn invigil() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("invigil").unwrap()
}

const CONFIG: &str = r#"data_dir = "./invigil-data"

[student]
name = "Siti Rahma"
nis = "2024-041"
classes = ["8A"]
"#;

const ARITHMETIC_QUIZ: &str = r#"[module]
title = "Mathematics 8A"

[quiz]
title = "Arithmetic Drill"
kind = "practice"
duration_minutes = 10

[[questions]]
id = "q1"
kind = "multiple_choice"
prompt = "What is 6 x 7?"
options = ["42", "36", "48"]
answer = "42"

[[questions]]
id = "q2"
kind = "multiple_choice"
prompt = "What is 81 / 9?"
options = ["9", "8", "7"]
answer = "9"

[[questions]]
id = "q3"
kind = "multiple_choice"
prompt = "What is 15 - 8?"
options = ["7", "6", "8"]
answer = "7"

[[questions]]
id = "q4"
kind = "essay"
prompt = "Show how you would estimate 19 x 21."
rubric = "Full marks for rounding both factors and multiplying."
"#;

/// Answers option 1 on each of the four questions, then submits.
/// Three correct multiple-choice answers and an ungraded essay: 30/40 = 75.
const FULL_RUN: &str = "1\n:n\n1\n:n\n1\n:n\n1\n:submit\n";

fn exam_quiz() -> String {
    ARITHMETIC_QUIZ.replace("kind = \"practice\"", "kind = \"exam\"")
}

/// Writes the config and quiz into a fresh working directory.
fn setup(quiz: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("invigil.toml"), CONFIG).unwrap();
    std::fs::write(dir.path().join("quiz.toml"), quiz).unwrap();
    dir
}

fn stored_records(dir: &TempDir) -> String {
    std::fs::read_to_string(dir.path().join("invigil-data/records.json")).unwrap()
}

// --- practice runs ---

#[test]
fn practice_run_scores_and_stores_the_result() {
    let dir = setup(ARITHMETIC_QUIZ);

    invigil()
        .current_dir(dir.path())
        .args(["take", "--quiz", "quiz.toml"])
        .write_stdin(FULL_RUN)
        .assert()
        .success()
        .stdout(predicate::str::contains("Mathematics 8A :: Arithmetic Drill"))
        .stdout(predicate::str::contains("Score: 75/100"));

    let raw = stored_records(&dir);
    assert!(raw.contains("\"score\": 75"));
    assert!(raw.contains("\"studentNis\": \"2024-041\""));
    assert!(raw.contains("\"isDisqualified\": false"));
    // Taking a quiz also puts the student on the roster.
    assert!(raw.contains("\"nis\": \"2024-041\""));
}

#[test]
fn practice_can_be_retaken() {
    let dir = setup(ARITHMETIC_QUIZ);

    for _ in 0..2 {
        invigil()
            .current_dir(dir.path())
            .args(["take", "--quiz", "quiz.toml"])
            .write_stdin(FULL_RUN)
            .assert()
            .success()
            .stdout(predicate::str::contains("Score: 75/100"));
    }

    let raw = stored_records(&dir);
    assert_eq!(raw.matches("\"quizTitle\"").count(), 2);
}

#[test]
fn unanswered_questions_score_zero() {
    let dir = setup(ARITHMETIC_QUIZ);

    invigil()
        .current_dir(dir.path())
        .args(["take", "--quiz", "quiz.toml"])
        .write_stdin(":submit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 0/100"))
        .stdout(predicate::str::contains("(unanswered)"));
}

#[test]
fn seeded_runs_present_questions_in_the_same_order() {
    let dir = setup(ARITHMETIC_QUIZ);

    let run = || {
        invigil()
            .current_dir(dir.path())
            .args(["take", "--quiz", "quiz.toml", "--seed", "7"])
            .write_stdin(FULL_RUN)
            .output()
            .unwrap()
    };
    let first = run();
    let second = run();

    assert_eq!(
        String::from_utf8_lossy(&first.stdout),
        String::from_utf8_lossy(&second.stdout)
    );
}

// --- exam runs ---

#[test]
fn exam_submission_withholds_the_sheet() {
    let dir = setup(&exam_quiz());

    invigil()
        .current_dir(dir.path())
        .args(["take", "--quiz", "quiz.toml"])
        .write_stdin(FULL_RUN)
        .assert()
        .success()
        .stdout(predicate::str::contains("Submission received"))
        .stdout(predicate::str::contains("Score:").not());

    // The sheet is withheld from the student but stored in full.
    let raw = stored_records(&dir);
    assert!(raw.contains("\"score\": 75"));
}

#[test]
fn exam_cannot_be_retaken() {
    let dir = setup(&exam_quiz());

    invigil()
        .current_dir(dir.path())
        .args(["take", "--quiz", "quiz.toml"])
        .write_stdin(FULL_RUN)
        .assert()
        .success();

    invigil()
        .current_dir(dir.path())
        .args(["take", "--quiz", "quiz.toml"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "This exam has already been submitted",
        ));

    let raw = stored_records(&dir);
    assert_eq!(raw.matches("\"quizTitle\"").count(), 1);
}

// --- preview ---

#[test]
fn preview_leaves_no_records() {
    let dir = setup(ARITHMETIC_QUIZ);

    invigil()
        .current_dir(dir.path())
        .args(["take", "--quiz", "quiz.toml", "--preview"])
        .write_stdin(FULL_RUN)
        .assert()
        .success()
        .stdout(predicate::str::contains("preview, nothing is stored"))
        .stdout(predicate::str::contains("Score: 75/100"));

    assert!(!dir.path().join("invigil-data/records.json").exists());
}

// --- blocked starts ---

#[test]
fn disqualified_record_blocks_retake() {
    let dir = setup(ARITHMETIC_QUIZ);
    let data = dir.path().join("invigil-data");
    std::fs::create_dir_all(&data).unwrap();
    std::fs::write(
        data.join("records.json"),
        r#"{
  "results": [
    {
      "id": "3f2b8c7a-1d4e-4f6a-9b0c-2e5d7a8f1c3b",
      "studentName": "Siti Rahma",
      "studentNis": "2024-041",
      "moduleTitle": "Mathematics 8A",
      "quizTitle": "Arithmetic Drill",
      "score": 0,
      "submittedAt": "2024-03-14T08:30:00Z",
      "answers": [],
      "violations": 3,
      "isDisqualified": true
    }
  ],
  "manualGrades": [],
  "students": []
}"#,
    )
    .unwrap();

    invigil()
        .current_dir(dir.path())
        .args(["take", "--quiz", "quiz.toml"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ask the operator to clear it"));
}

#[test]
fn closed_window_blocks_start() {
    let closed = ARITHMETIC_QUIZ.replace(
        "duration_minutes = 10",
        "duration_minutes = 10\ncloses_at = \"2020-01-01T00:00:00Z\"",
    );
    let dir = setup(&closed);

    invigil()
        .current_dir(dir.path())
        .args(["take", "--quiz", "quiz.toml"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("no longer available"));

    assert!(!dir.path().join("invigil-data/records.json").exists());
}

#[test]
fn future_window_blocks_start() {
    let unopened = ARITHMETIC_QUIZ.replace(
        "duration_minutes = 10",
        "duration_minutes = 10\nopens_at = \"2099-01-01T00:00:00Z\"",
    );
    let dir = setup(&unopened);

    invigil()
        .current_dir(dir.path())
        .args(["take", "--quiz", "quiz.toml"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("not open yet"));
}
