//! TOML quiz document parser.
//!
//! Hosts that are not wired to a content-module backend load quizzes from
//! TOML files: one module per file, carrying its quiz and questions. Parsing
//! goes through intermediate structs so the file format can stay friendlier
//! than the serialized model (lowercase kinds, RFC 3339 timestamp strings).

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::model::{Module, Question, QuestionKind, Quiz, QuizKind};

/// Intermediate TOML structure for quiz document files.
#[derive(Debug, Deserialize)]
struct TomlQuizFile {
    module: TomlModuleHeader,
    quiz: TomlQuizHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlModuleHeader {
    title: String,
}

#[derive(Debug, Deserialize)]
struct TomlQuizHeader {
    title: String,
    #[serde(default = "default_kind")]
    kind: String,
    #[serde(default)]
    duration_minutes: u32,
    #[serde(default)]
    opens_at: Option<String>,
    #[serde(default)]
    closes_at: Option<String>,
}

fn default_kind() -> String {
    "practice".to_string()
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    kind: String,
    prompt: String,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    rubric: Option<String>,
}

/// Parse a single TOML file into a [`Module`].
pub fn parse_module(path: &Path) -> Result<Module> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read quiz file: {}", path.display()))?;

    parse_module_str(&content, path)
}

/// Parse a TOML string into a [`Module`] (useful for testing).
pub fn parse_module_str(content: &str, source_path: &Path) -> Result<Module> {
    let parsed: TomlQuizFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let kind: QuizKind = parsed
        .quiz
        .kind
        .parse()
        .map_err(|e: String| anyhow::anyhow!("{}", e))?;

    let opens_at = parsed
        .quiz
        .opens_at
        .as_deref()
        .map(|v| parse_instant(v, "opens_at", source_path))
        .transpose()?;
    let closes_at = parsed
        .quiz
        .closes_at
        .as_deref()
        .map(|v| parse_instant(v, "closes_at", source_path))
        .transpose()?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| {
            let kind = match q.kind.to_lowercase().as_str() {
                "multiple_choice" | "mc" => {
                    let correct_answer = q.answer.ok_or_else(|| {
                        anyhow::anyhow!("question '{}': multiple_choice requires an answer", q.id)
                    })?;
                    QuestionKind::MultipleChoice { options: q.options, correct_answer }
                }
                "essay" => QuestionKind::Essay { rubric: q.rubric.unwrap_or_default() },
                other => {
                    anyhow::bail!("question '{}': unknown question kind: {other}", q.id)
                }
            };
            Ok(Question { id: q.id, prompt: q.prompt, image: q.image, kind })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Module {
        title: parsed.module.title,
        quiz: Quiz {
            title: parsed.quiz.title,
            kind,
            duration_minutes: parsed.quiz.duration_minutes,
            opens_at,
            closes_at,
            questions,
        },
    })
}

fn parse_instant(value: &str, field: &str, source: &Path) -> Result<DateTime<Utc>> {
    value
        .parse::<DateTime<Utc>>()
        .with_context(|| format!("invalid {field} timestamp '{value}' in {}", source.display()))
}

/// Recursively load all `.toml` quiz documents from a directory.
pub fn load_module_directory(dir: &Path) -> Result<Vec<Module>> {
    let mut modules = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            modules.extend(load_module_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_module(&path) {
                Ok(module) => modules.push(module),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(modules)
}

/// A warning from quiz document validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question id, when the warning concerns one question.
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a module's quiz for authoring mistakes.
///
/// All checks are non-fatal: a quiz with warnings still loads and runs, it
/// just may not behave the way its author expects.
pub fn validate_module(module: &Module) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let quiz = &module.quiz;

    if quiz.questions.is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "quiz has no questions; every submission will score 0".into(),
        });
    }

    if let (Some(opens_at), Some(closes_at)) = (quiz.opens_at, quiz.closes_at) {
        if closes_at <= opens_at {
            warnings.push(ValidationWarning {
                question_id: None,
                message: format!(
                    "availability window is empty: closes_at {closes_at} is not after opens_at {opens_at}"
                ),
            });
        }
    }

    let mut seen_ids = std::collections::HashSet::new();
    for question in &quiz.questions {
        if !seen_ids.insert(&question.id) {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: format!("duplicate question id: {}", question.id),
            });
        }
    }

    for question in &quiz.questions {
        if question.prompt.trim().is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: "prompt is empty".into(),
            });
        }

        if let QuestionKind::MultipleChoice { options, correct_answer } = &question.kind {
            if options.len() < 2 {
                warnings.push(ValidationWarning {
                    question_id: Some(question.id.clone()),
                    message: format!("multiple choice needs at least 2 options, has {}", options.len()),
                });
            }
            // Answers are matched by exact string equality at scoring time.
            if !options.contains(correct_answer) {
                warnings.push(ValidationWarning {
                    question_id: Some(question.id.clone()),
                    message: format!(
                        "correct answer '{correct_answer}' is not one of the options; no response can ever match"
                    ),
                });
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[module]
title = "Mathematics 8A"

[quiz]
title = "Linear equations"
kind = "exam"
duration_minutes = 10
opens_at = "2026-03-01T08:00:00Z"
closes_at = "2026-03-01T10:00:00Z"

[[questions]]
id = "q1"
kind = "multiple_choice"
prompt = "Solve: 2x + 3 = 11. x = ?"
options = ["3", "4", "5"]
answer = "4"

[[questions]]
id = "q2"
kind = "multiple_choice"
prompt = "Which is a linear equation?"
image = "figures/equations.png"
options = ["y = x^2", "y = 2x + 1"]
answer = "y = 2x + 1"

[[questions]]
id = "q3"
kind = "essay"
prompt = "Describe how you would isolate x in 5x - 2 = 13."
rubric = "Mentions adding 2 to both sides, then dividing by 5."
"#;

    #[test]
    fn parse_valid_toml() {
        let module = parse_module_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(module.title, "Mathematics 8A");
        assert_eq!(module.quiz.title, "Linear equations");
        assert_eq!(module.quiz.kind, QuizKind::Exam);
        assert_eq!(module.quiz.duration_minutes, 10);
        assert!(module.quiz.opens_at.is_some());
        assert_eq!(module.quiz.questions.len(), 3);
        assert_eq!(module.quiz.questions[1].image.as_deref(), Some("figures/equations.png"));
        assert_eq!(
            module.quiz.questions[2].kind,
            QuestionKind::Essay {
                rubric: "Mentions adding 2 to both sides, then dividing by 5.".into()
            }
        );
    }

    #[test]
    fn parse_missing_optional_fields() {
        let toml = r#"
[module]
title = "Minimal"

[quiz]
title = "Untimed drill"

[[questions]]
id = "q1"
kind = "mc"
options = ["a", "b"]
answer = "a"
prompt = "Pick a"
"#;
        let module = parse_module_str(toml, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(module.quiz.kind, QuizKind::Practice);
        assert_eq!(module.quiz.duration_minutes, 0);
        assert_eq!(module.quiz.time_budget_secs(), None);
        assert!(module.quiz.opens_at.is_none());
        assert!(module.quiz.closes_at.is_none());
    }

    #[test]
    fn parse_rejects_multiple_choice_without_answer() {
        let toml = r#"
[module]
title = "Broken"

[quiz]
title = "Broken"

[[questions]]
id = "q1"
kind = "multiple_choice"
prompt = "No answer here"
options = ["a", "b"]
"#;
        let err = parse_module_str(toml, &PathBuf::from("test.toml")).unwrap_err();
        assert!(err.to_string().contains("requires an answer"), "got: {err:#}");
    }

    #[test]
    fn parse_rejects_unknown_question_kind() {
        let toml = r#"
[module]
title = "Broken"

[quiz]
title = "Broken"

[[questions]]
id = "q1"
kind = "matching"
prompt = "Match these"
"#;
        let err = parse_module_str(toml, &PathBuf::from("test.toml")).unwrap_err();
        assert!(err.to_string().contains("unknown question kind"), "got: {err:#}");
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        assert!(parse_module_str(bad, &PathBuf::from("bad.toml")).is_err());
    }

    #[test]
    fn parse_rejects_bad_timestamp() {
        let toml = r#"
[module]
title = "Broken"

[quiz]
title = "Broken"
opens_at = "tomorrow morning"
"#;
        let err = parse_module_str(toml, &PathBuf::from("test.toml")).unwrap_err();
        assert!(err.to_string().contains("opens_at"), "got: {err:#}");
    }

    #[test]
    fn validate_flags_duplicate_ids() {
        let toml = r#"
[module]
title = "Dupes"

[quiz]
title = "Dupes"

[[questions]]
id = "same"
kind = "mc"
prompt = "First"
options = ["a", "b"]
answer = "a"

[[questions]]
id = "same"
kind = "mc"
prompt = "Second"
options = ["a", "b"]
answer = "b"
"#;
        let module = parse_module_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_module(&module);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate")));
    }

    #[test]
    fn validate_flags_thin_options_and_unmatchable_answers() {
        let toml = r#"
[module]
title = "Sloppy"

[quiz]
title = "Sloppy"

[[questions]]
id = "q1"
kind = "mc"
prompt = "Only one option"
options = ["a"]
answer = "a"

[[questions]]
id = "q2"
kind = "mc"
prompt = "Answer has a stray space"
options = ["4", "5"]
answer = "4 "
"#;
        let module = parse_module_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_module(&module);
        assert!(warnings.iter().any(|w| w.message.contains("at least 2 options")));
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("not one of the options")));
    }

    #[test]
    fn validate_flags_empty_window_and_empty_quiz() {
        let toml = r#"
[module]
title = "Empty"

[quiz]
title = "Empty"
opens_at = "2026-03-01T10:00:00Z"
closes_at = "2026-03-01T08:00:00Z"
"#;
        let module = parse_module_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_module(&module);
        assert!(warnings.iter().any(|w| w.message.contains("no questions")));
        assert!(warnings.iter().any(|w| w.message.contains("window is empty")));
    }

    #[test]
    fn load_directory_recurses_and_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("good.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("bad.toml"), "not toml at all [").unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(nested.join("also-good.toml"), VALID_TOML).unwrap();
        std::fs::write(nested.join("notes.txt"), "ignored").unwrap();

        let modules = load_module_directory(dir.path()).unwrap();
        assert_eq!(modules.len(), 2);
    }
}
