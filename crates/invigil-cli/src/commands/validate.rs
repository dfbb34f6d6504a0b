//! The `invigil validate` command.

use std::path::PathBuf;

use anyhow::Result;

pub fn execute(quiz_path: PathBuf) -> Result<()> {
    let modules = if quiz_path.is_dir() {
        invigil_core::quizfile::load_module_directory(&quiz_path)?
    } else {
        vec![invigil_core::quizfile::parse_module(&quiz_path)?]
    };

    let mut total_warnings = 0;

    for module in &modules {
        println!(
            "Module: {} :: {} ({} quiz, {} questions)",
            module.title,
            module.quiz.title,
            module.quiz.kind,
            module.quiz.questions.len()
        );

        let warnings = invigil_core::quizfile::validate_module(module);
        for w in &warnings {
            match &w.question_id {
                Some(id) => println!("  [{id}] WARNING: {}", w.message),
                None => println!("  WARNING: {}", w.message),
            }
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All quiz modules valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
