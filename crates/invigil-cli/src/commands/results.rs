//! The `invigil results` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use invigil_core::traits::ResultStore;

pub async fn execute(student: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let (_config, store) = super::open_store(config_path.as_deref())?;

    let mut results = store.list_results().await?;
    if let Some(nis) = &student {
        results.retain(|r| r.student_nis == *nis);
    }

    if results.is_empty() {
        println!("No results on record.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Id", "Student", "Quiz", "Score", "Submitted", "Flags"]);

    for result in &results {
        let flags = if result.is_disqualified {
            format!("DISQUALIFIED ({} violations)", result.violations)
        } else if result.violations > 0 {
            format!("{} violation(s)", result.violations)
        } else {
            String::new()
        };
        table.add_row(vec![
            Cell::new(result.id),
            Cell::new(format!("{} ({})", result.student_name, result.student_nis)),
            Cell::new(format!("{} :: {}", result.module_title, result.quiz_title)),
            Cell::new(result.score),
            Cell::new(result.submitted_at.format("%Y-%m-%d %H:%M")),
            Cell::new(flags),
        ]);
    }

    println!("{table}");
    Ok(())
}
