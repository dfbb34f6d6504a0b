//! The `invigil grades` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use invigil_core::grades::summarize;
use invigil_core::model::GradeSummary;
use invigil_core::traits::ResultStore;

pub async fn execute(
    class: Option<String>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (_config, store) = super::open_store(config_path.as_deref())?;

    let mut students = store.list_students().await?;
    if let Some(class) = &class {
        students.retain(|s| s.classes.iter().any(|c| c == class));
    }
    let results = store.list_results().await?;
    let manual_grades = store.list_manual_grades().await?;

    let summaries = summarize(&students, &results, &manual_grades);

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&summaries)?),
        "table" => print_table(&summaries),
        other => anyhow::bail!("unknown format: {other} (expected table or json)"),
    }

    Ok(())
}

fn print_table(summaries: &[GradeSummary]) {
    if summaries.is_empty() {
        println!("No students on record. The roster fills in as quizzes are taken.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        "NIS",
        "Student",
        "Quizzes",
        "Quiz avg",
        "Manual",
        "Manual avg",
        "Final",
    ]);

    for summary in summaries {
        table.add_row(vec![
            Cell::new(&summary.student_nis),
            Cell::new(&summary.student_name),
            Cell::new(summary.quiz_count),
            Cell::new(average_cell(summary.quiz_count, summary.quiz_average)),
            Cell::new(summary.manual_count),
            Cell::new(average_cell(summary.manual_count, summary.manual_average)),
            Cell::new(summary.final_score),
        ]);
    }

    println!("{table}");
}

/// An average over zero records renders as a dash.
fn average_cell(count: usize, average: u32) -> String {
    if count == 0 {
        "-".to_string()
    } else {
        average.to_string()
    }
}
