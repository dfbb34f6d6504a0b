//! The `invigil record` command.

use std::path::PathBuf;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use invigil_core::model::ManualGrade;
use invigil_core::traits::ResultStore;

pub async fn execute(
    nis: String,
    module: String,
    title: String,
    score: u32,
    date: Option<NaiveDate>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(score <= 100, "score must be between 0 and 100");

    let (_config, store) = super::open_store(config_path.as_deref())?;

    let grade = ManualGrade {
        id: Uuid::new_v4(),
        student_nis: nis,
        module_id: module,
        title,
        score,
        date: date.unwrap_or_else(|| Utc::now().date_naive()),
    };
    store.append_manual_grade(&grade).await?;

    println!(
        "Recorded manual grade {} for {}: {} ({})",
        grade.id, grade.student_nis, grade.score, grade.title
    );
    Ok(())
}
