//! The `invigil clear` command.

use std::path::PathBuf;

use anyhow::Result;
use uuid::Uuid;

use invigil_core::traits::ResultStore;

pub async fn execute(result_id: Uuid, config_path: Option<PathBuf>) -> Result<()> {
    let (_config, store) = super::open_store(config_path.as_deref())?;

    let result = store.fetch_result(result_id).await?;
    anyhow::ensure!(
        result.is_disqualified,
        "result {result_id} is not disqualified; clear only removes disqualified attempts"
    );

    store.delete_result(result_id).await?;
    println!(
        "Cleared disqualified result {result_id} for {} ({}). The student can retake the quiz.",
        result.student_name, result.student_nis
    );
    Ok(())
}
