//! The `invigil regrade` command.

use std::path::PathBuf;

use anyhow::Result;
use uuid::Uuid;

use invigil_core::score::apply_correction;
use invigil_core::traits::ResultStore;

pub async fn execute(
    result_id: Uuid,
    question: String,
    points: u32,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (_config, store) = super::open_store(config_path.as_deref())?;

    let mut result = store.fetch_result(result_id).await?;
    let before = result.score;
    apply_correction(&mut result, &question, points)?;
    store.update_result(&result).await?;

    println!(
        "Regraded {question} on {result_id}: total {before} -> {}",
        result.score
    );
    if result.is_disqualified {
        println!("The result is disqualified; its stored total stays 0.");
    }
    Ok(())
}
