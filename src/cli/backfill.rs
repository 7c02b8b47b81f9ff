use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

use talentmatch::TalentEngine;

/// Embed every eligible profile that does not have an embedding yet.
pub async fn backfill(engine: &TalentEngine) -> Result<()> {
    let before = engine.coverage().await?;
    let missing = before.total_profiles - before.with_embedding;
    if missing == 0 {
        println!("All {} profiles already have embeddings.", before.total_profiles);
        return Ok(());
    }

    let batch = missing.min(engine.config().sync.backfill_batch_size);
    println!(
        "Backfilling {batch} of {missing} profiles with model '{}'...",
        engine.config().embedding.model
    );

    let pb = ProgressBar::new(batch as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  {bar:40.cyan/blue} {pos}/{len} ({eta}) {msg}")
            .expect("valid template")
            .progress_chars("##-"),
    );

    let report = engine
        .backfill_with_progress(|id, ok| {
            if !ok {
                pb.set_message(format!("failed: {id}"));
            }
            pb.inc(1);
        })
        .await?;

    pb.finish_and_clear();

    println!(
        "Backfill complete: {} processed, {} succeeded, {} failed.",
        report.total, report.succeeded, report.failed
    );
    if missing > batch {
        println!("{} profiles remain; run backfill again.", missing - report.succeeded);
    }
    Ok(())
}
