use anyhow::{Context, Result};
use std::path::Path;

use talentmatch::profile::types::ProfileData;
use talentmatch::TalentEngine;

/// Import profiles from a JSON file (an array of profile objects).
///
/// Existing profiles with the same id are overwritten. Unless `skip_embed`
/// is set, the embeddings of every imported profile are computed before
/// returning instead of waiting for the settle delay.
pub async fn import(engine: &TalentEngine, file: &Path, skip_embed: bool) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read import file: {}", file.display()))?;
    let profiles: Vec<ProfileData> =
        serde_json::from_str(&json).context("failed to parse import JSON")?;

    println!("Importing {} profiles...", profiles.len());

    let mut imported = 0usize;
    let mut failed = 0usize;
    for data in profiles {
        let id = data.id().to_string();
        match engine.save_profile(data).await {
            Ok(_) => imported += 1,
            Err(e) => {
                failed += 1;
                eprintln!("  skipped {id}: {e}");
            }
        }
    }

    let embedded = if skip_embed {
        0
    } else {
        engine.scheduler().flush().await?
    };

    println!("Import complete: {imported} imported, {failed} failed, {embedded} embedded.");
    Ok(())
}
