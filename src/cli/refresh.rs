use anyhow::Result;

use talentmatch::sync::RefreshOutcome;
use talentmatch::TalentEngine;

/// Rebuild one profile's embedding immediately.
pub async fn refresh(engine: &TalentEngine, profile_id: &str) -> Result<()> {
    match engine.refresh(profile_id).await? {
        RefreshOutcome::Updated => println!("Embedding for {profile_id} updated."),
        RefreshOutcome::NotFound => println!("Profile {profile_id} not found."),
        RefreshOutcome::EmbeddingUnavailable => {
            anyhow::bail!("embedding service unavailable; {profile_id} is still stale")
        }
    }
    Ok(())
}
