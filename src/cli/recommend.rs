use anyhow::{Context, Result};
use std::path::Path;

use talentmatch::ranking::Opportunity;
use talentmatch::TalentEngine;

/// Rank opportunities from a JSON file for one employee.
pub async fn recommend(engine: &TalentEngine, profile_id: &str, file: &Path, json: bool) -> Result<()> {
    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read opportunities file: {}", file.display()))?;
    let opportunities: Vec<Opportunity> =
        serde_json::from_str(&contents).context("failed to parse opportunities JSON")?;

    let ranked = engine.rank_opportunities(profile_id, &opportunities).await?;

    if json {
        return super::print_json(&ranked);
    }
    if ranked.is_empty() {
        println!("No opportunities to rank.");
        return Ok(());
    }

    println!("Opportunities for {profile_id}\n");
    for (i, r) in ranked.iter().enumerate() {
        println!(
            "  {}. [{:?}] {} relevance {:.3}",
            i + 1,
            r.kind,
            r.opportunity_id,
            r.relevance_score
        );
        println!("     {}", r.reasoning);
    }
    Ok(())
}
