use anyhow::Result;

use talentmatch::TalentEngine;

/// Display embedding coverage over employee profiles.
pub async fn coverage(engine: &TalentEngine, json: bool) -> Result<()> {
    let report = engine.coverage().await?;
    if json {
        return super::print_json(&report);
    }

    println!("Embedding Coverage");
    println!("{}", "=".repeat(40));
    println!("  Employee profiles:   {}", report.total_profiles);
    println!("  With embedding:      {}", report.with_embedding);
    println!("  Coverage:            {:.1}%", report.percentage);
    if let Some(ref last) = report.last_updated {
        println!("  Last updated:        {last}");
    }
    Ok(())
}
