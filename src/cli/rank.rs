use anyhow::Result;

use talentmatch::ranking::WeightProfile;
use talentmatch::TalentEngine;

/// Rank the given candidates for a staffing request.
pub async fn rank(
    engine: &TalentEngine,
    query: &str,
    candidates: &[String],
    profile: WeightProfile,
    json: bool,
) -> Result<()> {
    let ranked = engine.rank_candidates(query, candidates, profile).await?;

    if json {
        return super::print_json(&ranked);
    }
    if ranked.is_empty() {
        println!("No known candidates to rank.");
        return Ok(());
    }

    println!("Ranking with profile '{profile}'\n");
    println!(
        "  {:<4} {:<24} {:>7} {:>7} {:>7} {:>7} {:>7}",
        "#", "candidate", "score", "skills", "exp", "asp", "pot"
    );
    for (i, r) in ranked.iter().enumerate() {
        let b = &r.breakdown;
        println!(
            "  {:<4} {:<24} {:>7.3} {:>7.2} {:>7.2} {:>7.2} {:>7.2}",
            i + 1,
            super::preview(&r.profile_id, 24),
            r.composite_score,
            b.hard_skills,
            b.experience,
            b.career_aspiration,
            b.potential
        );
    }
    Ok(())
}
