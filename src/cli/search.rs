use anyhow::Result;

use talentmatch::search::SearchOptions;
use talentmatch::TalentEngine;

/// Run a semantic profile search from the terminal.
pub async fn search(
    engine: &TalentEngine,
    query: &str,
    threshold: Option<f64>,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let options = SearchOptions {
        threshold: threshold.unwrap_or(engine.config().search.default_threshold),
        limit: limit.unwrap_or(engine.config().search.default_limit),
    };
    let hits = engine.search(query, Some(options)).await?;

    if json {
        return super::print_json(&hits);
    }
    if hits.is_empty() {
        println!("No matching profiles.");
        return Ok(());
    }

    println!("Found {} profile(s)\n", hits.len());
    for (i, hit) in hits.iter().enumerate() {
        let profile = &hit.profile.profile;
        println!(
            "  {}. {} ({}) similarity {:.3}",
            i + 1,
            profile.display_name,
            hit.profile_id,
            hit.similarity
        );
        if let Some(title) = &profile.job_title {
            println!("     {title}");
        }
    }
    Ok(())
}
