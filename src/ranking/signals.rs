//! The four independent sub-scores, each in [0, 1].
//!
//! Missing data scores 0 rather than failing. Only the text-similarity
//! primitive can return an error (embedding mode); callers decide the
//! fallback.

use anyhow::Result;
use chrono::NaiveDate;

use super::similarity::Similarity;
use crate::profile::types::ProfileData;
use crate::skills::{skills_match, skills_related};

/// Share of a skill's credit earned when the candidate only knows a
/// related technology.
const RELATED_SKILL_CREDIT: f64 = 0.4;
const VERIFIED_BONUS: f64 = 0.2;
/// Floor for projects that ended long ago.
const MIN_RECENCY: f64 = 0.3;
const MIN_LEVEL_MATCH: f64 = 0.3;

/// Coverage of the required skills by the candidate's current skills.
///
/// A direct match earns `level/5` plus a bonus for peer verification; a
/// related technology earns a fraction of `level/5`. Each requirement takes
/// the best contribution among the candidate's skills.
pub fn hard_skills_score(candidate: &ProfileData, required: &[String]) -> f64 {
    if required.is_empty() {
        return 0.0;
    }

    let total: f64 = required
        .iter()
        .map(|req| {
            candidate
                .using_skills()
                .map(|skill| {
                    let level = f64::from(skill.level.clamp(1, 5)) / 5.0;
                    if skills_match(&skill.name, req) {
                        let bonus = if skill.verified { VERIFIED_BONUS } else { 0.0 };
                        (level + bonus).min(1.0)
                    } else if skills_related(&skill.name, req) {
                        RELATED_SKILL_CREDIT * level
                    } else {
                        0.0
                    }
                })
                .fold(0.0, f64::max)
        })
        .sum();

    (total / required.len() as f64).clamp(0.0, 1.0)
}

/// 1.0 for an ongoing project, decaying linearly over a year after it
/// ended, never below 0.3. An end date in the future counts as ongoing.
pub fn recency_factor(end_date: Option<NaiveDate>, today: NaiveDate) -> f64 {
    match end_date {
        None => 1.0,
        Some(end) => {
            let days = (today - end).num_days().max(0) as f64;
            (1.0 - days / 365.0).max(MIN_RECENCY)
        }
    }
}

/// Relevance of the candidate's documented project work to the query,
/// weighted by how recent it is. Projects without achievements carry no
/// evidence and are ignored.
pub fn experience_score(
    similarity: &Similarity,
    query: &str,
    candidate: &ProfileData,
    today: NaiveDate,
) -> Result<f64> {
    let mut total = 0.0;
    for project in &candidate.projects {
        let Some(achievements) = project.achievements_text() else {
            continue;
        };
        let text = format!("{}. {}. {}", project.name, project.role, achievements);
        total += similarity.score(query, &text)? * recency_factor(project.end_date, today);
    }
    Ok(total.min(1.0))
}

/// How well the candidate's stated goals line up with the query, weighted
/// by goal priority.
pub fn aspiration_score(similarity: &Similarity, query: &str, candidate: &ProfileData) -> Result<f64> {
    let mut total = 0.0;
    for goal in &candidate.goals {
        let text = format!("{}: {}", goal.goal_type, goal.target);
        total += similarity.score(query, &text)? * f64::from(goal.priority.clamp(1, 5)) / 5.0;
    }
    Ok(total.min(1.0))
}

/// Baseline plus learning activity and accumulated reward.
pub fn learning_momentum(candidate: &ProfileData) -> f64 {
    let learning = (f64::from(candidate.learning_activity()) / 10.0).min(1.0);
    let earned = (candidate.profile.lifetime_earned.max(0) as f64 / 1000.0).min(1.0);
    (0.5 + 0.3 * learning + 0.2 * earned).min(1.0)
}

/// Fraction of required skills the candidate does not have at all, in any
/// status. `None` means the requirements could not be determined, which
/// counts as a full gap.
pub fn skill_gap(candidate: &ProfileData, required: Option<&[String]>) -> f64 {
    let Some(required) = required else {
        return 1.0;
    };
    if required.is_empty() {
        return 0.0;
    }
    let missing = required
        .iter()
        .filter(|req| !candidate.skills.iter().any(|s| skills_match(&s.name, req)))
        .count();
    missing as f64 / required.len() as f64
}

pub fn potential_score(candidate: &ProfileData, required: Option<&[String]>) -> f64 {
    let gap = skill_gap(candidate, required);
    (learning_momentum(candidate) + 0.3 * (1.0 - gap)).min(1.0)
}

/// Numeric seniority a requirement label asks for. Unknown labels and
/// "all" ask for nothing.
pub fn required_level(label: &str) -> u8 {
    match label.trim().to_lowercase().as_str() {
        "junior" => 2,
        "middle" => 3,
        "senior" => 5,
        "expert" => 6,
        _ => 1,
    }
}

/// 1.0 when the employee meets the requirement, otherwise their share of
/// it with a floor of 0.3. No requirement always matches.
pub fn level_match(employee_level: Option<u8>, requirement: Option<&str>) -> f64 {
    let Some(label) = requirement else {
        return 1.0;
    };
    let required = required_level(label);
    let level = employee_level.unwrap_or(1);
    if level >= required {
        1.0
    } else {
        (f64::from(level) / f64::from(required)).max(MIN_LEVEL_MATCH)
    }
}
