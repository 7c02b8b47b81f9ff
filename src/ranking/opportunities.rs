//! Relevance of courses, projects, job openings and mentoring offers for one
//! employee, with a short human-readable reason.

use serde::{Deserialize, Serialize};

use super::candidates::ScoreBreakdown;
use super::signals::{learning_momentum, level_match};
use super::similarity::Similarity;
use super::weights::{Weights, EMPLOYEE_RECOMMENDATIONS};
use crate::profile::types::ProfileData;
use crate::skills::{contains_sequence, skill_tokens, skills_match};

/// Below this the reasoning is a flat "low match".
const LOW_MATCH: f64 = 0.3;
const MAX_REASONS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Opportunity {
    Course {
        id: String,
        title: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        target_skills: Vec<String>,
        #[serde(default)]
        level: Option<String>,
    },
    Mentoring {
        id: String,
        title: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        target_skills: Vec<String>,
        #[serde(default)]
        level: Option<String>,
    },
    Project {
        id: String,
        title: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        level: Option<String>,
    },
    JobOpening {
        id: String,
        title: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        requirements: String,
        #[serde(default)]
        level: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityKind {
    Course,
    Mentoring,
    Project,
    JobOpening,
}

impl Opportunity {
    pub fn id(&self) -> &str {
        match self {
            Self::Course { id, .. }
            | Self::Mentoring { id, .. }
            | Self::Project { id, .. }
            | Self::JobOpening { id, .. } => id,
        }
    }

    pub fn kind(&self) -> OpportunityKind {
        match self {
            Self::Course { .. } => OpportunityKind::Course,
            Self::Mentoring { .. } => OpportunityKind::Mentoring,
            Self::Project { .. } => OpportunityKind::Project,
            Self::JobOpening { .. } => OpportunityKind::JobOpening,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedOpportunity {
    pub opportunity_id: String,
    #[serde(rename = "type")]
    pub kind: OpportunityKind,
    pub relevance_score: f64,
    pub breakdown: ScoreBreakdown,
    pub reasoning: String,
}

/// Score every opportunity for `employee`, best first (stable on ties).
pub fn rank_opportunities(
    employee: &ProfileData,
    opportunities: &[Opportunity],
    similarity: &Similarity,
) -> Vec<RankedOpportunity> {
    let weights = EMPLOYEE_RECOMMENDATIONS;
    let mut ranked: Vec<RankedOpportunity> = opportunities
        .iter()
        .map(|o| score_opportunity(employee, o, similarity, &weights))
        .collect();
    ranked.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
    ranked
}

fn score_opportunity(
    employee: &ProfileData,
    opportunity: &Opportunity,
    similarity: &Similarity,
    weights: &Weights,
) -> RankedOpportunity {
    let goals = goal_targets(employee);
    let momentum = learning_momentum(employee);

    let (breakdown, skill_reason) = match opportunity {
        Opportunity::Course {
            title,
            description,
            target_skills,
            level,
            ..
        }
        | Opportunity::Mentoring {
            title,
            description,
            target_skills,
            level,
            ..
        } => {
            let developed = wanted_matches(employee, target_skills);
            let hard = if target_skills.is_empty() {
                0.0
            } else {
                developed.len() as f64 / target_skills.len() as f64
            };
            let text = format!("{title} {description}");
            let breakdown = ScoreBreakdown {
                hard_skills: hard,
                experience: level_match(employee.profile.level, level.as_deref()),
                career_aspiration: safe_score(similarity, &text, &goals),
                potential: momentum,
            };
            let reason = (!developed.is_empty())
                .then(|| format!("Develops skills: {}", developed.join(", ")));
            (breakdown, reason)
        }
        Opportunity::Project {
            description, level, ..
        } => {
            let breakdown = ScoreBreakdown {
                hard_skills: safe_score(similarity, description, &skill_names(employee)),
                experience: level_match(employee.profile.level, level.as_deref()),
                career_aspiration: safe_score(similarity, description, &goals),
                potential: momentum,
            };
            (breakdown, uses_skills_reason(employee, description))
        }
        Opportunity::JobOpening {
            title,
            description,
            requirements,
            level,
            ..
        } => {
            let text = format!("{title} {description}");
            let breakdown = ScoreBreakdown {
                hard_skills: safe_score(similarity, requirements, &skill_names(employee)),
                experience: level_match(employee.profile.level, level.as_deref()),
                career_aspiration: safe_score(similarity, &text, &goals),
                potential: momentum,
            };
            (breakdown, uses_skills_reason(employee, requirements))
        }
    };

    let relevance = breakdown.composite(weights).clamp(0.0, 1.0);

    RankedOpportunity {
        opportunity_id: opportunity.id().to_string(),
        kind: opportunity.kind(),
        relevance_score: relevance,
        breakdown,
        reasoning: reasoning(relevance, &breakdown, weights, skill_reason),
    }
}

/// Up to two strongest contributing factors, strongest first.
fn reasoning(
    relevance: f64,
    breakdown: &ScoreBreakdown,
    weights: &Weights,
    skill_reason: Option<String>,
) -> String {
    if relevance < LOW_MATCH {
        return "Low match with your profile".to_string();
    }

    let mut factors: Vec<(f64, String)> = Vec::new();
    if let Some(reason) = skill_reason {
        factors.push((weights.hard_skills * breakdown.hard_skills, reason));
    }
    if breakdown.career_aspiration > 0.0 {
        factors.push((
            weights.career_aspiration * breakdown.career_aspiration,
            "Matches career plan".to_string(),
        ));
    }
    if breakdown.experience >= 1.0 {
        factors.push((
            weights.experience * breakdown.experience,
            "Fits your level".to_string(),
        ));
    }
    if breakdown.potential > 0.5 {
        factors.push((
            weights.potential * breakdown.potential,
            "Builds on your learning activity".to_string(),
        ));
    }

    factors.sort_by(|a, b| b.0.total_cmp(&a.0));
    let reasons: Vec<String> = factors
        .into_iter()
        .take(MAX_REASONS)
        .map(|(_, r)| r)
        .collect();

    if reasons.is_empty() {
        "Matches your profile".to_string()
    } else {
        reasons.join("; ")
    }
}

fn safe_score(similarity: &Similarity, a: &str, b: &str) -> f64 {
    similarity.score(a, b).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "opportunity similarity unavailable");
        0.0
    })
}

fn goal_targets(employee: &ProfileData) -> String {
    employee
        .goals
        .iter()
        .map(|g| g.target.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn skill_names(employee: &ProfileData) -> String {
    employee
        .using_skills()
        .map(|s| s.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Target skills the employee has said they want to learn.
fn wanted_matches(employee: &ProfileData, targets: &[String]) -> Vec<String> {
    targets
        .iter()
        .filter(|t| employee.wanted_skills().any(|w| skills_match(&w.name, t)))
        .cloned()
        .collect()
}

/// "Uses your skills: X" for current skills mentioned in `text`.
fn uses_skills_reason(employee: &ProfileData, text: &str) -> Option<String> {
    let tokens = skill_tokens(text);
    let used: Vec<&str> = employee
        .using_skills()
        .filter(|s| contains_sequence(&tokens, &skill_tokens(&s.name)))
        .map(|s| s.name.as_str())
        .take(MAX_REASONS)
        .collect();
    (!used.is_empty()).then(|| format!("Uses your skills: {}", used.join(", ")))
}
