//! Composite candidate scoring for a single staffing request.

use chrono::NaiveDate;
use serde::Serialize;

use super::signals::{aspiration_score, experience_score, hard_skills_score, potential_score};
use super::similarity::Similarity;
use super::weights::Weights;
use crate::profile::types::ProfileData;

/// Potential assumed when it cannot be computed.
pub const DEFAULT_POTENTIAL: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub hard_skills: f64,
    pub experience: f64,
    pub career_aspiration: f64,
    pub potential: f64,
}

impl ScoreBreakdown {
    /// Scores given to a candidate whose evaluation failed outright.
    pub fn fallback() -> Self {
        Self {
            hard_skills: 0.0,
            experience: 0.0,
            career_aspiration: 0.0,
            potential: DEFAULT_POTENTIAL,
        }
    }

    pub fn composite(&self, weights: &Weights) -> f64 {
        weights.hard_skills * self.hard_skills
            + weights.experience * self.experience
            + weights.career_aspiration * self.career_aspiration
            + weights.potential * self.potential
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate {
    pub profile_id: String,
    pub composite_score: f64,
    pub breakdown: ScoreBreakdown,
}

/// Everything about the request that is shared by all candidates.
pub struct RankingContext {
    pub query: String,
    /// Required skills extracted from the query; `None` if extraction failed.
    pub required_skills: Option<Vec<String>>,
    pub similarity: Similarity,
    pub weights: Weights,
    pub today: NaiveDate,
}

impl RankingContext {
    pub fn required(&self) -> &[String] {
        self.required_skills.as_deref().unwrap_or(&[])
    }
}

/// Compute all four sub-scores. A failing similarity-backed score falls
/// back to 0 on its own; the other scores are unaffected.
pub fn score_candidate(ctx: &RankingContext, candidate: &ProfileData) -> ScoreBreakdown {
    let hard_skills = hard_skills_score(candidate, ctx.required());

    let experience = experience_score(&ctx.similarity, &ctx.query, candidate, ctx.today)
        .unwrap_or_else(|e| {
            tracing::warn!(profile_id = %candidate.id(), error = %e, "experience score unavailable");
            0.0
        });

    let career_aspiration = aspiration_score(&ctx.similarity, &ctx.query, candidate)
        .unwrap_or_else(|e| {
            tracing::warn!(profile_id = %candidate.id(), error = %e, "aspiration score unavailable");
            0.0
        });

    let potential = potential_score(candidate, ctx.required_skills.as_deref());

    ScoreBreakdown {
        hard_skills,
        experience,
        career_aspiration,
        potential,
    }
}

pub fn rank_candidate(ctx: &RankingContext, candidate: &ProfileData) -> RankedCandidate {
    let breakdown = score_candidate(ctx, candidate);
    RankedCandidate {
        profile_id: candidate.id().to_string(),
        composite_score: breakdown.composite(&ctx.weights),
        breakdown,
    }
}

/// Best first. The sort is stable, so equal scores keep input order.
pub fn sort_ranked(ranked: &mut [RankedCandidate]) {
    ranked.sort_by(|a, b| b.composite_score.total_cmp(&a.composite_score));
}
