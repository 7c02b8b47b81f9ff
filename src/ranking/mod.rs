//! Weighted multi-signal ranking of candidates and opportunities.
//!
//! Four signals (hard skills, experience, career aspiration, potential) are
//! computed independently in [`signals`] and combined with a
//! [`weights::WeightProfile`]. Request orchestration (extraction, hydration,
//! concurrency) lives in [`crate::engine`].

pub mod candidates;
pub mod opportunities;
pub mod signals;
pub mod similarity;
pub mod weights;

pub use candidates::{RankedCandidate, ScoreBreakdown};
pub use opportunities::{Opportunity, OpportunityKind, RankedOpportunity};
pub use similarity::{Similarity, SimilarityMode};
pub use weights::{WeightProfile, Weights};
