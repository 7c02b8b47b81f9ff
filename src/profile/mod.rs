//! Profile records read from the collaborator tables and their text projection.

pub mod document;
pub mod load;
pub mod store;
pub mod types;

pub use document::{build_document, render_document};
pub use load::{fetch_profile, fetch_profiles};
pub use types::{
    CareerGoal, Profile, ProfileData, ProjectParticipation, SkillAssertion, SkillStatus,
};
