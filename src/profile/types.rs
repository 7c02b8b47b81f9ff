//! Profile record definitions as exposed by the profile collaborators.
//!
//! [`ProfileData`] bundles a [`Profile`] with its [`SkillAssertion`]s,
//! [`ProjectParticipation`]s and [`CareerGoal`]s. It is also the JSON import
//! format.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Whether an employee currently uses a skill or wants to learn it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillStatus {
    Using,
    WantToLearn,
}

impl SkillStatus {
    /// SQL-compatible string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Using => "using",
            Self::WantToLearn => "want_to_learn",
        }
    }
}

impl std::fmt::Display for SkillStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SkillStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "using" => Ok(Self::Using),
            "want_to_learn" => Ok(Self::WantToLearn),
            _ => Err(format!("unknown skill status: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillAssertion {
    pub name: String,
    /// 1 (beginner) to 5 (expert).
    pub level: u8,
    #[serde(default)]
    pub verified: bool,
    pub status: SkillStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectParticipation {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub achievements: Option<String>,
    pub start_date: NaiveDate,
    /// `None` while the project is ongoing.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl ProjectParticipation {
    /// Non-blank achievements text, if any.
    pub fn achievements_text(&self) -> Option<&str> {
        self.achievements
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerGoal {
    pub goal_type: String,
    pub target: String,
    /// 1 (low) to 5 (top priority).
    pub priority: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub display_name: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    /// Seniority 1 (newcomer) to 6 (principal).
    #[serde(default)]
    pub level: Option<u8>,
    /// 0 to 100.
    #[serde(default)]
    pub profile_strength: u8,
    #[serde(default)]
    pub lifetime_earned: i64,
    #[serde(default)]
    pub enrolled_courses: u32,
    #[serde(default)]
    pub mentoring_sessions: u32,
    /// RFC 3339 last-modified timestamp; assigned by the write path.
    #[serde(default)]
    pub updated_at: String,
}

fn default_role() -> String {
    "employee".into()
}

/// A profile together with everything the scoring pipeline reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileData {
    #[serde(flatten)]
    pub profile: Profile,
    #[serde(default)]
    pub skills: Vec<SkillAssertion>,
    #[serde(default)]
    pub projects: Vec<ProjectParticipation>,
    #[serde(default)]
    pub goals: Vec<CareerGoal>,
}

impl ProfileData {
    pub fn id(&self) -> &str {
        &self.profile.id
    }

    pub fn using_skills(&self) -> impl Iterator<Item = &SkillAssertion> {
        self.skills.iter().filter(|s| s.status == SkillStatus::Using)
    }

    pub fn wanted_skills(&self) -> impl Iterator<Item = &SkillAssertion> {
        self.skills
            .iter()
            .filter(|s| s.status == SkillStatus::WantToLearn)
    }

    /// Enrolled courses plus mentoring participations.
    pub fn learning_activity(&self) -> u32 {
        self.profile.enrolled_courses + self.profile.mentoring_sessions
    }
}

/// Textual label for the six-step seniority scale.
pub fn level_label(level: Option<u8>) -> &'static str {
    match level {
        Some(1) => "Newcomer",
        Some(2) => "Junior",
        Some(3) => "Middle",
        Some(4) => "Senior",
        Some(5) => "Lead",
        Some(6) => "Principal",
        _ => "Unknown",
    }
}

/// Textual label for a 1 to 5 skill level.
pub fn skill_level_label(level: u8) -> &'static str {
    match level {
        0 | 1 => "Beginner",
        2 => "Elementary",
        3 => "Intermediate",
        4 => "Advanced",
        _ => "Expert",
    }
}
