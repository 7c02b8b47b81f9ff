use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Relative importance of the four signals in a composite score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Weights {
    pub hard_skills: f64,
    pub experience: f64,
    pub career_aspiration: f64,
    pub potential: f64,
}

impl Weights {
    pub fn sum(&self) -> f64 {
        self.hard_skills + self.experience + self.career_aspiration + self.potential
    }
}

/// Hard skills dominate; aspiration barely matters.
pub const TECHNICAL_ROLE: Weights = Weights {
    hard_skills: 0.50,
    experience: 0.25,
    career_aspiration: 0.10,
    potential: 0.15,
};

/// Track record and ambition over raw skill.
pub const MANAGEMENT_ROLE: Weights = Weights {
    hard_skills: 0.20,
    experience: 0.35,
    career_aspiration: 0.30,
    potential: 0.15,
};

/// Growth potential first.
pub const INNOVATIVE_PROJECT: Weights = Weights {
    hard_skills: 0.25,
    experience: 0.20,
    career_aspiration: 0.25,
    potential: 0.30,
};

/// Ranking opportunities for an employee: what they want matters most.
pub const EMPLOYEE_RECOMMENDATIONS: Weights = Weights {
    hard_skills: 0.25,
    experience: 0.20,
    career_aspiration: 0.40,
    potential: 0.15,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeightProfile {
    TechnicalRole,
    ManagementRole,
    InnovativeProject,
    EmployeeRecommendations,
}

impl WeightProfile {
    pub const ALL: [WeightProfile; 4] = [
        Self::TechnicalRole,
        Self::ManagementRole,
        Self::InnovativeProject,
        Self::EmployeeRecommendations,
    ];

    pub fn weights(&self) -> Weights {
        match self {
            Self::TechnicalRole => TECHNICAL_ROLE,
            Self::ManagementRole => MANAGEMENT_ROLE,
            Self::InnovativeProject => INNOVATIVE_PROJECT,
            Self::EmployeeRecommendations => EMPLOYEE_RECOMMENDATIONS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TechnicalRole => "technical-role",
            Self::ManagementRole => "management-role",
            Self::InnovativeProject => "innovative-project",
            Self::EmployeeRecommendations => "employee-recommendations",
        }
    }
}

impl std::fmt::Display for WeightProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WeightProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown weight profile: {s}. Supported: technical-role, management-role, \
                     innovative-project, employee-recommendations"
                )
            })
    }
}

/// Check that every built-in profile sums to 1.0. Run once at startup.
pub fn validate_builtin_profiles() -> Result<(), EngineError> {
    for profile in WeightProfile::ALL {
        let weights = profile.weights();
        let sum = weights.sum();
        let in_range = [
            weights.hard_skills,
            weights.experience,
            weights.career_aspiration,
            weights.potential,
        ]
        .iter()
        .all(|w| (0.0..=1.0).contains(w));
        if (sum - 1.0).abs() > 1e-6 || !in_range {
            return Err(EngineError::InvalidWeights {
                profile: profile.as_str(),
                sum,
            });
        }
    }
    Ok(())
}
