#![allow(dead_code)]

use chrono::NaiveDate;
use rusqlite::Connection;
use std::sync::Arc;

use talentmatch::config::TalentConfig;
use talentmatch::db;
use talentmatch::embedding::hashed::HashEmbeddingProvider;
use talentmatch::embedding::EmbeddingProvider;
use talentmatch::extraction::lexicon::LexiconSkillExtractor;
use talentmatch::profile::types::{
    CareerGoal, Profile, ProfileData, ProjectParticipation, SkillAssertion, SkillStatus,
};
use talentmatch::TalentEngine;

pub const DIMS: usize = 256;

/// Offline config: hash embeddings, lexicon extraction, and a settle delay
/// long enough that scheduled refreshes never fire on their own mid-test.
pub fn test_config() -> TalentConfig {
    let mut config = TalentConfig::default();
    config.embedding.provider = "hash".into();
    config.embedding.dimensions = DIMS;
    config.extraction.provider = "lexicon".into();
    config.sync.debounce_secs = 60;
    config.sync.backfill_delay_ms = 0;
    config
}

/// Engine over a fresh in-memory database.
pub fn test_engine() -> TalentEngine {
    engine_on(db::open_memory_database(DIMS).unwrap(), test_config())
}

pub fn engine_on(conn: Connection, config: TalentConfig) -> TalentEngine {
    TalentEngine::with_components(
        conn,
        Arc::new(HashEmbeddingProvider::new(DIMS)),
        Arc::new(LexiconSkillExtractor::new()),
        config,
    )
    .unwrap()
}

/// Embedding service that is always down.
pub struct DownProvider;

impl EmbeddingProvider for DownProvider {
    fn embed(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
        anyhow::bail!("connection refused")
    }
    fn dimensions(&self) -> usize {
        DIMS
    }
    fn model(&self) -> &str {
        "feature-hash-v1"
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Bare employee profile; callers fill in skills, projects and goals.
pub fn employee(id: &str, name: &str, title: &str) -> ProfileData {
    ProfileData {
        profile: Profile {
            id: id.into(),
            display_name: name.into(),
            role: "employee".into(),
            job_title: Some(title.into()),
            department: Some("Engineering".into()),
            level: Some(3),
            profile_strength: 60,
            lifetime_earned: 200,
            enrolled_courses: 2,
            mentoring_sessions: 1,
            updated_at: String::new(),
        },
        skills: Vec::new(),
        projects: Vec::new(),
        goals: Vec::new(),
    }
}

pub fn using(name: &str, level: u8, verified: bool) -> SkillAssertion {
    SkillAssertion {
        name: name.into(),
        level,
        verified,
        status: SkillStatus::Using,
    }
}

pub fn wants(name: &str) -> SkillAssertion {
    SkillAssertion {
        name: name.into(),
        level: 1,
        verified: false,
        status: SkillStatus::WantToLearn,
    }
}

pub fn project(name: &str, role: &str, achievements: &str, end: Option<NaiveDate>) -> ProjectParticipation {
    ProjectParticipation {
        name: name.into(),
        role: role.into(),
        achievements: Some(achievements.into()),
        start_date: date(2022, 1, 10),
        end_date: end,
    }
}

pub fn goal(target: &str, priority: u8) -> CareerGoal {
    CareerGoal {
        goal_type: "role".into(),
        target: target.into(),
        priority,
    }
}

/// Streaming specialist, a message-queue generalist and a frontend
/// developer: a clear best, middle and worst fit for Kafka work.
pub fn kafka_team() -> Vec<ProfileData> {
    let mut alice = employee("alice", "Alice Park", "Senior Backend Engineer");
    alice.skills = vec![using("Kafka", 5, true), using("Java", 4, false)];
    alice.projects = vec![project(
        "Event streaming platform",
        "Backend engineer",
        "Built Kafka pipelines for order events",
        None,
    )];
    alice.goals = vec![goal("Staff backend engineer", 4)];

    let mut bob = employee("bob", "Bob Stone", "Backend Engineer");
    bob.skills = vec![using("RabbitMQ", 4, false), using("Python", 3, false)];
    bob.projects = vec![project(
        "Order queue",
        "Backend engineer",
        "Moved billing jobs onto a message queue",
        None,
    )];
    bob.goals = vec![goal("Senior backend engineer", 3)];

    let mut carol = employee("carol", "Carol Diaz", "Frontend Developer");
    carol.skills = vec![using("React", 5, true), using("TypeScript", 4, false)];
    carol.projects = vec![project(
        "Design system",
        "Frontend developer",
        "Shipped the component library",
        None,
    )];
    carol.goals = vec![goal("Design lead", 3)];

    vec![alice, bob, carol]
}

pub async fn save_all(engine: &TalentEngine, profiles: Vec<ProfileData>) {
    for data in profiles {
        engine.save_profile(data).await.unwrap();
    }
}

pub fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
