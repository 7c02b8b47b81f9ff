mod helpers;

use std::sync::Arc;

use helpers::{
    employee, engine_on, ids, kafka_team, save_all, test_config, test_engine, using, wants,
    DownProvider, DIMS,
};
use talentmatch::db;
use talentmatch::embedding::hashed::HashEmbeddingProvider;
use talentmatch::extraction::lexicon::LexiconSkillExtractor;
use talentmatch::extraction::SkillExtractor;
use talentmatch::ranking::{Opportunity, OpportunityKind, WeightProfile};
use talentmatch::{EngineError, TalentEngine};

const KAFKA_QUERY: &str = "Senior backend engineer with Kafka experience";

#[tokio::test]
async fn kafka_specialist_ranks_first() {
    let engine = test_engine();
    save_all(&engine, kafka_team()).await;

    let ranked = engine
        .rank_candidates(KAFKA_QUERY, &ids(&["carol", "bob", "alice"]), WeightProfile::TechnicalRole)
        .await
        .unwrap();

    let order: Vec<&str> = ranked.iter().map(|r| r.profile_id.as_str()).collect();
    assert_eq!(order, vec!["alice", "bob", "carol"]);

    // Verified level-5 exact match saturates the hard-skills signal
    assert!((ranked[0].breakdown.hard_skills - 1.0).abs() < 1e-9);
    // RabbitMQ only counts as related evidence
    assert!(ranked[1].breakdown.hard_skills > 0.0);
    assert!(ranked[1].breakdown.hard_skills < 0.5);
    assert_eq!(ranked[2].breakdown.hard_skills, 0.0);
}

#[tokio::test]
async fn scores_stay_in_unit_range_for_every_profile() {
    let engine = test_engine();
    save_all(&engine, kafka_team()).await;
    let candidates = ids(&["alice", "bob", "carol"]);

    for profile in WeightProfile::ALL {
        let ranked = engine
            .rank_candidates(KAFKA_QUERY, &candidates, profile)
            .await
            .unwrap();
        assert_eq!(ranked.len(), 3, "profile {profile}");
        for r in &ranked {
            let b = &r.breakdown;
            for value in [r.composite_score, b.hard_skills, b.experience, b.career_aspiration, b.potential] {
                assert!((0.0..=1.0).contains(&value), "{} {profile}: {value}", r.profile_id);
            }
        }
        assert!(ranked
            .windows(2)
            .all(|w| w[0].composite_score >= w[1].composite_score));
    }
}

#[tokio::test]
async fn unknown_candidates_are_skipped() {
    let engine = test_engine();
    save_all(&engine, kafka_team()).await;

    let ranked = engine
        .rank_candidates(KAFKA_QUERY, &ids(&["ghost", "alice", "nobody"]), WeightProfile::TechnicalRole)
        .await
        .unwrap();
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].profile_id, "alice");

    let none = engine
        .rank_candidates(KAFKA_QUERY, &ids(&["ghost"]), WeightProfile::TechnicalRole)
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn equal_scores_keep_input_order() {
    let engine = test_engine();
    let mut first = employee("twin-a", "Sam Lee", "Data Engineer");
    first.skills = vec![using("Spark", 3, false)];
    let mut second = first.clone();
    second.profile.id = "twin-b".into();
    save_all(&engine, vec![first, second]).await;

    for order in [["twin-b", "twin-a"], ["twin-a", "twin-b"]] {
        let ranked = engine
            .rank_candidates("Spark data pipelines", &ids(&order), WeightProfile::ManagementRole)
            .await
            .unwrap();
        assert_eq!(ranked[0].composite_score, ranked[1].composite_score);
        let got: Vec<&str> = ranked.iter().map(|r| r.profile_id.as_str()).collect();
        assert_eq!(got, order.to_vec());
    }
}

struct BrokenExtractor;

impl SkillExtractor for BrokenExtractor {
    fn extract_skills(&self, _query: &str) -> anyhow::Result<Vec<String>> {
        anyhow::bail!("extraction service timed out")
    }
}

#[tokio::test]
async fn extraction_failure_still_ranks() {
    let engine = TalentEngine::with_components(
        db::open_memory_database(DIMS).unwrap(),
        Arc::new(HashEmbeddingProvider::new(DIMS)),
        Arc::new(BrokenExtractor),
        test_config(),
    )
    .unwrap();
    save_all(&engine, kafka_team()).await;

    let ranked = engine
        .rank_candidates(KAFKA_QUERY, &ids(&["alice", "bob", "carol"]), WeightProfile::InnovativeProject)
        .await
        .unwrap();
    assert_eq!(ranked.len(), 3);
    for r in &ranked {
        assert!((0.0..=1.0).contains(&r.composite_score));
    }
}

#[tokio::test]
async fn embedding_outage_zeroes_text_signals() {
    let mut config = test_config();
    config.ranking.similarity = "embedding".into();
    let engine = TalentEngine::with_components(
        db::open_memory_database(DIMS).unwrap(),
        Arc::new(DownProvider),
        Arc::new(LexiconSkillExtractor::new()),
        config,
    )
    .unwrap();
    save_all(&engine, kafka_team()).await;

    let ranked = engine
        .rank_candidates(KAFKA_QUERY, &ids(&["alice", "bob"]), WeightProfile::TechnicalRole)
        .await
        .unwrap();
    assert_eq!(ranked.len(), 2);
    for r in &ranked {
        assert_eq!(r.breakdown.experience, 0.0, "{}", r.profile_id);
        assert_eq!(r.breakdown.career_aspiration, 0.0, "{}", r.profile_id);
        assert!(r.breakdown.potential >= 0.5, "{}", r.profile_id);
    }
    // Skill evidence does not need the embedding service
    assert_eq!(ranked[0].profile_id, "alice");
}

#[tokio::test]
async fn ranking_schedules_refresh_for_stale_candidates() {
    let engine = test_engine();
    save_all(&engine, kafka_team()).await;
    engine.scheduler().flush().await.unwrap();

    // Every embedding is current: ranking leaves the scheduler idle
    engine
        .rank_candidates(KAFKA_QUERY, &ids(&["alice", "bob"]), WeightProfile::TechnicalRole)
        .await
        .unwrap();
    assert_eq!(engine.scheduler().pending(), 0);

    // Written behind the engine's back, so no embedding exists yet
    let mut dave = employee("dave", "Dave Kim", "Backend Engineer");
    dave.skills = vec![using("Kafka", 3, false)];
    {
        let db = engine.db();
        let mut conn = db.lock().unwrap();
        talentmatch::profile::store::upsert_profile(&mut conn, &dave).unwrap();
    }
    engine
        .rank_candidates(KAFKA_QUERY, &ids(&["alice", "dave"]), WeightProfile::TechnicalRole)
        .await
        .unwrap();
    assert_eq!(engine.scheduler().pending(), 1);
}

#[tokio::test]
async fn ranking_without_refresh_on_rank_never_schedules() {
    let mut config = test_config();
    config.sync.refresh_on_rank = false;
    let engine = engine_on(db::open_memory_database(DIMS).unwrap(), config);
    {
        let db = engine.db();
        let mut conn = db.lock().unwrap();
        for data in kafka_team() {
            talentmatch::profile::store::upsert_profile(&mut conn, &data).unwrap();
        }
    }
    engine
        .rank_candidates(KAFKA_QUERY, &ids(&["alice", "bob", "carol"]), WeightProfile::TechnicalRole)
        .await
        .unwrap();
    assert_eq!(engine.scheduler().pending(), 0);
}

#[tokio::test]
async fn opportunities_follow_learning_goals() {
    let engine = test_engine();
    let mut erin = employee("erin", "Erin Wu", "Platform Engineer");
    erin.skills = vec![using("Docker", 4, true), wants("Kubernetes")];
    erin.goals = vec![helpers::goal("Kubernetes platform lead", 5)];
    engine.save_profile(erin).await.unwrap();

    let opportunities: Vec<Opportunity> = serde_json::from_str(
        r#"[
            {"type": "course", "id": "c-paint", "title": "Watercolor painting",
             "description": "Brushes, paper and pigments"},
            {"type": "course", "id": "c-k8s", "title": "Kubernetes fundamentals",
             "description": "Pods, deployments and services on Kubernetes",
             "target_skills": ["Kubernetes"], "level": "middle"},
            {"type": "job_opening", "id": "j-platform", "title": "Platform engineer",
             "description": "Run our container platform",
             "requirements": "Docker and Kubernetes in production", "level": "senior"}
        ]"#,
    )
    .unwrap();

    let ranked = engine.rank_opportunities("erin", &opportunities).await.unwrap();
    assert_eq!(ranked.len(), 3);
    assert_eq!(ranked.last().unwrap().opportunity_id, "c-paint");

    let k8s = ranked.iter().find(|r| r.opportunity_id == "c-k8s").unwrap();
    assert_eq!(k8s.kind, OpportunityKind::Course);
    assert!(!k8s.reasoning.is_empty());

    for r in &ranked {
        assert!((0.0..=1.0).contains(&r.relevance_score), "{}", r.opportunity_id);
    }
    assert!(ranked
        .windows(2)
        .all(|w| w[0].relevance_score >= w[1].relevance_score));
}

#[tokio::test]
async fn opportunities_for_unknown_employee() {
    let engine = test_engine();
    let err = engine.rank_opportunities("ghost", &[]).await.unwrap_err();
    assert!(matches!(err, EngineError::ProfileNotFound(_)));
}
