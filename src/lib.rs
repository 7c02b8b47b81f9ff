//! Talent matching: profile embeddings, semantic search, and weighted
//! multi-signal ranking of candidates and opportunities.
//!
//! A profile (skills, projects, career goals, seniority) is rendered into a
//! canonical text document, embedded through an external model, and stored
//! next to the relational data in SQLite. On top of that store the crate
//! offers two request paths:
//!
//! | Request | Entry point | Result |
//! |---------|-------------|--------|
//! | Semantic search | [`engine::TalentEngine::search`] | profiles above a similarity threshold |
//! | Candidate ranking | [`engine::TalentEngine::rank_candidates`] | composite score + breakdown per candidate |
//! | Opportunity ranking | [`engine::TalentEngine::rank_opportunities`] | relevance + reasoning per opportunity |
//!
//! # Architecture
//!
//! - **Storage**: SQLite with [sqlite-vec](https://github.com/asg017/sqlite-vec)
//!   for k-nearest-neighbour retrieval
//! - **Embeddings**: OpenAI-compatible HTTP API, or a deterministic
//!   feature-hashing embedder for offline use
//! - **Skill extraction**: chat-completion prompt, or a curated vocabulary
//! - **Sync**: debounced re-embedding after profile writes plus batch backfill
//!
//! # Modules
//!
//! - [`config`]: configuration from TOML files and environment variables
//! - [`db`]: SQLite initialization, schema and migrations
//! - [`embedding`]: embedding providers and vector helpers
//! - [`extraction`]: required-skill extraction from free text
//! - [`profile`]: profile records and their document projection
//! - [`sync`]: embedding freshness, backfill and the refresh scheduler
//! - [`search`]: vector retrieval
//! - [`ranking`]: signals, weights and the two rankers
//! - [`engine`]: the async facade over all of the above

pub mod config;
pub mod db;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod extraction;
pub mod profile;
pub mod ranking;
pub mod search;
pub mod skills;
pub mod sync;

pub use engine::TalentEngine;
pub use error::{EngineError, EngineResult};
