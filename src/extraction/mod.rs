//! Text-understanding boundary: extract required skill names from a request.
//!
//! [`SkillExtractor`] has two implementations selected by
//! `[extraction].provider`: an LLM chat-completion client ([`chat`]) and an
//! offline vocabulary matcher ([`lexicon`]).

pub mod chat;
pub mod lexicon;

use anyhow::Result;

use crate::config::ExtractionConfig;

/// Extract concrete technical skill names from free text.
///
/// Synchronous like [`crate::embedding::EmbeddingProvider`]; async callers
/// use `spawn_blocking`. An empty list is a valid answer.
pub trait SkillExtractor: Send + Sync {
    fn extract_skills(&self, query: &str) -> Result<Vec<String>>;
}

pub fn create_extractor(config: &ExtractionConfig) -> Result<Box<dyn SkillExtractor>> {
    match config.provider.as_str() {
        "chat" => Ok(Box::new(chat::ChatSkillExtractor::from_config(config)?)),
        "lexicon" => Ok(Box::new(lexicon::LexiconSkillExtractor::new())),
        other => anyhow::bail!("unknown extraction provider: {other}. Supported: chat, lexicon"),
    }
}

/// Parse a comma-separated model reply into distinct skill names.
///
/// Accepts newline or comma separators, strips list bullets, quotes and
/// trailing punctuation, and treats "none" as an empty answer.
pub fn parse_skill_list(reply: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    reply
        .split(|c: char| matches!(c, ',' | '\n' | ';'))
        .map(|s| {
            s.trim()
                .trim_start_matches(|c: char| matches!(c, '-' | '*' | '•'))
                .trim()
                .trim_matches(|c: char| matches!(c, '"' | '\'' | '`'))
                .trim_end_matches('.')
                .trim()
        })
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("none"))
        .filter(|s| seen.insert(s.to_lowercase()))
        .map(str::to_string)
        .collect()
}
