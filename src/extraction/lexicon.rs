//! Offline skill extraction against the curated vocabulary in [`crate::skills`].

use anyhow::Result;

use super::SkillExtractor;
use crate::skills::{
    contains_sequence, skill_tokens, EXTRA_SKILLS, QUALIFIED_SKILLS, RELATED_CLUSTERS,
};

pub struct LexiconSkillExtractor {
    /// (display name, tokens), longest phrases first so "machine learning"
    /// wins over a shorter overlapping entry. Qualified entries map
    /// "golang" back to "go".
    vocabulary: Vec<(String, Vec<String>)>,
}

impl LexiconSkillExtractor {
    pub fn new() -> Self {
        let mut names: Vec<&str> = RELATED_CLUSTERS
            .iter()
            .flat_map(|cluster| cluster.iter().copied())
            .chain(EXTRA_SKILLS.iter().copied())
            .filter(|name| !QUALIFIED_SKILLS.iter().any(|(bare, _)| bare == name))
            .collect();
        names.sort_unstable();
        names.dedup();

        let mut vocabulary: Vec<(String, Vec<String>)> = names
            .into_iter()
            .map(|name| (name.to_string(), skill_tokens(name)))
            .chain(
                QUALIFIED_SKILLS
                    .iter()
                    .map(|(bare, phrase)| (bare.to_string(), skill_tokens(phrase))),
            )
            .filter(|(_, tokens)| !tokens.is_empty())
            .collect();
        vocabulary.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(&b.0)));

        Self { vocabulary }
    }
}

impl Default for LexiconSkillExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SkillExtractor for LexiconSkillExtractor {
    fn extract_skills(&self, query: &str) -> Result<Vec<String>> {
        let tokens = skill_tokens(query);
        let mut found: Vec<(usize, String)> = Vec::new();

        for (name, skill) in &self.vocabulary {
            if !contains_sequence(&tokens, skill) {
                continue;
            }
            // Skip single-token entries already covered by a longer phrase
            if found
                .iter()
                .any(|(_, existing)| skill_tokens(existing).len() > skill.len()
                    && contains_sequence(&skill_tokens(existing), skill))
            {
                continue;
            }
            let position = tokens
                .windows(skill.len())
                .position(|w| w == skill.as_slice())
                .unwrap_or(usize::MAX);
            found.push((position, name.clone()));
        }

        found.sort_by_key(|(pos, _)| *pos);
        tracing::debug!(count = found.len(), "lexicon skill extraction");
        Ok(found.into_iter().map(|(_, name)| name).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_known_skills_in_query_order() {
        let extractor = LexiconSkillExtractor::new();
        let skills = extractor
            .extract_skills("Need strong Kafka experience with Java and Kubernetes")
            .unwrap();
        assert_eq!(skills, vec!["kafka", "java", "kubernetes"]);
    }

    #[test]
    fn prefers_multi_word_phrases() {
        let extractor = LexiconSkillExtractor::new();
        let skills = extractor
            .extract_skills("Looking for machine learning with PyTorch")
            .unwrap();
        assert_eq!(skills, vec!["machine learning", "pytorch"]);
    }

    #[test]
    fn no_skills_is_empty() {
        let extractor = LexiconSkillExtractor::new();
        assert!(extractor
            .extract_skills("Someone friendly for the team")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn everyday_words_are_not_skills() {
        let extractor = LexiconSkillExtractor::new();
        let skills = extractor
            .extract_skills("We go live with the rest of the team, plan C if needed")
            .unwrap();
        assert!(skills.is_empty(), "{skills:?}");
    }

    #[test]
    fn qualified_forms_map_to_the_skill() {
        let extractor = LexiconSkillExtractor::new();
        let skills = extractor
            .extract_skills("Golang services behind a REST API")
            .unwrap();
        assert_eq!(skills, vec!["go", "rest"]);
    }
}
