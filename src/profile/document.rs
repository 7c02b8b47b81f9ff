//! Canonical text projection of a profile, used as embedding input.

use anyhow::Result;
use rusqlite::Connection;

use super::load::fetch_profile;
use super::types::{level_label, skill_level_label, ProfileData};

/// Render the document for a profile already in memory.
///
/// Sections appear in a fixed order and are newline-joined. Skills, projects
/// and goals are left out when empty; level and strength are always present.
pub fn render_document(data: &ProfileData) -> String {
    let profile = &data.profile;
    let mut parts: Vec<String> = Vec::new();

    push_non_empty(&mut parts, &profile.display_name);
    if let Some(title) = &profile.job_title {
        push_non_empty(&mut parts, title);
    }
    if let Some(department) = &profile.department {
        push_non_empty(&mut parts, department);
    }

    let skills: Vec<String> = data
        .using_skills()
        .map(|s| {
            if s.verified {
                format!("{} ({}, verified by peers)", s.name, skill_level_label(s.level))
            } else {
                format!("{} ({})", s.name, skill_level_label(s.level))
            }
        })
        .collect();
    if !skills.is_empty() {
        parts.push(format!("Skills: {}", skills.join(", ")));
    }

    let projects: Vec<String> = data
        .projects
        .iter()
        .filter_map(|p| {
            p.achievements_text()
                .map(|a| format!("{}. {}. {}", p.name, p.role, a))
        })
        .collect();
    if !projects.is_empty() {
        parts.push(format!("Projects: {}", projects.join(". ")));
    }

    let goals: Vec<String> = data
        .goals
        .iter()
        .map(|g| format!("{}: {}", g.goal_type, g.target))
        .collect();
    if !goals.is_empty() {
        parts.push(format!("Career goals: {}", goals.join(", ")));
    }

    parts.push(format!("Level: {}", level_label(profile.level)));
    parts.push(format!("Profile strength: {}%", profile.profile_strength));

    parts.join("\n").trim().to_string()
}

/// Build the document for a stored profile. `None` if the profile is unknown.
pub fn build_document(conn: &Connection, profile_id: &str) -> Result<Option<String>> {
    Ok(fetch_profile(conn, profile_id)?.map(|data| render_document(&data)))
}

/// First `max_chars` characters of a document, never splitting a character.
pub fn snapshot(document: &str, max_chars: usize) -> String {
    match document.char_indices().nth(max_chars) {
        Some((idx, _)) => document[..idx].to_string(),
        None => document.to_string(),
    }
}

fn push_non_empty(parts: &mut Vec<String>, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        parts.push(value.to_string());
    }
}
