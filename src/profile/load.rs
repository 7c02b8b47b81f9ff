//! Relational read boundary: hydrate [`ProfileData`] from the collaborator tables.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;

use super::types::{
    CareerGoal, Profile, ProfileData, ProjectParticipation, SkillAssertion, SkillStatus,
};

const PROFILE_COLUMNS: &str = "id, display_name, role, job_title, department, level, \
     profile_strength, lifetime_earned, enrolled_courses, mentoring_sessions, updated_at";

fn profile_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Profile> {
    Ok(Profile {
        id: row.get(0)?,
        display_name: row.get(1)?,
        role: row.get(2)?,
        job_title: row.get(3)?,
        department: row.get(4)?,
        level: row.get(5)?,
        profile_strength: row.get(6)?,
        lifetime_earned: row.get(7)?,
        enrolled_courses: row.get(8)?,
        mentoring_sessions: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

/// Fetch one profile with its skills, projects and goals.
pub fn fetch_profile(conn: &Connection, profile_id: &str) -> Result<Option<ProfileData>> {
    let mut map = fetch_profiles(conn, &[profile_id])?;
    Ok(map.remove(profile_id))
}

/// Batch-fetch profiles by ID. Missing IDs are simply absent from the map;
/// callers that need rank order re-walk their own ID list.
pub fn fetch_profiles(conn: &Connection, ids: &[&str]) -> Result<HashMap<String, ProfileData>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let placeholders: Vec<String> = (1..=ids.len()).map(|i| format!("?{i}")).collect();
    let in_clause = placeholders.join(", ");
    let params: Vec<&dyn rusqlite::types::ToSql> =
        ids.iter().map(|id| id as &dyn rusqlite::types::ToSql).collect();

    let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id IN ({in_clause})");
    let mut stmt = conn.prepare(&sql)?;
    let profiles = stmt
        .query_map(params.as_slice(), profile_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    let mut map: HashMap<String, ProfileData> = profiles
        .into_iter()
        .map(|profile| {
            (
                profile.id.clone(),
                ProfileData {
                    profile,
                    skills: Vec::new(),
                    projects: Vec::new(),
                    goals: Vec::new(),
                },
            )
        })
        .collect();

    if map.is_empty() {
        return Ok(map);
    }

    // Skills
    let sql = format!(
        "SELECT profile_id, name, level, verified, status FROM profile_skills \
         WHERE profile_id IN ({in_clause}) ORDER BY id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params.as_slice(), |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u8>(2)?,
                row.get::<_, bool>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    for (profile_id, name, level, verified, status) in rows {
        let status: SkillStatus = status.parse().map_err(anyhow::Error::msg)?;
        if let Some(data) = map.get_mut(&profile_id) {
            data.skills.push(SkillAssertion {
                name,
                level,
                verified,
                status,
            });
        }
    }

    // Projects
    let sql = format!(
        "SELECT profile_id, name, role, achievements, start_date, end_date FROM profile_projects \
         WHERE profile_id IN ({in_clause}) ORDER BY start_date DESC, id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params.as_slice(), |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, Option<String>>(5)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    for (profile_id, name, role, achievements, start, end) in rows {
        let start_date = parse_date(&start)?;
        let end_date = end.as_deref().map(parse_date).transpose()?;
        if let Some(data) = map.get_mut(&profile_id) {
            data.projects.push(ProjectParticipation {
                name,
                role,
                achievements,
                start_date,
                end_date,
            });
        }
    }

    // Goals
    let sql = format!(
        "SELECT profile_id, goal_type, target, priority FROM career_goals \
         WHERE profile_id IN ({in_clause}) ORDER BY priority DESC, id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params.as_slice(), |row| {
            Ok((
                row.get::<_, String>(0)?,
                CareerGoal {
                    goal_type: row.get(1)?,
                    target: row.get(2)?,
                    priority: row.get(3)?,
                },
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    for (profile_id, goal) in rows {
        if let Some(data) = map.get_mut(&profile_id) {
            data.goals.push(goal);
        }
    }

    Ok(map)
}

/// Last-modified timestamp of a profile, or `None` if it does not exist.
pub fn profile_updated_at(conn: &Connection, profile_id: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT updated_at FROM profiles WHERE id = ?1",
        params![profile_id],
        |row| row.get(0),
    )
    .optional()
    .context("failed to read profile timestamp")
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("invalid project date: {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::store::upsert_profile;
    use crate::profile::types::SkillStatus;

    fn sample(id: &str) -> ProfileData {
        ProfileData {
            profile: Profile {
                id: id.into(),
                display_name: format!("Person {id}"),
                role: "employee".into(),
                job_title: Some("Backend Engineer".into()),
                department: None,
                level: Some(3),
                profile_strength: 70,
                lifetime_earned: 120,
                enrolled_courses: 1,
                mentoring_sessions: 0,
                updated_at: String::new(),
            },
            skills: vec![SkillAssertion {
                name: "Kafka".into(),
                level: 5,
                verified: true,
                status: SkillStatus::Using,
            }],
            projects: vec![ProjectParticipation {
                name: "Atlas".into(),
                role: "Developer".into(),
                achievements: Some("Built the event bus".into()),
                start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                end_date: None,
            }],
            goals: vec![CareerGoal {
                goal_type: "Promotion".into(),
                target: "Staff Engineer".into(),
                priority: 4,
            }],
        }
    }

    #[test]
    fn fetch_profile_hydrates_children() {
        let mut conn = crate::db::open_memory_database(8).unwrap();
        upsert_profile(&mut conn, &sample("p1")).unwrap();

        let data = fetch_profile(&conn, "p1").unwrap().expect("profile exists");
        assert_eq!(data.profile.display_name, "Person p1");
        assert_eq!(data.skills.len(), 1);
        assert!(data.skills[0].verified);
        assert_eq!(data.projects[0].achievements.as_deref(), Some("Built the event bus"));
        assert_eq!(data.goals[0].target, "Staff Engineer");
        assert!(!data.profile.updated_at.is_empty());
    }

    #[test]
    fn fetch_profiles_skips_missing_ids() {
        let mut conn = crate::db::open_memory_database(8).unwrap();
        upsert_profile(&mut conn, &sample("p1")).unwrap();
        upsert_profile(&mut conn, &sample("p2")).unwrap();

        let map = fetch_profiles(&conn, &["p2", "missing", "p1"]).unwrap();
        assert_eq!(map.len(), 2);
        assert!(map.contains_key("p1"));
        assert!(!map.contains_key("missing"));
    }

    #[test]
    fn unknown_profile_is_none() {
        let conn = crate::db::open_memory_database(8).unwrap();
        assert!(fetch_profile(&conn, "ghost").unwrap().is_none());
        assert!(profile_updated_at(&conn, "ghost").unwrap().is_none());
    }
}
