//! Relational write path for profile records.
//!
//! The profile collaborators own these tables in production; the write path
//! exists so the CLI import and the test suites can seed them. Every write
//! stamps `updated_at`, which is what staleness detection compares against.

use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use super::types::ProfileData;

/// Insert or replace a profile and all of its child rows in one transaction.
///
/// Returns the `updated_at` timestamp written.
pub fn upsert_profile(conn: &mut Connection, data: &ProfileData) -> Result<String> {
    let profile = &data.profile;
    if profile.id.trim().is_empty() {
        anyhow::bail!("profile id must not be empty");
    }

    let now = crate::db::now_timestamp();
    let tx = conn.transaction()?;

    tx.execute(
        "INSERT INTO profiles (id, display_name, role, job_title, department, level, \
             profile_strength, lifetime_earned, enrolled_courses, mentoring_sessions, \
             created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)
         ON CONFLICT(id) DO UPDATE SET
             display_name = excluded.display_name,
             role = excluded.role,
             job_title = excluded.job_title,
             department = excluded.department,
             level = excluded.level,
             profile_strength = excluded.profile_strength,
             lifetime_earned = excluded.lifetime_earned,
             enrolled_courses = excluded.enrolled_courses,
             mentoring_sessions = excluded.mentoring_sessions,
             updated_at = excluded.updated_at",
        params![
            profile.id,
            profile.display_name,
            profile.role,
            profile.job_title,
            profile.department,
            profile.level,
            profile.profile_strength.min(100),
            profile.lifetime_earned,
            profile.enrolled_courses,
            profile.mentoring_sessions,
            now,
        ],
    )
    .with_context(|| format!("failed to write profile {}", profile.id))?;

    for table in ["profile_skills", "profile_projects", "career_goals"] {
        tx.execute(
            &format!("DELETE FROM {table} WHERE profile_id = ?1"),
            params![profile.id],
        )?;
    }

    for skill in &data.skills {
        tx.execute(
            "INSERT INTO profile_skills (profile_id, name, level, verified, status)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                profile.id,
                skill.name,
                skill.level.clamp(1, 5),
                skill.verified,
                skill.status.as_str(),
            ],
        )?;
    }

    for project in &data.projects {
        tx.execute(
            "INSERT INTO profile_projects (profile_id, name, role, achievements, start_date, end_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                profile.id,
                project.name,
                project.role,
                project.achievements,
                project.start_date.format("%Y-%m-%d").to_string(),
                project.end_date.map(|d| d.format("%Y-%m-%d").to_string()),
            ],
        )?;
    }

    for goal in &data.goals {
        tx.execute(
            "INSERT INTO career_goals (profile_id, goal_type, target, priority)
             VALUES (?1, ?2, ?3, ?4)",
            params![profile.id, goal.goal_type, goal.target, goal.priority.clamp(1, 5)],
        )?;
    }

    tx.commit()?;
    tracing::debug!(profile_id = %profile.id, skills = data.skills.len(), "profile written");
    Ok(now)
}

/// Mark a profile as modified without changing its content.
pub fn touch_profile(conn: &Connection, profile_id: &str) -> Result<bool> {
    let now = crate::db::now_timestamp();
    let rows = conn.execute(
        "UPDATE profiles SET updated_at = ?1 WHERE id = ?2",
        params![now, profile_id],
    )?;
    Ok(rows > 0)
}

/// Delete a profile. Child rows and the embedding record go with it through
/// the foreign-key cascade; the vec0 row through the cleanup trigger.
pub fn delete_profile(conn: &Connection, profile_id: &str) -> Result<bool> {
    let rows = conn.execute("DELETE FROM profiles WHERE id = ?1", params![profile_id])?;
    Ok(rows > 0)
}
