use anyhow::Context;
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use time::{format_description::FormatItem, macros::format_description, OffsetDateTime, UtcOffset};

use crate::assessment::AssessmentInput;

/// One stored assessment. Rows are never updated or deleted.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct HistoryEntry {
    pub id: i64,
    pub user_id: i64,
    pub work_hours_per_day: f64,
    pub sleep_hours: f64,
    pub exercise_minutes: f64,
    pub social_hours: f64,
    pub screen_time_nonwork: f64,
    pub breaks_per_day: f64,
    pub coffee_cups: i64,
    pub stress_level: i64,
    pub burnout_score: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
}

impl HistoryEntry {
    pub fn input(&self) -> AssessmentInput {
        AssessmentInput {
            work_hours_per_day: self.work_hours_per_day,
            sleep_hours: self.sleep_hours,
            exercise_minutes: self.exercise_minutes,
            social_hours: self.social_hours,
            screen_time_nonwork: self.screen_time_nonwork,
            breaks_per_day: self.breaks_per_day,
            coffee_cups: self.coffee_cups,
            stress_level: self.stress_level,
        }
    }
}

/// A point on the score-over-time trend.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct HistoryPoint {
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
    pub burnout_score: f64,
}

/// Fixed-width UTC text, so stored values compare the same way as instants.
const STORED_TIMESTAMP: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:9]Z");

fn stored_timestamp(at: OffsetDateTime) -> anyhow::Result<String> {
    at.to_offset(UtcOffset::UTC)
        .format(STORED_TIMESTAMP)
        .context("format recorded_at")
}

pub async fn save_history(
    db: &SqlitePool,
    user_id: i64,
    input: &AssessmentInput,
    score: f64,
) -> anyhow::Result<HistoryEntry> {
    save_history_at(db, user_id, input, score, OffsetDateTime::now_utc()).await
}

pub(crate) async fn save_history_at(
    db: &SqlitePool,
    user_id: i64,
    input: &AssessmentInput,
    score: f64,
    recorded_at: OffsetDateTime,
) -> anyhow::Result<HistoryEntry> {
    let entry = sqlx::query_as::<_, HistoryEntry>(
        r#"
        INSERT INTO user_history (
            user_id, work_hours_per_day, sleep_hours, exercise_minutes,
            social_hours, screen_time_nonwork, breaks_per_day, coffee_cups,
            stress_level, burnout_score, recorded_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id, user_id, work_hours_per_day, sleep_hours, exercise_minutes,
                  social_hours, screen_time_nonwork, breaks_per_day, coffee_cups,
                  stress_level, burnout_score, recorded_at
        "#,
    )
    .bind(user_id)
    .bind(input.work_hours_per_day)
    .bind(input.sleep_hours)
    .bind(input.exercise_minutes)
    .bind(input.social_hours)
    .bind(input.screen_time_nonwork)
    .bind(input.breaks_per_day)
    .bind(input.coffee_cups)
    .bind(input.stress_level)
    .bind(score)
    .bind(stored_timestamp(recorded_at)?)
    .fetch_one(db)
    .await
    .context("insert history entry")?;
    Ok(entry)
}

/// Score trend for a user, oldest first.
pub async fn get_history(db: &SqlitePool, user_id: i64) -> anyhow::Result<Vec<HistoryPoint>> {
    let rows = sqlx::query_as::<_, HistoryPoint>(
        r#"
        SELECT recorded_at, burnout_score
          FROM user_history
         WHERE user_id = ?
         ORDER BY julianday(recorded_at) ASC, recorded_at ASC, id ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("list history points")?;
    Ok(rows)
}

/// Full stored rows for a user, oldest first.
pub async fn list_entries(db: &SqlitePool, user_id: i64) -> anyhow::Result<Vec<HistoryEntry>> {
    let rows = sqlx::query_as::<_, HistoryEntry>(
        r#"
        SELECT id, user_id, work_hours_per_day, sleep_hours, exercise_minutes,
               social_hours, screen_time_nonwork, breaks_per_day, coffee_cups,
               stress_level, burnout_score, recorded_at
          FROM user_history
         WHERE user_id = ?
         ORDER BY julianday(recorded_at) ASC, recorded_at ASC, id ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("list history entries")?;
    Ok(rows)
}
