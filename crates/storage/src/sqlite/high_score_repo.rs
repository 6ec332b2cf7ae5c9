use async_trait::async_trait;
use lesson_core::model::UserId;
use lesson_core::progress::WeekKey;
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, ser, u32_from_i64};
use crate::repository::{HighScore, HighScoreRepository, StorageError};

#[async_trait]
impl HighScoreRepository for SqliteRepository {
    async fn get_high_score(
        &self,
        user: &UserId,
        topic: &str,
        week: WeekKey,
    ) -> Result<Option<HighScore>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT pass_count, total, recorded_at
                FROM high_scores
                WHERE user_id = ?1 AND topic = ?2 AND week_key = ?3
            ",
        )
        .bind(user.as_str())
        .bind(topic)
        .bind(week.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(HighScore {
            pass_count: u32_from_i64("pass_count", row.try_get("pass_count").map_err(ser)?)?,
            total: u32_from_i64("total", row.try_get("total").map_err(ser)?)?,
            recorded_at: row.try_get("recorded_at").map_err(ser)?,
        }))
    }

    async fn offer_high_score(
        &self,
        user: &UserId,
        topic: &str,
        week: WeekKey,
        score: HighScore,
    ) -> Result<bool, StorageError> {
        // The conditional upsert leaves the row untouched unless the new score is higher.
        let res = sqlx::query(
            r"
                INSERT INTO high_scores (user_id, topic, week_key, pass_count, total, recorded_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(user_id, topic, week_key) DO UPDATE SET
                    pass_count = excluded.pass_count,
                    total = excluded.total,
                    recorded_at = excluded.recorded_at
                WHERE excluded.pass_count > high_scores.pass_count
            ",
        )
        .bind(user.as_str())
        .bind(topic)
        .bind(week.to_string())
        .bind(i64::from(score.pass_count))
        .bind(i64::from(score.total))
        .bind(score.recorded_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(res.rows_affected() > 0)
    }
}
