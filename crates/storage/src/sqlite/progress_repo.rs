use async_trait::async_trait;
use chrono::NaiveDate;
use lesson_core::model::UserId;
use lesson_core::progress::Streak;
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, i64_from_u64, ser, u32_from_i64, u64_from_i64};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait]
impl ProgressRepository for SqliteRepository {
    async fn total_xp(&self, user: &UserId) -> Result<u64, StorageError> {
        let row = sqlx::query("SELECT total_xp FROM learner_progress WHERE user_id = ?1")
            .bind(user.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        match row {
            Some(row) => u64_from_i64("total_xp", row.try_get("total_xp").map_err(ser)?),
            None => Ok(0),
        }
    }

    async fn add_xp(&self, user: &UserId, xp: u64) -> Result<u64, StorageError> {
        let row = sqlx::query(
            r"
                INSERT INTO learner_progress (user_id, total_xp)
                VALUES (?1, ?2)
                ON CONFLICT(user_id) DO UPDATE SET total_xp = total_xp + excluded.total_xp
                RETURNING total_xp
            ",
        )
        .bind(user.as_str())
        .bind(i64_from_u64("xp", xp)?)
        .fetch_one(&self.pool)
        .await
        .map_err(conn)?;

        u64_from_i64("total_xp", row.try_get("total_xp").map_err(ser)?)
    }

    async fn get_streak(&self, user: &UserId) -> Result<Option<Streak>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT streak_count, streak_last_active
                FROM learner_progress
                WHERE user_id = ?1
            ",
        )
        .bind(user.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let count: Option<i64> = row.try_get("streak_count").map_err(ser)?;
        let last_active: Option<NaiveDate> = row.try_get("streak_last_active").map_err(ser)?;

        match (count, last_active) {
            (Some(count), Some(last_active)) => Ok(Some(Streak {
                count: u32_from_i64("streak_count", count)?,
                last_active,
            })),
            _ => Ok(None),
        }
    }

    async fn put_streak(&self, user: &UserId, streak: Streak) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO learner_progress (user_id, streak_count, streak_last_active)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(user_id) DO UPDATE SET
                    streak_count = excluded.streak_count,
                    streak_last_active = excluded.streak_last_active
            ",
        )
        .bind(user.as_str())
        .bind(i64::from(streak.count))
        .bind(streak.last_active)
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }

    async fn goal_minutes(&self, user: &UserId, day: NaiveDate) -> Result<u32, StorageError> {
        let row = sqlx::query("SELECT minutes FROM goal_minutes WHERE user_id = ?1 AND day = ?2")
            .bind(user.as_str())
            .bind(day)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        match row {
            Some(row) => u32_from_i64("minutes", row.try_get("minutes").map_err(ser)?),
            None => Ok(0),
        }
    }

    async fn add_goal_minutes(
        &self,
        user: &UserId,
        day: NaiveDate,
        minutes: u32,
    ) -> Result<u32, StorageError> {
        let row = sqlx::query(
            r"
                INSERT INTO goal_minutes (user_id, day, minutes)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(user_id, day) DO UPDATE SET minutes = minutes + excluded.minutes
                RETURNING minutes
            ",
        )
        .bind(user.as_str())
        .bind(day)
        .bind(i64::from(minutes))
        .fetch_one(&self.pool)
        .await
        .map_err(conn)?;

        u32_from_i64("minutes", row.try_get("minutes").map_err(ser)?)
    }
}
