use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs the schema migrations in order, skipping versions already applied.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: learner progress and the weekly high-score cache.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS learner_progress (
                    user_id TEXT PRIMARY KEY,
                    total_xp INTEGER NOT NULL DEFAULT 0 CHECK (total_xp >= 0),
                    streak_count INTEGER CHECK (streak_count >= 0),
                    streak_last_active TEXT
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS goal_minutes (
                    user_id TEXT NOT NULL,
                    day TEXT NOT NULL,
                    minutes INTEGER NOT NULL CHECK (minutes >= 0),
                    PRIMARY KEY (user_id, day)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS high_scores (
                    user_id TEXT NOT NULL,
                    topic TEXT NOT NULL,
                    week_key TEXT NOT NULL,
                    pass_count INTEGER NOT NULL CHECK (pass_count >= 0),
                    total INTEGER NOT NULL CHECK (total >= 0),
                    recorded_at TEXT NOT NULL,
                    PRIMARY KEY (user_id, topic, week_key)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    Ok(())
}
