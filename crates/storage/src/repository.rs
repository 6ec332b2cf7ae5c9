use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use lesson_core::model::UserId;
use lesson_core::progress::{Streak, WeekKey};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Best lesson result a learner reached for a topic within one week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighScore {
    pub pass_count: u32,
    pub total: u32,
    pub recorded_at: DateTime<Utc>,
}

impl HighScore {
    /// Whether `self` should replace `other` as the stored best.
    #[must_use]
    pub fn beats(&self, other: &HighScore) -> bool {
        self.pass_count > other.pass_count
    }
}

/// Per-learner counters that outlive a single lesson.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Lifetime XP, zero for an unknown learner.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be read.
    async fn total_xp(&self, user: &UserId) -> Result<u64, StorageError>;

    /// Add XP and return the new lifetime total.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn add_xp(&self, user: &UserId, xp: u64) -> Result<u64, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be read.
    async fn get_streak(&self, user: &UserId) -> Result<Option<Streak>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn put_streak(&self, user: &UserId, streak: Streak) -> Result<(), StorageError>;

    /// Minutes credited towards the daily goal on `day`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be read.
    async fn goal_minutes(&self, user: &UserId, day: NaiveDate) -> Result<u32, StorageError>;

    /// Credit minutes for `day` and return the new total for that day.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn add_goal_minutes(
        &self,
        user: &UserId,
        day: NaiveDate,
        minutes: u32,
    ) -> Result<u32, StorageError>;
}

/// Local high-score cache keyed by `(user, topic, week)`.
///
/// Display only; the backend holds the authoritative attempt history.
#[async_trait]
pub trait HighScoreRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be read.
    async fn get_high_score(
        &self,
        user: &UserId,
        topic: &str,
        week: WeekKey,
    ) -> Result<Option<HighScore>, StorageError>;

    /// Store `score` if it beats the current best. Returns `true` when stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be read or stored.
    async fn offer_high_score(
        &self,
        user: &UserId,
        topic: &str,
        week: WeekKey,
        score: HighScore,
    ) -> Result<bool, StorageError>;
}

type HighScoreKey = (UserId, String, WeekKey);

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    xp: Arc<Mutex<HashMap<UserId, u64>>>,
    streaks: Arc<Mutex<HashMap<UserId, Streak>>>,
    goals: Arc<Mutex<HashMap<(UserId, NaiveDate), u32>>>,
    high_scores: Arc<Mutex<HashMap<HighScoreKey, HighScore>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn total_xp(&self, user: &UserId) -> Result<u64, StorageError> {
        let guard = self.xp.lock().map_err(poisoned)?;
        Ok(guard.get(user).copied().unwrap_or(0))
    }

    async fn add_xp(&self, user: &UserId, xp: u64) -> Result<u64, StorageError> {
        let mut guard = self.xp.lock().map_err(poisoned)?;
        let total = guard.entry(user.clone()).or_insert(0);
        *total = total.saturating_add(xp);
        Ok(*total)
    }

    async fn get_streak(&self, user: &UserId) -> Result<Option<Streak>, StorageError> {
        let guard = self.streaks.lock().map_err(poisoned)?;
        Ok(guard.get(user).copied())
    }

    async fn put_streak(&self, user: &UserId, streak: Streak) -> Result<(), StorageError> {
        let mut guard = self.streaks.lock().map_err(poisoned)?;
        guard.insert(user.clone(), streak);
        Ok(())
    }

    async fn goal_minutes(&self, user: &UserId, day: NaiveDate) -> Result<u32, StorageError> {
        let guard = self.goals.lock().map_err(poisoned)?;
        Ok(guard.get(&(user.clone(), day)).copied().unwrap_or(0))
    }

    async fn add_goal_minutes(
        &self,
        user: &UserId,
        day: NaiveDate,
        minutes: u32,
    ) -> Result<u32, StorageError> {
        let mut guard = self.goals.lock().map_err(poisoned)?;
        let total = guard.entry((user.clone(), day)).or_insert(0);
        *total = total.saturating_add(minutes);
        Ok(*total)
    }
}

#[async_trait]
impl HighScoreRepository for InMemoryRepository {
    async fn get_high_score(
        &self,
        user: &UserId,
        topic: &str,
        week: WeekKey,
    ) -> Result<Option<HighScore>, StorageError> {
        let guard = self.high_scores.lock().map_err(poisoned)?;
        Ok(guard.get(&(user.clone(), topic.to_string(), week)).cloned())
    }

    async fn offer_high_score(
        &self,
        user: &UserId,
        topic: &str,
        week: WeekKey,
        score: HighScore,
    ) -> Result<bool, StorageError> {
        let mut guard = self.high_scores.lock().map_err(poisoned)?;
        let key = (user.clone(), topic.to_string(), week);
        match guard.get(&key) {
            Some(best) if !score.beats(best) => Ok(false),
            _ => {
                guard.insert(key, score);
                Ok(true)
            }
        }
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
    pub high_scores: Arc<dyn HighScoreRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo.clone());
        let high_scores: Arc<dyn HighScoreRepository> = Arc::new(repo);
        Self {
            progress,
            high_scores,
        }
    }
}
