use std::sync::Arc;

use lesson_core::model::{LessonSummary, UserId};
use lesson_core::progress::{DailyGoal, LevelProgress, Streak, WeekKey, DEFAULT_GOAL_MINUTES};
use storage::repository::{HighScore, HighScoreRepository, ProgressRepository};

use crate::error::ProgressError;
use crate::Clock;

/// Learner state after a completed lesson was credited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub level: LevelProgress,
    pub leveled_up: bool,
    pub streak: Streak,
    pub goal: DailyGoal,
    pub new_high_score: bool,
}

/// Credits completed lessons towards level, streak, daily goal and the
/// weekly high-score cache.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    progress: Arc<dyn ProgressRepository>,
    high_scores: Arc<dyn HighScoreRepository>,
    goal_minutes: u32,
}

impl ProgressService {
    #[must_use]
    pub fn new(
        clock: Clock,
        progress: Arc<dyn ProgressRepository>,
        high_scores: Arc<dyn HighScoreRepository>,
    ) -> Self {
        Self {
            clock,
            progress,
            high_scores,
            goal_minutes: DEFAULT_GOAL_MINUTES,
        }
    }

    #[must_use]
    pub fn with_goal_minutes(mut self, goal_minutes: u32) -> Self {
        self.goal_minutes = goal_minutes;
        self
    }

    #[must_use]
    pub fn goal_minutes(&self) -> u32 {
        self.goal_minutes
    }

    /// Apply a completed lesson to the learner's counters.
    ///
    /// The completion day is taken from the summary, so the update is
    /// stable regardless of when it runs.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if any counter cannot be read or stored.
    pub async fn record_completion(
        &self,
        user: &UserId,
        topic: &str,
        summary: &LessonSummary,
    ) -> Result<ProgressUpdate, ProgressError> {
        let day = summary.completed_at().date_naive();

        let before = self.progress.total_xp(user).await?;
        let total = self
            .progress
            .add_xp(user, u64::from(summary.xp_earned()))
            .await?;
        let previous_level = LevelProgress::from_total_xp(before).level;
        let level = LevelProgress::from_total_xp(total);

        let streak = Streak::advance(self.progress.get_streak(user).await?, day);
        self.progress.put_streak(user, streak).await?;

        let minutes = summary.rounded_minutes();
        let credited = if minutes > 0 {
            self.progress.add_goal_minutes(user, day, minutes).await?
        } else {
            self.progress.goal_minutes(user, day).await?
        };

        let score = HighScore {
            pass_count: summary.pass_count(),
            total: summary.total(),
            recorded_at: summary.completed_at(),
        };
        let new_high_score = self
            .high_scores
            .offer_high_score(user, topic, WeekKey::of(day), score)
            .await?;

        tracing::debug!(
            user = %user,
            topic,
            total_xp = total,
            level = level.level,
            streak = streak.count,
            goal_minutes = credited,
            new_high_score,
            "progress recorded"
        );

        Ok(ProgressUpdate {
            level,
            leveled_up: level.level > previous_level,
            streak,
            goal: DailyGoal::new(credited, self.goal_minutes),
            new_high_score,
        })
    }

    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if lifetime XP cannot be read.
    pub async fn level(&self, user: &UserId) -> Result<LevelProgress, ProgressError> {
        Ok(LevelProgress::from_total_xp(self.progress.total_xp(user).await?))
    }

    /// Current streak, or `None` once a day has been missed.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the streak cannot be read.
    pub async fn streak(&self, user: &UserId) -> Result<Option<Streak>, ProgressError> {
        let today = self.clock.today();
        let streak = self.progress.get_streak(user).await?;
        Ok(streak.filter(|s| s.last_active == today || s.last_active.succ_opt() == Some(today)))
    }

    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if today's minutes cannot be read.
    pub async fn todays_goal(&self, user: &UserId) -> Result<DailyGoal, ProgressError> {
        let minutes = self.progress.goal_minutes(user, self.clock.today()).await?;
        Ok(DailyGoal::new(minutes, self.goal_minutes))
    }

    /// Best result this week for `topic`.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the cache cannot be read.
    pub async fn high_score(
        &self,
        user: &UserId,
        topic: &str,
    ) -> Result<Option<HighScore>, ProgressError> {
        let week = WeekKey::of(self.clock.today());
        Ok(self.high_scores.get_high_score(user, topic, week).await?)
    }
}
