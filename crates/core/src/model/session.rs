use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::LessonId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonSummaryError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("pass count ({pass}) exceeds total exercises ({total})")]
    CountMismatch { pass: u32, total: u32 },

    #[error("too many exercises for a single lesson: {len}")]
    TooManyExercises { len: usize },
}

/// Outcome of one completed lesson attempt, as reported to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonSummary {
    lesson_id: LessonId,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    pass_count: u32,
    fail_count: u32,
    xp_earned: u32,
}

impl LessonSummary {
    /// Build a summary from the number of exercises and correct answers.
    ///
    /// # Errors
    ///
    /// Returns `LessonSummaryError::InvalidTimeRange` if `completed_at` is before `started_at`.
    /// Returns `LessonSummaryError::CountMismatch` if more answers passed than exist.
    /// Returns `LessonSummaryError::TooManyExercises` if the total cannot fit in `u32`.
    pub fn new(
        lesson_id: LessonId,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        total_exercises: usize,
        pass_count: u32,
        xp_earned: u32,
    ) -> Result<Self, LessonSummaryError> {
        if completed_at < started_at {
            return Err(LessonSummaryError::InvalidTimeRange);
        }
        let total = u32::try_from(total_exercises).map_err(|_| {
            LessonSummaryError::TooManyExercises {
                len: total_exercises,
            }
        })?;
        if pass_count > total {
            return Err(LessonSummaryError::CountMismatch {
                pass: pass_count,
                total,
            });
        }

        Ok(Self {
            lesson_id,
            started_at,
            completed_at,
            pass_count,
            fail_count: total - pass_count,
            xp_earned,
        })
    }

    #[must_use]
    pub fn lesson_id(&self) -> LessonId {
        self.lesson_id
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn pass_count(&self) -> u32 {
        self.pass_count
    }

    #[must_use]
    pub fn fail_count(&self) -> u32 {
        self.fail_count
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.pass_count + self.fail_count
    }

    #[must_use]
    pub fn xp_earned(&self) -> u32 {
        self.xp_earned
    }

    /// Time spent in the lesson, rounded to the nearest whole minute.
    #[must_use]
    pub fn rounded_minutes(&self) -> u32 {
        let secs = (self.completed_at - self.started_at).num_seconds().max(0);
        let minutes = (secs + 30) / 60;
        u32::try_from(minutes).unwrap_or(u32::MAX)
    }
}
