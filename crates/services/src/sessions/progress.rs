/// Where a lesson attempt currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonStatus {
    /// Building an answer for the current step.
    Answering,
    /// Current step is frozen and scored.
    Submitted { correct: bool },
    Completed,
    Failed,
}

impl LessonStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Aggregated view of lesson progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    /// One-based position of the current step.
    pub step: usize,
    pub lives_remaining: u32,
    pub correct_count: u32,
    pub xp_earned: u32,
    pub status: LessonStatus,
}

impl SessionProgress {
    /// Share of steps behind the learner, 0..=100.
    #[must_use]
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let done = match self.status {
            LessonStatus::Answering => self.step - 1,
            _ => self.step,
        };
        let pct = done.saturating_mul(100) / self.total;
        u8::try_from(pct.min(100)).unwrap_or(100)
    }
}
