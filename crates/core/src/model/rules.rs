use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionRulesError {
    #[error("starting lives must be > 0")]
    InvalidStartingLives,
}

/// Gamification parameters for a lesson attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionRules {
    starting_lives: u32,
    xp_per_correct: u32,
}

impl SessionRules {
    pub const DEFAULT_LIVES: u32 = 5;
    pub const DEFAULT_XP_PER_CORRECT: u32 = 10;

    /// Creates custom rules.
    ///
    /// # Errors
    ///
    /// Returns `SessionRulesError::InvalidStartingLives` if `starting_lives` is zero.
    pub fn new(starting_lives: u32, xp_per_correct: u32) -> Result<Self, SessionRulesError> {
        if starting_lives == 0 {
            return Err(SessionRulesError::InvalidStartingLives);
        }
        Ok(Self {
            starting_lives,
            xp_per_correct,
        })
    }

    #[must_use]
    pub fn starting_lives(&self) -> u32 {
        self.starting_lives
    }

    #[must_use]
    pub fn xp_per_correct(&self) -> u32 {
        self.xp_per_correct
    }
}

impl Default for SessionRules {
    /// Five lives and a flat 10 XP per correct answer.
    fn default() -> Self {
        Self {
            starting_lives: Self::DEFAULT_LIVES,
            xp_per_correct: Self::DEFAULT_XP_PER_CORRECT,
        }
    }
}
