//! Gamification bookkeeping kept alongside lessons: levels, streaks,
//! today's goal and the week bucket for high scores.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

//
// ─── LEVEL ─────────────────────────────────────────────────────────────────────
//

/// XP required to clear level `n` is `n * XP_PER_LEVEL_STEP`.
pub const XP_PER_LEVEL_STEP: u64 = 100;

/// Level derived from a learner's lifetime XP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelProgress {
    pub level: u32,
    /// XP earned inside the current level.
    pub xp_into_level: u64,
    pub xp_for_next_level: u64,
    pub percent: u8,
}

impl LevelProgress {
    #[must_use]
    pub fn from_total_xp(total_xp: u64) -> Self {
        let mut level: u32 = 1;
        let mut used: u64 = 0;
        while used + xp_for_level(level) <= total_xp {
            used += xp_for_level(level);
            level += 1;
        }
        let xp_into_level = total_xp - used;
        let xp_for_next_level = xp_for_level(level);
        Self {
            level,
            xp_into_level,
            xp_for_next_level,
            percent: percent_of(xp_into_level, xp_for_next_level),
        }
    }
}

fn xp_for_level(level: u32) -> u64 {
    u64::from(level) * XP_PER_LEVEL_STEP
}

#[allow(clippy::cast_possible_truncation)]
fn percent_of(part: u64, whole: u64) -> u8 {
    if whole == 0 {
        return 0;
    }
    // rounded, capped at 100
    let pct = (part.saturating_mul(100) + whole / 2) / whole;
    pct.min(100) as u8
}

//
// ─── STREAK ────────────────────────────────────────────────────────────────────
//

/// Consecutive-day activity counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub count: u32,
    pub last_active: NaiveDate,
}

impl Streak {
    #[must_use]
    pub fn start(today: NaiveDate) -> Self {
        Self {
            count: 1,
            last_active: today,
        }
    }

    /// Register activity on `today`.
    ///
    /// Same day keeps the count, the following day extends it, and any gap
    /// (or a clock that moved backwards) restarts at 1.
    #[must_use]
    pub fn register(self, today: NaiveDate) -> Self {
        if today == self.last_active {
            return self;
        }
        if self.last_active.succ_opt() == Some(today) {
            return Self {
                count: self.count.saturating_add(1),
                last_active: today,
            };
        }
        Self::start(today)
    }

    /// Apply activity to an optional streak.
    #[must_use]
    pub fn advance(current: Option<Self>, today: NaiveDate) -> Self {
        match current {
            Some(streak) => streak.register(today),
            None => Self::start(today),
        }
    }
}

//
// ─── TODAY'S GOAL ──────────────────────────────────────────────────────────────
//

pub const DEFAULT_GOAL_MINUTES: u32 = 20;

/// Minutes studied today against a daily target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyGoal {
    pub minutes: u32,
    pub goal_minutes: u32,
}

impl DailyGoal {
    #[must_use]
    pub fn new(minutes: u32, goal_minutes: u32) -> Self {
        Self {
            minutes,
            goal_minutes,
        }
    }

    #[must_use]
    pub fn percent(&self) -> u8 {
        percent_of(u64::from(self.minutes), u64::from(self.goal_minutes))
    }

    #[must_use]
    pub fn is_met(&self) -> bool {
        self.minutes >= self.goal_minutes
    }
}

//
// ─── WEEK KEY ──────────────────────────────────────────────────────────────────
//

/// ISO-8601 week bucket, displayed as `2026-W42`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WeekKey {
    year: i32,
    week: u32,
}

impl WeekKey {
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        Self {
            year: iso.year(),
            week: iso.week(),
        }
    }

    #[must_use]
    pub fn year(&self) -> i32 {
        self.year
    }

    #[must_use]
    pub fn week(&self) -> u32 {
        self.week
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}
