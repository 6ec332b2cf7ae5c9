mod exercise;
mod ids;
mod rules;
mod session;
mod submission;

pub use exercise::{Exercise, ExerciseError, ExerciseKind, MatchPair};
pub use ids::{ExerciseId, LessonId, ParseIdError, UserId};
pub use rules::{SessionRules, SessionRulesError};
pub use session::{LessonSummary, LessonSummaryError};
pub use submission::{PairSide, Submission};
