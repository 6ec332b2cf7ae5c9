mod progress;
mod service;
mod workflow;

// Public API of the lesson subsystem.
pub use crate::error::SessionError;
pub use progress::{LessonStatus, SessionProgress};
pub use service::{Advance, LessonSession};
pub use workflow::{AdvanceResult, LearnerContext, LessonLoopService};
