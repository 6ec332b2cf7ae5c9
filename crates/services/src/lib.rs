#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod lesson_api;
pub mod loader;
pub mod progress_service;
pub mod reporter;
pub mod sessions;

pub use lesson_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, LessonApiError, ProgressError, SessionError};
pub use lesson_api::{AttemptPayload, AttemptSink, LessonApiClient, LessonApiConfig, QuestionSource};
pub use loader::QuestionSetLoader;
pub use progress_service::{ProgressService, ProgressUpdate};
pub use reporter::{ReportOutcome, SessionReporter};
pub use sessions::{
    Advance, AdvanceResult, LearnerContext, LessonLoopService, LessonSession, LessonStatus,
    SessionProgress,
};
