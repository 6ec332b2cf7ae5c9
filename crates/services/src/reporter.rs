use std::sync::Arc;

use lesson_core::model::LessonSummary;

use crate::lesson_api::{AttemptPayload, AttemptSink};

/// What happened to a completion report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    Delivered,
    /// The backend could not be reached or refused the attempt. The record is lost.
    Dropped,
}

/// Best-effort delivery of lesson summaries to the backend.
#[derive(Clone)]
pub struct SessionReporter {
    sink: Arc<dyn AttemptSink>,
}

impl SessionReporter {
    #[must_use]
    pub fn new(sink: Arc<dyn AttemptSink>) -> Self {
        Self { sink }
    }

    /// Submit once. Failures are logged and swallowed; nothing is retried.
    pub async fn report(&self, summary: &LessonSummary) -> ReportOutcome {
        let payload = AttemptPayload::from(summary);
        match self.sink.submit_attempt(&payload).await {
            Ok(()) => {
                tracing::info!(
                    lesson_id = %payload.quiz_id,
                    pass_count = payload.pass_count,
                    fail_count = payload.fail_count,
                    "lesson attempt reported"
                );
                ReportOutcome::Delivered
            }
            Err(err) => {
                tracing::error!(lesson_id = %payload.quiz_id, error = %err, "failed to report lesson attempt");
                ReportOutcome::Dropped
            }
        }
    }
}
