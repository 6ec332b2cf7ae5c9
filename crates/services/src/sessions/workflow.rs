use std::sync::Arc;

use lesson_core::model::{LessonId, SessionRules, UserId};

use super::service::{Advance, LessonSession};
use crate::error::SessionError;
use crate::lesson_api::{AttemptSink, QuestionSource};
use crate::loader::QuestionSetLoader;
use crate::progress_service::{ProgressService, ProgressUpdate};
use crate::reporter::{ReportOutcome, SessionReporter};
use crate::Clock;

/// Who is playing and under which topic the result is cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearnerContext {
    pub user_id: UserId,
    pub topic: String,
}

impl LearnerContext {
    #[must_use]
    pub fn new(user_id: UserId, topic: impl Into<String>) -> Self {
        Self {
            user_id,
            topic: topic.into(),
        }
    }
}

/// Result of advancing a lesson through the loop service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvanceResult {
    pub advance: Advance,
    /// Set when this call delivered (or dropped) the attempt report.
    pub report: Option<ReportOutcome>,
    /// Set when this call credited learner progress.
    pub progress: Option<ProgressUpdate>,
}

/// Orchestrates lesson start, completion reporting and progress bookkeeping.
#[derive(Clone)]
pub struct LessonLoopService {
    clock: Clock,
    loader: QuestionSetLoader,
    reporter: SessionReporter,
    progress: Option<Arc<ProgressService>>,
    rules: SessionRules,
    shuffle_choices: bool,
}

impl LessonLoopService {
    #[must_use]
    pub fn new(clock: Clock, source: Arc<dyn QuestionSource>, sink: Arc<dyn AttemptSink>) -> Self {
        Self {
            clock,
            loader: QuestionSetLoader::new(source),
            reporter: SessionReporter::new(sink),
            progress: None,
            rules: SessionRules::default(),
            shuffle_choices: false,
        }
    }

    #[must_use]
    pub fn with_rules(mut self, rules: SessionRules) -> Self {
        self.rules = rules;
        self
    }

    #[must_use]
    pub fn with_shuffle_choices(mut self, shuffle_choices: bool) -> Self {
        self.shuffle_choices = shuffle_choices;
        self
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Arc<ProgressService>) -> Self {
        self.progress = Some(progress);
        self
    }

    #[must_use]
    pub fn rules(&self) -> SessionRules {
        self.rules
    }

    /// Load a lesson and open an attempt.
    ///
    /// Returns `Ok(None)` when the lesson has no playable exercises, which
    /// includes an unreachable backend.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the session cannot be opened.
    pub async fn start_lesson(
        &self,
        lesson_id: LessonId,
    ) -> Result<Option<LessonSession>, SessionError> {
        let exercises = self.loader.load(lesson_id).await;
        if exercises.is_empty() {
            tracing::info!(%lesson_id, "no exercises to play");
            return Ok(None);
        }

        let count = exercises.len();
        let mut session = LessonSession::new(lesson_id, exercises, self.rules, self.clock.now())?;
        if self.shuffle_choices {
            session = session.with_shuffled_choices();
        }
        tracing::info!(%lesson_id, exercises = count, "lesson started");
        Ok(Some(session))
    }

    /// Advance the session and, on completion, report and credit it once.
    ///
    /// Report and progress failures are logged; they never fail the call.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` from the state machine.
    pub async fn advance(
        &self,
        session: &mut LessonSession,
        learner: &LearnerContext,
    ) -> Result<AdvanceResult, SessionError> {
        let advance = session.advance(self.clock.now())?;
        let mut result = AdvanceResult {
            advance,
            report: None,
            progress: None,
        };

        match &result.advance {
            Advance::Completed(summary) if !session.is_reported() => {
                session.mark_reported();
                tracing::info!(
                    lesson_id = %summary.lesson_id(),
                    pass = summary.pass_count(),
                    fail = summary.fail_count(),
                    xp = summary.xp_earned(),
                    "lesson completed"
                );
                result.report = Some(self.reporter.report(summary).await);

                if let Some(progress) = &self.progress {
                    match progress
                        .record_completion(&learner.user_id, &learner.topic, summary)
                        .await
                    {
                        Ok(update) => result.progress = Some(update),
                        Err(err) => {
                            tracing::warn!(user = %learner.user_id, error = %err, "progress not recorded");
                        }
                    }
                }
            }
            Advance::Failed => {
                tracing::info!(lesson_id = %session.lesson_id(), "lesson failed, out of lives");
            }
            Advance::Next { step } => {
                tracing::debug!(lesson_id = %session.lesson_id(), step, "next exercise");
            }
            _ => {}
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lesson_core::model::{Exercise, ExerciseId, ExerciseKind};
    use lesson_core::time::fixed_clock;
    use std::sync::Mutex;
    use storage::repository::Storage;

    use crate::error::LessonApiError;
    use crate::lesson_api::AttemptPayload;

    struct Lesson(Vec<Exercise>);

    #[async_trait]
    impl QuestionSource for Lesson {
        async fn fetch_questions(&self, _: LessonId) -> Result<Vec<Exercise>, LessonApiError> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct Sink(Mutex<Vec<AttemptPayload>>);

    #[async_trait]
    impl AttemptSink for Sink {
        async fn submit_attempt(&self, payload: &AttemptPayload) -> Result<(), LessonApiError> {
            self.0.lock().unwrap().push(payload.clone());
            Ok(())
        }
    }

    fn fill_blank(id: u64) -> Exercise {
        Exercise::new(
            ExerciseId::new(id),
            "Saya ___ nasi",
            ExerciseKind::FillBlank,
            vec!["makan".into(), "minum".into()],
            "makan",
        )
        .unwrap()
    }

    fn learner() -> LearnerContext {
        LearnerContext::new(UserId::new("ana").unwrap(), "food")
    }

    fn loop_service(exercises: Vec<Exercise>, sink: Arc<Sink>) -> LessonLoopService {
        LessonLoopService::new(fixed_clock(), Arc::new(Lesson(exercises)), sink)
    }

    #[tokio::test]
    async fn empty_lesson_does_not_start() {
        let svc = loop_service(Vec::new(), Arc::new(Sink::default()));
        assert!(svc.start_lesson(LessonId::new(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn completion_is_reported_once() {
        let sink = Arc::new(Sink::default());
        let storage = Storage::in_memory();
        let progress = Arc::new(ProgressService::new(
            fixed_clock(),
            Arc::clone(&storage.progress),
            Arc::clone(&storage.high_scores),
        ));
        let svc = loop_service(vec![fill_blank(1), fill_blank(2)], Arc::clone(&sink))
            .with_progress(progress);
        let mut session = svc.start_lesson(LessonId::new(8)).await.unwrap().unwrap();

        session.select_option("makan").unwrap();
        session.submit().unwrap();
        let first = svc.advance(&mut session, &learner()).await.unwrap();
        assert_eq!(first.advance, Advance::Next { step: 1 });
        assert!(first.report.is_none());

        session.select_option("minum").unwrap();
        session.submit().unwrap();
        let done = svc.advance(&mut session, &learner()).await.unwrap();
        assert!(matches!(done.advance, Advance::Completed(_)));
        assert_eq!(done.report, Some(ReportOutcome::Delivered));
        assert_eq!(done.progress.unwrap().level.xp_into_level, 10);

        let again = svc.advance(&mut session, &learner()).await.unwrap();
        assert_eq!(again.advance, Advance::Unchanged);
        assert!(again.report.is_none());

        let sent = sink.0.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].quiz_id, LessonId::new(8));
        assert_eq!((sent[0].pass_count, sent[0].fail_count), (1, 1));
    }

    #[tokio::test]
    async fn failed_lesson_reports_nothing() {
        let sink = Arc::new(Sink::default());
        let svc = loop_service(vec![fill_blank(1), fill_blank(2)], Arc::clone(&sink))
            .with_rules(SessionRules::new(1, 10).unwrap());
        let mut session = svc.start_lesson(LessonId::new(8)).await.unwrap().unwrap();

        session.select_option("minum").unwrap();
        session.submit().unwrap();
        let result = svc.advance(&mut session, &learner()).await.unwrap();
        assert_eq!(result.advance, Advance::Failed);
        assert!(result.report.is_none());
        assert!(sink.0.lock().unwrap().is_empty());
    }
}
