use std::sync::Arc;

use lesson_core::model::{Exercise, LessonId};

use crate::lesson_api::QuestionSource;

/// Fetches the question set for a lesson view.
///
/// A single attempt is made. Every failure degrades to an empty set, which
/// callers present as "no questions" rather than as an error. Exercises
/// that fail validation are dropped whatever the source.
#[derive(Clone)]
pub struct QuestionSetLoader {
    source: Arc<dyn QuestionSource>,
}

impl QuestionSetLoader {
    #[must_use]
    pub fn new(source: Arc<dyn QuestionSource>) -> Self {
        Self { source }
    }

    pub async fn load(&self, lesson_id: LessonId) -> Vec<Exercise> {
        match self.source.fetch_questions(lesson_id).await {
            Ok(exercises) => {
                let exercises: Vec<Exercise> = exercises
                    .into_iter()
                    .filter(|exercise| match exercise.validate() {
                        Ok(()) => true,
                        Err(err) => {
                            tracing::warn!(%lesson_id, error = %err, "dropping invalid exercise");
                            false
                        }
                    })
                    .collect();
                tracing::debug!(%lesson_id, count = exercises.len(), "question set loaded");
                exercises
            }
            Err(err) => {
                tracing::warn!(%lesson_id, error = %err, "failed to load question set");
                Vec::new()
            }
        }
    }
}
