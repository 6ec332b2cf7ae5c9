use std::sync::Arc;

use lesson_core::model::SessionRules;
use storage::repository::Storage;

use crate::error::AppServicesError;
use crate::lesson_api::{LessonApiClient, LessonApiConfig};
use crate::progress_service::ProgressService;
use crate::sessions::LessonLoopService;
use crate::Clock;

/// Assembles app-facing services around one storage backend and one lesson API.
#[derive(Clone)]
pub struct AppServices {
    lesson_loop: Arc<LessonLoopService>,
    progress: Arc<ProgressService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or the HTTP client fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        api: LessonApiConfig,
        rules: SessionRules,
        shuffle_choices: bool,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::with_storage(storage, clock, api, rules, shuffle_choices)
    }

    /// Build services over an already opened storage backend.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Api` if the HTTP client cannot be built.
    pub fn with_storage(
        storage: Storage,
        clock: Clock,
        api: LessonApiConfig,
        rules: SessionRules,
        shuffle_choices: bool,
    ) -> Result<Self, AppServicesError> {
        let client = Arc::new(LessonApiClient::new(api)?);
        let progress = Arc::new(ProgressService::new(
            clock,
            Arc::clone(&storage.progress),
            Arc::clone(&storage.high_scores),
        ));
        let lesson_loop = Arc::new(
            LessonLoopService::new(clock, client.clone(), client)
                .with_rules(rules)
                .with_shuffle_choices(shuffle_choices)
                .with_progress(Arc::clone(&progress)),
        );

        Ok(Self {
            lesson_loop,
            progress,
        })
    }

    #[must_use]
    pub fn lesson_loop(&self) -> Arc<LessonLoopService> {
        Arc::clone(&self.lesson_loop)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }
}
