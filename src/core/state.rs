use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::core::config::Settings;
use crate::services::grading::GradingService;
use crate::services::question_source::QuestionSource;
use crate::services::quiz::SessionStore;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    db: PgPool,
    questions: Arc<dyn QuestionSource>,
    grader: Arc<dyn GradingService>,
    sessions: SessionStore,
}

impl AppState {
    pub(crate) fn new(
        settings: Settings,
        db: PgPool,
        questions: Arc<dyn QuestionSource>,
        grader: Arc<dyn GradingService>,
    ) -> Self {
        let sessions = SessionStore::new(
            settings.quiz().max_active_sessions,
            Duration::from_secs(settings.quiz().session_idle_minutes.saturating_mul(60)),
        );
        Self { inner: Arc::new(InnerState { settings, db, questions, grader, sessions }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn db(&self) -> &PgPool {
        &self.inner.db
    }

    pub(crate) fn questions(&self) -> &dyn QuestionSource {
        self.inner.questions.as_ref()
    }

    pub(crate) fn grader(&self) -> Arc<dyn GradingService> {
        self.inner.grader.clone()
    }

    pub(crate) fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }
}
