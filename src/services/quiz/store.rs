use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::session::{QuizSession, SessionState, SubmitRejection};
use super::view::QuizView;
use crate::services::grading::GradingService;

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum StoreError {
    #[error("quiz session not found")]
    NotFound,
    #[error("too many active quiz sessions (limit {0})")]
    AtCapacity(usize),
    #[error(transparent)]
    Rejected(#[from] SubmitRejection),
    #[error("grading task failed: {0}")]
    GradingTask(String),
}

struct StoredSession {
    session: QuizSession,
    touched_at: Instant,
}

type SessionHandle = Arc<Mutex<StoredSession>>;

/// In-process registry of live quiz sessions. Each session has its own lock;
/// the map lock is never held while a session is being worked on.
pub(crate) struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SessionHandle>>,
    max_active: usize,
    idle_after: Duration,
}

impl SessionStore {
    pub(crate) fn new(max_active: usize, idle_after: Duration) -> Self {
        Self { sessions: RwLock::new(HashMap::new()), max_active, idle_after }
    }

    pub(crate) async fn insert(&self, session: QuizSession) -> Result<Uuid, StoreError> {
        let mut sessions = self.sessions.write().await;

        if sessions.len() >= self.max_active {
            let evicted = evict_idle(&mut sessions, self.idle_after);
            if evicted > 0 {
                tracing::info!(evicted, remaining = sessions.len(), "Evicted idle quiz sessions");
            }
        }
        if sessions.len() >= self.max_active {
            return Err(StoreError::AtCapacity(self.max_active));
        }

        let id = Uuid::new_v4();
        let stored = StoredSession { session, touched_at: Instant::now() };
        sessions.insert(id, Arc::new(Mutex::new(stored)));
        Ok(id)
    }

    pub(crate) async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub(crate) async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Runs `action` against the session while holding its lock.
    pub(crate) async fn with_session<T>(
        &self,
        id: Uuid,
        action: impl FnOnce(&mut QuizSession) -> T,
    ) -> Result<T, StoreError> {
        let handle = self.handle(id).await?;
        let mut stored = handle.lock().await;
        stored.touched_at = Instant::now();
        Ok(action(&mut stored.session))
    }

    pub(crate) async fn view(&self, id: Uuid) -> Result<QuizView, StoreError> {
        self.with_session(id, |session| session.current_view()).await
    }

    /// Snapshots the answers under the session lock, then grades and records
    /// the outcome on a spawned task. The task owns the session handle, so the
    /// session leaves `submitting` even if the caller stops waiting. A
    /// concurrent submit sees `submitting` and is rejected.
    pub(crate) async fn submit(
        &self,
        id: Uuid,
        grader: Arc<dyn GradingService>,
    ) -> Result<QuizView, StoreError> {
        let handle = self.handle(id).await?;

        let ticket = {
            let mut stored = handle.lock().await;
            stored.touched_at = Instant::now();
            stored.session.begin_submit()?
        };

        let task_handle = handle.clone();
        let grading = tokio::spawn(async move {
            let outcome = grader.grade(ticket.answers()).await;

            let mut stored = task_handle.lock().await;
            stored.touched_at = Instant::now();
            stored.session.complete_submit(ticket, outcome);
            stored.session.current_view()
        });

        match grading.await {
            Ok(view) => Ok(view),
            Err(err) => {
                tracing::error!(session_id = %id, error = %err, "Grading task failed");
                let mut stored = handle.lock().await;
                stored.session.abandon_submit("grading did not complete, please resubmit");
                Err(StoreError::GradingTask(err.to_string()))
            }
        }
    }

    async fn handle(&self, id: Uuid) -> Result<SessionHandle, StoreError> {
        self.sessions.read().await.get(&id).cloned().ok_or(StoreError::NotFound)
    }
}

fn evict_idle(sessions: &mut HashMap<Uuid, SessionHandle>, idle_after: Duration) -> usize {
    let before = sessions.len();
    sessions.retain(|_, handle| match handle.try_lock() {
        Ok(stored) => {
            stored.session.state() == SessionState::Submitting
                || stored.touched_at.elapsed() < idle_after
        }
        Err(_) => true,
    });
    before - sessions.len()
}
