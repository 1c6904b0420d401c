mod postgres;
mod rest;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::core::config::{GradingBackend, Settings};
use crate::services::quiz::{AnswerPair, GradeReport};

pub(crate) use postgres::PgGradingService;
pub(crate) use rest::RestGradingService;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum GradingError {
    #[error("grading rejected the submission: {0}")]
    Rejected(String),
    #[error("grading service unreachable: {0}")]
    Transport(String),
    #[error("grading service returned an unexpected response: {0}")]
    InvalidResponse(String),
}

impl GradingError {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            GradingError::Rejected(_) => "rejected",
            GradingError::Transport(_) => "transport",
            GradingError::InvalidResponse(_) => "invalid_response",
        }
    }
}

/// The sole authority on correctness. Each call grades one submission and
/// persists it; callers must not retry on their own.
#[async_trait]
pub(crate) trait GradingService: Send + Sync {
    async fn grade(&self, answers: &[AnswerPair]) -> Result<GradeReport, GradingError>;
}

pub(crate) fn from_settings(
    settings: &Settings,
    pool: PgPool,
) -> anyhow::Result<Arc<dyn GradingService>> {
    let grader: Arc<dyn GradingService> = match settings.grading().backend {
        GradingBackend::Postgres => Arc::new(PgGradingService::new(pool)),
        GradingBackend::Rest => Arc::new(RestGradingService::from_settings(settings)?),
    };

    tracing::info!(backend = settings.grading().backend.as_str(), "Grading service configured");
    Ok(grader)
}

fn score_from(field: &'static str, value: i64) -> Result<u32, GradingError> {
    u32::try_from(value)
        .map_err(|_| GradingError::InvalidResponse(format!("{field} out of range: {value}")))
}
