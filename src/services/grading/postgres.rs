use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{score_from, GradingError, GradingService};
use crate::repositories;
use crate::services::quiz::{
    AnswerKey, AnswerPair, AttemptId, ChoiceId, GradeReport, GradedResult, QuestionId,
};

/// Grades through the database's `grade_and_record` procedure.
#[derive(Debug, Clone)]
pub(crate) struct PgGradingService {
    pool: PgPool,
}

impl PgGradingService {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GradingService for PgGradingService {
    async fn grade(&self, answers: &[AnswerPair]) -> Result<GradeReport, GradingError> {
        let payload = serde_json::to_value(answers)
            .map_err(|err| GradingError::InvalidResponse(err.to_string()))?;
        let question_ids = answers
            .iter()
            .map(|pair| {
                Uuid::parse_str(pair.question_id.as_str()).map_err(|_| {
                    GradingError::Rejected(format!("invalid question id: {}", pair.question_id))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        // The key is read in the grading transaction so a failed read also
        // rolls back the recorded attempt.
        let mut tx = self.pool.begin().await.map_err(classify)?;
        let row = repositories::attempts::grade_and_record(&mut *tx, &payload)
            .await
            .map_err(classify)?;
        let key_rows = repositories::questions::list_correct_choices(&mut *tx, &question_ids)
            .await
            .map_err(classify)?;
        tx.commit().await.map_err(classify)?;

        let result = GradedResult {
            attempt_id: AttemptId::new(row.attempt_id.to_string()),
            score: score_from("score", i64::from(row.score))?,
            total: score_from("total", i64::from(row.total))?,
        };
        let answer_key: AnswerKey = key_rows
            .into_iter()
            .map(|row| {
                (QuestionId::new(row.question_id.to_string()), ChoiceId::new(row.id.to_string()))
            })
            .collect();

        tracing::info!(
            attempt_id = %result.attempt_id,
            score = result.score,
            total = result.total,
            "Attempt graded"
        );

        Ok(GradeReport { result, answer_key })
    }
}

fn classify(err: sqlx::Error) -> GradingError {
    match &err {
        sqlx::Error::Database(db) if is_validation_code(db.code().as_deref()) => {
            GradingError::Rejected(db.message().to_string())
        }
        sqlx::Error::RowNotFound
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. } => {
            GradingError::InvalidResponse(err.to_string())
        }
        _ => GradingError::Transport(err.to_string()),
    }
}

/// Data exceptions (22xxx), integrity violations (23xxx) and `RAISE EXCEPTION`
/// without an explicit code (P0001) are problems with the submitted answers.
fn is_validation_code(code: Option<&str>) -> bool {
    matches!(
        code,
        Some(code) if code.starts_with("22") || code.starts_with("23") || code == "P0001"
    )
}
