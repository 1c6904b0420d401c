use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::{ChoiceRow, CorrectChoiceRow, QuestionRow};

pub(crate) async fn list_ordered(pool: &PgPool) -> Result<Vec<QuestionRow>, sqlx::Error> {
    sqlx::query_as::<_, QuestionRow>(
        "SELECT id, prompt, created_at
         FROM questions
         ORDER BY created_at ASC, id",
    )
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_choices(pool: &PgPool) -> Result<Vec<ChoiceRow>, sqlx::Error> {
    sqlx::query_as::<_, ChoiceRow>(
        "SELECT id, question_id, label
         FROM choices
         ORDER BY created_at ASC, id",
    )
    .fetch_all(pool)
    .await
}

/// Correct choices for the given questions. Only used once an attempt has
/// been graded.
pub(crate) async fn list_correct_choices(
    executor: impl sqlx::PgExecutor<'_>,
    question_ids: &[Uuid],
) -> Result<Vec<CorrectChoiceRow>, sqlx::Error> {
    if question_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, CorrectChoiceRow>(
        "SELECT id, question_id
         FROM choices
         WHERE is_correct AND question_id = ANY($1)",
    )
    .bind(question_ids)
    .fetch_all(executor)
    .await
}
