use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::{Attempt, GradeRow, ResponseDetail};

pub(crate) async fn grade_and_record(
    executor: impl sqlx::PgExecutor<'_>,
    answers: &serde_json::Value,
) -> Result<GradeRow, sqlx::Error> {
    sqlx::query_as::<_, GradeRow>(
        "SELECT attempt_id, score, total
         FROM grade_and_record($1::jsonb)",
    )
    .bind(answers)
    .fetch_one(executor)
    .await
}

pub(crate) async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(
        "SELECT id, score, total, created_at
         FROM attempts
         ORDER BY created_at DESC, id
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_responses(
    pool: &PgPool,
    attempt_ids: &[Uuid],
) -> Result<Vec<ResponseDetail>, sqlx::Error> {
    if attempt_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, ResponseDetail>(
        "SELECT r.attempt_id,
                q.prompt AS question_prompt,
                c.label AS choice_label,
                r.is_correct
         FROM responses r
         LEFT JOIN questions q ON q.id = r.question_id
         LEFT JOIN choices c ON c.id = r.choice_id
         WHERE r.attempt_id = ANY($1)
         ORDER BY r.attempt_id, q.created_at ASC NULLS LAST, r.id",
    )
    .bind(attempt_ids)
    .fetch_all(pool)
    .await
}
