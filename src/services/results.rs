use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::time::format_offset;
use crate::db::models::{Attempt, ResponseDetail};
use crate::repositories;
use crate::schemas::results::{AttemptResponse, ResponseItem};
use crate::services::errors::DataUnavailable;

const SHORT_ID_LEN: usize = 8;

/// Most recent attempts, newest first, each with its per-question responses.
pub(crate) async fn recent_results(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<AttemptResponse>, DataUnavailable> {
    let attempts = repositories::attempts::list_recent(pool, limit)
        .await
        .map_err(|err| DataUnavailable::new("attempts", err))?;

    let ids: Vec<Uuid> = attempts.iter().map(|attempt| attempt.id).collect();
    let responses = repositories::attempts::list_responses(pool, &ids)
        .await
        .map_err(|err| DataUnavailable::new("responses", err))?;

    Ok(attach_responses(attempts, responses))
}

pub(crate) fn attach_responses(
    attempts: Vec<Attempt>,
    responses: Vec<ResponseDetail>,
) -> Vec<AttemptResponse> {
    let mut by_attempt: HashMap<Uuid, Vec<ResponseItem>> = HashMap::new();
    for response in responses {
        by_attempt.entry(response.attempt_id).or_default().push(ResponseItem {
            question: response.question_prompt.unwrap_or_default(),
            choice: response.choice_label.unwrap_or_default(),
            correct: response.is_correct,
        });
    }

    attempts
        .into_iter()
        .map(|attempt| {
            let id = attempt.id.to_string();
            AttemptResponse {
                short_id: id.chars().take(SHORT_ID_LEN).collect(),
                id,
                created_at: format_offset(attempt.created_at),
                score: attempt.score,
                total: attempt.total,
                responses: by_attempt.remove(&attempt.id).unwrap_or_default(),
            }
        })
        .collect()
}
