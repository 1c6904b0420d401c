use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{score_from, GradingError, GradingService};
use crate::core::config::Settings;
use crate::services::quiz::{
    AnswerKey, AnswerPair, AttemptId, ChoiceId, GradeReport, GradedResult, QuestionId,
};

/// Grades through a PostgREST-style RPC endpoint
/// (`POST {base}/rest/v1/rpc/grade_and_record`).
#[derive(Debug, Clone)]
pub(crate) struct RestGradingService {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GradeRow {
    attempt_id: String,
    score: i64,
    total: i64,
}

#[derive(Debug, Deserialize)]
struct KeyRow {
    id: String,
    question_id: String,
}

impl RestGradingService {
    pub(crate) fn from_settings(settings: &Settings) -> Result<Self> {
        let grading = settings.grading();
        Self::new(
            &grading.rest_url,
            &grading.rest_api_key,
            Duration::from_secs(grading.request_timeout),
        )
    }

    fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()
            .context("Failed to build grading HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        if self.api_key.is_empty() {
            return request;
        }
        request.header("apikey", &self.api_key).bearer_auth(&self.api_key)
    }

    async fn fetch_answer_key(&self, answers: &[AnswerPair]) -> Result<AnswerKey, GradingError> {
        if answers.is_empty() {
            return Ok(AnswerKey::default());
        }

        let ids =
            answers.iter().map(|pair| pair.question_id.as_str()).collect::<Vec<_>>().join(",");
        let url = format!("{}/rest/v1/choices", self.base_url);
        let response = self
            .authorize(self.client.get(&url))
            .query(&[
                ("select", "id,question_id".to_string()),
                ("is_correct", "eq.true".to_string()),
                ("question_id", format!("in.({ids})")),
            ])
            .send()
            .await
            .map_err(|err| GradingError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GradingError::Transport(format!("answer key request failed: {status}")));
        }

        let rows: Vec<KeyRow> =
            response.json().await.map_err(|err| GradingError::InvalidResponse(err.to_string()))?;
        Ok(rows
            .into_iter()
            .map(|row| (QuestionId::new(row.question_id), ChoiceId::new(row.id)))
            .collect())
    }
}

#[async_trait]
impl GradingService for RestGradingService {
    async fn grade(&self, answers: &[AnswerPair]) -> Result<GradeReport, GradingError> {
        let url = format!("{}/rest/v1/rpc/grade_and_record", self.base_url);
        tracing::info!(answers = answers.len(), "Sending grading request");

        let response = self
            .authorize(self.client.post(&url))
            .json(&json!({ "answers": answers }))
            .send()
            .await
            .map_err(|err| GradingError::Transport(err.to_string()))?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        let result = parse_grade_payload(&body)?;

        let answer_key = match self.fetch_answer_key(answers).await {
            Ok(key) => key,
            Err(err) => {
                // The attempt is already recorded; report it without marks.
                tracing::warn!(
                    attempt_id = %result.attempt_id,
                    error = %err,
                    "Graded attempt without answer key"
                );
                AnswerKey::default()
            }
        };

        tracing::info!(
            attempt_id = %result.attempt_id,
            score = result.score,
            total = result.total,
            "Attempt graded"
        );

        Ok(GradeReport { result, answer_key })
    }
}

/// Accepts the RPC result as an object or as a one-row table.
fn parse_grade_payload(body: &Value) -> Result<GradedResult, GradingError> {
    let row = match body {
        Value::Array(rows) => rows
            .first()
            .ok_or_else(|| GradingError::InvalidResponse("empty grading result".to_string()))?,
        Value::Object(_) => body,
        other => {
            return Err(GradingError::InvalidResponse(format!("unexpected grading body: {other}")))
        }
    };

    let row: GradeRow = serde_json::from_value(row.clone())
        .map_err(|err| GradingError::InvalidResponse(err.to_string()))?;
    if row.attempt_id.trim().is_empty() {
        return Err(GradingError::InvalidResponse("missing attempt_id".to_string()));
    }

    Ok(GradedResult {
        attempt_id: AttemptId::new(row.attempt_id),
        score: score_from("score", row.score)?,
        total: score_from("total", row.total)?,
    })
}

fn status_error(status: StatusCode, body: &Value) -> GradingError {
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{status}: {body}"));

    let auth_failure = status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN;
    if status.is_client_error() && !auth_failure {
        GradingError::Rejected(message)
    } else {
        GradingError::Transport(message)
    }
}
