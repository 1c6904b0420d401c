use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::core::{metrics, state::AppState};
use crate::schemas::quiz::{QuestionResponse, QuizSessionResponse, SelectAnswerRequest};
use crate::services::quiz::{
    ChoiceId, QuestionId, QuizSession, SessionState, StoreError, SubmitRejection,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/questions", get(list_questions))
        .route("/sessions", post(create_session))
        .route("/sessions/:session_id", get(get_session).delete(delete_session))
        .route("/sessions/:session_id/answers/:question_id", put(select_answer))
        .route("/sessions/:session_id/submit", post(submit_session))
}

async fn list_questions(
    State(state): State<AppState>,
) -> Result<Json<Vec<QuestionResponse>>, ApiError> {
    let questions = state.questions().fetch_questions().await?;
    Ok(Json(questions.into_iter().map(QuestionResponse::from).collect()))
}

async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<QuizSessionResponse>), ApiError> {
    let questions = state.questions().fetch_questions().await?;
    let question_count = questions.len();

    let mut session = QuizSession::new(questions);
    let mut rng = StdRng::from_entropy();
    session.start(&mut rng);
    let view = session.current_view();

    let session_id = state.sessions().insert(session).await?;
    metrics::quiz_session_started(question_count);
    tracing::info!(%session_id, questions = question_count, "Quiz session started");

    Ok((StatusCode::CREATED, Json(QuizSessionResponse::new(session_id, view))))
}

async fn get_session(
    Path(session_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<QuizSessionResponse>, ApiError> {
    let view = state.sessions().view(session_id).await?;
    Ok(Json(QuizSessionResponse::new(session_id, view)))
}

async fn select_answer(
    Path((session_id, question_id)): Path<(Uuid, String)>,
    State(state): State<AppState>,
    Json(payload): Json<SelectAnswerRequest>,
) -> Result<Json<QuizSessionResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let question_id = QuestionId::new(question_id);
    let choice_id = ChoiceId::new(payload.choice_id);
    let view = state
        .sessions()
        .with_session(session_id, |session| {
            session.select_answer(question_id, choice_id)?;
            Ok::<_, ApiError>(session.current_view())
        })
        .await??;

    Ok(Json(QuizSessionResponse::new(session_id, view)))
}

async fn submit_session(
    Path(session_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<QuizSessionResponse>, ApiError> {
    let outcome = state.sessions().submit(session_id, state.grader()).await;

    match &outcome {
        Ok(view) if view.state == SessionState::Graded => {
            metrics::quiz_submission("graded");
            if let Some(result) = &view.result {
                tracing::info!(
                    %session_id,
                    attempt_id = %result.attempt_id,
                    score = result.score,
                    total = result.total,
                    "Quiz graded"
                );
            }
        }
        Ok(view) => {
            metrics::quiz_submission("failed");
            tracing::warn!(
                %session_id,
                error = view.error.as_deref().unwrap_or("-"),
                "Quiz grading failed"
            );
        }
        Err(StoreError::Rejected(SubmitRejection::Incomplete { .. })) => {
            metrics::quiz_submission("incomplete");
        }
        Err(StoreError::Rejected(_)) => metrics::quiz_submission("rejected"),
        Err(_) => {}
    }

    Ok(Json(QuizSessionResponse::new(session_id, outcome?)))
}

async fn delete_session(
    Path(session_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    if state.sessions().remove(session_id).await {
        tracing::debug!(%session_id, "Quiz session dropped");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StoreError::NotFound.into())
    }
}
