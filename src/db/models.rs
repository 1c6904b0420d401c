use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub(crate) struct Fact {
    pub(crate) id: Uuid,
    pub(crate) text: String,
    pub(crate) created_at: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct QuestionRow {
    pub(crate) id: Uuid,
    pub(crate) prompt: String,
    pub(crate) created_at: OffsetDateTime,
}

/// Client-visible choice columns; `is_correct` is never selected here.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct ChoiceRow {
    pub(crate) id: Uuid,
    pub(crate) question_id: Uuid,
    pub(crate) label: String,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct CorrectChoiceRow {
    pub(crate) id: Uuid,
    pub(crate) question_id: Uuid,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct Attempt {
    pub(crate) id: Uuid,
    pub(crate) score: i32,
    pub(crate) total: i32,
    pub(crate) created_at: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct ResponseDetail {
    pub(crate) attempt_id: Uuid,
    pub(crate) question_prompt: Option<String>,
    pub(crate) choice_label: Option<String>,
    pub(crate) is_correct: bool,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct GradeRow {
    pub(crate) attempt_id: Uuid,
    pub(crate) score: i32,
    pub(crate) total: i32,
}
