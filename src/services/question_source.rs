use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::models::{ChoiceRow, QuestionRow};
use crate::repositories;
use crate::services::errors::DataUnavailable;
use crate::services::quiz::{Choice, ChoiceId, Question, QuestionId};

#[async_trait]
pub(crate) trait QuestionSource: Send + Sync {
    /// Questions oldest first, each with its choices. Never carries correctness.
    async fn fetch_questions(&self) -> Result<Vec<Question>, DataUnavailable>;
}

#[derive(Debug, Clone)]
pub(crate) struct PgQuestionSource {
    pool: PgPool,
}

impl PgQuestionSource {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuestionSource for PgQuestionSource {
    async fn fetch_questions(&self) -> Result<Vec<Question>, DataUnavailable> {
        let questions = repositories::questions::list_ordered(&self.pool)
            .await
            .map_err(|err| DataUnavailable::new("questions", err))?;
        let choices = repositories::questions::list_choices(&self.pool)
            .await
            .map_err(|err| DataUnavailable::new("choices", err))?;

        Ok(shape_questions(questions, choices))
    }
}

/// Groups choices under their question, keeping both fetch orders.
pub(crate) fn shape_questions(
    questions: Vec<QuestionRow>,
    choices: Vec<ChoiceRow>,
) -> Vec<Question> {
    let mut by_question: HashMap<uuid::Uuid, Vec<Choice>> = HashMap::new();
    for choice in choices {
        by_question
            .entry(choice.question_id)
            .or_default()
            .push(Choice { id: ChoiceId::new(choice.id.to_string()), label: choice.label });
    }

    questions
        .into_iter()
        .map(|question| Question {
            id: QuestionId::new(question.id.to_string()),
            prompt: question.prompt,
            choices: by_question.remove(&question.id).unwrap_or_default(),
        })
        .collect()
}
