use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::services::quiz::{Question, QuizView};

#[derive(Debug, Serialize)]
pub(crate) struct ChoiceResponse {
    pub(crate) id: String,
    pub(crate) label: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionResponse {
    pub(crate) id: String,
    pub(crate) prompt: String,
    pub(crate) choices: Vec<ChoiceResponse>,
}

impl From<Question> for QuestionResponse {
    fn from(question: Question) -> Self {
        Self {
            id: question.id.as_str().to_string(),
            prompt: question.prompt,
            choices: question
                .choices
                .into_iter()
                .map(|choice| ChoiceResponse {
                    id: choice.id.as_str().to_string(),
                    label: choice.label,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct SelectAnswerRequest {
    #[validate(length(min = 1, max = 128))]
    pub(crate) choice_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizSessionResponse {
    pub(crate) session_id: Uuid,
    #[serde(flatten)]
    pub(crate) view: QuizView,
}

impl QuizSessionResponse {
    pub(crate) fn new(session_id: Uuid, view: QuizView) -> Self {
        Self { session_id, view }
    }
}
