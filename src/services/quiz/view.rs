use serde::Serialize;

use super::model::{ChoiceId, GradedResult, QuestionId};
use super::session::{QuizSession, SessionState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ChoiceMark {
    Correct,
    Incorrect,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ChoiceView {
    pub(crate) id: ChoiceId,
    pub(crate) label: String,
    pub(crate) selected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) mark: Option<ChoiceMark>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct QuestionView {
    pub(crate) id: QuestionId,
    pub(crate) position: usize,
    pub(crate) prompt: String,
    pub(crate) selected_choice_id: Option<ChoiceId>,
    pub(crate) choices: Vec<ChoiceView>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct QuizView {
    pub(crate) state: SessionState,
    pub(crate) questions: Vec<QuestionView>,
    pub(crate) answered: usize,
    pub(crate) total: usize,
    pub(crate) all_answered: bool,
    pub(crate) can_submit: bool,
    pub(crate) error: Option<String>,
    pub(crate) result: Option<GradedResult>,
}

impl QuizSession {
    /// Read-only projection of the session. Correctness marks appear only
    /// once the session is graded.
    pub(crate) fn current_view(&self) -> QuizView {
        let answer_key = self.answer_key();

        let questions = self
            .questions()
            .iter()
            .enumerate()
            .map(|(index, question)| {
                let selected = self.answer(&question.id);
                let choices = question
                    .choices
                    .iter()
                    .map(|choice| {
                        let is_selected = selected == Some(&choice.id);
                        let mark = answer_key.and_then(|key| {
                            if key.is_correct(&question.id, &choice.id) {
                                Some(ChoiceMark::Correct)
                            } else if is_selected && key.covers(&question.id) {
                                Some(ChoiceMark::Incorrect)
                            } else {
                                None
                            }
                        });
                        ChoiceView {
                            id: choice.id.clone(),
                            label: choice.label.clone(),
                            selected: is_selected,
                            mark,
                        }
                    })
                    .collect();

                QuestionView {
                    id: question.id.clone(),
                    position: index + 1,
                    prompt: question.prompt.clone(),
                    selected_choice_id: selected.cloned(),
                    choices,
                }
            })
            .collect();

        QuizView {
            state: self.state(),
            questions,
            answered: self.answered_count(),
            total: self.questions().len(),
            all_answered: self.all_answered(),
            can_submit: self.can_submit(),
            error: self.last_error().map(str::to_string),
            result: self.result().cloned(),
        }
    }
}
