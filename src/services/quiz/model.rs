use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct QuestionId(String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct ChoiceId(String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct AttemptId(String);

impl QuestionId {
    pub(crate) fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

impl ChoiceId {
    pub(crate) fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

impl AttemptId {
    pub(crate) fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ChoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A selectable option. Correctness is deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct Choice {
    pub(crate) id: ChoiceId,
    pub(crate) label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct Question {
    pub(crate) id: QuestionId,
    pub(crate) prompt: String,
    pub(crate) choices: Vec<Choice>,
}

impl Question {
    pub(crate) fn has_choice(&self, choice_id: &ChoiceId) -> bool {
        self.choices.iter().any(|choice| &choice.id == choice_id)
    }
}

/// One `(question, choice)` pair as sent to grading.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub(crate) struct AnswerPair {
    pub(crate) question_id: QuestionId,
    pub(crate) choice_id: ChoiceId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct GradedResult {
    pub(crate) attempt_id: AttemptId,
    pub(crate) score: u32,
    pub(crate) total: u32,
}

/// Correct choices per question, released by grading alongside the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct AnswerKey {
    correct: HashMap<QuestionId, HashSet<ChoiceId>>,
}

impl AnswerKey {
    pub(crate) fn insert(&mut self, question_id: QuestionId, choice_id: ChoiceId) {
        self.correct.entry(question_id).or_default().insert(choice_id);
    }

    pub(crate) fn is_correct(&self, question_id: &QuestionId, choice_id: &ChoiceId) -> bool {
        self.correct.get(question_id).is_some_and(|choices| choices.contains(choice_id))
    }

    pub(crate) fn covers(&self, question_id: &QuestionId) -> bool {
        self.correct.contains_key(question_id)
    }
}

impl FromIterator<(QuestionId, ChoiceId)> for AnswerKey {
    fn from_iter<I: IntoIterator<Item = (QuestionId, ChoiceId)>>(iter: I) -> Self {
        let mut key = AnswerKey::default();
        for (question_id, choice_id) in iter {
            key.insert(question_id, choice_id);
        }
        key
    }
}

/// What a successful grading call hands back to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GradeReport {
    pub(crate) result: GradedResult,
    pub(crate) answer_key: AnswerKey,
}
