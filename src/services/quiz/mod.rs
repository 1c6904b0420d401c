pub(crate) mod model;
pub(crate) mod session;
pub(crate) mod store;
pub(crate) mod view;

pub(crate) use model::{
    AnswerKey, AnswerPair, AttemptId, Choice, ChoiceId, GradeReport, GradedResult, Question,
    QuestionId,
};
pub(crate) use session::{AnswerError, QuizSession, SessionState, SubmitRejection};
pub(crate) use store::{SessionStore, StoreError};
pub(crate) use view::QuizView;
