use std::collections::HashMap;
use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use thiserror::Error;

use super::model::{
    AnswerKey, AnswerPair, ChoiceId, GradeReport, GradedResult, Question, QuestionId,
};
use crate::services::grading::GradingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum SessionState {
    Loading,
    Answering,
    Submitting,
    Graded,
}

impl SessionState {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            SessionState::Loading => "loading",
            SessionState::Answering => "answering",
            SessionState::Submitting => "submitting",
            SessionState::Graded => "graded",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum AnswerError {
    #[error("answers cannot change while the quiz is {0}")]
    NotAnswering(SessionState),
    #[error("question {0} is not part of this quiz")]
    UnknownQuestion(QuestionId),
    #[error("choice {choice_id} is not an option for question {question_id}")]
    UnknownChoice { question_id: QuestionId, choice_id: ChoiceId },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum SubmitRejection {
    #[error("the quiz has not started yet")]
    NotStarted,
    #[error("{answered} of {total} questions answered")]
    Incomplete { answered: usize, total: usize },
    #[error("a submission is already being graded")]
    InFlight,
    #[error("the quiz has already been graded")]
    AlreadyGraded,
}

/// Answer snapshot taken when a submission begins. Hand it back to
/// [`QuizSession::complete_submit`] with the grading outcome.
#[derive(Debug)]
#[must_use]
pub(crate) struct SubmissionTicket {
    answers: Vec<AnswerPair>,
}

impl SubmissionTicket {
    pub(crate) fn answers(&self) -> &[AnswerPair] {
        &self.answers
    }
}

/// One pass through a fixed question set, from presentation to grading.
///
/// `loading -> answering -> submitting -> graded`, with a failed grading call
/// returning to `answering` and keeping every captured answer.
#[derive(Debug)]
pub(crate) struct QuizSession {
    questions: Vec<Question>,
    answers: HashMap<QuestionId, ChoiceId>,
    state: SessionState,
    report: Option<GradeReport>,
    last_error: Option<String>,
}

impl QuizSession {
    pub(crate) fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            answers: HashMap::new(),
            state: SessionState::Loading,
            report: None,
            last_error: None,
        }
    }

    /// Shuffles every question's choices independently and opens the session
    /// for answers. Only the first call has an effect.
    pub(crate) fn start<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if self.state != SessionState::Loading {
            return false;
        }

        for question in &mut self.questions {
            question.choices.shuffle(rng);
        }
        self.state = SessionState::Answering;
        true
    }

    pub(crate) fn select_answer(
        &mut self,
        question_id: QuestionId,
        choice_id: ChoiceId,
    ) -> Result<(), AnswerError> {
        if self.state != SessionState::Answering {
            return Err(AnswerError::NotAnswering(self.state));
        }

        let question = self
            .questions
            .iter()
            .find(|question| question.id == question_id)
            .ok_or_else(|| AnswerError::UnknownQuestion(question_id.clone()))?;

        if !question.has_choice(&choice_id) {
            return Err(AnswerError::UnknownChoice { question_id, choice_id });
        }

        self.answers.insert(question_id, choice_id);
        Ok(())
    }

    /// Moves to `submitting` and captures the answers to grade.
    pub(crate) fn begin_submit(&mut self) -> Result<SubmissionTicket, SubmitRejection> {
        match self.state {
            SessionState::Loading => return Err(SubmitRejection::NotStarted),
            SessionState::Submitting => return Err(SubmitRejection::InFlight),
            SessionState::Graded => return Err(SubmitRejection::AlreadyGraded),
            SessionState::Answering => {}
        }

        if !self.all_answered() {
            return Err(SubmitRejection::Incomplete {
                answered: self.answered_count(),
                total: self.questions.len(),
            });
        }

        let answers = self
            .questions
            .iter()
            .filter_map(|question| {
                self.answers.get(&question.id).map(|choice_id| AnswerPair {
                    question_id: question.id.clone(),
                    choice_id: choice_id.clone(),
                })
            })
            .collect();

        self.last_error = None;
        self.state = SessionState::Submitting;
        Ok(SubmissionTicket { answers })
    }

    /// Records the grading outcome for a ticket from [`Self::begin_submit`].
    pub(crate) fn complete_submit(
        &mut self,
        ticket: SubmissionTicket,
        outcome: Result<GradeReport, GradingError>,
    ) -> SessionState {
        if self.state != SessionState::Submitting {
            tracing::warn!(
                state = %self.state,
                answers = ticket.answers.len(),
                "Grading outcome arrived for a session that is not submitting"
            );
            return self.state;
        }

        match outcome {
            Ok(report) => {
                if report.result.total as usize != self.questions.len() {
                    tracing::warn!(
                        attempt_id = %report.result.attempt_id,
                        total = report.result.total,
                        presented = self.questions.len(),
                        "Graded total differs from the number of presented questions"
                    );
                }
                self.report = Some(report);
                self.state = SessionState::Graded;
            }
            Err(err) => {
                tracing::warn!(kind = err.kind(), error = %err, "Grading failed");
                self.last_error = Some(err.to_string());
                self.state = SessionState::Answering;
            }
        }

        self.state
    }

    /// Puts a `submitting` session back to `answering` when its grading
    /// outcome can no longer arrive. Answers are kept.
    pub(crate) fn abandon_submit(&mut self, reason: &str) -> SessionState {
        if self.state == SessionState::Submitting {
            self.last_error = Some(reason.to_string());
            self.state = SessionState::Answering;
        }
        self.state
    }

    pub(crate) fn state(&self) -> SessionState {
        self.state
    }

    pub(crate) fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub(crate) fn answer(&self, question_id: &QuestionId) -> Option<&ChoiceId> {
        self.answers.get(question_id)
    }

    pub(crate) fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub(crate) fn all_answered(&self) -> bool {
        self.questions.iter().all(|question| self.answers.contains_key(&question.id))
    }

    pub(crate) fn can_submit(&self) -> bool {
        self.state == SessionState::Answering && self.all_answered()
    }

    pub(crate) fn result(&self) -> Option<&GradedResult> {
        self.report.as_ref().map(|report| &report.result)
    }

    pub(crate) fn answer_key(&self) -> Option<&AnswerKey> {
        match self.state {
            SessionState::Graded => self.report.as_ref().map(|report| &report.answer_key),
            _ => None,
        }
    }

    pub(crate) fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

#[cfg(test)]
impl QuizSession {
    /// Single-owner submission: snapshot, one grading call, record outcome.
    pub(crate) async fn submit(
        &mut self,
        grader: &dyn crate::services::grading::GradingService,
    ) -> Result<SessionState, SubmitRejection> {
        let ticket = self.begin_submit()?;
        let outcome = grader.grade(ticket.answers()).await;
        Ok(self.complete_submit(ticket, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::test_support::{self, ScriptedGrader};

    fn started(seed: u64) -> QuizSession {
        let mut session = QuizSession::new(test_support::sample_questions());
        session.start(&mut StdRng::seed_from_u64(seed));
        session
    }

    fn choice_ids(question: &Question) -> Vec<String> {
        question.choices.iter().map(|choice| choice.id.as_str().to_string()).collect()
    }

    fn answer_all(session: &mut QuizSession) {
        session.select_answer(QuestionId::new("q1"), ChoiceId::new("q1-a")).unwrap();
        session.select_answer(QuestionId::new("q2"), ChoiceId::new("q2-c")).unwrap();
    }

    #[test]
    fn new_session_keeps_source_order_until_started() {
        let session = QuizSession::new(test_support::sample_questions());
        assert_eq!(session.state(), SessionState::Loading);
        assert_eq!(choice_ids(&session.questions()[0]), vec!["q1-a", "q1-b", "q1-c"]);
        assert!(!session.can_submit());
    }

    #[test]
    fn start_permutes_choices_without_changing_membership() {
        let source = test_support::sample_questions();
        for seed in 0..32 {
            let session = started(seed);
            assert_eq!(session.state(), SessionState::Answering);
            for (shuffled, original) in session.questions().iter().zip(&source) {
                assert_eq!(shuffled.id, original.id);
                let mut left = choice_ids(shuffled);
                let mut right = choice_ids(original);
                left.sort();
                right.sort();
                assert_eq!(left, right);
            }
        }
    }

    #[test]
    fn start_is_deterministic_for_a_seed_and_applies_once() {
        let mut first = started(7);
        let second = started(7);
        let before: Vec<_> = first.questions().iter().map(choice_ids).collect();
        let same_seed: Vec<_> = second.questions().iter().map(choice_ids).collect();
        assert_eq!(before, same_seed);

        assert!(!first.start(&mut StdRng::seed_from_u64(99)));
        let after: Vec<_> = first.questions().iter().map(choice_ids).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn question_order_is_fixed() {
        let session = started(3);
        let ids: Vec<_> = session.questions().iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["q1", "q2"]);
    }

    #[test]
    fn select_answer_before_start_is_rejected() {
        let mut session = QuizSession::new(test_support::sample_questions());
        let err = session.select_answer(QuestionId::new("q1"), ChoiceId::new("q1-a")).unwrap_err();
        assert_eq!(err, AnswerError::NotAnswering(SessionState::Loading));
        assert_eq!(session.answered_count(), 0);
    }

    #[test]
    fn select_answer_overwrites_and_tracks_completion() {
        let mut session = started(1);
        session.select_answer(QuestionId::new("q1"), ChoiceId::new("q1-b")).unwrap();
        assert!(!session.all_answered());

        session.select_answer(QuestionId::new("q1"), ChoiceId::new("q1-a")).unwrap();
        assert_eq!(session.answered_count(), 1);
        assert_eq!(session.answer(&QuestionId::new("q1")), Some(&ChoiceId::new("q1-a")));

        session.select_answer(QuestionId::new("q2"), ChoiceId::new("q2-a")).unwrap();
        assert!(session.all_answered());
        assert!(session.can_submit());
    }

    #[test]
    fn select_answer_validates_ids() {
        let mut session = started(1);
        assert_eq!(
            session.select_answer(QuestionId::new("q9"), ChoiceId::new("q1-a")),
            Err(AnswerError::UnknownQuestion(QuestionId::new("q9")))
        );
        assert_eq!(
            session.select_answer(QuestionId::new("q1"), ChoiceId::new("q2-a")),
            Err(AnswerError::UnknownChoice {
                question_id: QuestionId::new("q1"),
                choice_id: ChoiceId::new("q2-a"),
            })
        );
        assert_eq!(session.answered_count(), 0);
    }

    #[tokio::test]
    async fn submit_with_missing_answers_does_not_call_grading() {
        let grader = ScriptedGrader::new();
        let mut session = started(2);
        session.select_answer(QuestionId::new("q1"), ChoiceId::new("q1-a")).unwrap();

        let rejection = session.submit(&grader).await.unwrap_err();
        assert_eq!(rejection, SubmitRejection::Incomplete { answered: 1, total: 2 });
        assert_eq!(session.state(), SessionState::Answering);
        assert_eq!(grader.call_count(), 0);
    }

    #[tokio::test]
    async fn grading_receives_exactly_the_answered_pairs() {
        for seed in [0, 5, 11] {
            let grader =
                ScriptedGrader::new().respond(Ok(test_support::report("abc123", 1, 2)));
            let mut session = started(seed);
            answer_all(&mut session);

            session.submit(&grader).await.expect("submitted");

            let calls = grader.calls();
            assert_eq!(calls.len(), 1);
            let mut sent: Vec<_> = calls[0]
                .iter()
                .map(|pair| {
                    (pair.question_id.as_str().to_string(), pair.choice_id.as_str().to_string())
                })
                .collect();
            sent.sort();
            assert_eq!(
                sent,
                vec![
                    ("q1".to_string(), "q1-a".to_string()),
                    ("q2".to_string(), "q2-c".to_string()),
                ]
            );
        }
    }

    #[test]
    fn second_submit_while_in_flight_is_rejected() {
        let mut session = started(4);
        answer_all(&mut session);

        let ticket = session.begin_submit().expect("first submit");
        assert_eq!(session.begin_submit().unwrap_err(), SubmitRejection::InFlight);
        assert_eq!(
            session.select_answer(QuestionId::new("q1"), ChoiceId::new("q1-b")),
            Err(AnswerError::NotAnswering(SessionState::Submitting))
        );

        let state = session.complete_submit(ticket, Ok(test_support::report("abc123", 1, 2)));
        assert_eq!(state, SessionState::Graded);
        assert_eq!(session.answer(&QuestionId::new("q1")), Some(&ChoiceId::new("q1-a")));
    }

    #[tokio::test]
    async fn graded_session_is_terminal() {
        let grader = ScriptedGrader::new()
            .respond(Ok(test_support::report("abc123", 1, 2)))
            .respond(Ok(test_support::report("other", 2, 2)));
        let mut session = started(6);
        answer_all(&mut session);

        assert_eq!(session.submit(&grader).await, Ok(SessionState::Graded));
        assert_eq!(session.submit(&grader).await, Err(SubmitRejection::AlreadyGraded));
        assert_eq!(
            session.select_answer(QuestionId::new("q2"), ChoiceId::new("q2-b")),
            Err(AnswerError::NotAnswering(SessionState::Graded))
        );

        assert_eq!(grader.call_count(), 1);
        let result = session.result().expect("result");
        assert_eq!(result.attempt_id.as_str(), "abc123");
        assert_eq!((result.score, result.total), (1, 2));
    }

    #[tokio::test]
    async fn grading_failure_returns_to_answering_with_answers_intact() {
        let grader = ScriptedGrader::new()
            .respond(Err(GradingError::Transport("connection reset".to_string())))
            .respond(Ok(test_support::report("abc123", 1, 2)));
        let mut session = started(8);
        answer_all(&mut session);

        assert_eq!(session.submit(&grader).await, Ok(SessionState::Answering));
        assert_eq!(session.answer(&QuestionId::new("q1")), Some(&ChoiceId::new("q1-a")));
        assert_eq!(session.answer(&QuestionId::new("q2")), Some(&ChoiceId::new("q2-c")));
        assert!(session.last_error().is_some_and(|message| message.contains("connection reset")));
        assert!(session.all_answered());
        assert!(session.can_submit());
        assert!(session.result().is_none());

        assert_eq!(session.submit(&grader).await, Ok(SessionState::Graded));
        assert!(session.last_error().is_none());
        assert_eq!(grader.call_count(), 2);
    }

    #[test]
    fn answer_key_is_withheld_until_graded() {
        let mut session = started(9);
        answer_all(&mut session);
        let ticket = session.begin_submit().expect("submit");
        assert!(session.answer_key().is_none());

        session.complete_submit(ticket, Ok(test_support::report("abc123", 1, 2)));
        assert!(session.answer_key().is_some());
    }

    #[test]
    fn empty_quiz_is_vacuously_complete() {
        let mut session = QuizSession::new(Vec::new());
        session.start(&mut StdRng::seed_from_u64(0));
        assert!(session.all_answered());
        let ticket = session.begin_submit().expect("empty submit");
        assert!(ticket.answers().is_empty());
    }

    #[test]
    fn abandoned_submit_returns_to_answering() {
        let mut session = started(10);
        answer_all(&mut session);
        let ticket = session.begin_submit().expect("submit");

        assert_eq!(session.abandon_submit("grading did not complete"), SessionState::Answering);
        assert_eq!(session.last_error(), Some("grading did not complete"));
        assert!(session.can_submit());
        assert_eq!(session.answer(&QuestionId::new("q2")), Some(&ChoiceId::new("q2-c")));

        assert_eq!(
            session.complete_submit(ticket, Ok(test_support::report("late", 1, 2))),
            SessionState::Answering
        );
        assert!(session.result().is_none());
        assert_eq!(session.abandon_submit("again"), SessionState::Answering);
        assert_eq!(session.last_error(), Some("grading did not complete"));
    }
}
