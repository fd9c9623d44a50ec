use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

use super::answers::AnswerStore;
use super::domain::{AnswerVector, ManifestoId, Ordinal, QuestionId, QuestionSet, ResultsPayload};
use super::expander::DetailExpander;
use super::presenter::{displayed_ids, ranking_defect, results_view};
use super::views::{OptionView, QuestionView, ResultsView, SessionPhase, SessionView};

/// Lifecycle of one quiz session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Loading,
    Ready,
    Submitting,
    Results(ResultsPayload),
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        match self {
            Self::Loading => SessionPhase::Loading,
            Self::Ready => SessionPhase::Ready,
            Self::Submitting => SessionPhase::Submitting,
            Self::Results(_) => SessionPhase::Results,
        }
    }
}

/// Identifies the request a completion belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    generation: u64,
}

/// A scoring request the caller must send, then report back through
/// [`QuizSession::complete_submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    ticket: RequestTicket,
    answers: AnswerVector,
}

impl SubmitRequest {
    pub fn ticket(&self) -> RequestTicket {
        self.ticket
    }

    pub fn answers(&self) -> &AnswerVector {
        &self.answers
    }
}

/// What a completion did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The response was applied.
    Applied,
    /// The request failed; the session fell back without surfacing an error.
    Degraded,
    /// The request no longer matches the session and was ignored.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    QuestionLoad,
    Submission,
}

impl FailureStage {
    pub const fn label(self) -> &'static str {
        match self {
            Self::QuestionLoad => "question load",
            Self::Submission => "submission",
        }
    }
}

/// Diagnostic record of a failed request. Never shown as a user-facing error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionFailure {
    pub stage: FailureStage,
    pub message: String,
    pub recorded_at: DateTime<Utc>,
}

/// Transition rejected by the session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("cannot submit while {phase}")]
    SubmitRejected { phase: PhaseName },
    #[error("answers are not accepted while {phase}")]
    NotAccepting { phase: PhaseName },
    #[error("reset is only available from the results view (currently {phase})")]
    ResetRejected { phase: PhaseName },
    #[error("no results are displayed")]
    NoResults,
    #[error("manifesto {manifesto_id} is not among the displayed results")]
    NotDisplayed { manifesto_id: ManifestoId },
}

/// Phase as it appears in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseName(pub SessionPhase);

impl fmt::Display for PhaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.0 {
            SessionPhase::Loading => "loading",
            SessionPhase::Ready => "ready",
            SessionPhase::Submitting => "submitting",
            SessionPhase::Results => "showing results",
        };
        f.write_str(name)
    }
}

/// Single-threaded quiz state machine.
///
/// Owns the question set, the answers, and the expansion state. Requests are
/// issued by the caller: every `begin_*` hands out a [`RequestTicket`] and the
/// matching `complete_*` applies the response. A completion whose ticket is
/// not the latest in flight is dropped.
#[derive(Debug, Clone)]
pub struct QuizSession {
    state: SessionState,
    questions: QuestionSet,
    answers: AnswerStore,
    expander: DetailExpander,
    generation: u64,
    last_failure: Option<SessionFailure>,
}

impl QuizSession {
    /// Starts a session in `Loading` together with the ticket for its single
    /// question-set read.
    pub fn start() -> (Self, RequestTicket) {
        let session = Self {
            state: SessionState::Loading,
            questions: QuestionSet::empty(),
            answers: AnswerStore::new(),
            expander: DetailExpander::new(),
            generation: 0,
            last_failure: None,
        };
        let ticket = session.current_ticket();
        (session, ticket)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase()
    }

    pub fn questions(&self) -> &QuestionSet {
        &self.questions
    }

    pub fn answers(&self) -> &AnswerStore {
        &self.answers
    }

    pub fn expanded(&self) -> Option<&ManifestoId> {
        self.expander.expanded()
    }

    pub fn payload(&self) -> Option<&ResultsPayload> {
        match &self.state {
            SessionState::Results(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn last_failure(&self) -> Option<&SessionFailure> {
        self.last_failure.as_ref()
    }

    /// Applies the question-set read. A failed read leaves an empty survey.
    pub fn complete_load<E: fmt::Display>(
        &mut self,
        ticket: RequestTicket,
        outcome: Result<QuestionSet, E>,
    ) -> CompletionOutcome {
        if !matches!(self.state, SessionState::Loading) || ticket != self.current_ticket() {
            debug!(phase = ?self.phase(), "ignoring stale question-set completion");
            return CompletionOutcome::Stale;
        }

        self.state = SessionState::Ready;
        match outcome {
            Ok(questions) => {
                info!(questions = questions.len(), "question set loaded");
                self.questions = questions;
                CompletionOutcome::Applied
            }
            Err(err) => {
                self.record_failure(FailureStage::QuestionLoad, &err);
                self.questions = QuestionSet::empty();
                CompletionOutcome::Degraded
            }
        }
    }

    /// Upserts an answer. Only the question form (`Ready`) accepts input.
    pub fn answer(&mut self, question_id: QuestionId, value: Ordinal) -> Result<(), SessionError> {
        if !matches!(self.state, SessionState::Ready) {
            return Err(SessionError::NotAccepting {
                phase: PhaseName(self.phase()),
            });
        }
        self.answers.set(question_id, value);
        Ok(())
    }

    /// Builds the answer vector and moves to `Submitting`.
    ///
    /// Rejected unless the session is `Ready`, so a second submit cannot be
    /// issued while one is in flight.
    pub fn begin_submit(&mut self) -> Result<SubmitRequest, SessionError> {
        if !matches!(self.state, SessionState::Ready) {
            return Err(SessionError::SubmitRejected {
                phase: PhaseName(self.phase()),
            });
        }

        let answers = self.answers.answer_vector(&self.questions);
        self.generation += 1;
        self.state = SessionState::Submitting;
        debug!(
            answered = self.answers.answered_in(&self.questions),
            total = answers.len(),
            "submitting answers"
        );

        Ok(SubmitRequest {
            ticket: self.current_ticket(),
            answers,
        })
    }

    /// Applies the scoring response. The payload is stored as received; a
    /// failure returns the session to the question form.
    pub fn complete_submit<E: fmt::Display>(
        &mut self,
        ticket: RequestTicket,
        outcome: Result<ResultsPayload, E>,
    ) -> CompletionOutcome {
        if !matches!(self.state, SessionState::Submitting) || ticket != self.current_ticket() {
            debug!(phase = ?self.phase(), "ignoring stale scoring completion");
            return CompletionOutcome::Stale;
        }

        match outcome {
            Ok(payload) => {
                if let Some(defect) = ranking_defect(&payload.alignment_results) {
                    warn!(%defect, "scoring service returned results out of order");
                }
                info!(
                    results = payload.alignment_results.len(),
                    "alignment results received"
                );
                self.expander.collapse();
                self.state = SessionState::Results(payload);
                CompletionOutcome::Applied
            }
            Err(err) => {
                self.record_failure(FailureStage::Submission, &err);
                self.state = SessionState::Ready;
                CompletionOutcome::Degraded
            }
        }
    }

    /// Leaves the results view for the question form, keeping the loaded
    /// questions and every previous answer.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        if !matches!(self.state, SessionState::Results(_)) {
            return Err(SessionError::ResetRejected {
                phase: PhaseName(self.phase()),
            });
        }
        self.expander.collapse();
        self.state = SessionState::Ready;
        debug!(retained = self.answers.len(), "quiz reset for retake");
        Ok(())
    }

    /// Opens or closes the breakdown of one displayed result.
    pub fn toggle_details(&mut self, id: &ManifestoId) -> Result<Option<&ManifestoId>, SessionError> {
        let payload = match &self.state {
            SessionState::Results(payload) => payload,
            _ => return Err(SessionError::NoResults),
        };
        if !displayed_ids(&payload.alignment_results).any(|shown| shown == id) {
            return Err(SessionError::NotDisplayed {
                manifesto_id: id.clone(),
            });
        }
        Ok(self.expander.toggle(id))
    }

    pub fn results_view(&self) -> Option<ResultsView> {
        self.payload()
            .map(|payload| results_view(payload, &self.expander))
    }

    /// Serializable snapshot of everything the current screen shows.
    pub fn view(&self) -> SessionView {
        let phase = self.phase();
        let questions = match phase {
            SessionPhase::Ready | SessionPhase::Submitting => self.question_views(),
            SessionPhase::Loading | SessionPhase::Results => Vec::new(),
        };

        SessionView {
            phase,
            phase_label: phase.label(),
            questions,
            answered: self.answers.answered_in(&self.questions),
            results: self.results_view(),
        }
    }

    fn question_views(&self) -> Vec<QuestionView> {
        self.questions
            .iter()
            .enumerate()
            .map(|(index, question)| {
                let answer = self.answers.get(&question.id);
                let options = Ordinal::scale()
                    .map(|value| OptionView {
                        value: value.get(),
                        label: question
                            .options
                            .label(value)
                            .map(str::to_string)
                            .unwrap_or_else(|| value.to_string()),
                        selected: answer == Some(value),
                    })
                    .collect();
                QuestionView {
                    number: index + 1,
                    id: question.id.clone(),
                    text: question.text.clone(),
                    options,
                    answer: answer.map(Ordinal::get),
                }
            })
            .collect()
    }

    fn current_ticket(&self) -> RequestTicket {
        RequestTicket {
            generation: self.generation,
        }
    }

    fn record_failure(&mut self, stage: FailureStage, err: &dyn fmt::Display) {
        let message = err.to_string();
        warn!(stage = stage.label(), error = %message, "quiz request failed");
        self.last_failure = Some(SessionFailure {
            stage,
            message,
            recorded_at: Utc::now(),
        });
    }
}
