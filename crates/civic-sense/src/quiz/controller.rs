use super::domain::{ManifestoId, Ordinal, QuestionId};
use super::gateway::QuizGateway;
use super::session::{CompletionOutcome, QuizSession, SessionError};
use super::views::{ResultsView, SessionView};

/// Drives a [`QuizSession`] against a gateway, awaiting each request before
/// applying its completion.
pub struct QuizController<G> {
    gateway: G,
    session: QuizSession,
}

impl<G> QuizController<G>
where
    G: QuizGateway,
{
    /// Creates the session and performs its single question-set read.
    pub async fn start(gateway: G) -> Self {
        let (mut session, ticket) = QuizSession::start();
        let outcome = gateway.fetch_questions().await;
        session.complete_load(ticket, outcome);
        Self { gateway, session }
    }

    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn answer(&mut self, question_id: QuestionId, value: Ordinal) -> Result<(), SessionError> {
        self.session.answer(question_id, value)
    }

    /// Submits the current answers. Failures leave the session on the form.
    pub async fn submit(&mut self) -> Result<CompletionOutcome, SessionError> {
        let request = self.session.begin_submit()?;
        let outcome = self.gateway.score(request.answers()).await;
        Ok(self.session.complete_submit(request.ticket(), outcome))
    }

    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.session.reset()
    }

    pub fn toggle_details(
        &mut self,
        id: &ManifestoId,
    ) -> Result<Option<&ManifestoId>, SessionError> {
        self.session.toggle_details(id)
    }

    pub fn results_view(&self) -> Option<ResultsView> {
        self.session.results_view()
    }

    pub fn view(&self) -> SessionView {
        self.session.view()
    }

    pub fn into_session(self) -> QuizSession {
        self.session
    }
}
