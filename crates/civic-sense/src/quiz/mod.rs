//! Policy quiz: question loading, answer collection, submission, and the
//! derivation of ranked results from the scoring payload.

pub mod answers;
pub mod controller;
pub mod domain;
pub mod expander;
pub mod gateway;
pub mod presenter;
pub mod session;
pub mod views;

#[cfg(test)]
mod tests;

pub use answers::{resolve_answer, AnswerStore, NEUTRAL_DEFAULT};
pub use controller::QuizController;
pub use domain::{
    Alignment, AlignmentResult, AnswerVector, ManifestoId, ManifestoProfile, OptionLabels,
    Ordinal, OrdinalError, PolicyDetail, PolicyHighlight, PolicyTag, Question, QuestionId,
    QuestionSet, ResultsPayload, ServiceHealth, UserPreference,
};
pub use expander::DetailExpander;
pub use gateway::{GatewayError, HttpQuizGateway, QuizGateway};
pub use presenter::{
    color_bucket, policy_rows, preference_bars, quality_label, ranking_defect, results_view,
    top_three, AlignmentTier, RankBadge, RankingDefect,
};
pub use session::{
    CompletionOutcome, FailureStage, QuizSession, RequestTicket, SessionError, SessionFailure,
    SessionState, SubmitRequest,
};
pub use views::{MatchView, ResultsView, SessionPhase, SessionView};
