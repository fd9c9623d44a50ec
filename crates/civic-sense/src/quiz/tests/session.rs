use super::common::*;
use crate::quiz::domain::{ManifestoId, QuestionId, QuestionSet};
use crate::quiz::session::{
    CompletionOutcome, FailureStage, QuizSession, SessionError, SessionState,
};
use crate::quiz::views::SessionPhase;

fn ready_session(questions: QuestionSet) -> QuizSession {
    let (mut session, ticket) = QuizSession::start();
    let outcome = session.complete_load(ticket, Ok::<_, String>(questions));
    assert_eq!(outcome, CompletionOutcome::Applied);
    session
}

fn session_with_results() -> QuizSession {
    let mut session = ready_session(two_question_survey());
    session
        .answer(QuestionId::from("1"), ordinal(5))
        .expect("form accepts answers");
    let request = session.begin_submit().expect("ready session submits");
    session.complete_submit(request.ticket(), Ok::<_, String>(sample_payload()));
    session
}

#[test]
fn session_starts_loading_and_rejects_input() {
    let (mut session, _ticket) = QuizSession::start();
    assert_eq!(session.state(), &SessionState::Loading);
    assert!(matches!(
        session.answer(QuestionId::from("1"), ordinal(4)),
        Err(SessionError::NotAccepting { .. })
    ));
    assert!(matches!(
        session.begin_submit(),
        Err(SessionError::SubmitRejected { .. })
    ));
}

#[test]
fn failed_load_degrades_to_an_empty_form() {
    let (mut session, ticket) = QuizSession::start();
    let outcome = session.complete_load(ticket, Err::<QuestionSet, _>("connection refused"));

    assert_eq!(outcome, CompletionOutcome::Degraded);
    assert_eq!(session.phase(), SessionPhase::Ready);
    assert!(session.questions().is_empty());
    let failure = session.last_failure().expect("failure recorded");
    assert_eq!(failure.stage, FailureStage::QuestionLoad);
    assert!(failure.message.contains("connection refused"));
}

#[test]
fn duplicate_load_completion_is_ignored() {
    let (mut session, ticket) = QuizSession::start();
    session.complete_load(ticket, Ok::<_, String>(two_question_survey()));
    let outcome = session.complete_load(ticket, Ok::<_, String>(QuestionSet::empty()));
    assert_eq!(outcome, CompletionOutcome::Stale);
    assert_eq!(session.questions().len(), 2);
}

#[test]
fn partially_answered_survey_submits_neutral_defaults() {
    let mut session = ready_session(two_question_survey());
    session
        .answer(QuestionId::from("1"), ordinal(5))
        .expect("answer accepted");

    let request = session.begin_submit().expect("submit allowed");
    assert_eq!(request.answers().to_raw(), vec![5, 3]);
    assert_eq!(session.phase(), SessionPhase::Submitting);
}

#[test]
fn second_submit_is_rejected_while_in_flight() {
    let mut session = ready_session(two_question_survey());
    session.begin_submit().expect("first submit allowed");

    match session.begin_submit() {
        Err(SessionError::SubmitRejected { phase }) => {
            assert_eq!(phase.to_string(), "submitting")
        }
        other => panic!("expected submit rejection, got {other:?}"),
    }
}

#[test]
fn successful_submit_stores_payload_verbatim() {
    let session = session_with_results();
    assert_eq!(session.payload(), Some(&sample_payload()));
    assert_eq!(session.expanded(), None);
}

#[test]
fn unsorted_results_are_kept_in_received_order() {
    let mut session = ready_session(two_question_survey());
    let request = session.begin_submit().expect("submit allowed");
    let mut payload = sample_payload();
    payload.alignment_results.reverse();
    session.complete_submit(request.ticket(), Ok::<_, String>(payload.clone()));

    let stored = session.payload().expect("results stored");
    assert_eq!(stored.alignment_results[0].manifesto_id, ManifestoId::from("B"));
    assert_eq!(stored, &payload);
}

#[test]
fn failed_submit_returns_to_the_form_with_answers_intact() {
    let mut session = ready_session(two_question_survey());
    session
        .answer(QuestionId::from("2"), ordinal(1))
        .expect("answer accepted");
    let request = session.begin_submit().expect("submit allowed");

    let outcome = session.complete_submit(request.ticket(), Err::<_, String>("HTTP 500".into()));

    assert_eq!(outcome, CompletionOutcome::Degraded);
    assert_eq!(session.phase(), SessionPhase::Ready);
    assert_eq!(session.answers().get(&QuestionId::from("2")), Some(ordinal(1)));
    assert_eq!(
        session.last_failure().map(|failure| failure.stage),
        Some(FailureStage::Submission)
    );
}

#[test]
fn late_completion_of_an_abandoned_request_is_dropped() {
    let mut session = ready_session(two_question_survey());
    let first = session.begin_submit().expect("first submit");
    session.complete_submit(first.ticket(), Err::<_, String>("timeout".into()));

    let second = session.begin_submit().expect("retry submit");
    let stale = session.complete_submit(first.ticket(), Ok::<_, String>(sample_payload()));
    assert_eq!(stale, CompletionOutcome::Stale);
    assert_eq!(session.phase(), SessionPhase::Submitting);

    let applied = session.complete_submit(second.ticket(), Ok::<_, String>(sample_payload()));
    assert_eq!(applied, CompletionOutcome::Applied);
    assert_eq!(session.phase(), SessionPhase::Results);
}

#[test]
fn reset_returns_to_form_and_keeps_previous_answers() {
    let mut session = session_with_results();
    session
        .toggle_details(&ManifestoId::from("A"))
        .expect("A is displayed");

    session.reset().expect("reset from results");

    assert_eq!(session.state(), &SessionState::Ready);
    assert_eq!(session.expanded(), None);
    assert_eq!(session.questions().len(), 2);
    assert_eq!(session.answers().get(&QuestionId::from("1")), Some(ordinal(5)));
    let request = session.begin_submit().expect("retake submits");
    assert_eq!(request.answers().to_raw(), vec![5, 3]);
}

#[test]
fn reset_outside_results_is_rejected() {
    let mut session = ready_session(two_question_survey());
    assert!(matches!(
        session.reset(),
        Err(SessionError::ResetRejected { .. })
    ));
}

#[test]
fn toggle_sequence_leaves_at_most_one_breakdown_open() {
    let mut session = session_with_results();
    let a = ManifestoId::from("A");
    let b = ManifestoId::from("B");

    assert_eq!(session.toggle_details(&a).expect("toggle A").cloned(), Some(a.clone()));
    assert_eq!(session.toggle_details(&b).expect("toggle B").cloned(), Some(b.clone()));
    assert_eq!(session.toggle_details(&b).expect("toggle B again"), None);
    assert_eq!(session.expanded(), None);
}

#[test]
fn toggle_rejects_results_that_are_not_displayed() {
    let mut session = session_with_results();
    match session.toggle_details(&ManifestoId::from("Z")) {
        Err(SessionError::NotDisplayed { manifesto_id }) => {
            assert_eq!(manifesto_id, ManifestoId::from("Z"))
        }
        other => panic!("expected not displayed error, got {other:?}"),
    }

    let mut ready = ready_session(two_question_survey());
    assert_eq!(
        ready.toggle_details(&ManifestoId::from("A")),
        Err(SessionError::NoResults)
    );
}

#[test]
fn form_view_marks_selected_options() {
    let mut session = ready_session(two_question_survey());
    session
        .answer(QuestionId::from("2"), ordinal(4))
        .expect("answer accepted");

    let view = session.view();
    assert_eq!(view.phase, SessionPhase::Ready);
    assert_eq!(view.answered, 1);
    assert_eq!(view.questions.len(), 2);
    assert_eq!(view.questions[0].number, 1);
    assert_eq!(view.questions[0].answer, None);
    let selected: Vec<u8> = view.questions[1]
        .options
        .iter()
        .filter(|option| option.selected)
        .map(|option| option.value)
        .collect();
    assert_eq!(selected, vec![4]);
    assert_eq!(view.questions[1].options[3].label, "Agree");
    assert!(view.results.is_none());
}
