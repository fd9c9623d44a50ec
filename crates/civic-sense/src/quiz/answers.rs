use std::collections::HashMap;

use super::domain::{AnswerVector, Ordinal, QuestionId, QuestionSet};

/// Value submitted for any question the user left unanswered.
pub const NEUTRAL_DEFAULT: Ordinal = Ordinal::NEUTRAL;

/// Merges an optional answer with the neutral default.
pub fn resolve_answer(answer: Option<Ordinal>) -> Ordinal {
    answer.unwrap_or(NEUTRAL_DEFAULT)
}

/// Accumulates the user's responses for the current session.
///
/// Entries are upserted and never removed; a fresh store is the only way to
/// forget an answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerStore {
    answers: HashMap<QuestionId, Ordinal>,
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `value` for `question_id`, returning the value it replaced.
    pub fn set(&mut self, question_id: QuestionId, value: Ordinal) -> Option<Ordinal> {
        self.answers.insert(question_id, value)
    }

    pub fn get(&self, question_id: &QuestionId) -> Option<Ordinal> {
        self.answers.get(question_id).copied()
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Number of questions in `questions` that have an explicit answer.
    pub fn answered_in(&self, questions: &QuestionSet) -> usize {
        questions
            .iter()
            .filter(|question| self.answers.contains_key(&question.id))
            .count()
    }

    /// Builds the submission vector: one entry per question, in survey order.
    pub fn answer_vector(&self, questions: &QuestionSet) -> AnswerVector {
        AnswerVector::new(
            questions
                .iter()
                .map(|question| resolve_answer(self.get(&question.id)))
                .collect(),
        )
    }
}
