use super::domain::{ManifestoId, PolicyTag, QuestionId};
use super::presenter::{AlignmentTier, RankBadge};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Loading,
    Ready,
    Submitting,
    Results,
}

impl SessionPhase {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Loading => "Loading questions...",
            Self::Ready => "Ready",
            Self::Submitting => "Submitting...",
            Self::Results => "Your Results",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OptionView {
    pub value: u8,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub number: usize,
    pub id: QuestionId,
    pub text: String,
    pub options: Vec<OptionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PolicyRowView {
    pub tag: PolicyTag,
    pub your_position: u8,
    pub manifesto_position: u8,
    pub alignment: u8,
    pub tier: AlignmentTier,
    pub color: &'static str,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HighlightView {
    pub tag: PolicyTag,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchHighlights {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub agreements: Vec<HighlightView>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub disagreements: Vec<HighlightView>,
}

impl MatchHighlights {
    pub fn is_empty(&self) -> bool {
        self.agreements.is_empty() && self.disagreements.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchView {
    pub rank: usize,
    pub badge: RankBadge,
    pub badge_label: &'static str,
    pub manifesto_id: ManifestoId,
    pub name: String,
    pub alignment: u8,
    pub summary: String,
    pub tier: AlignmentTier,
    pub color: &'static str,
    pub quality: &'static str,
    pub has_breakdown: bool,
    pub expanded: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub policy_rows: Vec<PolicyRowView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlights: Option<MatchHighlights>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreferenceBarView {
    pub tag: PolicyTag,
    pub score: f32,
    /// Fraction of the full bar, `score / 5`.
    pub width: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultsView {
    pub top_matches: Vec<MatchView>,
    pub preferences: Vec<PreferenceBarView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expanded: Option<ManifestoId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub phase: SessionPhase,
    pub phase_label: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub questions: Vec<QuestionView>,
    pub answered: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<ResultsView>,
}
