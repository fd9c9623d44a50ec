//! Pure derivation from a scoring payload to the ranked, labelled results view.

use std::collections::BTreeMap;

use serde::Serialize;

use super::domain::{
    Alignment, AlignmentResult, ManifestoId, Ordinal, PolicyDetail, PolicyHighlight, PolicyTag,
    ResultsPayload, UserPreference,
};
use super::expander::DetailExpander;
use super::views::{
    HighlightView, MatchHighlights, MatchView, PolicyRowView, PreferenceBarView, ResultsView,
};

/// Number of manifestos shown as top matches.
pub const TOP_MATCH_LIMIT: usize = 3;

/// Four alignment bands; both the color token and the quality label derive
/// from this so they can never disagree on a boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentTier {
    Weak,
    Moderate,
    Good,
    Strong,
}

impl AlignmentTier {
    pub const fn from_alignment(alignment: Alignment) -> Self {
        match alignment.get() {
            80..=u8::MAX => Self::Strong,
            60..=79 => Self::Good,
            40..=59 => Self::Moderate,
            _ => Self::Weak,
        }
    }

    pub const fn color_token(self) -> &'static str {
        match self {
            Self::Strong => "strong",
            Self::Good => "good",
            Self::Moderate => "moderate",
            Self::Weak => "weak",
        }
    }

    pub const fn quality_label(self) -> &'static str {
        match self {
            Self::Strong => "Excellent Match",
            Self::Good => "Good Match",
            Self::Moderate => "Moderate Match",
            Self::Weak => "Low Match",
        }
    }
}

pub fn color_bucket(alignment: Alignment) -> &'static str {
    AlignmentTier::from_alignment(alignment).color_token()
}

pub fn quality_label(alignment: Alignment) -> &'static str {
    AlignmentTier::from_alignment(alignment).quality_label()
}

/// Fixed badge for the three ranked positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RankBadge {
    First,
    Second,
    Third,
}

impl RankBadge {
    pub const fn for_rank(rank: usize) -> Option<Self> {
        match rank {
            0 => Some(Self::First),
            1 => Some(Self::Second),
            2 => Some(Self::Third),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::First => "1st",
            Self::Second => "2nd",
            Self::Third => "3rd",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedMatch<'a> {
    pub rank: usize,
    pub badge: RankBadge,
    pub tier: AlignmentTier,
    pub result: &'a AlignmentResult,
}

/// The first three results in the order the service sent them.
pub fn top_three(results: &[AlignmentResult]) -> Vec<RankedMatch<'_>> {
    results
        .iter()
        .take(TOP_MATCH_LIMIT)
        .enumerate()
        .filter_map(|(rank, result)| {
            RankBadge::for_rank(rank).map(|badge| RankedMatch {
                rank,
                badge,
                tier: AlignmentTier::from_alignment(result.alignment),
                result,
            })
        })
        .collect()
}

/// Identities of the results currently on screen.
pub fn displayed_ids(results: &[AlignmentResult]) -> impl Iterator<Item = &ManifestoId> {
    results
        .iter()
        .take(TOP_MATCH_LIMIT)
        .map(|result| &result.manifesto_id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyRow<'a> {
    pub tag: &'a PolicyTag,
    pub detail: &'a PolicyDetail,
    pub tier: AlignmentTier,
}

/// Policy breakdown rows ordered by tag.
pub fn policy_rows(details: &BTreeMap<PolicyTag, PolicyDetail>) -> Vec<PolicyRow<'_>> {
    details
        .iter()
        .map(|(tag, detail)| PolicyRow {
            tag,
            detail,
            tier: AlignmentTier::from_alignment(detail.alignment),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreferenceBar<'a> {
    pub tag: &'a PolicyTag,
    pub score: f32,
    pub width: f32,
}

/// One bar per preference, width proportional to `score / 5`.
pub fn preference_bars(preferences: &[UserPreference]) -> Vec<PreferenceBar<'_>> {
    preferences
        .iter()
        .map(|preference| PreferenceBar {
            tag: preference.tag(),
            score: preference.score(),
            width: bar_width(preference.score()),
        })
        .collect()
}

fn bar_width(score: f32) -> f32 {
    if score.is_nan() {
        return 0.0;
    }
    (score / f32::from(Ordinal::MAX)).clamp(0.0, 1.0)
}

/// First place where the payload breaks descending alignment order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("result {position} ({current}) outranks its predecessor {previous_id} ({previous})")]
pub struct RankingDefect {
    pub position: usize,
    pub previous_id: ManifestoId,
    pub previous: Alignment,
    pub current: Alignment,
}

/// Reports, without correcting, results that are not sorted by descending alignment.
pub fn ranking_defect(results: &[AlignmentResult]) -> Option<RankingDefect> {
    results
        .windows(2)
        .enumerate()
        .find(|(_, pair)| pair[1].alignment > pair[0].alignment)
        .map(|(index, pair)| RankingDefect {
            position: index + 1,
            previous_id: pair[0].manifesto_id.clone(),
            previous: pair[0].alignment,
            current: pair[1].alignment,
        })
}

fn highlight_views(highlights: &[PolicyHighlight]) -> Vec<HighlightView> {
    highlights
        .iter()
        .map(|highlight| HighlightView {
            tag: highlight.tag.clone(),
            explanation: highlight.explanation.clone(),
        })
        .collect()
}

impl PolicyRow<'_> {
    pub fn to_view(&self) -> PolicyRowView {
        PolicyRowView {
            tag: self.tag.clone(),
            your_position: self.detail.your_position.get(),
            manifesto_position: self.detail.manifesto_position.get(),
            alignment: self.detail.alignment.get(),
            tier: self.tier,
            color: self.tier.color_token(),
            explanation: self.detail.explanation.clone(),
        }
    }
}

impl RankedMatch<'_> {
    pub fn to_view(&self, expanded: bool) -> MatchView {
        let result = self.result;
        let rows = match (&result.policy_details, expanded) {
            (Some(details), true) => policy_rows(details)
                .iter()
                .map(PolicyRow::to_view)
                .collect(),
            _ => Vec::new(),
        };
        let highlights = if self.rank == 0 {
            Some(MatchHighlights {
                agreements: highlight_views(&result.top_matching_policies),
                disagreements: highlight_views(&result.top_disagreements),
            })
            .filter(|highlights| !highlights.is_empty())
        } else {
            None
        };

        MatchView {
            rank: self.rank,
            badge: self.badge,
            badge_label: self.badge.label(),
            manifesto_id: result.manifesto_id.clone(),
            name: result.name.clone(),
            alignment: result.alignment.get(),
            summary: result.summary.clone(),
            tier: self.tier,
            color: self.tier.color_token(),
            quality: self.tier.quality_label(),
            has_breakdown: result
                .policy_details
                .as_ref()
                .is_some_and(|details| !details.is_empty()),
            expanded,
            policy_rows: rows,
            highlights,
        }
    }
}

impl PreferenceBar<'_> {
    pub fn to_view(&self) -> PreferenceBarView {
        PreferenceBarView {
            tag: self.tag.clone(),
            score: self.score,
            width: self.width,
        }
    }
}

/// Complete render model for the results screen.
///
/// At most one card is expanded: when the service repeats a manifesto within
/// the top three, only its highest-ranked card opens.
pub fn results_view(payload: &ResultsPayload, expander: &DetailExpander) -> ResultsView {
    let mut opened = false;
    ResultsView {
        top_matches: top_three(&payload.alignment_results)
            .iter()
            .map(|ranked| {
                let expanded = !opened && expander.is_expanded(&ranked.result.manifesto_id);
                opened |= expanded;
                ranked.to_view(expanded)
            })
            .collect(),
        preferences: preference_bars(&payload.user_preferences)
            .iter()
            .map(PreferenceBar::to_view)
            .collect(),
        expanded: expander.expanded().cloned(),
    }
}
