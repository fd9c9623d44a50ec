use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier accepted from the wire as either a JSON string or number.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawIdentifier {
    Text(String),
    Unsigned(u64),
    Signed(i64),
}

impl From<RawIdentifier> for String {
    fn from(value: RawIdentifier) -> Self {
        match value {
            RawIdentifier::Text(text) => text,
            RawIdentifier::Unsigned(number) => number.to_string(),
            RawIdentifier::Signed(number) => number.to_string(),
        }
    }
}

fn deserialize_identifier<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawIdentifier::deserialize(deserializer).map(String::from)
}

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                deserialize_identifier(deserializer).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

identifier!(
    /// Stable identity of a survey question.
    QuestionId
);
identifier!(
    /// Identity of a scored manifesto.
    ManifestoId
);

/// Short identifier for a policy dimension (e.g. "Economy").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyTag(pub String);

impl PolicyTag {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PolicyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PolicyTag {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Ordinal response on the five point agreement scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Ordinal(u8);

impl Ordinal {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;
    /// Neutral midpoint of the scale.
    pub const NEUTRAL: Ordinal = Ordinal(3);

    pub fn new(value: u8) -> Result<Self, OrdinalError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(OrdinalError(value))
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// Every value on the scale in ascending order.
    pub fn scale() -> impl Iterator<Item = Ordinal> {
        (Self::MIN..=Self::MAX).map(Ordinal)
    }
}

impl TryFrom<u8> for Ordinal {
    type Error = OrdinalError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Ordinal> for u8 {
    fn from(value: Ordinal) -> Self {
        value.0
    }
}

impl fmt::Display for Ordinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("ordinal value {0} is outside the 1..=5 scale")]
pub struct OrdinalError(pub u8);

/// Labels shown for each ordinal option of a question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionLabels(BTreeMap<Ordinal, String>);

impl OptionLabels {
    pub fn new(labels: BTreeMap<Ordinal, String>) -> Self {
        Self(labels)
    }

    pub fn label(&self, value: Ordinal) -> Option<&str> {
        self.0.get(&value).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Ordinal, &str)> {
        self.0.iter().map(|(value, label)| (*value, label.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    #[serde(rename = "question")]
    pub text: String,
    pub options: OptionLabels,
    /// Policy dimension this question feeds, when the service declares it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<PolicyTag>,
}

/// Ordered, immutable survey fetched once per session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionSet(Vec<Question>);

impl QuestionSet {
    pub fn new(questions: Vec<Question>) -> Self {
        Self(questions)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn questions(&self) -> &[Question] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.0.iter()
    }

    pub fn get(&self, id: &QuestionId) -> Option<&Question> {
        self.0.iter().find(|question| &question.id == id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One ordinal per question, in survey order, as sent to the scoring service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AnswerVector(Vec<Ordinal>);

impl AnswerVector {
    pub(crate) fn new(values: Vec<Ordinal>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[Ordinal] {
        &self.0
    }

    pub fn to_raw(&self) -> Vec<u8> {
        self.0.iter().map(|value| value.get()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Body of the scoring request.
#[derive(Debug, Serialize)]
pub struct ScoringRequest<'a> {
    pub answers: &'a AnswerVector,
}

/// Integer similarity percentage in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "u8")]
pub struct Alignment(u8);

impl Alignment {
    pub const MAX: u8 = 100;

    pub fn new(value: u8) -> Result<Self, AlignmentError> {
        if value <= Self::MAX {
            Ok(Self(value))
        } else {
            Err(AlignmentError(f64::from(value)))
        }
    }

    /// Rounds a decimal percentage (the service reports one decimal place).
    pub fn from_percentage(value: f64) -> Result<Self, AlignmentError> {
        let rounded = value.round();
        if rounded.is_finite() && (0.0..=f64::from(Self::MAX)).contains(&rounded) {
            Ok(Self(rounded as u8))
        } else {
            Err(AlignmentError(value))
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl From<Alignment> for u8 {
    fn from(value: Alignment) -> Self {
        value.0
    }
}

impl<'de> Deserialize<'de> for Alignment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = f64::deserialize(deserializer)?;
        Alignment::from_percentage(raw).map_err(de::Error::custom)
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("alignment {0} is outside 0..=100")]
pub struct AlignmentError(pub f64);

/// Per-policy comparison between the user and one manifesto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDetail {
    pub your_position: Ordinal,
    pub manifesto_position: Ordinal,
    pub alignment: Alignment,
    #[serde(default)]
    pub explanation: String,
}

/// Short note on a policy the user strongly agrees or disagrees with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyHighlight {
    pub tag: PolicyTag,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentResult {
    pub manifesto_id: ManifestoId,
    pub name: String,
    pub alignment: Alignment,
    #[serde(default)]
    pub summary: String,
    /// Keyed by tag; the map iterates in tag order so rendering is stable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_details: Option<BTreeMap<PolicyTag, PolicyDetail>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_matching_policies: Vec<PolicyHighlight>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_disagreements: Vec<PolicyHighlight>,
}

/// The user's averaged stance on one policy dimension, sent as `[tag, score]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreference(pub PolicyTag, pub f32);

impl UserPreference {
    pub fn tag(&self) -> &PolicyTag {
        &self.0
    }

    pub fn score(&self) -> f32 {
        self.1
    }
}

/// Scoring response, stored exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsPayload {
    pub alignment_results: Vec<AlignmentResult>,
    #[serde(default)]
    pub user_preferences: Vec<UserPreference>,
}

impl ResultsPayload {
    pub fn result(&self, id: &ManifestoId) -> Option<&AlignmentResult> {
        self.alignment_results
            .iter()
            .find(|result| &result.manifesto_id == id)
    }
}

/// Stance the analysis assigned a manifesto on one policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyStance {
    pub score: Ordinal,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestoAnalysis {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub policy_scores: BTreeMap<PolicyTag, PolicyStance>,
}

/// Catalog entry for a manifesto known to the scoring service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestoProfile {
    pub id: ManifestoId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub analysis: ManifestoAnalysis,
}

impl ManifestoProfile {
    /// Display name, falling back to the id when the catalog omits one.
    pub fn display_name(&self) -> String {
        if self.name.trim().is_empty() {
            format!("Manifesto {}", self.id)
        } else {
            self.name.clone()
        }
    }
}

/// Liveness report from the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

impl ServiceHealth {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ordinal_rejects_values_outside_scale() {
        assert!(Ordinal::new(0).is_err());
        assert!(Ordinal::new(6).is_err());
        assert_eq!(Ordinal::new(5).map(Ordinal::get), Ok(5));
        assert_eq!(Ordinal::scale().count(), 5);
    }

    #[test]
    fn question_accepts_numeric_ids_and_string_option_keys() {
        let question: Question = serde_json::from_value(json!({
            "id": 7,
            "question": "Should public transit be free?",
            "options": {
                "1": "Strongly disagree",
                "2": "Disagree",
                "3": "Neutral",
                "4": "Agree",
                "5": "Strongly agree"
            },
            "tag": "Infrastructure"
        }))
        .expect("question decodes");

        assert_eq!(question.id, QuestionId::from("7"));
        assert_eq!(
            question.options.label(Ordinal::NEUTRAL),
            Some("Neutral")
        );
        assert_eq!(question.tag, Some(PolicyTag::from("Infrastructure")));
    }

    #[test]
    fn alignment_rounds_decimal_percentages() {
        let alignment: Alignment = serde_json::from_value(json!(82.4)).expect("decodes");
        assert_eq!(alignment.get(), 82);
        let alignment: Alignment = serde_json::from_value(json!(59.5)).expect("decodes");
        assert_eq!(alignment.get(), 60);
        assert!(serde_json::from_value::<Alignment>(json!(100.6)).is_err());
        assert!(serde_json::from_value::<Alignment>(json!(-1)).is_err());
    }

    #[test]
    fn payload_decodes_preference_pairs() {
        let payload: ResultsPayload = serde_json::from_value(json!({
            "alignment_results": [
                { "manifesto_id": 1, "name": "Green Future", "alignment": 71.3, "summary": "" }
            ],
            "user_preferences": [["Environment", 4.5], ["Economy", 2]]
        }))
        .expect("payload decodes");

        assert_eq!(payload.alignment_results[0].manifesto_id, ManifestoId::from("1"));
        assert_eq!(payload.alignment_results[0].alignment.get(), 71);
        assert!(payload.alignment_results[0].policy_details.is_none());
        assert_eq!(payload.user_preferences[0].tag().as_str(), "Environment");
        assert_eq!(payload.user_preferences[1].score(), 2.0);
    }

    #[test]
    fn answer_vector_serializes_as_plain_integers() {
        let vector = AnswerVector::new(vec![Ordinal::NEUTRAL, Ordinal(5)]);
        let body = serde_json::to_value(ScoringRequest { answers: &vector }).expect("encodes");
        assert_eq!(body, json!({ "answers": [3, 5] }));
    }
}
