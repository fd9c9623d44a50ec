use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

use crate::quiz::domain::{
    Alignment, AlignmentResult, AnswerVector, ManifestoId, OptionLabels, Ordinal, PolicyDetail,
    PolicyHighlight, PolicyTag, Question, QuestionId, QuestionSet, ResultsPayload, UserPreference,
};
use crate::quiz::gateway::{GatewayError, QuizGateway, SCORING_PATH};

pub(super) fn ordinal(value: u8) -> Ordinal {
    Ordinal::new(value).expect("valid ordinal")
}

pub(super) fn alignment(value: u8) -> Alignment {
    Alignment::new(value).expect("valid alignment")
}

pub(super) fn question(id: &str, text: &str) -> Question {
    let labels = ["Strongly disagree", "Disagree", "Neutral", "Agree", "Strongly agree"];
    let options = Ordinal::scale()
        .zip(labels)
        .map(|(value, label)| (value, label.to_string()))
        .collect::<BTreeMap<_, _>>();
    Question {
        id: QuestionId::from(id),
        text: text.to_string(),
        options: OptionLabels::new(options),
        tag: None,
    }
}

pub(super) fn two_question_survey() -> QuestionSet {
    QuestionSet::new(vec![
        question("1", "The state should fund public broadband."),
        question("2", "Farm subsidies should be expanded."),
    ])
}

pub(super) fn result(id: &str, name: &str, value: u8) -> AlignmentResult {
    AlignmentResult {
        manifesto_id: ManifestoId::from(id),
        name: name.to_string(),
        alignment: alignment(value),
        summary: format!("{name} summary"),
        policy_details: None,
        top_matching_policies: Vec::new(),
        top_disagreements: Vec::new(),
    }
}

pub(super) fn detail(yours: u8, theirs: u8, value: u8, explanation: &str) -> PolicyDetail {
    PolicyDetail {
        your_position: ordinal(yours),
        manifesto_position: ordinal(theirs),
        alignment: alignment(value),
        explanation: explanation.to_string(),
    }
}

pub(super) fn highlight(tag: &str, explanation: &str) -> PolicyHighlight {
    PolicyHighlight {
        tag: PolicyTag::from(tag),
        explanation: explanation.to_string(),
    }
}

/// Two results: A at 82 with a policy breakdown, B at 55.
pub(super) fn sample_payload() -> ResultsPayload {
    let mut first = result("A", "Progress Alliance", 82);
    let mut details = BTreeMap::new();
    details.insert(
        PolicyTag::from("Technology"),
        detail(5, 4, 75, "Both favour digital public services."),
    );
    details.insert(
        PolicyTag::from("Agriculture"),
        detail(2, 5, 25, "The manifesto expands subsidies you oppose."),
    );
    first.policy_details = Some(details);
    first.top_matching_policies = vec![highlight("Technology", "Broadband for all.")];
    first.top_disagreements = vec![highlight("Agriculture", "More farm subsidies.")];

    ResultsPayload {
        alignment_results: vec![first, result("B", "Rural Front", 55)],
        user_preferences: vec![
            UserPreference(PolicyTag::from("Technology"), 5.0),
            UserPreference(PolicyTag::from("Agriculture"), 2.0),
        ],
    }
}

/// Gateway double serving a fixed survey and queued scoring responses.
pub(super) struct MemoryGateway {
    questions: Result<QuestionSet, String>,
    responses: Mutex<VecDeque<Result<ResultsPayload, String>>>,
    submitted: Mutex<Vec<Vec<u8>>>,
}

impl MemoryGateway {
    pub(super) fn new(questions: QuestionSet) -> Self {
        Self {
            questions: Ok(questions),
            responses: Mutex::new(VecDeque::new()),
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn failing_questions(message: &str) -> Self {
        Self {
            questions: Err(message.to_string()),
            ..Self::new(QuestionSet::empty())
        }
    }

    pub(super) fn respond_with(self, response: Result<ResultsPayload, &str>) -> Self {
        self.responses
            .lock()
            .expect("responses mutex poisoned")
            .push_back(response.map_err(str::to_string));
        self
    }

    pub(super) fn submitted(&self) -> Vec<Vec<u8>> {
        self.submitted
            .lock()
            .expect("submitted mutex poisoned")
            .clone()
    }
}

impl QuizGateway for MemoryGateway {
    async fn fetch_questions(&self) -> Result<QuestionSet, GatewayError> {
        self.questions
            .clone()
            .map_err(|message| GatewayError::Service {
                endpoint: "api/quiz",
                message,
            })
    }

    async fn score(&self, answers: &AnswerVector) -> Result<ResultsPayload, GatewayError> {
        self.submitted
            .lock()
            .expect("submitted mutex poisoned")
            .push(answers.to_raw());
        let next = self
            .responses
            .lock()
            .expect("responses mutex poisoned")
            .pop_front()
            .unwrap_or_else(|| Err("no scripted response".to_string()));
        next.map_err(|message| GatewayError::Service {
            endpoint: SCORING_PATH,
            message,
        })
    }
}
