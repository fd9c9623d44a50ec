use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::domain::{
    AnswerVector, ManifestoProfile, QuestionSet, ResultsPayload, ScoringRequest, ServiceHealth,
};
use crate::config::ApiConfig;

pub const QUESTIONS_PATH: &str = "api/quiz";
pub const SCORING_PATH: &str = "api/align";
pub const MANIFESTOS_PATH: &str = "api/manifestos";
pub const HEALTH_PATH: &str = "api/health";

/// Remote source of the survey and the alignment scores.
///
/// Each call is a single request: no retry, no timeout, no cancellation.
#[allow(async_fn_in_trait)]
pub trait QuizGateway {
    async fn fetch_questions(&self) -> Result<QuestionSet, GatewayError>;
    async fn score(&self, answers: &AnswerVector) -> Result<ResultsPayload, GatewayError>;
}

/// Error raised while talking to the quiz service.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("invalid endpoint '{path}': {reason}")]
    Endpoint { path: &'static str, reason: String },
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} answered HTTP {status}{}", status_suffix(.message))]
    Status {
        endpoint: &'static str,
        status: u16,
        message: Option<String>,
    },
    #[error("{endpoint} reported an error: {message}")]
    Service {
        endpoint: &'static str,
        message: String,
    },
    #[error("unable to decode {endpoint} response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Error body the service sends instead of a payload.
#[derive(Debug, Deserialize)]
struct ServiceFailure {
    error: String,
}

/// `QuizGateway` backed by the service's JSON HTTP API.
#[derive(Debug, Clone)]
pub struct HttpQuizGateway {
    client: Client,
    base_url: Url,
}

impl HttpQuizGateway {
    pub fn new(config: &ApiConfig) -> Self {
        Self::with_client(Client::new(), config.base_url.clone())
    }

    pub fn with_client(client: Client, base_url: Url) -> Self {
        Self {
            client,
            base_url: with_trailing_slash(base_url),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Catalog of manifestos the service scores against.
    pub async fn manifestos(&self) -> Result<Vec<ManifestoProfile>, GatewayError> {
        self.get_json(MANIFESTOS_PATH).await
    }

    pub async fn health(&self) -> Result<ServiceHealth, GatewayError> {
        self.get_json(HEALTH_PATH).await
    }

    fn endpoint(&self, path: &'static str) -> Result<Url, GatewayError> {
        self.base_url
            .join(path)
            .map_err(|err| GatewayError::Endpoint {
                path,
                reason: err.to_string(),
            })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &'static str) -> Result<T, GatewayError> {
        let url = self.endpoint(path)?;
        debug!(%url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| GatewayError::Transport {
                endpoint: path,
                source,
            })?;
        decode(path, response).await
    }
}

impl QuizGateway for HttpQuizGateway {
    async fn fetch_questions(&self) -> Result<QuestionSet, GatewayError> {
        self.get_json(QUESTIONS_PATH).await
    }

    async fn score(&self, answers: &AnswerVector) -> Result<ResultsPayload, GatewayError> {
        let url = self.endpoint(SCORING_PATH)?;
        debug!(%url, answers = answers.len(), "POST");
        let response = self
            .client
            .post(url)
            .json(&ScoringRequest { answers })
            .send()
            .await
            .map_err(|source| GatewayError::Transport {
                endpoint: SCORING_PATH,
                source,
            })?;
        decode(SCORING_PATH, response).await
    }
}

async fn decode<T: DeserializeOwned>(
    endpoint: &'static str,
    response: Response,
) -> Result<T, GatewayError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|source| GatewayError::Transport { endpoint, source })?;

    if let Ok(failure) = serde_json::from_str::<ServiceFailure>(&body) {
        return Err(if status.is_success() {
            GatewayError::Service {
                endpoint,
                message: failure.error,
            }
        } else {
            GatewayError::Status {
                endpoint,
                status: status.as_u16(),
                message: Some(failure.error),
            }
        });
    }

    if !status.is_success() {
        return Err(GatewayError::Status {
            endpoint,
            status: status.as_u16(),
            message: None,
        });
    }

    serde_json::from_str(&body).map_err(|source| GatewayError::Decode { endpoint, source })
}

fn status_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|message| format!(": {message}"))
        .unwrap_or_default()
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
