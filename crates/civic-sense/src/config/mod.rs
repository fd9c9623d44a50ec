use reqwest::Url;
use std::env;
use std::fmt;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

/// Distinguishes runtime behavior for different stages of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the quiz client.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub api: ApiConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let raw_url = env::var("CIVIC_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let api = ApiConfig::parse(&raw_url)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string());

        Ok(Self {
            environment,
            api,
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Location of the question and scoring service.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
}

impl ApiConfig {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let base_url = Url::parse(raw.trim()).map_err(|err| ConfigError::InvalidApiUrl {
            value: raw.to_string(),
            reason: err.to_string(),
        })?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidApiUrl {
                value: raw.to_string(),
                reason: format!("unsupported scheme '{}'", base_url.scheme()),
            });
        }

        Ok(Self { base_url })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidApiUrl { value: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidApiUrl { value, reason } => {
                write!(
                    f,
                    "CIVIC_API_URL must be an absolute http(s) URL, got '{}' ({})",
                    value, reason
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}
