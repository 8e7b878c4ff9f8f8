use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "healthdoc";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default OpenAI-compatible endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model for the HL7v2 narrative pipeline.
pub const DEFAULT_HL7_MODEL: &str = "gpt-4o-mini";

/// Default model for the HIPAA compliance pipeline.
pub const DEFAULT_HIPAA_MODEL: &str = "gpt-4o";

pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_HL7_MODEL: &str = "HL7_MODEL";
pub const ENV_HIPAA_MODEL: &str = "HIPAA_MODEL";
pub const ENV_TIMEOUT_SECS: &str = "ANALYSIS_TIMEOUT_SECS";

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "healthdoc_analyzer=info,healthdoc=info,warn"
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set; export it or add it to .env before running an analysis")]
    MissingCredential(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// LLM API credential. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Model identifier per pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    pub hl7: String,
    pub hipaa: String,
}

impl Default for ModelSelection {
    fn default() -> Self {
        Self {
            hl7: DEFAULT_HL7_MODEL.to_string(),
            hipaa: DEFAULT_HIPAA_MODEL.to_string(),
        }
    }
}

/// Startup configuration, read once and handed to the client and analyzer.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: ApiKey,
    pub base_url: String,
    pub models: ModelSelection,
    /// Whole-request timeout. `None` leaves the call unbounded.
    pub request_timeout: Option<Duration>,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_blank(ENV_API_KEY)
            .map(|v| ApiKey(v.trim().to_string()))
            .ok_or(ConfigError::MissingCredential(ENV_API_KEY))?;

        let base_url = non_blank(ENV_BASE_URL)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                key: ENV_BASE_URL,
                reason: format!("expected an http(s) URL, got '{base_url}'"),
            });
        }

        let defaults = ModelSelection::default();
        let models = ModelSelection {
            hl7: non_blank(ENV_HL7_MODEL).unwrap_or(defaults.hl7),
            hipaa: non_blank(ENV_HIPAA_MODEL).unwrap_or(defaults.hipaa),
        };

        let request_timeout = match non_blank(ENV_TIMEOUT_SECS) {
            None => None,
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                    key: ENV_TIMEOUT_SECS,
                    reason: format!("'{raw}' is not a whole number of seconds"),
                })?;
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        key: ENV_TIMEOUT_SECS,
                        reason: "must be greater than zero".into(),
                    });
                }
                Some(Duration::from_secs(secs))
            }
        };

        Ok(Self {
            api_key,
            base_url,
            models,
            request_timeout,
        })
    }
}
