use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JudgeCallErrorKind {
    RateLimit,
    Timeout,
    Server,
    Network,
    EmptyResponse,
    Other,
}

impl JudgeCallErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RateLimit => "rate_limit",
            Self::Timeout => "timeout",
            Self::Server => "server",
            Self::Network => "network",
            Self::EmptyResponse => "empty_response",
            Self::Other => "other",
        }
    }
}

/// A failed outbound judge call. Never fatal: converted into a default review.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct JudgeCallError {
    pub kind: JudgeCallErrorKind,
    pub message: String,
    pub status: Option<u16>,
    pub provider: Option<String>,
    /// True when kind was inferred from free-form message parsing.
    pub legacy_classified: bool,
}

impl JudgeCallError {
    pub fn new(kind: JudgeCallErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            provider: None,
            legacy_classified: false,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Typed error for a non-success HTTP status.
    pub fn from_status(status: u16, provider: &str, body: impl Into<String>) -> Self {
        let kind = match status {
            429 => JudgeCallErrorKind::RateLimit,
            408 | 504 => JudgeCallErrorKind::Timeout,
            500..=599 => JudgeCallErrorKind::Server,
            _ => JudgeCallErrorKind::Other,
        };
        Self::new(
            kind,
            format!("{provider} API error (status {status}): {}", body.into()),
        )
        .with_status(status)
        .with_provider(provider)
    }

    pub fn empty_response(provider: &str) -> Self {
        Self::new(
            JudgeCallErrorKind::EmptyResponse,
            format!("{provider} API response missing content"),
        )
        .with_provider(provider)
    }

    pub fn classify_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let msg = message.to_lowercase();
        let kind = if msg.contains("rate limit") || msg.contains("429") {
            JudgeCallErrorKind::RateLimit
        } else if msg.contains("timeout") || msg.contains("timed out") {
            JudgeCallErrorKind::Timeout
        } else if msg.contains("500")
            || msg.contains("502")
            || msg.contains("503")
            || msg.contains("504")
            || msg.contains("provider error")
        {
            JudgeCallErrorKind::Server
        } else if msg.contains("network") || msg.contains("connection") || msg.contains("dns") {
            JudgeCallErrorKind::Network
        } else if msg.contains("empty response") || msg.contains("missing content") {
            JudgeCallErrorKind::EmptyResponse
        } else {
            JudgeCallErrorKind::Other
        };

        let mut err = Self::new(kind, message);
        err.legacy_classified = true;
        err
    }

    /// Typed error if one is in the chain, else message classification.
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        if let Some(typed) = err.downcast_ref::<JudgeCallError>() {
            return typed.clone();
        }
        if let Some(reqwest_err) = err.downcast_ref::<reqwest::Error>() {
            let kind = if reqwest_err.is_timeout() {
                JudgeCallErrorKind::Timeout
            } else if reqwest_err.is_connect() || reqwest_err.is_request() {
                JudgeCallErrorKind::Network
            } else {
                JudgeCallErrorKind::Other
            };
            let mut typed = Self::new(kind, err.to_string());
            if let Some(status) = reqwest_err.status() {
                typed = typed.with_status(status.as_u16());
            }
            return typed;
        }
        Self::classify_message(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ConfigError: failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("ConfigError: failed to parse yaml {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("ConfigError: unsupported config version {0} (expected 1)")]
    UnsupportedVersion(u32),
    #[error("ConfigError: unknown judge provider '{0}' (expected dashscope or fake)")]
    UnknownProvider(String),
    #[error("ConfigError: missing API key for provider '{0}' (set --judge-api-key, QWEN_API_KEY or DASHSCOPE_API_KEY)")]
    MissingApiKey(String),
    #[error("ConfigError: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::{JudgeCallError, JudgeCallErrorKind};

    #[test]
    fn classify_message_maps_infra_errors() {
        assert_eq!(
            JudgeCallError::classify_message("provider returned 429").kind,
            JudgeCallErrorKind::RateLimit
        );
        assert_eq!(
            JudgeCallError::classify_message("request timeout while calling provider").kind,
            JudgeCallErrorKind::Timeout
        );
        assert_eq!(
            JudgeCallError::classify_message("provider error: 503").kind,
            JudgeCallErrorKind::Server
        );
        assert_eq!(
            JudgeCallError::classify_message("network dns resolution failed").kind,
            JudgeCallErrorKind::Network
        );
        assert_eq!(
            JudgeCallError::classify_message("something odd").kind,
            JudgeCallErrorKind::Other
        );
    }

    #[test]
    fn status_constructor_captures_stable_fields() {
        let err = JudgeCallError::from_status(503, "dashscope", "upstream unavailable");
        assert_eq!(err.kind, JudgeCallErrorKind::Server);
        assert_eq!(err.status, Some(503));
        assert_eq!(err.provider.as_deref(), Some("dashscope"));
        assert!(!err.legacy_classified);
        assert!(err.to_string().contains("upstream unavailable"));

        assert_eq!(
            JudgeCallError::from_status(429, "dashscope", "").kind,
            JudgeCallErrorKind::RateLimit
        );
        assert_eq!(
            JudgeCallError::from_status(401, "dashscope", "bad key").kind,
            JudgeCallErrorKind::Other
        );
    }

    #[test]
    fn from_anyhow_prefers_typed_errors() {
        let typed: anyhow::Error = JudgeCallError::empty_response("fake").into();
        let back = JudgeCallError::from_anyhow(&typed);
        assert_eq!(back.kind, JudgeCallErrorKind::EmptyResponse);
        assert!(!back.legacy_classified);

        let legacy = JudgeCallError::from_anyhow(&anyhow::anyhow!("connection reset"));
        assert_eq!(legacy.kind, JudgeCallErrorKind::Network);
        assert!(legacy.legacy_classified);
    }
}
