use crate::errors::ConfigError;
use crate::judge::{JudgeProvider, JudgeRuntimeConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const FAKE_MODEL: &str = "fake-judge";

/// Environment variables consulted for the judge credential, in order.
pub const API_KEY_ENV: [&str; 2] = ["QWEN_API_KEY", "DASHSCOPE_API_KEY"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    pub version: u32,
    #[serde(default)]
    pub judge: JudgeSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JudgeSection {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Client-side request timeout; unset means none.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

pub fn load_config(path: &Path) -> Result<AuditConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let cfg: AuditConfig = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    if cfg.version != SUPPORTED_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion(cfg.version));
    }
    if let Some(t) = cfg.judge.temperature {
        if !(0.0..=2.0).contains(&t) {
            return Err(ConfigError::Invalid(format!(
                "judge.temperature {t} out of range 0.0..=2.0"
            )));
        }
    }
    Ok(cfg)
}

/// Judge settings given on the command line or through the environment.
/// They take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct JudgeOverrides {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
}

/// First non-empty credential: explicit value, then `QWEN_API_KEY`, then `DASHSCOPE_API_KEY`.
pub fn resolve_api_key<F>(explicit: Option<&str>, lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    explicit
        .map(str::to_string)
        .into_iter()
        .chain(API_KEY_ENV.iter().filter_map(|name| lookup(*name)))
        .map(|k| k.trim().to_string())
        .find(|k| !k.is_empty())
}

impl JudgeRuntimeConfig {
    /// Resolve once per process. A live provider without a credential is fatal.
    pub fn resolve<F>(
        file: Option<&AuditConfig>,
        overrides: &JudgeOverrides,
        lookup: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let section = file.map(|c| c.judge.clone()).unwrap_or_default();

        let provider_name = overrides
            .provider
            .clone()
            .or(section.provider)
            .unwrap_or_else(|| JudgeProvider::DashScope.as_str().to_string());
        let provider = JudgeProvider::parse(&provider_name)?;

        let model = overrides
            .model
            .clone()
            .or(section.model)
            .unwrap_or_else(|| match provider {
                JudgeProvider::DashScope => {
                    crate::providers::llm::dashscope::DEFAULT_MODEL.to_string()
                }
                JudgeProvider::Fake => FAKE_MODEL.to_string(),
            });

        let api_key = match provider {
            JudgeProvider::DashScope => Some(
                resolve_api_key(overrides.api_key.as_deref(), lookup)
                    .ok_or_else(|| ConfigError::MissingApiKey(provider.as_str().to_string()))?,
            ),
            JudgeProvider::Fake => None,
        };

        Ok(Self {
            provider,
            model,
            base_url: section.base_url,
            temperature: section.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: section.max_tokens,
            timeout: section.timeout_secs.map(Duration::from_secs),
            api_key,
        })
    }
}
