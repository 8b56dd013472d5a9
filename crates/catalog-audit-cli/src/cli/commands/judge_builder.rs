use crate::cli::args::JudgeArgs;
use catalog_audit_core::config::{load_config, JudgeOverrides};
use catalog_audit_core::judge::{JudgeRuntimeConfig, JudgeService};

/// Resolve config file, flags and environment into one judge, once per process.
pub(crate) fn build_judge(args: &JudgeArgs) -> anyhow::Result<JudgeService> {
    let file = match &args.config {
        Some(path) => Some(load_config(path)?),
        None => None,
    };
    let overrides = JudgeOverrides {
        provider: args.judge.clone(),
        model: args.judge_model.clone(),
        api_key: args.judge_api_key.clone(),
    };
    let config = JudgeRuntimeConfig::resolve(file.as_ref(), &overrides, |name| {
        std::env::var(name).ok()
    })?;
    tracing::info!(
        provider = config.provider.as_str(),
        model = config.model.as_str(),
        "judge configured"
    );
    JudgeService::from_config(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fake_judge_needs_no_credential() {
        let args = JudgeArgs {
            judge: Some("fake".into()),
            ..Default::default()
        };
        let judge = build_judge(&args).unwrap();
        assert_eq!(judge.config().model, "fake-judge");
        assert_eq!(judge.provider_name(), "fake");
    }

    #[test]
    fn unknown_provider_is_a_config_error() {
        let args = JudgeArgs {
            judge: Some("openai".into()),
            ..Default::default()
        };
        let err = build_judge(&args).err().unwrap();
        assert!(err.to_string().contains("openai"));
    }
}
