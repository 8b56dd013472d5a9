//! Decoding of content-quality rubric responses. Scores fail closed to 0.

use super::{extract_json, PARSE_FAILURE_REASON};
use crate::candidate::{CriterionScore, RubricEvaluation};
use crate::errors::JudgeCallError;
use crate::judge::Rubric;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const MAX_SCORE: u8 = 2;

/// A JSON number that is a whole value in 0..=2.
fn valid_score(value: &Value) -> Option<u8> {
    let n = value.as_f64()?;
    if n.fract() == 0.0 && (0.0..=f64::from(MAX_SCORE)).contains(&n) {
        Some(n as u8)
    } else {
        None
    }
}

fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn decode_criterion(key: &str, entry: Option<&Value>) -> CriterionScore {
    let Some(entry) = entry else {
        return CriterionScore {
            score: 0,
            reason: format!("{key} score missing"),
        };
    };
    let reason = text(entry.get("reason"));
    match entry.get("score").and_then(valid_score) {
        Some(score) => CriterionScore { score, reason },
        None => {
            let raw = entry.get("score").map(Value::to_string).unwrap_or_else(|| "none".into());
            let note = format!("invalid score {raw}, counted as 0");
            CriterionScore {
                score: 0,
                reason: if reason.is_empty() {
                    note
                } else {
                    format!("{note}: {reason}")
                },
            }
        }
    }
}

fn decode_group(keys: &[&str], group: Option<&Value>) -> BTreeMap<String, CriterionScore> {
    let group = group.and_then(Value::as_object);
    keys.iter()
        .map(|key| {
            (
                (*key).to_string(),
                decode_criterion(key, group.and_then(|g| g.get(*key))),
            )
        })
        .collect()
}

fn summary_score(raw: &Map<String, Value>, key: &str, default: u8) -> u8 {
    match raw.get(key) {
        None | Some(Value::Null) => default,
        Some(value) => valid_score(value).unwrap_or_else(|| {
            tracing::warn!(key, value = %value, "invalid summary score, counted as 0");
            0
        }),
    }
}

pub fn decode_rubric(rubric: Rubric, raw: &Map<String, Value>) -> RubricEvaluation {
    let overall_score = summary_score(raw, "overall_score", 0);
    RubricEvaluation {
        rubric,
        must_have: decode_group(rubric.must_have(), raw.get("must_have")),
        must_avoid: decode_group(rubric.must_avoid(), raw.get("must_avoid")),
        must_have_score: summary_score(raw, "must_have_score", overall_score),
        must_avoid_score: summary_score(raw, "must_avoid_score", overall_score),
        overall_score,
        overall_reason: text(raw.get("overall_reason")),
        error: None,
    }
}

/// Finalize one rubric call outcome. Parse and call failures yield a failed
/// evaluation with `overall_score = 0`.
pub fn finalize_rubric(rubric: Rubric, outcome: Result<String, JudgeCallError>) -> RubricEvaluation {
    match outcome {
        Err(err) => {
            tracing::warn!(rubric = rubric.as_str(), error = %err, "rubric call failed");
            RubricEvaluation::failed(rubric, format!("judge call failed: {}", err.message))
        }
        Ok(text) => match extract_json(&text) {
            Some(Value::Object(map)) => decode_rubric(rubric, &map),
            _ => {
                tracing::warn!(rubric = rubric.as_str(), "rubric response not a JSON object");
                RubricEvaluation::failed(rubric, PARSE_FAILURE_REASON)
            }
        },
    }
}
