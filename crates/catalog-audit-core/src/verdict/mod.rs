//! Verdict parsing and validation.
//!
//! Turns the judge's free text into an [`AuditResult`] that always carries
//! every aspect of its variant. Every failure path converges on a finalized
//! result:
//!
//! ```text
//! Unreviewed -> Parsed      -> Finalized
//!            -> ParseFailed -> Finalized (default review)
//! call failure              -> Finalized (default review)
//! ```

pub mod content;

use crate::errors::JudgeCallError;
use crate::model::{Aspect, AuditResult, AuditVariant, Status, Verdict};
use crate::normalize::NormalizedFields;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const PARSE_FAILURE_REASON: &str = "JSON parse failure";
pub const CATEGORY_EMPTY_REASON: &str = "category empty or N/A";
const DROPPED_KEYS: [&str; 1] = ["image_review"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReviewStage {
    Parsed,
    ParseFailed,
    CallFailed,
}

impl ReviewStage {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Parsed => "parsed",
            Self::ParseFailed => "parse_failed",
            Self::CallFailed => "call_failed",
        }
    }
}

/// Decode the trimmed text directly; failing that, decode the first fenced
/// block (```json or bare ```). Exactly two attempts.
pub fn extract_json(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }
    let fenced = fenced_block(trimmed)?;
    serde_json::from_str::<Value>(fenced.trim()).ok()
}

fn fenced_block(text: &str) -> Option<&str> {
    let (start, tag_len) = match text.find("```json") {
        Some(i) => (i, "```json".len()),
        None => (text.find("```")?, "```".len()),
    };
    let body = &text[start + tag_len..];
    let end = body.find("```").unwrap_or(body.len());
    Some(&body[..end])
}

/// Every required aspect `NEEDS_MANUAL_CHECK` with the same reason.
pub fn default_review(variant: AuditVariant, reason: &str) -> AuditResult {
    AuditResult {
        variant,
        verdicts: variant
            .required_aspects()
            .iter()
            .map(|aspect| (*aspect, Verdict::manual_check(reason)))
            .collect(),
    }
}

/// A failed judge call becomes the default review carrying the error message.
pub fn recover_from_call_failure(
    variant: AuditVariant,
    fields: &NormalizedFields,
    err: &JudgeCallError,
) -> AuditResult {
    let reason = format!("judge call failed: {}", err.message);
    apply_overrides(default_review(variant, &reason), fields)
}

/// Validate a decoded judge object: drop unknown keys, synthesize missing
/// aspects, coerce statuses into the variant's vocabulary, then apply the
/// deterministic overrides.
pub fn finalize_verdicts(
    variant: AuditVariant,
    raw: &Map<String, Value>,
    fields: &NormalizedFields,
) -> AuditResult {
    let mut verdicts = BTreeMap::new();
    for aspect in variant.required_aspects() {
        let verdict = match raw.get(aspect.key()) {
            Some(entry) => decode_verdict(variant, *aspect, entry),
            None => Verdict::manual_check(format!("{} verdict missing", aspect.key())),
        };
        verdicts.insert(*aspect, verdict);
    }
    let dropped: Vec<&str> = raw
        .keys()
        .map(String::as_str)
        .filter(|k| !variant.required_aspects().iter().any(|a| a.key() == *k))
        .filter(|k| !DROPPED_KEYS.contains(k))
        .collect();
    if !dropped.is_empty() {
        tracing::debug!(?dropped, variant = variant.as_str(), "ignoring unexpected judge keys");
    }
    apply_overrides(AuditResult { variant, verdicts }, fields)
}

fn decode_verdict(variant: AuditVariant, aspect: Aspect, entry: &Value) -> Verdict {
    let Some(obj) = entry.as_object() else {
        return Verdict::manual_check(format!("{} verdict malformed", aspect.key()));
    };
    let raw_status = match obj.get("status") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    let reason = match obj.get("reason") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    match Status::parse(&raw_status).filter(|s| variant.allows(*s)) {
        Some(status) => Verdict::new(status, reason),
        None => {
            tracing::warn!(
                aspect = aspect.key(),
                status = raw_status.as_str(),
                "status out of vocabulary"
            );
            Verdict::manual_check(format!(
                "status out of vocabulary, coerced to NEEDS_MANUAL_CHECK (was: {})",
                raw_status.trim().to_ascii_uppercase()
            ))
        }
    }
}

fn apply_overrides(mut result: AuditResult, fields: &NormalizedFields) -> AuditResult {
    if fields.category_is_empty_or_na {
        if let Some(verdict) = result.verdicts.get_mut(&Aspect::Category) {
            *verdict = Verdict::manual_check(CATEGORY_EMPTY_REASON);
        }
    }
    result
}

/// Finalize one judge outcome. Never fails and never retries.
pub fn finalize(
    outcome: Result<String, JudgeCallError>,
    variant: AuditVariant,
    fields: &NormalizedFields,
) -> AuditResult {
    let (stage, result) = match outcome {
        Err(err) => (
            ReviewStage::CallFailed,
            recover_from_call_failure(variant, fields, &err),
        ),
        Ok(text) => match extract_json(&text) {
            Some(Value::Object(map)) => (
                ReviewStage::Parsed,
                finalize_verdicts(variant, &map, fields),
            ),
            _ => {
                let preview: String = text.chars().take(200).collect();
                tracing::warn!(response = preview.as_str(), "judge response not a JSON object");
                (
                    ReviewStage::ParseFailed,
                    apply_overrides(default_review(variant, PARSE_FAILURE_REASON), fields),
                )
            }
        },
    };
    if stage != ReviewStage::Parsed {
        tracing::warn!(
            stage = stage.as_str(),
            variant = variant.as_str(),
            "falling back to default review"
        );
    }
    result
}

/// Run a finalized result through validation again. A no-op on any result
/// produced by [`finalize`].
pub fn revalidate(result: &AuditResult, fields: &NormalizedFields) -> AuditResult {
    match result.to_judge_json() {
        Value::Object(map) => finalize_verdicts(result.variant, &map, fields),
        _ => default_review(result.variant, PARSE_FAILURE_REASON),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::JudgeCallErrorKind;

    fn fields(category: &str) -> NormalizedFields {
        NormalizedFields {
            category_is_empty_or_na: crate::normalize::is_empty_or_na(category),
            category_text: category.to_string(),
            ..Default::default()
        }
    }

    const ALL_PASS_SOURCED: &str = r#"{
        "url_review": {"status": "PASS", "reason": "product page"},
        "title_review": {"status": "PASS", "reason": "ok"},
        "description_review": {"status": "NEEDS_REVIEW", "reason": "thin"},
        "category_review": {"status": "PASS", "reason": "fits"},
        "keyword_review": {"status": "PASS", "reason": "fits"},
        "image_review": {"status": "PASS", "reason": "skipped"}
    }"#;

    #[test]
    fn extract_direct_and_fenced() {
        assert!(extract_json(r#" {"a": 1} "#).is_some());
        let fenced = "Here you go:\n```json\n{\"a\": 1}\n```\nthanks";
        assert_eq!(extract_json(fenced).unwrap()["a"], 1);
        let bare = "```\n{\"b\": 2}\n```";
        assert_eq!(extract_json(bare).unwrap()["b"], 2);
        assert!(extract_json("sorry, I can't help").is_none());
        assert!(extract_json("```json\nnot json\n```").is_none());
    }

    #[test]
    fn empty_category_overrides_judge_pass() {
        let text = r#"{"product_validity": {"status": "PASS", "reason": "ok"},
                       "category_review": {"status": "PASS", "reason": "fine"},
                       "keyword_review": {"status": "PASS", "reason": "ok"}}"#;
        let result = finalize(Ok(text.to_string()), AuditVariant::NoUrl, &fields(""));
        let category = result.get(Aspect::Category).unwrap();
        assert_eq!(category.status, Status::NeedsManualCheck);
        assert_eq!(category.reason, CATEGORY_EMPTY_REASON);
        assert_eq!(result.status(Aspect::ProductValidity), Some(Status::Pass));
        assert_eq!(result.status(Aspect::Keyword), Some(Status::Pass));
    }

    #[test]
    fn unparseable_response_is_default_review() {
        let result = finalize(
            Ok("sorry, I can't help".to_string()),
            AuditVariant::Sourced,
            &fields("Home > Kitchen"),
        );
        assert_eq!(result.verdicts.len(), 5);
        for verdict in result.verdicts.values() {
            assert_eq!(verdict.status, Status::NeedsManualCheck);
            assert_eq!(verdict.reason, PARSE_FAILURE_REASON);
        }
    }

    #[test]
    fn non_object_json_is_parse_failure() {
        let result = finalize(Ok("[1, 2]".into()), AuditVariant::NoUrl, &fields("A"));
        assert!(result.verdicts.values().all(|v| v.reason == PARSE_FAILURE_REASON));
    }

    #[test]
    fn missing_aspect_is_synthesized_alone() {
        let text = r#"{"product_validity": {"status": "PASS", "reason": "ok"},
                       "category_review": {"status": "PASS", "reason": "fine"}}"#;
        let result = finalize(Ok(text.into()), AuditVariant::NoUrl, &fields("A > B"));
        assert_eq!(result.status(Aspect::Category), Some(Status::Pass));
        let keyword = result.get(Aspect::Keyword).unwrap();
        assert_eq!(keyword.status, Status::NeedsManualCheck);
        assert_eq!(keyword.reason, "keyword_review verdict missing");
    }

    #[test]
    fn out_of_vocabulary_status_is_coerced() {
        let text = r#"{"product_validity": {"status": "needs_review", "reason": "meh"},
                       "category_review": {"status": "pass", "reason": "fine"},
                       "keyword_review": {"status": "MAYBE"}}"#;
        let result = finalize(Ok(text.into()), AuditVariant::NoUrl, &fields("A"));
        let validity = result.get(Aspect::ProductValidity).unwrap();
        assert_eq!(validity.status, Status::NeedsManualCheck);
        assert!(validity.reason.contains("(was: NEEDS_REVIEW)"));
        assert_eq!(result.status(Aspect::Category), Some(Status::Pass));
        assert!(result.get(Aspect::Keyword).unwrap().reason.contains("(was: MAYBE)"));
    }

    #[test]
    fn image_review_and_foreign_keys_are_dropped() {
        let result = finalize(
            Ok(ALL_PASS_SOURCED.into()),
            AuditVariant::Sourced,
            &fields("Home"),
        );
        assert_eq!(result.verdicts.len(), 5);
        assert!(!result.to_judge_json().as_object().unwrap().contains_key("image_review"));
        assert_eq!(result.status(Aspect::Description), Some(Status::NeedsReview));
    }

    #[test]
    fn call_failure_converts_to_default_review() {
        let err = JudgeCallError::new(JudgeCallErrorKind::Timeout, "request timed out");
        let result = recover_from_call_failure(AuditVariant::Sourced, &fields("Home"), &err);
        assert!(result
            .verdicts
            .values()
            .all(|v| v.status == Status::NeedsManualCheck
                && v.reason == "judge call failed: request timed out"));

        let via_finalize = finalize(Err(err), AuditVariant::Sourced, &fields("Home"));
        assert_eq!(via_finalize, result);
    }

    #[test]
    fn fenced_response_is_accepted() {
        let text = format!("```json\n{ALL_PASS_SOURCED}\n```");
        let result = finalize(Ok(text), AuditVariant::Sourced, &fields("Home"));
        assert_eq!(result.status(Aspect::Url), Some(Status::Pass));
    }

    #[test]
    fn validator_is_idempotent() {
        let cases = [
            (Ok(ALL_PASS_SOURCED.to_string()), AuditVariant::Sourced, fields("")),
            (Ok("garbage".to_string()), AuditVariant::Sourced, fields("N/A")),
            (
                Ok(r#"{"product_validity": {"status": "WEIRD"}}"#.to_string()),
                AuditVariant::NoUrl,
                fields("A"),
            ),
            (
                Err(JudgeCallError::new(JudgeCallErrorKind::Network, "dns")),
                AuditVariant::NoUrl,
                fields("none"),
            ),
        ];
        for (outcome, variant, f) in cases {
            let once = finalize(outcome, variant, &f);
            assert_eq!(revalidate(&once, &f), once);
        }
    }
}
