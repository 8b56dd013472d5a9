//! Field normalization.
//!
//! Scraped exports encode category, keyword and image fields inconsistently:
//! JSON arrays, JSON objects, or plain delimited text, sometimes all three in
//! one file. Everything here is infallible; a field that fails to decode is
//! used as literal text.

pub mod language;

use crate::model::ProductRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Values that mark a category as absent, compared case-insensitively after trimming.
pub const NA_TOKENS: [&str; 4] = ["N/A", "NA", "NULL", "NONE"];

/// Maximum number of keywords taken from a JSON array.
pub const MAX_ARRAY_KEYWORDS: usize = 10;

const CATEGORY_PATH_KEY: &str = "catPath";
const CATEGORY_ID_KEY: &str = "catId";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedFields {
    pub category_text: String,
    /// Authoritative: overrides any category verdict from the judge.
    pub category_is_empty_or_na: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    pub keyword_text: String,
    pub image_urls: Vec<String>,
}

pub fn normalize(record: &ProductRecord) -> NormalizedFields {
    let category_text = normalize_category(&record.category_raw);
    let category_id = record
        .category_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .or_else(|| category_id_from_raw(&record.category_raw));

    NormalizedFields {
        category_is_empty_or_na: is_empty_or_na(&category_text),
        category_text,
        category_id,
        keyword_text: normalize_keywords(&record.keyword_raw),
        image_urls: record
            .image_list_raw
            .as_deref()
            .map(parse_image_list)
            .unwrap_or_default(),
    }
}

pub fn is_empty_or_na(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty()
        || NA_TOKENS
            .iter()
            .any(|token| trimmed.eq_ignore_ascii_case(token))
}

/// Category path from a raw category field.
pub fn normalize_category(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Array(items)) => match items.first() {
                Some(first) => category_path(first),
                None => String::new(),
            },
            _ => raw.to_string(),
        }
    } else if trimmed.starts_with('{') {
        match serde_json::from_str::<Value>(trimmed) {
            Ok(obj @ Value::Object(_)) => category_path(&obj),
            _ => raw.to_string(),
        }
    } else {
        raw.to_string()
    }
}

fn category_path(entry: &Value) -> String {
    match entry.get(CATEGORY_PATH_KEY) {
        Some(path) => stringify(path),
        None => stringify(entry),
    }
}

/// `catId` of a JSON-encoded category, if any.
pub fn category_id_from_raw(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if !(trimmed.starts_with('[') || trimmed.starts_with('{')) {
        return None;
    }
    let value: Value = serde_json::from_str(trimmed).ok()?;
    let entry = match &value {
        Value::Array(items) => items.first()?,
        other => other,
    };
    entry.get(CATEGORY_ID_KEY).map(stringify)
}

/// Comma-joined keyword text from a raw keyword field.
pub fn normalize_keywords(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') {
        match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Object(map)) => {
                match map.get("keywords_english").or_else(|| map.get("keywords")) {
                    Some(Value::Object(inner)) => join(inner.values()),
                    Some(Value::Array(items)) => join(items.iter()),
                    Some(other) => stringify(other),
                    None => Value::Object(map).to_string(),
                }
            }
            _ => raw.to_string(),
        }
    } else if trimmed.starts_with('[') {
        match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Array(items)) => join(items.iter().take(MAX_ARRAY_KEYWORDS)),
            _ => raw.to_string(),
        }
    } else {
        raw.to_string()
    }
}

/// Image URLs from a JSON list/mapping or a comma-separated string.
pub fn parse_image_list(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Array(items)) => return collect_urls(items.iter()),
            Ok(Value::Object(map)) => return collect_urls(map.values()),
            _ => {}
        }
    }
    split_commas(raw)
}

fn collect_urls<'a>(values: impl Iterator<Item = &'a Value>) -> Vec<String> {
    values
        .map(stringify)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn split_commas(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn join<'a>(values: impl Iterator<Item = &'a Value>) -> String {
    values.map(stringify).collect::<Vec<_>>().join(", ")
}

/// Strings verbatim, everything else as compact JSON.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn category_array_prefers_cat_path() {
        let raw = r#"[{"catId": 1203, "catPath": "Home > Kitchen > Bottles"}, {"catPath": "ignored"}]"#;
        assert_eq!(normalize_category(raw), "Home > Kitchen > Bottles");
        assert_eq!(category_id_from_raw(raw).as_deref(), Some("1203"));
    }

    #[test]
    fn category_object_without_cat_path_is_stringified() {
        let raw = r#"{"name": "Bottles"}"#;
        assert_eq!(normalize_category(raw), r#"{"name":"Bottles"}"#);
    }

    #[test]
    fn category_broken_json_is_literal() {
        assert_eq!(normalize_category("[not json"), "[not json");
        assert_eq!(normalize_category("{oops"), "{oops");
        assert_eq!(normalize_category("Garden Tools"), "Garden Tools");
    }

    #[test]
    fn empty_array_category_is_empty() {
        assert_eq!(normalize_category("[]"), "");
        assert!(is_empty_or_na(&normalize_category("[]")));
    }

    #[test]
    fn na_tokens_are_case_insensitive() {
        for raw in ["", "   ", "N/A", "n/a", " na ", "Null", "NONE", "none\t"] {
            assert!(is_empty_or_na(raw), "{raw:?} should count as empty");
        }
        for raw in ["Nail Art", "N/A Tools", "Kitchen"] {
            assert!(!is_empty_or_na(raw), "{raw:?} should not count as empty");
        }
    }

    #[test]
    fn keywords_object_prefers_english() {
        let raw = r#"{"keywords": {"0": "Flasche"}, "keywords_english": {"0": "bottle", "1": "steel", "2": "750ml"}}"#;
        assert_eq!(normalize_keywords(raw), "bottle, steel, 750ml");

        let raw = r#"{"keywords": {"0": "bottle", "1": "flask"}}"#;
        assert_eq!(normalize_keywords(raw), "bottle, flask");

        let raw = r#"{"tags": ["x"]}"#;
        assert_eq!(normalize_keywords(raw), r#"{"tags":["x"]}"#);
    }

    #[test]
    fn keywords_array_is_capped_at_ten() {
        let raw = serde_json::to_string(&(1..=12).map(|i| format!("k{i}")).collect::<Vec<_>>())
            .unwrap();
        let text = normalize_keywords(&raw);
        assert_eq!(text.split(", ").count(), MAX_ARRAY_KEYWORDS);
        assert!(text.starts_with("k1, k2"));
        assert!(!text.contains("k11"));
    }

    #[test]
    fn keywords_fallback_to_literal() {
        assert_eq!(normalize_keywords("bottle, flask"), "bottle, flask");
        assert_eq!(normalize_keywords("{broken"), "{broken");
        assert_eq!(normalize_keywords("[1, 2"), "[1, 2");
    }

    #[test]
    fn image_list_variants() {
        assert_eq!(
            parse_image_list(r#"["https://a/1.jpg", "", "https://a/2.jpg"]"#),
            vec!["https://a/1.jpg", "https://a/2.jpg"]
        );
        assert_eq!(
            parse_image_list(r#"{"main": "https://a/1.jpg", "alt": "https://a/2.jpg"}"#),
            vec!["https://a/1.jpg", "https://a/2.jpg"]
        );
        assert_eq!(
            parse_image_list(" https://a/1.jpg , ,https://a/2.jpg "),
            vec!["https://a/1.jpg", "https://a/2.jpg"]
        );
        assert_eq!(parse_image_list("[broken, https://a/3.jpg"), vec!["[broken", "https://a/3.jpg"]);
    }

    #[test]
    fn explicit_category_id_wins() {
        let record = ProductRecord {
            category_raw: r#"[{"catId": 7, "catPath": "A > B"}]"#.into(),
            category_id: Some("99".into()),
            ..Default::default()
        };
        let fields = normalize(&record);
        assert_eq!(fields.category_id.as_deref(), Some("99"));
        assert_eq!(fields.category_text, "A > B");
        assert!(!fields.category_is_empty_or_na);
    }

    proptest! {
        #[test]
        fn cat_path_of_first_element_is_taken_verbatim(
            path in "[A-Za-z0-9 >&/-]{0,40}",
            other in "[a-z]{1,10}",
        ) {
            let raw = serde_json::json!([{ "catPath": path, "catId": 1 }, { "catPath": other }]).to_string();
            prop_assert_eq!(normalize_category(&raw), path);
        }

        #[test]
        fn na_variants_always_flag(
            token in prop::sample::select(NA_TOKENS.to_vec()),
            lead in "[ \t]{0,3}",
            trail in "[ \t]{0,3}",
            lower in any::<bool>(),
        ) {
            let token = if lower { token.to_lowercase() } else { token.to_string() };
            let record = ProductRecord {
                category_raw: format!("{lead}{token}{trail}"),
                ..Default::default()
            };
            prop_assert!(normalize(&record).category_is_empty_or_na);
        }

        #[test]
        fn whitespace_only_always_flags(ws in "[ \t\r\n]{0,8}") {
            prop_assert!(is_empty_or_na(&ws));
        }
    }
}
