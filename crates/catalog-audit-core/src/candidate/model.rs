use crate::judge::Rubric;
use crate::normalize::language::{self, SourceLang};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Content-optimization row as read from the record source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub original_title: String,
    pub original_description: String,
    /// One title, a JSON array of titles, or a comma-separated list.
    pub optimized_title_raw: String,
    pub optimized_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    /// Remaining input columns, passed through to the result in input order.
    #[serde(default)]
    pub extra: Vec<(String, String)>,
}

impl ContentRow {
    /// Rows missing an original title, optimized titles or an optimized description are skipped.
    pub fn is_complete(&self) -> bool {
        !self.original_title.trim().is_empty()
            && !self.optimized_title_raw.trim().is_empty()
            && !self.optimized_description.trim().is_empty()
    }

    pub fn content_input(&self) -> ContentInput {
        ContentInput {
            id: self.id.clone(),
            original_title: self.original_title.clone(),
            original_description: self.original_description.clone(),
            optimized_description: self.optimized_description.clone(),
            lang: language::resolve(
                self.lang.as_deref(),
                &self.original_title,
                &self.original_description,
            ),
        }
    }
}

/// Everything the rubric prompts need except the candidate title itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub original_title: String,
    pub original_description: String,
    pub optimized_description: String,
    pub lang: SourceLang,
}

/// At least one optimized-title candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSet(Vec<String>);

impl CandidateSet {
    /// `[`-prefixed input decodes as a JSON array, anything else splits on
    /// commas. A broken array falls back to the raw text as the only
    /// candidate. `None` when nothing usable remains.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let titles: Vec<String> = if trimmed.starts_with('[') {
            match serde_json::from_str::<Vec<serde_json::Value>>(trimmed) {
                Ok(items) => items
                    .iter()
                    .map(|v| match v {
                        serde_json::Value::String(s) => s.trim().to_string(),
                        other => other.to_string(),
                    })
                    .filter(|s| !s.is_empty())
                    .collect(),
                Err(_) => vec![trimmed.to_string()],
            }
        } else {
            trimmed
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        };
        if titles.is_empty() {
            None
        } else {
            Some(Self(titles))
        }
    }

    pub fn titles(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionScore {
    /// Always within 0..=2.
    pub score: u8,
    #[serde(default)]
    pub reason: String,
}

/// Decoded rubric verdict for one title or description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RubricEvaluation {
    pub rubric: Rubric,
    #[serde(default)]
    pub must_have: BTreeMap<String, CriterionScore>,
    #[serde(default)]
    pub must_avoid: BTreeMap<String, CriterionScore>,
    pub must_have_score: u8,
    pub must_avoid_score: u8,
    pub overall_score: u8,
    #[serde(default)]
    pub overall_reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RubricEvaluation {
    pub fn failed(rubric: Rubric, error: impl Into<String>) -> Self {
        Self {
            rubric,
            must_have: BTreeMap::new(),
            must_avoid: BTreeMap::new(),
            must_have_score: 0,
            must_avoid_score: 0,
            overall_score: 0,
            overall_reason: String::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Title and description evaluations of one candidate title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEvaluation {
    pub title: RubricEvaluation,
    pub description: RubricEvaluation,
    pub title_score: u8,
    pub description_score: u8,
    pub overall_score: u8,
}

impl ContentEvaluation {
    pub fn new(title: RubricEvaluation, description: RubricEvaluation) -> Self {
        let title_score = title.overall_score;
        let description_score = description.overall_score;
        Self {
            overall_score: combined_score(title_score, description_score),
            title,
            description,
            title_score,
            description_score,
        }
    }

    /// Ranking metric. `overall_score` is itself derived from the other two,
    /// so it is counted twice on purpose.
    pub fn selection_metric(&self) -> u32 {
        u32::from(self.title_score) + u32::from(self.description_score) + u32::from(self.overall_score)
    }
}

/// Mean of the two scores, halves rounded to even.
pub fn combined_score(title_score: u8, description_score: u8) -> u8 {
    let mean = (f64::from(title_score) + f64::from(description_score)) / 2.0;
    mean.round_ties_even() as u8
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedCandidate {
    pub title: String,
    pub evaluation: ContentEvaluation,
    pub candidates_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_set_parsing() {
        assert_eq!(
            CandidateSet::parse(r#"["Steel Bottle 750ml", " Water Bottle ", ""]"#)
                .unwrap()
                .titles(),
            ["Steel Bottle 750ml", "Water Bottle"]
        );
        assert_eq!(
            CandidateSet::parse("Steel Bottle, Water Bottle,,").unwrap().len(),
            2
        );
        assert_eq!(
            CandidateSet::parse(r#"["unterminated"#).unwrap().titles(),
            [r#"["unterminated"#]
        );
        assert!(CandidateSet::parse("  ").is_none());
        assert!(CandidateSet::parse("[]").is_none());
        assert!(CandidateSet::parse(" , ,").is_none());
    }

    #[test]
    fn combined_score_rounds_half_to_even() {
        assert_eq!(combined_score(0, 0), 0);
        assert_eq!(combined_score(1, 0), 0);
        assert_eq!(combined_score(1, 1), 1);
        assert_eq!(combined_score(2, 1), 2);
        assert_eq!(combined_score(2, 2), 2);
    }

    #[test]
    fn metric_double_counts_overall() {
        let mut t = RubricEvaluation::failed(Rubric::Title, "x");
        t.error = None;
        t.overall_score = 2;
        let mut d = RubricEvaluation::failed(Rubric::Description, "x");
        d.error = None;
        d.overall_score = 2;
        let eval = ContentEvaluation::new(t, d);
        assert_eq!(eval.overall_score, 2);
        assert_eq!(eval.selection_metric(), 6);
    }

    #[test]
    fn incomplete_rows_are_detected() {
        let row = ContentRow {
            original_title: "Bottle".into(),
            optimized_title_raw: "Steel Bottle".into(),
            optimized_description: " ".into(),
            ..Default::default()
        };
        assert!(!row.is_complete());
    }
}
