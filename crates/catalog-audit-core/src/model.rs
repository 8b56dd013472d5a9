use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One product row as delivered by a record source. Never mutated by the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: String,
    /// Source page the product was scraped from. Populated only for the sourced audit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Category as found in the input: JSON array/object or plain text.
    #[serde(default)]
    pub category_raw: String,
    /// Keywords as found in the input: JSON array/object or plain text.
    #[serde(default)]
    pub keyword_raw: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_list_raw: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    /// URL carried as a grouping tag only (online layout); never shown to the judge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
}

impl ProductRecord {
    /// Trimmed, non-empty source URL.
    pub fn source_url(&self) -> Option<&str> {
        non_empty(self.url.as_deref())
    }

    /// URL used for per-URL grouping: the origin tag, else the source URL.
    pub fn grouping_url(&self) -> Option<&str> {
        non_empty(self.origin_url.as_deref()).or_else(|| self.source_url())
    }

    /// The prompt variant follows from which fields are populated.
    pub fn variant(&self) -> AuditVariant {
        if self.source_url().is_some() {
            AuditVariant::Sourced
        } else {
            AuditVariant::NoUrl
        }
    }
}

fn non_empty(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditVariant {
    /// Scraped record with its source URL.
    Sourced,
    /// Online record without a source URL; judged on title and description only.
    NoUrl,
}

impl AuditVariant {
    pub fn required_aspects(&self) -> &'static [Aspect] {
        match self {
            Self::Sourced => &[
                Aspect::Url,
                Aspect::Title,
                Aspect::Description,
                Aspect::Category,
                Aspect::Keyword,
            ],
            Self::NoUrl => &[Aspect::ProductValidity, Aspect::Category, Aspect::Keyword],
        }
    }

    /// Status vocabulary the judge is allowed to use in this variant.
    pub fn vocabulary(&self) -> &'static [Status] {
        match self {
            Self::Sourced => &[Status::Pass, Status::NeedsReview, Status::NeedsManualCheck],
            Self::NoUrl => &[Status::Pass, Status::NeedsManualCheck],
        }
    }

    pub fn allows(&self, status: Status) -> bool {
        self.vocabulary().contains(&status)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sourced => "sourced",
            Self::NoUrl => "no_url",
        }
    }
}

/// One reviewable facet of a record. Serialized as the judge's JSON key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Aspect {
    #[serde(rename = "product_validity")]
    ProductValidity,
    #[serde(rename = "url_review")]
    Url,
    #[serde(rename = "title_review")]
    Title,
    #[serde(rename = "description_review")]
    Description,
    #[serde(rename = "category_review")]
    Category,
    #[serde(rename = "keyword_review")]
    Keyword,
}

impl Aspect {
    pub const ALL: [Aspect; 6] = [
        Aspect::ProductValidity,
        Aspect::Url,
        Aspect::Title,
        Aspect::Description,
        Aspect::Category,
        Aspect::Keyword,
    ];

    /// Key used in the judge's JSON response.
    pub fn key(&self) -> &'static str {
        match self {
            Self::ProductValidity => "product_validity",
            Self::Url => "url_review",
            Self::Title => "title_review",
            Self::Description => "description_review",
            Self::Category => "category_review",
            Self::Keyword => "keyword_review",
        }
    }

    /// Short column label used by the result sink and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ProductValidity => "product_validity",
            Self::Url => "url",
            Self::Title => "title",
            Self::Description => "description",
            Self::Category => "category",
            Self::Keyword => "keyword",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.label() == label)
    }
}

impl fmt::Display for Aspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Pass,
    NeedsReview,
    NeedsManualCheck,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Pass, Status::NeedsReview, Status::NeedsManualCheck];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::NeedsReview => "NEEDS_REVIEW",
            Self::NeedsManualCheck => "NEEDS_MANUAL_CHECK",
        }
    }

    /// Case-insensitive parse of a judge-provided status string.
    pub fn parse(raw: &str) -> Option<Self> {
        let upper = raw.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|s| s.as_str() == upper)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub status: Status,
    #[serde(default)]
    pub reason: String,
}

impl Verdict {
    pub fn new(status: Status, reason: impl Into<String>) -> Self {
        Self {
            status,
            reason: reason.into(),
        }
    }

    pub fn manual_check(reason: impl Into<String>) -> Self {
        Self::new(Status::NeedsManualCheck, reason)
    }
}

/// Finalized verdicts for one record. Every aspect of `variant` is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditResult {
    pub variant: AuditVariant,
    pub verdicts: BTreeMap<Aspect, Verdict>,
}

impl AuditResult {
    pub fn get(&self, aspect: Aspect) -> Option<&Verdict> {
        self.verdicts.get(&aspect)
    }

    pub fn status(&self, aspect: Aspect) -> Option<Status> {
        self.get(aspect).map(|v| v.status)
    }

    /// True when at least one aspect is not PASS.
    pub fn has_issues(&self) -> bool {
        self.verdicts.values().any(|v| v.status != Status::Pass)
    }

    /// The verdict map in the judge's own JSON shape.
    pub fn to_judge_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.verdicts).unwrap_or_default()
    }
}

/// A record paired with its finalized result, as handed to the result sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditedRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default)]
    pub category_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    pub result: AuditResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Role-tagged request handed to the judge capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    /// Text of the user turn; used by fakes and for logging.
    pub fn user_prompt(&self) -> &str {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub provider: String,
    pub model: String,
    #[serde(default)]
    pub meta: serde_json::Value,
}
