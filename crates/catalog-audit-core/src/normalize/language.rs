//! Source-language detection for the content-quality rubric.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Common German words; three distinct hits mark a text as German.
const GERMAN_WORDS: &[&str] = &[
    "der", "die", "das", "und", "ist", "sind", "für", "mit", "auf", "zu", "von", "über", "unter",
    "nach", "vor", "bei", "durch", "gegen", "ohne", "als", "wie", "wenn", "dass", "wird",
    "werden", "kann", "können", "muss", "müssen", "hat", "haben", "wurde", "wurden", "sein",
    "seine", "ihr", "ihre", "produkt", "artikel", "ware", "marke", "hersteller", "modell", "typ",
    "qualität", "größe", "farbe", "preis", "kosten", "versand", "lieferung", "bestellung", "kauf",
    "verkauf", "verfügbar", "erhältlich", "lager", "vorrätig", "empfehlung", "bewertung", "kunde",
    "garantie", "rückgabe", "umtausch", "versandkosten", "zahlung", "rechnung", "lieferzeit",
    "verfügbarkeit", "rabatt", "angebot", "sonderangebot", "neuheit", "beliebt", "technologie",
    "technisch", "elektronik", "elektrisch", "automatisch", "kompatibel", "zubehör",
    "professionell", "haushalt", "büro", "geschäft", "industrie", "gesundheit", "funktion",
    "funktional", "eigenschaft", "merkmal", "vorteil",
];

const GERMAN_WORD_THRESHOLD: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceLang {
    #[default]
    En,
    De,
    Zh,
}

impl SourceLang {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::De => "de",
            Self::Zh => "zh",
        }
    }

    /// Language from an explicit `lang` column. Unknown codes prompt in English.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_lowercase().as_str() {
            "de" | "de-de" | "ger" | "deu" => Self::De,
            "zh" | "zh-cn" | "cn" => Self::Zh,
            _ => Self::En,
        }
    }
}

lazy_static! {
    /// CJK unified ideographs.
    static ref CJK: Regex = Regex::new(r"[\u{4e00}-\u{9fff}]").unwrap();
    static ref UMLAUT: Regex = Regex::new(r"[äöüÄÖÜß]").unwrap();
}

pub fn detect(text: &str) -> SourceLang {
    if text.trim().is_empty() {
        return SourceLang::En;
    }
    if CJK.is_match(text) {
        return SourceLang::Zh;
    }
    if UMLAUT.is_match(text) {
        return SourceLang::De;
    }

    let lower = text.to_lowercase();
    let mut hits: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| GERMAN_WORDS.contains(w))
        .collect();
    hits.sort_unstable();
    hits.dedup();
    if hits.len() >= GERMAN_WORD_THRESHOLD {
        SourceLang::De
    } else {
        SourceLang::En
    }
}

/// Prompt language for one row: explicit `lang` wins, then the title's
/// language unless English, then the description's.
pub fn resolve(lang_field: Option<&str>, title: &str, description: &str) -> SourceLang {
    if let Some(code) = lang_field.map(str::trim).filter(|c| !c.is_empty()) {
        return SourceLang::from_code(code);
    }
    match detect(title) {
        SourceLang::En => detect(description),
        other => other,
    }
}
