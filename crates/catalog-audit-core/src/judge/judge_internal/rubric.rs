use crate::candidate::ContentInput;
use crate::judge::JudgeRuntimeConfig;
use crate::model::{ChatMessage, CompletionRequest};
use crate::normalize::language::SourceLang;
use serde::{Deserialize, Serialize};

const SYSTEM_EN: &str = "You are a professional product content evaluation expert, skilled at objective scoring according to standards. Always provide evaluation reasons in English.";
const SYSTEM_DE: &str = "Sie sind ein Experte für die Bewertung von Produktinhalten, der sich auf objektive Bewertung nach Standards versteht. Geben Sie immer Bewertungsgründe auf Englisch an.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rubric {
    Title,
    Description,
}

impl Rubric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
        }
    }

    pub fn must_have(&self) -> &'static [&'static str] {
        match self {
            Self::Title => &["criteria_1_clear_product_type", "criteria_2_key_details"],
            Self::Description => &[
                "criteria_1_match_title_original",
                "criteria_2_key_details_upfront",
                "criteria_3_clear_structure",
                "criteria_4_proper_length",
            ],
        }
    }

    pub fn must_avoid(&self) -> &'static [&'static str] {
        match self {
            Self::Title => &[
                "criteria_3_no_extra_details",
                "criteria_4_no_repetition",
                "criteria_5_short_and_clear",
                "criteria_6_no_forbidden_content",
                "criteria_7_no_brand_only",
            ],
            Self::Description => &[
                "criteria_5_no_extra_details",
                "criteria_6_no_repetition",
                "criteria_7_no_forbidden_content",
                "criteria_8_no_care_tips",
            ],
        }
    }
}

/// Input-size band from the combined character length of original title and description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LengthBand {
    ShortInput = 1,
    Sufficient = 2,
    OverSupplied = 3,
}

impl LengthBand {
    pub fn classify(original_title: &str, original_description: &str) -> Self {
        let len = original_title.chars().count() + original_description.chars().count();
        if len < 100 {
            Self::ShortInput
        } else if len < 500 {
            Self::Sufficient
        } else {
            Self::OverSupplied
        }
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }
}

fn criterion_block(keys: &[&str]) -> String {
    keys.iter()
        .map(|k| {
            format!(
                "        \"{k}\": {{\n            \"score\": 0/1/2,\n            \"reason\": \"Evaluation reason in English\"\n        }}"
            )
        })
        .collect::<Vec<_>>()
        .join(",\n")
}

fn output_skeleton(rubric: Rubric) -> String {
    format!(
        "{{\n    \"must_have\": {{\n{}\n    }},\n    \"must_avoid\": {{\n{}\n    }},\n    \"must_have_score\": 0/1/2,\n    \"must_avoid_score\": 0/1/2,\n    \"overall_score\": 0/1/2,\n    \"overall_reason\": \"Overall evaluation reason in English\"\n}}\n",
        criterion_block(rubric.must_have()),
        criterion_block(rubric.must_avoid()),
    )
}

const TITLE_CRITERIA_EN: &str = r#"Evaluation Criteria:

Must Have Requirements:
1. Clear Product Type: The title must include the product type (e.g., "Laptop Lenovo", "Water Bottle") and must match the product type mentioned in the original title and description.
2. Key Details: If there are additional specifications in the original title or description (such as size, material, brand, certificate, application), they should be included in the optimized title.

Must Avoid Issues:
1. No Extra Details: Do not add information not present in the original content.
2. No Repetition or Stuffing: Avoid repeating words or synonym keyword stuffing (e.g., "Steel Metal Bottle Steel").
3. Short and Clear: Title length should be between 3-128 characters (ideal 50-80 characters). Should start with product type, followed by specifications.
4. No Forbidden Content: Do not include prices, VAT, shipping, company names, or incomplete phrases (e.g., ending in "for", "and").
5. No Brand/Model Only: The title cannot be just a brand or model number; it must include the product type.
"#;

const TITLE_CRITERIA_DE: &str = r#"Bewertungskriterien:

Erforderliche Anforderungen (Must Have):
1. Klarer Produkttyp: Der Titel muss den Produkttyp enthalten (z.B. "Laptop Lenovo", "Wasserflasche") und muss mit dem im Originaltitel und in der Beschreibung genannten Produkttyp übereinstimmen.
2. Wichtige Details: Wenn es zusätzliche Spezifikationen im Originaltitel oder in der Beschreibung gibt (wie Größe, Material, Marke, Zertifikat, Anwendung), sollten diese im optimierten Titel enthalten sein.

Zu vermeidende Probleme (Must Avoid):
1. Keine zusätzlichen Details: Fügen Sie keine Informationen hinzu, die nicht im Originalinhalt vorhanden sind.
2. Keine Wiederholung oder Überladung: Vermeiden Sie wiederholte Wörter oder Synonym-Keyword-Stuffing (z.B. "Stahl Metall Flasche Stahl").
3. Kurz und klar: Die Titellänge sollte zwischen 3-128 Zeichen liegen (ideal 50-80 Zeichen). Sollte mit dem Produkttyp beginnen, gefolgt von Spezifikationen.
4. Keine verbotenen Inhalte: Enthalten Sie keine Preise, Mehrwertsteuer, Versand, Firmennamen oder unvollständige Phrasen (z.B. endend mit "für", "und").
5. Nicht nur Marke/Modell: Der Titel darf nicht nur eine Marke oder Modellnummer sein, er muss den Produkttyp enthalten.
"#;

const DESCRIPTION_CRITERIA_EN: &str = r#"Evaluation Criteria:

Must Have Requirements:
1. Match Title and Original: The description must use the same details as the title and original text, with no contradictions.
2. Key Details Upfront: The first sentence should include product type and key specifications (if available).
3. Clear Structure: If there is enough information, it should include: intro sentence (type + specs), bullet points (features, materials, etc.), conclusion (value/use, if in original content).
4. Proper Length:
   - Category 1 (input too little): Output description may be <601 characters; focus on clarity and accuracy
   - Category 2 (input sufficient): Output description must be >610 characters (target 610-700)
   - Category 3 (input too much): Output description must be 600-700 characters; condense and remove redundancy

Must Avoid Issues:
1. No Extra Details: Do not add benefits, use cases, marketing information, or specifications not in the original content.
2. No Repetition or Stuffing: Avoid repeating words or keyword stuffing.
3. No Forbidden Content: Do not include prices, VAT, shipping, company/project information, or incomplete phrases.
4. No Care Tips or Extras: Do not add recipes, maintenance advice, or unsupported claims.
"#;

const DESCRIPTION_CRITERIA_DE: &str = r#"Bewertungskriterien:

Erforderliche Anforderungen (Must Have):
1. Übereinstimmung mit Titel und Original: Die Beschreibung muss die gleichen Details wie der Titel und der Originaltext verwenden, ohne Widersprüche.
2. Wichtige Details zuerst: Der erste Satz sollte den Produkttyp und wichtige Spezifikationen enthalten (falls verfügbar).
3. Klare Struktur: Wenn genügend Informationen vorhanden sind, sollte sie enthalten: Einleitungssatz (Typ + Spezifikationen), Aufzählungspunkte (Funktionen, Materialien usw.), Schlussfolgerung (Wert/Verwendung, falls im Originalinhalt).
4. Angemessene Länge:
   - Kategorie 1 (Eingabe zu wenig): Ausgabebeschreibung kann <601 Zeichen sein; Fokus auf Klarheit und Genauigkeit
   - Kategorie 2 (Eingabe ausreichend): Ausgabebeschreibung muss >610 Zeichen sein (Ziel 610-700)
   - Kategorie 3 (Eingabe zu viel): Ausgabebeschreibung muss 600-700 Zeichen sein; komprimieren und Redundanz entfernen

Zu vermeidende Probleme (Must Avoid):
1. Keine zusätzlichen Details: Fügen Sie keine Vorteile, Anwendungsfälle, Marketinginformationen oder Spezifikationen hinzu, die nicht im Originalinhalt vorhanden sind.
2. Keine Wiederholung oder Überladung: Vermeiden Sie wiederholte Wörter oder Keyword-Stuffing.
3. Keine verbotenen Inhalte: Enthalten Sie keine Preise, Mehrwertsteuer, Versand, Firmen-/Projektinformationen oder unvollständige Phrasen.
4. Keine Pflegetipps oder Extras: Fügen Sie keine Rezepte, Wartungsratschläge oder nicht unterstützte Behauptungen hinzu.
"#;

const SCORING_EN: &str = r#"Scoring System:
- For "Must Have" criteria: 0=does not meet, 1=partially meets, 2=fully meets
- For "Must Avoid" criteria: 0=problem exists (criterion violated), 1=partial problem, 2=no problem (criterion fully met)

Please score each criterion accordingly and provide detailed evaluation results.

IMPORTANT: All "reason" and "overall_reason" fields must be written in English.

Output format as JSON:
"#;

const SCORING_DE: &str = r#"Bewertungssystem:
- Für "Must Have" Kriterien: 0=erfüllt nicht, 1=teilweise erfüllt, 2=vollständig erfüllt
- Für "Must Avoid" Kriterien: 0=Problem vorhanden (Kriterium verletzt), 1=teilweise Problem, 2=kein Problem (Kriterium vollständig eingehalten)

Bitte bewerten Sie jedes Kriterium entsprechend und geben Sie detaillierte Bewertungsergebnisse.

WICHTIG: Alle "reason" und "overall_reason" Felder müssen auf Englisch geschrieben werden.

Ausgabeformat als JSON:
"#;

fn german(lang: SourceLang) -> bool {
    lang == SourceLang::De
}

pub(crate) fn build_title_prompt(input: &ContentInput, optimized_title: &str) -> String {
    let (header, criteria, scoring) = if german(input.lang) {
        (
            format!(
                "Sie sind ein Experte für die Bewertung von Produkttiteln. Bitte bewerten Sie den optimierten Titel nach folgenden Kriterien.\n\n\
                 Originaltitel: {}\nOriginalbeschreibung: {}\nOptimierter Titel: {}\n\n",
                input.original_title, input.original_description, optimized_title
            ),
            TITLE_CRITERIA_DE,
            SCORING_DE,
        )
    } else {
        (
            format!(
                "You are a professional product title evaluation expert. Please evaluate the optimized title according to the following criteria.\n\n\
                 Original Title: {}\nOriginal Description: {}\nOptimized Title: {}\n\n",
                input.original_title, input.original_description, optimized_title
            ),
            TITLE_CRITERIA_EN,
            SCORING_EN,
        )
    };
    format!("{header}{criteria}\n{scoring}{}", output_skeleton(Rubric::Title))
}

pub(crate) fn build_description_prompt(input: &ContentInput, optimized_title: &str) -> String {
    let band = LengthBand::classify(&input.original_title, &input.original_description).code();
    let optimized_len = input.optimized_description.chars().count();
    let (header, criteria, scoring) = if german(input.lang) {
        (
            format!(
                "Sie sind ein Experte für die Bewertung von Produktbeschreibungen. Bitte bewerten Sie die optimierte Beschreibung nach folgenden Kriterien.\n\n\
                 Originaltitel: {}\nOriginalbeschreibung: {}\nOptimierter Titel: {}\nOptimierte Beschreibung: {}\n\n\
                 Eingabetextlänge-Kategorie: {band} (1=zu wenig, 2=ausreichend, 3=zu viel)\n\
                 Optimierte Beschreibungslänge: {optimized_len} Zeichen\n\n",
                input.original_title, input.original_description, optimized_title, input.optimized_description
            ),
            DESCRIPTION_CRITERIA_DE,
            SCORING_DE,
        )
    } else {
        (
            format!(
                "You are a professional product description evaluation expert. Please evaluate the optimized description according to the following criteria.\n\n\
                 Original Title: {}\nOriginal Description: {}\nOptimized Title: {}\nOptimized Description: {}\n\n\
                 Input Text Length Category: {band} (1=too little, 2=sufficient, 3=too much)\n\
                 Optimized Description Length: {optimized_len} characters\n\n",
                input.original_title, input.original_description, optimized_title, input.optimized_description
            ),
            DESCRIPTION_CRITERIA_EN,
            SCORING_EN,
        )
    };
    format!(
        "{header}{criteria}\n{scoring}{}",
        output_skeleton(Rubric::Description)
    )
}

pub(crate) fn rubric_request(
    rubric: Rubric,
    input: &ContentInput,
    optimized_title: &str,
    config: &JudgeRuntimeConfig,
) -> CompletionRequest {
    let user = match rubric {
        Rubric::Title => build_title_prompt(input, optimized_title),
        Rubric::Description => build_description_prompt(input, optimized_title),
    };
    let system = if german(input.lang) { SYSTEM_DE } else { SYSTEM_EN };
    CompletionRequest {
        messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    }
}
