use crate::judge::JudgeRuntimeConfig;
use crate::model::{AuditVariant, ChatMessage, CompletionRequest, ProductRecord};
use crate::normalize::NormalizedFields;

pub(crate) const SOURCED_SYSTEM: &str = "You are a professional product quality auditor. \
You review scraped product information for consistency with the source website. \
The title and description are directly scraped from the source website without AI processing, \
so you should focus on checking consistency between the URL, title, and description. \
Always respond in valid JSON format.";

pub(crate) const NO_URL_SYSTEM: &str = "You are a professional product quality auditor. \
You review product information from online platforms. Since there is no source URL, \
you must evaluate products based solely on title and description. For product validity, \
you need to evaluate: non-spam content (meaningful and relevant, not gibberish or placeholder text) \
and non-product content detection (identify success stories, case studies, portfolio pages, etc.). \
Product validity has only two statuses: PASS or NEEDS_MANUAL_CHECK. \
Always respond in valid JSON format.";

const SOURCED_CRITERIA: &str = r#"**Review Criteria:**

For each aspect (URL, Title, Description, Category, Keyword), please evaluate:
Note: Image review is currently skipped.

**URL Review:**
- Is the URL a valid product page URL?
- Does the URL structure indicate it's a product page (not a category page, homepage, or other non-product page)?
- **IMPORTANT**: Check if the URL is a company success case/portfolio page (e.g., contains "case", "portfolio", "success", "project", "client", "example", "story", etc.). If it's a success case page, it is NOT a product URL and should be marked as NEEDS_MANUAL_CHECK.
- **IMPORTANT**: Check if the URL is a category page or multi-product listing page (e.g., contains "category", "catalog", "products", "list", "collection", "browse", "shop", "all", or shows multiple products). If it's a category/multi-product page, mark as NEEDS_REVIEW and specify "Category page" or "Multi-product page" in the reason.
- Are there any other signs that this is not a product URL (e.g., contains "search", "home", "about", "contact", etc.)?
- **Decision Rules:**
  - If the URL is clearly a valid single product page and is NOT a success case page → mark as PASS
  - If the URL is a success case page → mark as NEEDS_MANUAL_CHECK
  - If the URL is a category page or multi-product listing page → mark as NEEDS_REVIEW with reason "Category page" or "Multi-product page"
  - If you are uncertain or unclear whether it's a product URL → mark as NEEDS_REVIEW

**Title Review:**
Since the title is directly scraped from the source website without AI processing, please check:
- Does the scraped title match the product name/identifier in the source URL?
- Is the title consistent with what would be expected from the URL structure?
- If the URL contains product identifiers or names, do they match the scraped title?
- If there's a mismatch or inconsistency, mark as NEEDS_REVIEW or NEEDS_MANUAL_CHECK accordingly.

**Description Review:**
Since the description is directly scraped from the source website without AI processing, please check:
- Does the scraped description match/relate to the product name in the URL?
- Is the description consistent with the product title?
- Does the description content align with what would be expected for this product based on the URL?
- If there's a mismatch or inconsistency, mark as NEEDS_REVIEW or NEEDS_MANUAL_CHECK accordingly.

**Category Review:**
- Is the AI-predicted category accurate and appropriate?
- Does it match the product type?
- Is the category path logical?
- Are there any issues (wrong category, too broad, too narrow)?

**Keyword Review:**
Since keywords are limited to a maximum of 3, the review criteria is simplified:
- Do the keywords match/describe the product? If yes, then PASS.
- If keywords are irrelevant or don't match the product description, then mark as NEEDS_REVIEW or NEEDS_MANUAL_CHECK based on severity.

**Status Definitions:**
- "PASS": The content is acceptable and can be used directly
  - For Keywords: If keywords match/describe the product, mark as PASS
  - For URL: If the URL is clearly a valid product page
- "NEEDS_REVIEW": The content has minor issues, is uncertain, or needs spot-checking
  - For Keywords: If some keywords are slightly irrelevant but mostly acceptable
  - For URL: If you are uncertain whether the URL is a valid product page, or if the URL is a category page or multi-product listing page (reason "Category page" or "Multi-product page")
  - For Title/Description: If there's slight inconsistency but mostly acceptable
- "NEEDS_MANUAL_CHECK": The content has significant issues and requires manual review
  - For Keywords: If keywords are completely irrelevant or don't match the product at all
  - For URL: If the URL is clearly NOT a product page (e.g., success case page)
  - For Title/Description: If there's significant inconsistency or mismatch
"#;

const NO_URL_CRITERIA: &str = r#"**Review Criteria:**

Since there is no source URL, you need to evaluate the product based on the title and description only.

**Product Validity:**
This evaluation focuses on two key aspects:

1. **Non-Spam Content:**
   - Is the content meaningful and relevant?
   - Does it describe a real product?
   - Is it free of spam, gibberish, or placeholder text?
   - If content is spam, gibberish, or meaningless → mark as NEEDS_MANUAL_CHECK

2. **Non-Product Content Detection:**
   - **IMPORTANT**: Check if the description contains non-product content such as:
     - Company success stories, case studies, portfolio pages
     - Customer testimonials or project examples
     - Company information or "about us" content
     - General service descriptions without specific product details
   - If the content is clearly NOT about a specific product → mark as NEEDS_MANUAL_CHECK with reason "Non-product content (e.g., success story, case study)"

**Decision Rules for Product Validity:**
- **PASS**: the content is meaningful, describes a real product, and is about a specific product
- **NEEDS_MANUAL_CHECK**: the content is spam, gibberish or meaningless, or contains non-product information (success stories, case studies, portfolio pages, etc.)

**Category Review:**
- Is the category appropriate for the product described in title and description?
- Does the category match the product type?
- Is the category path logical?
- **Decision Rules:**
  - If category is accurate and appropriate → mark as PASS
  - If category has minor issues (slightly too broad/narrow) → mark as PASS (still acceptable)
  - If category is wrong or significantly inappropriate → mark as NEEDS_MANUAL_CHECK
  - **IMPORTANT**: If category is empty or N/A → mark as NEEDS_MANUAL_CHECK

**Keyword Review:**
- Do the keywords match/describe the product?
- Are keywords relevant to the product?
- **Decision Rules:**
  - If keywords match/describe the product → mark as PASS
  - If some keywords are slightly irrelevant but mostly acceptable → mark as PASS (still acceptable)
  - If keywords are completely irrelevant or don't match the product → mark as NEEDS_MANUAL_CHECK

**Status Definitions:**
- "PASS": The content is acceptable and can be used directly
- "NEEDS_MANUAL_CHECK": The content has significant issues and requires manual review
"#;

const JSON_ONLY: &str = "**Important:** Please respond ONLY with valid JSON, no additional text or explanations before or after the JSON.";

fn or_na(value: &str) -> &str {
    if value.trim().is_empty() {
        "N/A"
    } else {
        value
    }
}

/// JSON skeleton listing every aspect of the variant with its exact vocabulary.
fn output_format(variant: AuditVariant) -> String {
    let vocabulary = variant
        .vocabulary()
        .iter()
        .map(|s| format!("\"{s}\""))
        .collect::<Vec<_>>()
        .join(" | ");
    let entries = variant
        .required_aspects()
        .iter()
        .map(|aspect| {
            format!(
                "    \"{}\": {{\n        \"status\": {vocabulary},\n        \"reason\": \"Brief explanation of the review decision\"\n    }}",
                aspect.key()
            )
        })
        .collect::<Vec<_>>()
        .join(",\n");
    format!(
        "**Output Format:**\nPlease provide your review in the following JSON format:\n{{\n{entries}\n}}\n"
    )
}

pub(crate) fn build_sourced_prompt(record: &ProductRecord, fields: &NormalizedFields) -> String {
    let url = record.source_url().unwrap_or("N/A");
    let mut prompt = format!(
        "You are an AI product auditor. Please review the following product information scraped from a website and imported to a new platform.\n\n\
         **Product Source URL:** {url}\n\n\
         **Product Information to Review:**\n\n\
         0. **Product URL** (scraped URL):\n{url}\n\n\
         1. **Title** (scraped from source website):\n{}\n\n\
         2. **Description** (scraped from source website):\n{}\n\n\
         3. **AI Predicted Category:**\n{}\n\n\
         4. **AI Predicted Keywords:**\n{}\n\n",
        or_na(&record.title),
        or_na(&record.description),
        or_na(&fields.category_text),
        or_na(&fields.keyword_text),
    );
    prompt.push_str(SOURCED_CRITERIA);
    prompt.push('\n');
    prompt.push_str(&output_format(AuditVariant::Sourced));
    prompt.push('\n');
    prompt.push_str(JSON_ONLY);
    prompt
}

pub(crate) fn build_no_url_prompt(record: &ProductRecord, fields: &NormalizedFields) -> String {
    let mut prompt = format!(
        "You are an AI product auditor. Please review the following product information from an online platform.\n\n\
         **Product Information to Review:**\n\n\
         1. **Title:**\n{}\n\n\
         2. **Description:**\n{}\n\n\
         3. **Category:**\nID: {}\nName: {}\n\n\
         4. **Keywords:**\n{}\n\n",
        or_na(&record.title),
        or_na(&record.description),
        or_na(fields.category_id.as_deref().unwrap_or("")),
        or_na(&fields.category_text),
        or_na(&fields.keyword_text),
    );
    prompt.push_str(NO_URL_CRITERIA);
    prompt.push('\n');
    prompt.push_str(&output_format(AuditVariant::NoUrl));
    prompt.push('\n');
    prompt.push_str(JSON_ONLY);
    prompt
}

pub(crate) fn review_request(
    record: &ProductRecord,
    fields: &NormalizedFields,
    config: &JudgeRuntimeConfig,
) -> CompletionRequest {
    let (system, user) = match record.variant() {
        AuditVariant::Sourced => (SOURCED_SYSTEM, build_sourced_prompt(record, fields)),
        AuditVariant::NoUrl => (NO_URL_SYSTEM, build_no_url_prompt(record, fields)),
    };
    CompletionRequest {
        messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    fn sourced() -> ProductRecord {
        ProductRecord {
            id: "7".into(),
            url: Some("https://shop.example/products/bottle-750".into()),
            title: "Steel Bottle 750ml".into(),
            description: String::new(),
            category_raw: r#"[{"catPath": "Home > Kitchen"}]"#.into(),
            keyword_raw: r#"{"keywords_english": {"0": "bottle"}}"#.into(),
            ..Default::default()
        }
    }

    #[test]
    fn sourced_prompt_lists_every_aspect_with_full_vocabulary() {
        let record = sourced();
        let prompt = build_sourced_prompt(&record, &normalize(&record));
        for key in ["url_review", "title_review", "description_review", "category_review", "keyword_review"] {
            assert!(prompt.contains(&format!("\"{key}\"")), "missing {key}");
        }
        assert!(prompt.contains(r#""PASS" | "NEEDS_REVIEW" | "NEEDS_MANUAL_CHECK""#));
        assert!(prompt.contains("Category page"));
        assert!(prompt.contains("Home > Kitchen"));
        assert!(prompt.contains("2. **Description** (scraped from source website):\nN/A"));
        assert!(prompt.ends_with(JSON_ONLY));
        assert!(!prompt.contains("image_review"));
    }

    #[test]
    fn no_url_prompt_restricts_vocabulary() {
        let record = ProductRecord {
            title: "Steel Bottle".into(),
            keyword_raw: r#"["bottle", "steel"]"#.into(),
            ..Default::default()
        };
        let prompt = build_no_url_prompt(&record, &normalize(&record));
        assert!(prompt.contains(r#""status": "PASS" | "NEEDS_MANUAL_CHECK""#));
        assert!(!prompt.contains("NEEDS_REVIEW"));
        assert!(prompt.contains("ID: N/A\nName: N/A"));
        assert!(prompt.contains("bottle, steel"));
    }

    #[test]
    fn prompts_are_deterministic() {
        let record = sourced();
        let fields = normalize(&record);
        assert_eq!(
            build_sourced_prompt(&record, &fields),
            build_sourced_prompt(&record, &fields)
        );
    }
}
