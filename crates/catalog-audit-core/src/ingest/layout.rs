//! Column layouts of the three record sources.

use super::{Row, Table};
use crate::candidate::ContentRow;
use crate::model::ProductRecord;

const ONLINE_ID: &[&str] = &["offer_id", "supplier_id", "id"];
const ONLINE_KEYWORDS: &[&str] = &["keywords", "keyword_ai"];

const ORIGINAL_TITLE: &[&str] = &["Title_Original", "original_title"];
const ORIGINAL_DESCRIPTION: &[&str] = &["Description_original", "original_description"];
const OPTIMIZED_TITLE: &[&str] = &["Title_AI_optimized", "optimized_title"];
const OPTIMIZED_DESCRIPTION: &[&str] = &["Description_optimized_AI", "optimized_description"];

const CONTENT_COLUMNS: &[&[&str]] = &[
    ORIGINAL_TITLE,
    ORIGINAL_DESCRIPTION,
    OPTIMIZED_TITLE,
    OPTIMIZED_DESCRIPTION,
    &["lang"],
];

fn optional(value: &str) -> Option<String> {
    let v = value.trim();
    (!v.is_empty()).then(|| v.to_string())
}

/// Scraped layout: `id, url, title, description, product_main_image,
/// product_image_list, cate_info_ai, keyword_ai`. `source_file` tags every row.
pub fn scraped_records(table: &Table, source_file: Option<&str>) -> Vec<ProductRecord> {
    table
        .rows()
        .map(|row| ProductRecord {
            id: row.get("id").trim().to_string(),
            url: optional(row.get("url")),
            title: row.get("title").to_string(),
            description: row.get("description").to_string(),
            category_raw: row.get("cate_info_ai").to_string(),
            keyword_raw: row.get("keyword_ai").to_string(),
            image_list_raw: optional(row.get("product_image_list")),
            category_id: None,
            origin_url: None,
            source_file: row
                .non_blank("source_file")
                .or_else(|| source_file.map(str::to_string)),
        })
        .collect()
}

/// Online layout. The id is `offer_id`, else `supplier_id`. An explicit
/// `category_id`/`category_name` pair wins over `cate_info_ai` only when both
/// are present. `url` is kept as a grouping tag and never judged.
pub fn online_records(table: &Table, source_file: Option<&str>) -> Vec<ProductRecord> {
    table.rows().map(|row| online_record(&row, source_file)).collect()
}

fn online_record(row: &Row<'_>, source_file: Option<&str>) -> ProductRecord {
    let category_id = row.non_blank("category_id");
    let category_name = row.non_blank("category_name");
    let (category_raw, category_id) = match (category_id, category_name) {
        (Some(id), Some(name)) => (name, Some(id)),
        (id, name) => {
            let ai = row.get("cate_info_ai");
            if ai.trim().is_empty() {
                (name.unwrap_or_default(), id)
            } else {
                // the normalizer pulls catId/catPath out of the AI payload
                (ai.to_string(), None)
            }
        }
    };
    ProductRecord {
        id: row.first_of(ONLINE_ID).trim().to_string(),
        url: None,
        title: row.get("title").to_string(),
        description: row.get("description").to_string(),
        category_raw,
        keyword_raw: row.first_of(ONLINE_KEYWORDS).to_string(),
        image_list_raw: None,
        category_id,
        origin_url: optional(row.get("url")),
        source_file: row
            .non_blank("source_file")
            .or_else(|| source_file.map(str::to_string)),
    }
}

/// Content-optimization layout; unrecognized columns pass through as `extra`.
pub fn content_rows(table: &Table) -> Vec<ContentRow> {
    table
        .rows()
        .map(|row| ContentRow {
            id: optional(row.get("id")),
            original_title: row.first_of(ORIGINAL_TITLE).to_string(),
            original_description: row.first_of(ORIGINAL_DESCRIPTION).to_string(),
            optimized_title_raw: row.first_of(OPTIMIZED_TITLE).to_string(),
            optimized_description: row.first_of(OPTIMIZED_DESCRIPTION).to_string(),
            lang: optional(row.get("lang")),
            extra: row
                .pairs()
                .filter(|(h, _)| *h != "id" && !CONTENT_COLUMNS.iter().any(|a| a.contains(h)))
                .map(|(h, v)| (h.to_string(), v.to_string()))
                .collect(),
        })
        .collect()
}
