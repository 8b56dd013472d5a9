//! Record sources: CSV (header row, BOM tolerated) and JSON Lines.
//!
//! Both formats load into a [`Table`] of string cells; [`layout`] maps a table
//! onto product or content rows.

pub mod layout;

use anyhow::{bail, Context};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

pub use layout::{content_rows, online_records, scraped_records};

const BOM: char = '\u{feff}';

/// Column-named string cells, input order preserved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        let headers: Vec<String> = headers
            .into_iter()
            .map(|h| h.trim_start_matches(BOM).trim().to_string())
            .collect();
        let mut index = HashMap::new();
        for (i, h) in headers.iter().enumerate() {
            // first column wins on duplicate headers
            index.entry(h.clone()).or_insert(i);
        }
        Self {
            headers,
            index,
            rows: Vec::new(),
        }
    }

    /// Short rows are padded with empty cells.
    pub fn push_row(&mut self, mut cells: Vec<String>) {
        cells.resize(self.headers.len().max(cells.len()), String::new());
        self.rows.push(cells);
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(move |cells| Row { table: self, cells })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    cells: &'a [String],
}

impl<'a> Row<'a> {
    /// Cell value; empty when the column is absent.
    pub fn get(&self, column: &str) -> &'a str {
        self.table
            .index
            .get(column)
            .and_then(|i| self.cells.get(*i))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// First alias with a non-blank value.
    pub fn first_of(&self, aliases: &[&str]) -> &'a str {
        aliases
            .iter()
            .map(|a| self.get(a))
            .find(|v| !v.trim().is_empty())
            .unwrap_or("")
    }

    pub fn non_blank(&self, column: &str) -> Option<String> {
        let v = self.get(column).trim();
        (!v.is_empty()).then(|| v.to_string())
    }

    pub fn cells(&self) -> &'a [String] {
        self.cells
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&'a str, &'a str)> {
        let cells = self.cells;
        self.table
            .headers
            .iter()
            .enumerate()
            .map(move |(i, h)| (h.as_str(), cells.get(i).map(String::as_str).unwrap_or("")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    JsonLines,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase) {
            Some(ext) if ext == "jsonl" || ext == "ndjson" => Self::JsonLines,
            _ => Self::Csv,
        }
    }
}

pub fn read_table(path: &Path) -> anyhow::Result<Table> {
    let table = match InputFormat::from_path(path) {
        InputFormat::Csv => read_csv(path),
        InputFormat::JsonLines => read_jsonl(path),
    }?;
    tracing::info!(path = %path.display(), rows = table.len(), "record source loaded");
    Ok(table)
}

pub fn read_csv(path: &Path) -> anyhow::Result<Table> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read record source {}", path.display()))?;
    parse_csv(&text).with_context(|| format!("failed to parse CSV {}", path.display()))
}

pub fn parse_csv(text: &str) -> anyhow::Result<Table> {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = reader
        .headers()
        .context("missing header row")?
        .iter()
        .map(str::to_string)
        .collect();
    let mut table = Table::new(headers);
    for (idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("malformed CSV row {}", idx + 2))?;
        table.push_row(record.iter().map(str::to_string).collect());
    }
    Ok(table)
}

pub fn read_jsonl(path: &Path) -> anyhow::Result<Table> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read record source {}", path.display()))?;
    parse_jsonl(&text).with_context(|| format!("failed to parse JSON Lines {}", path.display()))
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        // nested values stay as JSON text so the normalizer sees the encoding
        other => other.to_string(),
    }
}

/// Columns are the union of object keys in first-seen order.
pub fn parse_jsonl(text: &str) -> anyhow::Result<Table> {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    let mut objects = Vec::new();
    let mut headers: Vec<String> = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(line)
            .with_context(|| format!("invalid JSON on line {}", idx + 1))?;
        let Value::Object(map) = value else {
            bail!("line {} is not a JSON object", idx + 1);
        };
        for key in map.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
        objects.push(map);
    }
    let mut table = Table::new(headers.clone());
    for map in objects {
        table.push_row(
            headers
                .iter()
                .map(|h| map.get(h).map(cell).unwrap_or_default())
                .collect(),
        );
    }
    Ok(table)
}

/// Source-file tag: the file stem.
pub fn source_tag(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}
