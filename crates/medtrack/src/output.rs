//! Output formatting: table, JSON, YAML, plain.
//!
//! Documents are schemaless, so tables are built column-by-column from
//! the union of keys instead of a `Tabled` derive.

use std::io::{self, IsTerminal, Write};

use medtrack_core::Document;
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a collection snapshot in the chosen format.
///
/// - `table`: one row per document, `id` first, then every other key in
///   first-seen order
/// - `json` / `json-compact` / `yaml`: the documents as served
/// - `plain`: one id per line
pub fn render_documents(format: &OutputFormat, docs: &[Document]) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => Ok(render_table(docs)),
        OutputFormat::Json => render_json(docs, false),
        OutputFormat::JsonCompact => render_json(docs, true),
        OutputFormat::Yaml => render_yaml(docs),
        OutputFormat::Plain => Ok(docs.iter().map(Document::id).collect::<Vec<_>>().join("\n")),
    }
}

/// Render one document. Table format shows a field/value listing.
pub fn render_document(format: &OutputFormat, doc: &Document) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => Ok(render_detail(doc)),
        OutputFormat::Json => render_json(doc, false),
        OutputFormat::JsonCompact => render_json(doc, true),
        OutputFormat::Yaml => render_yaml(doc),
        OutputFormat::Plain => Ok(doc.id().to_owned()),
    }
}

/// Render the id returned by a create.
pub fn render_created(format: &OutputFormat, id: &str) -> Result<String, CliError> {
    let value = serde_json::json!({ "id": id });
    match format {
        OutputFormat::Table | OutputFormat::Plain => Ok(id.to_owned()),
        OutputFormat::Json => render_json(&value, false),
        OutputFormat::JsonCompact => render_json(&value, true),
        OutputFormat::Yaml => render_yaml(&value),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn columns(docs: &[Document]) -> Vec<&str> {
    let mut cols = vec!["id"];
    for doc in docs {
        for key in doc.keys() {
            if !cols.contains(&key.as_str()) {
                cols.push(key.as_str());
            }
        }
    }
    cols
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn render_table(docs: &[Document]) -> String {
    if docs.is_empty() {
        return String::new();
    }
    let cols = columns(docs);
    let mut builder = Builder::default();
    builder.push_record(cols.iter().copied());
    for doc in docs {
        builder.push_record(cols.iter().map(|c| cell(doc.get(c))));
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

fn render_detail(doc: &Document) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    builder.push_record(["id".to_owned(), doc.id().to_owned()]);
    for (key, value) in doc.iter().filter(|(k, _)| k.as_str() != "id") {
        builder.push_record([key.clone(), cell(Some(value))]);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let out = if compact {
        serde_json::to_string(data)?
    } else {
        serde_json::to_string_pretty(data)?
    };
    Ok(out)
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    Ok(serde_yaml::to_string(data)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn docs() -> Vec<Document> {
        serde_json::from_value(json!([
            {"id": "1", "name": "Aspirin", "quantity": 10},
            {"id": "2", "name": "Ibuprofen", "expirationDate": "2026-01-01"}
        ]))
        .unwrap()
    }

    #[test]
    fn table_columns_are_union_of_keys() {
        assert_eq!(
            columns(&docs()),
            ["id", "name", "quantity", "expirationDate"]
        );
        let table = render_documents(&OutputFormat::Table, &docs()).unwrap();
        assert!(table.contains("expirationDate"));
        assert!(table.contains("Aspirin"));
    }

    #[test]
    fn plain_prints_ids() {
        let out = render_documents(&OutputFormat::Plain, &docs()).unwrap();
        assert_eq!(out, "1\n2");
    }

    #[test]
    fn compact_json_keeps_server_shape() {
        let out = render_documents(&OutputFormat::JsonCompact, &docs()[..1]).unwrap();
        assert_eq!(out, r#"[{"id":"1","name":"Aspirin","quantity":10}]"#);
    }

    #[test]
    fn created_id_as_json() {
        let out = render_created(&OutputFormat::JsonCompact, "42").unwrap();
        assert_eq!(out, r#"{"id":"42"}"#);
    }
}
