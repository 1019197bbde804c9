// ── Schemaless documents ──
//
// A document is an ordered JSON object whose only fixed field is `id`.
// Everything else is collection-specific and interpreted by consumers.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Ordered JSON object without the `id` requirement.
///
/// Payload type for writes: `create`/`update` bodies and optimistic
/// inserts. Field order is preserved as written.
pub type Fields = serde_json::Map<String, Value>;

/// A document could not be built from a JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidDocument {
    #[error("document has no `id` field")]
    MissingId,
    #[error("document `id` must be a string or number, got {0}")]
    BadId(&'static str),
}

/// One record of a remote collection.
///
/// Wraps an ordered field map and guarantees `id` is present and a string.
/// Numeric ids sent by the server are normalized to their decimal form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Fields", into = "Fields")]
pub struct Document {
    fields: Fields,
}

impl Document {
    /// Build `{id, ...fields}`.
    ///
    /// As with object spread, an `id` inside `fields` wins over `id` when
    /// it is a usable identifier (string or number).
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        let mut merged = Fields::new();
        merged.insert("id".into(), Value::String(id.into()));
        for (key, value) in fields {
            if key == "id" {
                if let Some(id) = scalar_id(&value) {
                    merged.insert(key, Value::String(id));
                }
                continue;
            }
            merged.insert(key, value);
        }
        Self { fields: merged }
    }

    /// The document identifier.
    pub fn id(&self) -> &str {
        self.fields
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    pub fn get_f64(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(Value::as_f64)
    }

    pub fn get_i64(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(Value::as_i64)
    }

    /// Iterate fields in wire order, `id` included.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// Field names in wire order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    pub fn as_fields(&self) -> &Fields {
        &self.fields
    }

    pub fn into_fields(self) -> Fields {
        self.fields
    }
}

impl TryFrom<Fields> for Document {
    type Error = InvalidDocument;

    fn try_from(mut fields: Fields) -> Result<Self, Self::Error> {
        let id = fields.get_mut("id").ok_or(InvalidDocument::MissingId)?;
        match id {
            Value::String(_) => {}
            Value::Number(n) => *id = Value::String(n.to_string()),
            other => return Err(InvalidDocument::BadId(kind(other))),
        }
        Ok(Self { fields })
    }
}

impl From<Document> for Fields {
    fn from(doc: Document) -> Self {
        doc.fields
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        Value::Object(doc.fields)
    }
}

fn scalar_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Human name of a JSON value's type, for error messages.
pub(crate) fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
