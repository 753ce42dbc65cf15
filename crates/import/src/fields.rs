//! Field probing for heterogeneous structured exports.
//!
//! Export tools disagree on key names and on whether a value is a single
//! string or a list (chapters, co-authors). Each [`FieldProbe`] is an ordered
//! list of candidate keys; the first key holding a usable value wins, and that
//! value is decided once into a [`FieldValue`].

use serde_json::{Map, Value};

/// Keys consulted on objects nested inside a sequence (`{"name": "..."}`
/// authors, `{"content": "..."}` chapters).
const NESTED_TEXT_KEYS: [&str; 5] = ["name", "content", "text", "body", "title"];

/// A present, non-empty field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Scalar(String),
    Sequence(Vec<String>),
}

impl FieldValue {
    /// Returns `None` for values that count as absent: `null`, booleans, empty
    /// strings, and sequences without any text in them.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(Self::Scalar(s.clone())),
            Value::Number(n) => Some(Self::Scalar(n.to_string())),
            Value::Array(items) => {
                let texts: Vec<String> = items.iter().filter_map(element_text).collect();
                (!texts.is_empty()).then_some(Self::Sequence(texts))
            },
            Value::Object(_) => element_text(value).map(Self::Scalar),
            Value::Null | Value::Bool(_) => None,
        }
    }

    pub fn join(self, separator: &str) -> String {
        match self {
            Self::Scalar(s) => s,
            Self::Sequence(items) => items.join(separator),
        }
    }

    pub fn into_list(self) -> Vec<String> {
        match self {
            Self::Scalar(s) => vec![s],
            Self::Sequence(items) => items,
        }
    }
}

fn element_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => NESTED_TEXT_KEYS.iter().find_map(|key| match map.get(*key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        }),
        _ => None,
    }
}

/// A named extractor: candidate keys tried in priority order.
#[derive(Debug, Clone, Copy)]
pub struct FieldProbe {
    pub name: &'static str,
    pub candidates: &'static [&'static str],
    /// How a [`FieldValue::Sequence`] is flattened into one string.
    pub separator: &'static str,
}

impl FieldProbe {
    /// First candidate key holding a usable value.
    pub fn probe(&self, record: &Map<String, Value>) -> Option<FieldValue> {
        self.candidates
            .iter()
            .find_map(|key| record.get(*key).and_then(FieldValue::from_json))
    }

    pub fn extract(&self, record: &Map<String, Value>) -> Option<String> {
        self.probe(record).map(|value| value.join(self.separator))
    }
}

pub const TITLE: FieldProbe = FieldProbe {
    name: "title",
    candidates: &["title"],
    separator: " ",
};
pub const CONTENT: FieldProbe = FieldProbe {
    name: "content",
    candidates: &["content", "body", "text", "chapters", "story", "summary"],
    separator: "\n\n",
};
pub const AUTHOR: FieldProbe = FieldProbe {
    name: "author",
    candidates: &["author", "authors", "creator", "creators", "user", "by"],
    separator: ", ",
};
pub const URL: FieldProbe = FieldProbe {
    name: "url",
    candidates: &["url", "link"],
    separator: " ",
};
pub const PUBLISHED: FieldProbe = FieldProbe {
    name: "published",
    candidates: &["published", "date"],
    separator: " ",
};
pub const ID: FieldProbe = FieldProbe {
    name: "id",
    candidates: &["id"],
    separator: " ",
};

/// Every string-valued field of a work, in the order they are extracted.
pub const SCALAR_FIELDS: [FieldProbe; 6] = [TITLE, CONTENT, AUTHOR, URL, PUBLISHED, ID];

/// All list entries found under `keys`, concatenated in key order.
pub fn list(record: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    keys.iter()
        .filter_map(|key| record.get(*key).and_then(FieldValue::from_json))
        .flat_map(FieldValue::into_list)
        .collect()
}
