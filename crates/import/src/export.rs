//! Structured-export (JSON) parser.
//!
//! Accepts either a top-level array of work records or an object holding that
//! array under `works`, as written by AO3 downloaders and similar tools.

use daon_work::Work;
use exn::ResultExt;
use serde_json::{Map, Value};
use std::path::Path;
use tokio::fs;
use tracing::{instrument, warn};

use crate::error::{ErrorKind, Result};
use crate::fields::{self, AUTHOR, CONTENT, ID, PUBLISHED, TITLE, URL};
use crate::{ImportOptions, Imported};

pub(crate) const PLATFORM: &str = "ao3";

#[instrument(skip(path, options), fields(path = %path.display()))]
pub async fn parse_export(path: &Path, options: &ImportOptions) -> Result<Imported> {
    let bytes = fs::read(path)
        .await
        .or_raise(|| ErrorKind::SourceRead(path.to_path_buf()))?;
    let value: Value =
        serde_json::from_slice(&bytes).or_raise(|| ErrorKind::SourceRead(path.to_path_buf()))?;
    parse_export_value(&value, Some(path), options)
}

/// Parses an already-decoded export document.
pub fn parse_export_value(value: &Value, source: Option<&Path>, options: &ImportOptions) -> Result<Imported> {
    let records = records(value)?;
    let mut imported = Imported::default();
    for (index, record) in records.iter().enumerate() {
        match work_from_record(record, source) {
            Ok(work) => imported.accept(work, &options.limits),
            Err(e) => {
                warn!(index, error = ?e, "Skipping malformed export record");
                imported.failed += 1;
            },
        }
    }
    Ok(imported)
}

fn records(value: &Value) -> Result<&[Value]> {
    match value {
        Value::Array(records) => Ok(records),
        Value::Object(map) => match map.get("works") {
            Some(Value::Array(records)) => Ok(records),
            Some(_) => exn::bail!(ErrorKind::UnrecognizedShape("`works` is not an array")),
            None => exn::bail!(ErrorKind::UnrecognizedShape("object without a `works` array")),
        },
        _ => exn::bail!(ErrorKind::UnrecognizedShape("expected an array or an object")),
    }
}

fn work_from_record(record: &Value, source: Option<&Path>) -> Result<Work> {
    let Value::Object(record) = record else {
        exn::bail!(ErrorKind::Record(format!("expected an object, found {}", kind_of(record))));
    };
    let builder = Work::builder(
        TITLE.extract(record).unwrap_or_default(),
        CONTENT.extract(record).unwrap_or_default(),
    )
    .author(AUTHOR.extract(record))
    .url(URL.extract(record))
    .published_date(PUBLISHED.extract(record))
    .original_id(ID.extract(record))
    .tags(fields::list(record, &["tags", "additional_tags"]))
    .fandoms(fields::list(record, &["fandoms"]))
    .characters(fields::list(record, &["characters"]))
    .platform(PLATFORM);
    let builder = match word_count(record) {
        Some(count) => builder.word_count(count),
        None => builder,
    };
    Ok(match source {
        Some(path) => builder.source_file(path),
        None => builder,
    }
    .build())
}

/// Exporters that already know the word count (AO3 does) are trusted over a
/// whitespace split of possibly truncated content.
fn word_count(record: &Map<String, Value>) -> Option<u64> {
    ["word_count", "words"].iter().find_map(|key| record.get(*key).and_then(Value::as_u64))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
