//! Best-effort JSON record of a run, one entry per processed work.

use daon_batch::BatchResult;
use daon_client::SubmissionOutcome;
use daon_work::Work;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Everything known about a work except its content, plus its outcome.
#[derive(Debug, Serialize)]
struct ResultRecord<'a> {
    title: &'a str,
    author: Option<&'a str>,
    url: Option<&'a str>,
    platform: &'a str,
    original_id: Option<&'a str>,
    published_date: Option<&'a str>,
    tags: &'a [String],
    fandoms: &'a [String],
    characters: &'a [String],
    categories: &'a [String],
    word_count: u64,
    source_file: Option<&'a Path>,
    result: &'a SubmissionOutcome,
}

impl<'a> ResultRecord<'a> {
    fn new(work: &'a Work, result: &'a SubmissionOutcome) -> Self {
        Self {
            title: work.title(),
            author: work.author(),
            url: work.url(),
            platform: work.platform(),
            original_id: work.original_id(),
            published_date: work.published_date(),
            tags: work.tags(),
            fandoms: work.fandoms(),
            characters: work.characters(),
            categories: work.categories(),
            word_count: work.word_count(),
            source_file: work.source_file(),
            result,
        }
    }
}

pub fn file_name(timestamp: i64) -> String {
    format!("daon_protection_results_{timestamp}.json")
}

/// Writes `result` to `directory`, named after `timestamp` (Unix seconds).
/// Returns `None` without touching the disk when nothing was processed.
pub fn save(directory: &Path, result: &BatchResult, timestamp: i64) -> Result<Option<PathBuf>> {
    if result.entries.is_empty() {
        return Ok(None);
    }
    let path = directory.join(file_name(timestamp));
    let records: Vec<ResultRecord<'_>> = result
        .entries
        .iter()
        .map(|entry| ResultRecord::new(&entry.work, &entry.outcome))
        .collect();

    let failed = |reason: String| ErrorKind::Results {
        path: path.clone(),
        reason,
    };
    let file = File::create(&path).map_err(|e| failed(e.to_string()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &records).map_err(|e| failed(e.to_string()))?;
    writer.flush().map_err(|e| failed(e.to_string()))?;
    tracing::info!(path = %path.display(), entries = records.len(), "Results written");
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use daon_batch::Entry;
    use daon_client::Receipt;
    use daon_work::ContentHash;
    use serde_json::{Value, json};
    use tempfile::TempDir;

    fn sample() -> BatchResult {
        let hash = ContentHash::of("first content");
        BatchResult {
            entries: vec![
                Entry {
                    position: 1,
                    work: Work::builder("First", "first content")
                        .author(Some("Ana"))
                        .url(Some("https://archiveofourown.org/works/1"))
                        .platform("ao3")
                        .original_id(Some("1"))
                        .published_date(Some("2023-01-15"))
                        .tags(["Fluff"])
                        .fandoms(["Original Work"])
                        .characters(["Ana"])
                        .source_file("stories/first.txt")
                        .build(),
                    outcome: SubmissionOutcome::Protected(Receipt {
                        content_hash: hash.clone(),
                        tx_hash: Some("sim-1700000000".to_string()),
                        verification_url: Some(format!("https://verify.daon.network/{hash}")),
                        simulated: true,
                    }),
                },
                Entry {
                    position: 2,
                    work: Work::builder("Second", "second content here").build(),
                    outcome: SubmissionOutcome::failed("registry returned HTTP 500: boom"),
                },
            ],
            protected_count: 1,
            error_count: 1,
            cancelled: false,
        }
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name(1700000000), "daon_protection_results_1700000000.json");
    }

    #[test]
    fn test_save_writes_one_record_per_entry() {
        let dir = TempDir::new().unwrap();
        let path = save(dir.path(), &sample(), 1700000000).unwrap().unwrap();
        assert_eq!(path, dir.path().join("daon_protection_results_1700000000.json"));

        let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let hash = ContentHash::of("first content");
        assert_eq!(
            written,
            json!([
                {
                    "title": "First",
                    "author": "Ana",
                    "url": "https://archiveofourown.org/works/1",
                    "platform": "ao3",
                    "original_id": "1",
                    "published_date": "2023-01-15",
                    "tags": ["Fluff"],
                    "fandoms": ["Original Work"],
                    "characters": ["Ana"],
                    "categories": [],
                    "word_count": 2,
                    "source_file": "stories/first.txt",
                    "result": {
                        "success": true,
                        "content_hash": hash.as_str(),
                        "tx_hash": "sim-1700000000",
                        "verification_url": format!("https://verify.daon.network/{hash}"),
                        "simulated": true,
                    },
                },
                {
                    "title": "Second",
                    "author": null,
                    "url": null,
                    "platform": "bulk-import",
                    "original_id": null,
                    "published_date": null,
                    "tags": [],
                    "fandoms": [],
                    "characters": [],
                    "categories": [],
                    "word_count": 3,
                    "source_file": null,
                    "result": {
                        "success": false,
                        "error": "registry returned HTTP 500: boom",
                    },
                },
            ])
        );
    }

    #[test]
    fn test_nothing_processed_writes_nothing() {
        let dir = TempDir::new().unwrap();
        assert_eq!(save(dir.path(), &BatchResult::default(), 1).unwrap(), None);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_unwritable_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        let err = save(&missing, &sample(), 1).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Results { path, .. } if path.starts_with(&missing)));
    }
}
