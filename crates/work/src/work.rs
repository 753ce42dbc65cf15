use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::hash::{ContentHash, HashStrategy};

/// Title given to works whose source does not provide one.
pub const UNTITLED: &str = "Untitled";
/// Display sentinel for works without a known author.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// A creative work, normalized from whichever export format it came from.
///
/// Works are immutable once built: every field is derived or defaulted by the
/// [`WorkBuilder`] and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Work {
    title: String,
    content: String,
    author: Option<String>,
    url: Option<String>,
    published_date: Option<String>,
    original_id: Option<String>,
    tags: Vec<String>,
    fandoms: Vec<String>,
    characters: Vec<String>,
    categories: Vec<String>,
    word_count: u64,
    platform: String,
    source_file: Option<PathBuf>,
}

impl Work {
    /// Starts building a work from the two fields every source must provide.
    pub fn builder(title: impl Into<String>, content: impl Into<String>) -> WorkBuilder {
        WorkBuilder::new(title, content)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    /// The author, or [`UNKNOWN_AUTHOR`] for anonymous works.
    pub fn author_or_unknown(&self) -> &str {
        self.author().unwrap_or(UNKNOWN_AUTHOR)
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn published_date(&self) -> Option<&str> {
        self.published_date.as_deref()
    }

    /// Identifier of the work on its original platform (post ID, AO3 work ID,
    /// file path...).
    pub fn original_id(&self) -> Option<&str> {
        self.original_id.as_deref()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn fandoms(&self) -> &[String] {
        &self.fandoms
    }

    pub fn characters(&self) -> &[String] {
        &self.characters
    }

    /// Taxonomy categories kept apart from [`tags`](Self::tags). Only populated
    /// by sources that were asked not to merge categories into tags.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Word count at construction time (whitespace-separated tokens unless the
    /// source supplied its own count).
    pub fn word_count(&self) -> u64 {
        self.word_count
    }

    /// Tag of the parser (or website host) that produced this work.
    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn source_file(&self) -> Option<&Path> {
        self.source_file.as_deref()
    }

    /// Content-addressing key of this work.
    pub fn content_hash(&self, strategy: HashStrategy) -> ContentHash {
        ContentHash::with_strategy(&self.content, strategy)
    }
}

/// Normalizer for raw input units.
///
/// Parsers feed whatever they managed to extract into the builder; `build()`
/// applies the defaulting rules:
///
/// - the title is trimmed, and falls back to [`UNTITLED`] when empty,
/// - optional strings that are blank become `None`,
/// - blank entries are dropped from the tag-like lists (order and duplicates
///   are otherwise preserved),
/// - the word count is derived from the content unless explicitly supplied.
#[derive(Debug, Clone)]
pub struct WorkBuilder {
    title: String,
    content: String,
    author: Option<String>,
    url: Option<String>,
    published_date: Option<String>,
    original_id: Option<String>,
    tags: Vec<String>,
    fandoms: Vec<String>,
    characters: Vec<String>,
    categories: Vec<String>,
    word_count: Option<u64>,
    platform: Option<String>,
    source_file: Option<PathBuf>,
}

impl WorkBuilder {
    fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            author: None,
            url: None,
            published_date: None,
            original_id: None,
            tags: Vec::new(),
            fandoms: Vec::new(),
            characters: Vec::new(),
            categories: Vec::new(),
            word_count: None,
            platform: None,
            source_file: None,
        }
    }

    pub fn author(mut self, author: Option<impl Into<String>>) -> Self {
        self.author = author.map(Into::into);
        self
    }

    pub fn url(mut self, url: Option<impl Into<String>>) -> Self {
        self.url = url.map(Into::into);
        self
    }

    pub fn published_date(mut self, date: Option<impl Into<String>>) -> Self {
        self.published_date = date.map(Into::into);
        self
    }

    pub fn original_id(mut self, id: Option<impl Into<String>>) -> Self {
        self.original_id = id.map(Into::into);
        self
    }

    pub fn tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn fandoms(mut self, fandoms: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.fandoms.extend(fandoms.into_iter().map(Into::into));
        self
    }

    pub fn characters(mut self, characters: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.characters.extend(characters.into_iter().map(Into::into));
        self
    }

    pub fn categories(mut self, categories: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.categories.extend(categories.into_iter().map(Into::into));
        self
    }

    /// Overrides the derived word count.
    pub fn word_count(mut self, count: u64) -> Self {
        self.word_count = Some(count);
        self
    }

    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    pub fn source_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_file = Some(path.into());
        self
    }

    pub fn build(self) -> Work {
        let title = match self.title.trim() {
            "" => UNTITLED.to_string(),
            trimmed => trimmed.to_string(),
        };
        let word_count = self.word_count.unwrap_or_else(|| count_words(&self.content));
        Work {
            title,
            word_count,
            content: self.content,
            author: non_blank(self.author),
            url: non_blank(self.url),
            published_date: non_blank(self.published_date),
            original_id: non_blank(self.original_id),
            tags: without_blanks(self.tags),
            fandoms: without_blanks(self.fandoms),
            characters: without_blanks(self.characters),
            categories: without_blanks(self.categories),
            platform: non_blank(self.platform).unwrap_or_else(|| "bulk-import".to_string()),
            source_file: self.source_file,
        }
    }
}

fn count_words(content: &str) -> u64 {
    // Infallible in practice: a usize always fits in a u64.
    u64::try_from(content.split_whitespace().count()).unwrap_or(u64::MAX)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn without_blanks(values: Vec<String>) -> Vec<String> {
    values.into_iter().map(|v| v.trim().to_string()).filter(|v| !v.is_empty()).collect()
}
