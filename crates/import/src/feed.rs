//! Syndication-export (WordPress WXR) parser.
//!
//! WXR is RSS 2.0 with `wp:`, `content:` and `dc:` extensions. Only the direct
//! children of each `<item>` are read; nested markup and everything outside
//! items (channel metadata, authors, terms) is ignored.

use daon_work::Work;
use exn::ResultExt;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use scraper::Html;
use std::path::Path;
use tokio::fs;
use tracing::{debug, instrument, warn};

use crate::error::{ErrorKind, Result};
use crate::{ImportOptions, Imported};

pub(crate) const PLATFORM: &str = "wordpress";

/// A direct child of `<item>` worth capturing.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    PubDate,
    Creator,
    Content,
    PostId,
    PostType,
    Status,
    Term { domain: Option<String> },
}

impl Field {
    fn from_element(element: &BytesStart<'_>) -> std::result::Result<Option<Self>, String> {
        let field = match element.name().as_ref() {
            b"title" => Self::Title,
            b"link" => Self::Link,
            b"pubDate" => Self::PubDate,
            b"dc:creator" => Self::Creator,
            b"content:encoded" => Self::Content,
            b"wp:post_id" | b"post_id" => Self::PostId,
            b"wp:post_type" | b"post_type" => Self::PostType,
            b"wp:status" | b"status" => Self::Status,
            b"category" => {
                let domain = element
                    .try_get_attribute("domain")
                    .map_err(|e| e.to_string())?
                    .map(|attr| attr.unescape_value().map(|v| v.into_owned()))
                    .transpose()
                    .map_err(|e| e.to_string())?;
                Self::Term { domain }
            },
            _ => return Ok(None),
        };
        Ok(Some(field))
    }
}

/// Raw values of one `<item>`, before filtering and normalization.
#[derive(Debug, Default)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    pub_date: Option<String>,
    creator: Option<String>,
    content: Option<String>,
    post_id: Option<String>,
    post_type: Option<String>,
    status: Option<String>,
    tags: Vec<String>,
    categories: Vec<String>,
    /// First decoding problem met inside the item, if any.
    broken: Option<String>,
}

impl Item {
    fn set(&mut self, field: Field, value: String) {
        match field {
            Field::Title => self.title = Some(value),
            Field::Link => self.link = Some(value),
            Field::PubDate => self.pub_date = Some(value),
            Field::Creator => self.creator = Some(value),
            Field::Content => self.content = Some(value),
            Field::PostId => self.post_id = Some(value),
            Field::PostType => self.post_type = Some(value),
            Field::Status => self.status = Some(value),
            Field::Term { domain } => match domain.as_deref() {
                Some("post_tag") => self.tags.push(value),
                Some("category") => self.categories.push(value),
                _ => {},
            },
        }
    }

    fn mark_broken(&mut self, reason: String) {
        self.broken.get_or_insert(reason);
    }

    /// Attachments, navigation menu entries and drafts are not works.
    fn is_published_post(&self) -> bool {
        let post_type_ok = self.post_type.as_deref().is_none_or(|t| t == "post" || t == "page");
        let status_ok = self.status.as_deref().is_none_or(|s| s == "publish");
        post_type_ok && status_ok
    }

    fn into_work(self, options: &ImportOptions, source: Option<&Path>) -> Work {
        let content = self.content.as_deref().map(strip_markup).unwrap_or_default();
        let builder = Work::builder(self.title.unwrap_or_default(), content)
            .author(self.creator)
            .url(self.link)
            .published_date(self.pub_date)
            .original_id(self.post_id)
            .tags(self.tags)
            .platform(PLATFORM);
        let builder = if options.merge_categories {
            builder.tags(self.categories)
        } else {
            builder.categories(self.categories)
        };
        match source {
            Some(path) => builder.source_file(path),
            None => builder,
        }
        .build()
    }
}

/// Reduces HTML to its text nodes.
pub(crate) fn strip_markup(html: &str) -> String {
    Html::parse_fragment(html).root_element().text().collect::<String>().trim().to_string()
}

#[instrument(skip(path, options), fields(path = %path.display()))]
pub async fn parse_feed(path: &Path, options: &ImportOptions) -> Result<Imported> {
    let bytes = fs::read(path)
        .await
        .or_raise(|| ErrorKind::SourceRead(path.to_path_buf()))?;
    let xml = String::from_utf8(bytes).or_raise(|| ErrorKind::SourceRead(path.to_path_buf()))?;
    parse_feed_str(&xml, Some(path), options)
}

/// Parses a WXR document held in memory.
pub fn parse_feed_str(xml: &str, source: Option<&Path>, options: &ImportOptions) -> Result<Imported> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut imported = Imported::default();
    let mut depth = 0usize;
    // Depth of the open `<item>` element, and the item being filled.
    let mut open: Option<(usize, Item)> = None;
    let mut capture: Option<Field> = None;
    let mut buffer = String::new();

    loop {
        let event = reader.read_event().map_err(|e| ErrorKind::MalformedXml(e.to_string()))?;
        match event {
            Event::Eof => break,
            Event::Start(element) => {
                depth += 1;
                if let Some((item_depth, item)) = open.as_mut() {
                    if depth == *item_depth + 1 {
                        buffer.clear();
                        capture = match Field::from_element(&element) {
                            Ok(field) => field,
                            Err(reason) => {
                                item.mark_broken(reason);
                                None
                            },
                        };
                    }
                } else if element.name().as_ref() == b"item" {
                    open = Some((depth, Item::default()));
                }
            },
            Event::Empty(element) => {
                if let Some((item_depth, item)) = open.as_mut()
                    && depth == *item_depth
                {
                    match Field::from_element(&element) {
                        Ok(Some(field)) => item.set(field, String::new()),
                        Ok(None) => {},
                        Err(reason) => item.mark_broken(reason),
                    }
                }
            },
            Event::Text(text) if capture.is_some() => match text.unescape() {
                Ok(value) => buffer.push_str(&value),
                Err(e) => {
                    if let Some((_, item)) = open.as_mut() {
                        item.mark_broken(e.to_string());
                    }
                },
            },
            Event::CData(data) if capture.is_some() => buffer.push_str(&String::from_utf8_lossy(&data)),
            Event::End(_) => {
                let item_depth = open.as_ref().map(|(item_depth, _)| *item_depth);
                if item_depth.is_some_and(|item_depth| depth == item_depth + 1)
                    && let Some(field) = capture.take()
                    && let Some((_, item)) = open.as_mut()
                {
                    item.set(field, std::mem::take(&mut buffer));
                } else if item_depth == Some(depth)
                    && let Some((_, item)) = open.take()
                {
                    finish_item(item, &mut imported, options, source);
                }
                depth = depth.saturating_sub(1);
            },
            _ => {},
        }
    }
    Ok(imported)
}

fn finish_item(item: Item, imported: &mut Imported, options: &ImportOptions, source: Option<&Path>) {
    if let Some(reason) = &item.broken {
        let title = item.title.as_deref().unwrap_or_default();
        warn!(title, reason, "Skipping undecodable feed item");
        imported.failed += 1;
        return;
    }
    if !item.is_published_post() {
        debug!(
            post_type = item.post_type.as_deref(),
            status = item.status.as_deref(),
            "Ignoring unpublished or non-post item"
        );
        return;
    }
    imported.accept(item.into_work(options, source), &options.limits);
}
