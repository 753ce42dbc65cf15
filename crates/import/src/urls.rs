//! URL-list parser: one page per line, scraped into a work.

use async_trait::async_trait;
use daon_work::Work;
use exn::ResultExt;
use reqwest::Url;
use scraper::{ElementRef, Html};
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info, instrument, warn};

use crate::consts::{AUTHOR_SELECTORS, CONTENT_SELECTORS, TITLE_SELECTOR, WHITESPACE_REGEX};
use crate::error::{ErrorKind, Result};
use crate::{ImportOptions, Imported};

pub const USER_AGENT: &str = "DAON Bulk Protection Tool 1.0";
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Platform tag for pages whose URL has no host.
const FALLBACK_PLATFORM: &str = "web";

/// Retrieves the HTML behind a URL.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// [`Fetch`] over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_settings(USER_AGENT, FETCH_TIMEOUT)
    }

    pub fn with_settings(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| ErrorKind::Fetch(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| ErrorKind::Fetch(e.to_string()))?;
        Ok(response.text().await.map_err(|e| ErrorKind::Fetch(e.to_string()))?)
    }
}

/// Entries of a URL list: trimmed, without blanks or `#` comments.
pub fn read_url_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToString::to_string)
        .collect()
}

/// Whether `entry` is an absolute `http` or `https` URL.
pub fn is_web_url(entry: &str) -> bool {
    Url::parse(entry).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

#[instrument(skip(path, options, fetcher), fields(path = %path.display()))]
pub async fn parse_url_list(path: &Path, options: &ImportOptions, fetcher: &dyn Fetch) -> Result<Imported> {
    let text = fs::read_to_string(path)
        .await
        .or_raise(|| ErrorKind::SourceRead(path.to_path_buf()))?;
    let urls = read_url_list(&text);
    info!(count = urls.len(), "Fetching listed pages");

    let mut imported = Imported::default();
    let mut fetched = 0;
    for url in &urls {
        if !is_web_url(url) {
            warn!(entry = %url, "Skipping entry that is not an http(s) URL");
            imported.failed += 1;
            continue;
        }
        if fetched > 0 {
            tokio::time::sleep(options.fetch_delay).await;
        }
        fetched += 1;
        match fetcher.fetch(url).await {
            Ok(html) => {
                debug!(url, bytes = html.len(), "Fetched page");
                imported.accept(scrape(url, &html), &options.limits);
            },
            Err(e) => {
                warn!(url, error = ?e, "Skipping page that could not be fetched");
                imported.failed += 1;
            },
        }
    }
    Ok(imported)
}

/// Extracts a work from a fetched page.
pub fn scrape(url: &str, html: &str) -> Work {
    let document = Html::parse_document(html);
    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .unwrap_or_default();
    let content = CONTENT_SELECTORS
        .iter()
        .find_map(|selector| document.select(selector).next())
        .map(element_text)
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| element_text(document.root_element()));
    let author = AUTHOR_SELECTORS
        .iter()
        .find_map(|selector| document.select(selector).next())
        .map(element_text);
    let platform = Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(ToString::to_string))
        .unwrap_or_else(|| FALLBACK_PLATFORM.to_string());

    Work::builder(title, content)
        .author(author)
        .url(Some(url))
        .platform(platform)
        .build()
}

/// All text below `element`, with whitespace runs collapsed to single spaces.
fn element_text(element: ElementRef<'_>) -> String {
    let text = element.text().collect::<String>();
    WHITESPACE_REGEX.replace_all(text.trim(), " ").into_owned()
}
