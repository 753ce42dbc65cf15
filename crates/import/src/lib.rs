//! DAON Import
//!
//! Turns the export formats writers already have into validated [`Work`]s:
//! structured JSON exports (AO3 downloaders and similar), WordPress WXR
//! exports, lists of page URLs, and folders of plain-text files.
//!
//! Every parser isolates failures at the narrowest scope. A malformed record,
//! an unreachable URL or an unreadable file is logged and counted in
//! [`Imported::failed`]; works failing the [`Limits`] are counted in
//! [`Imported::rejected`]. Only a source that cannot be opened or parsed at
//! all returns an error.

mod consts;
mod detect;
pub mod error;
mod export;
mod feed;
pub mod fields;
mod files;
mod options;
mod urls;

use daon_work::{Limits, Work};
use std::path::Path;
use tracing::{debug, info, instrument};

pub use crate::consts::{AUTHOR_CANDIDATES, CONTENT_CANDIDATES};
pub use crate::detect::SourceKind;
pub use crate::export::{parse_export, parse_export_value};
pub use crate::feed::{parse_feed, parse_feed_str};
pub use crate::files::{parse_directory, parse_text_file, walk, work_from_text};
pub use crate::options::{DEFAULT_EXTENSIONS, DEFAULT_FETCH_DELAY, ImportOptions, TITLE_MAX_CHARS, TitleHeuristic};
pub use crate::urls::{FETCH_TIMEOUT, Fetch, HttpFetcher, USER_AGENT, is_web_url, parse_url_list, read_url_list, scrape};

use crate::error::Result;

/// Works extracted from one source, plus what was dropped along the way.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Imported {
    pub works: Vec<Work>,
    /// Records that parsed but failed validation.
    pub rejected: usize,
    /// Records that could not be parsed, fetched or read.
    pub failed: usize,
}

impl Imported {
    pub(crate) fn accept(&mut self, work: Work, limits: &Limits) {
        match limits.check(&work) {
            Ok(()) => self.works.push(work),
            Err(rejection) => {
                debug!(title = work.title(), %rejection, "Rejecting work");
                self.rejected += 1;
            },
        }
    }

    /// Records seen in the source, whatever became of them.
    pub fn seen(&self) -> usize {
        self.works.len() + self.rejected + self.failed
    }
}

/// Imports `source` as `kind`. `fetcher` is only used for URL lists.
#[instrument(skip(source, options, fetcher), fields(source = %source.display()))]
pub async fn import(source: &Path, kind: SourceKind, options: &ImportOptions, fetcher: &dyn Fetch) -> Result<Imported> {
    info!(%kind, "Importing works");
    let imported = match kind {
        SourceKind::StructuredExport => parse_export(source, options).await?,
        SourceKind::Syndication => parse_feed(source, options).await?,
        SourceKind::UrlList => parse_url_list(source, options, fetcher).await?,
        SourceKind::Directory => parse_directory(source, options).await?,
        SourceKind::TextFile => parse_text_file(source, options).await?,
    };
    info!(
        valid = imported.works.len(),
        rejected = imported.rejected,
        failed = imported.failed,
        "Import finished"
    );
    Ok(imported)
}
