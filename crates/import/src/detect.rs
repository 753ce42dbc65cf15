use derive_more::Display;
use exn::ResultExt;
use std::path::Path;
use tokio::fs;

use crate::error::{ErrorKind, Result};
use crate::urls::{is_web_url, read_url_list};

/// The kinds of source the importer understands.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// JSON array of work records (or `{"works": [...]}`).
    #[display("structured export")]
    StructuredExport,
    /// WordPress WXR export.
    #[display("syndication export")]
    Syndication,
    /// Newline-delimited list of page URLs.
    #[display("URL list")]
    UrlList,
    /// Directory tree of plain-text files.
    #[display("directory")]
    Directory,
    /// One plain-text file.
    #[display("text file")]
    TextFile,
}

impl SourceKind {
    /// Guesses the kind of `path` from its type and extension. A `.txt` file
    /// is a URL list when its first entry, or most of its entries, are web
    /// URLs.
    pub async fn detect(path: &Path) -> Result<Self> {
        let metadata = match fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                exn::bail!(ErrorKind::NotFound(path.to_path_buf()))
            },
            Err(e) => return Err(e).or_raise(|| ErrorKind::SourceRead(path.to_path_buf())),
        };
        if metadata.is_dir() {
            return Ok(Self::Directory);
        }
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "json" => Ok(Self::StructuredExport),
            "xml" => Ok(Self::Syndication),
            "txt" => {
                let text = fs::read_to_string(path)
                    .await
                    .or_raise(|| ErrorKind::SourceRead(path.to_path_buf()))?;
                Ok(Self::sniff_text(&text))
            },
            "md" | "markdown" | "rst" | "text" => Ok(Self::TextFile),
            _ => exn::bail!(ErrorKind::UnsupportedSource(path.to_path_buf())),
        }
    }

    fn sniff_text(text: &str) -> Self {
        let entries = read_url_list(text);
        let Some(first) = entries.first() else {
            return Self::TextFile;
        };
        let urls = entries.iter().filter(|entry| is_web_url(entry)).count();
        if is_web_url(first) || urls * 2 > entries.len() {
            Self::UrlList
        } else {
            Self::TextFile
        }
    }
}
