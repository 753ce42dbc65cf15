use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::error::{Error, ErrorKind, Result};

const PREFIX: &str = "sha256:";
const HEX_LENGTH: usize = 64;

/// How content is prepared before hashing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashStrategy {
    /// Hash the UTF-8 bytes exactly as extracted. Matches every hash already
    /// registered by earlier tooling.
    #[default]
    Raw,
    /// Hash [`normalize_content`] output, so the same text exported with
    /// different line endings or trailing whitespace hashes identically.
    Normalized,
}

/// Content-addressing key of a work: `sha256:` followed by the lowercase hex
/// SHA-256 digest of the content's UTF-8 bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    /// Hashes the raw UTF-8 bytes of `content`.
    ///
    /// ```rust
    /// use daon_work::ContentHash;
    /// let hash = ContentHash::of("hello");
    /// assert_eq!(
    ///     hash.as_str(),
    ///     "sha256:2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
    /// );
    /// ```
    pub fn of(content: &str) -> Self {
        Self(format!("{PREFIX}{:x}", Sha256::digest(content.as_bytes())))
    }

    pub fn with_strategy(content: &str, strategy: HashStrategy) -> Self {
        match strategy {
            HashStrategy::Raw => Self::of(content),
            HashStrategy::Normalized => Self::of(&normalize_content(content)),
        }
    }

    /// Parses an existing hash string, applying the same format check as the
    /// registry (`sha256:` prefix, 71 characters in total).
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        let Some(hex) = value.strip_prefix(PREFIX) else {
            exn::bail!(ErrorKind::InvalidHash(value.to_string()));
        };
        if hex.len() != HEX_LENGTH || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            exn::bail!(ErrorKind::InvalidHash(value.to_string()));
        }
        Ok(Self(format!("{PREFIX}{}", hex.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The digest without its `sha256:` prefix.
    pub fn hex(&self) -> &str {
        &self.0[PREFIX.len()..]
    }

    /// First `length` characters of the full hash, for progress output.
    pub fn short(&self, length: usize) -> &str {
        &self.0[..length.min(self.0.len())]
    }
}

impl FromStr for ContentHash {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for ContentHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContentHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Canonical text form used by [`HashStrategy::Normalized`]: CRLF and lone CR
/// become LF, trailing whitespace is removed from every line, and the whole
/// text is trimmed.
pub fn normalize_content(content: &str) -> String {
    let unified = content.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = unified.split('\n').map(str::trim_end).collect();
    lines.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_hash_format() {
        let hash = ContentHash::of("Once upon a time");
        assert!(hash.as_str().starts_with("sha256:"));
        assert_eq!(hash.as_str().len(), 71);
        assert_eq!(hash.hex().len(), 64);
        assert!(hash.hex().bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()));
    }

    #[test]
    fn test_hash_is_deterministic() {
        assert_eq!(ContentHash::of("same text"), ContentHash::of("same text"));
    }

    #[rstest]
    #[case("story", "Story")]
    #[case("story", "story ")]
    #[case("line\n", "line\r\n")]
    #[case("", " ")]
    fn test_raw_hash_distinguishes_content(#[case] a: &str, #[case] b: &str) {
        assert_ne!(ContentHash::of(a), ContentHash::of(b));
    }

    #[test]
    fn test_empty_content_hash() {
        assert_eq!(
            ContentHash::of("").as_str(),
            "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_normalized_strategy() {
        let unix = "Chapter One\nIt was dark.\n";
        let windows = "Chapter One  \r\nIt was dark.\r\n\r\n";
        assert_ne!(
            ContentHash::with_strategy(unix, HashStrategy::Raw),
            ContentHash::with_strategy(windows, HashStrategy::Raw)
        );
        assert_eq!(
            ContentHash::with_strategy(unix, HashStrategy::Normalized),
            ContentHash::with_strategy(windows, HashStrategy::Normalized)
        );
    }

    #[test]
    fn test_normalize_content() {
        assert_eq!(normalize_content("  a \r\nb\t\rc  \n\n"), "a\nb\nc");
        // Interior blank lines survive.
        assert_eq!(normalize_content("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_parse_round_trip() {
        let hash = ContentHash::of("parse me");
        assert_eq!(ContentHash::parse(hash.as_str()).unwrap(), hash);
        let upper = format!("sha256:{}", hash.hex().to_ascii_uppercase());
        assert_eq!(upper.parse::<ContentHash>().unwrap(), hash);
    }

    #[rstest]
    #[case("")]
    #[case("sha256:")]
    #[case("md5:d41d8cd98f00b204e9800998ecf8427e")]
    #[case("sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b85")]
    #[case("sha256:z3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")]
    fn test_parse_rejects(#[case] value: &str) {
        let err = ContentHash::parse(value).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidHash(_)));
    }

    #[test]
    fn test_short() {
        let hash = ContentHash::of("x");
        assert_eq!(hash.short(16).len(), 16);
        assert_eq!(hash.short(500), hash.as_str());
    }
}
