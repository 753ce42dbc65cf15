use daon_work::Limits;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Maximum length (exclusive, in characters) of a first line that may be
/// promoted to a title.
pub const TITLE_MAX_CHARS: usize = 100;

/// Pause between two consecutive page fetches of a URL list.
pub const DEFAULT_FETCH_DELAY: Duration = Duration::from_secs(1);

/// Extensions picked up when walking a directory of text files.
pub const DEFAULT_EXTENSIONS: [&str; 4] = ["txt", "md", "rst", "text"];

/// Decides whether the first line of a text file is its title.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TitleHeuristic {
    /// Any non-empty first line shorter than [`TITLE_MAX_CHARS`].
    Length,
    /// As [`Length`](Self::Length), but a line ending in `.`, `!` or `?` reads
    /// as a sentence and is left in the content.
    #[default]
    LengthAndPunctuation,
}

impl TitleHeuristic {
    /// Splits `text` into `(title, content)` when its first line qualifies as
    /// a title. `text` is expected to be trimmed already.
    pub fn split<'a>(&self, text: &'a str) -> Option<(&'a str, &'a str)> {
        let (first, rest) = text.split_once('\n').unwrap_or((text, ""));
        let candidate = first.trim();
        if candidate.is_empty() || candidate.chars().count() >= TITLE_MAX_CHARS {
            return None;
        }
        if *self == Self::LengthAndPunctuation && candidate.ends_with(['.', '!', '?']) {
            return None;
        }
        Some((candidate, rest.trim()))
    }
}

/// Knobs shared by every parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    pub limits: Limits,
    pub fetch_delay: Duration,
    pub title_heuristic: TitleHeuristic,
    /// Append syndication `category` terms to the tags (after the `post_tag`
    /// terms) instead of keeping them in [`Work::categories`](daon_work::Work::categories).
    pub merge_categories: bool,
    /// Lowercase extensions (without the dot) accepted by the directory walk.
    pub extensions: Vec<String>,
}

impl ImportOptions {
    pub(crate) fn accepts_extension(&self, extension: &str) -> bool {
        self.extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(extension))
    }
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            fetch_delay: DEFAULT_FETCH_DELAY,
            title_heuristic: TitleHeuristic::default(),
            merge_categories: true,
            extensions: DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TitleHeuristic::LengthAndPunctuation, "My Story\n\nIt began.", Some(("My Story", "It began.")))]
    #[case(TitleHeuristic::LengthAndPunctuation, "It was a dark night.\nThen...", None)]
    #[case(TitleHeuristic::LengthAndPunctuation, "Really?\nYes.", None)]
    #[case(TitleHeuristic::Length, "It was a dark night.\nThen...", Some(("It was a dark night.", "Then...")))]
    #[case(TitleHeuristic::Length, "Only a title", Some(("Only a title", "")))]
    #[case(TitleHeuristic::Length, "\nbody", None)]
    fn test_title_heuristics(
        #[case] heuristic: TitleHeuristic,
        #[case] text: &str,
        #[case] expected: Option<(&str, &str)>,
    ) {
        assert_eq!(heuristic.split(text), expected);
    }

    #[rstest]
    #[case(99, true)]
    #[case(100, false)]
    fn test_title_length_threshold(#[case] length: usize, #[case] is_title: bool) {
        let text = format!("{}\nbody", "t".repeat(length));
        assert_eq!(TitleHeuristic::Length.split(&text).is_some(), is_title);
    }

    #[test]
    fn test_default_options() {
        let options = ImportOptions::default();
        assert_eq!(options.limits, Limits::STANDARD);
        assert_eq!(options.fetch_delay, Duration::from_secs(1));
        assert!(options.merge_categories);
        assert!(options.accepts_extension("TXT"));
        assert!(options.accepts_extension("rst"));
        assert!(!options.accepts_extension("html"));
    }

    #[test]
    fn test_heuristic_names() {
        let heuristic: TitleHeuristic = serde_json::from_str("\"length\"").unwrap();
        assert_eq!(heuristic, TitleHeuristic::Length);
        assert_eq!(
            serde_json::to_string(&TitleHeuristic::LengthAndPunctuation).unwrap(),
            "\"length-and-punctuation\""
        );
    }
}
