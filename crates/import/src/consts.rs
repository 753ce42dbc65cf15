use regex::Regex;
use scraper::Selector;
use std::sync::LazyLock;

macro_rules! selector {
    ($name:ident, $css:expr) => {
        pub(crate) static $name: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

macro_rules! selectors {
    ($name:ident, $candidates:expr) => {
        pub(crate) static $name: LazyLock<Vec<Selector>> =
            LazyLock::new(|| $candidates.iter().map(|css| Selector::parse(css).unwrap()).collect());
    };
}

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

/// Where the body of a scraped page is looked for, in priority order.
pub const CONTENT_CANDIDATES: [&str; 9] = [
    "article",
    ".post-content",
    ".entry-content",
    ".content",
    "main",
    "#content",
    // FanFiction.Net
    ".story-text",
    // AO3
    "#workskin",
    ".userstuff",
];

/// Where the author of a scraped page is looked for, in priority order.
pub const AUTHOR_CANDIDATES: [&str; 4] = [".author", ".byline", "[rel=\"author\"]", ".post-author"];

selector!(TITLE_SELECTOR, "title");
selectors!(CONTENT_SELECTORS, CONTENT_CANDIDATES);
selectors!(AUTHOR_SELECTORS, AUTHOR_CANDIDATES);
regex!(WHITESPACE_REGEX, r"\s+");
