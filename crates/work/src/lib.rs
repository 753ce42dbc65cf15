//! Normalized creative-work records.
//!
//! Every import source (structured exports, syndication feeds, scraped pages,
//! plain-text files) is funnelled into a single [`Work`] shape through the
//! [`WorkBuilder`], which fills in derived fields such as the word count and
//! the fallback title. [`Limits`] then decides whether a work is acceptable for
//! submission, and [`ContentHash`] is the content-addressing key sent to the
//! registry.

pub mod error;
mod hash;
mod validate;
mod work;

pub use crate::hash::{ContentHash, HashStrategy, normalize_content};
pub use crate::validate::{Limits, Rejection, is_valid};
pub use crate::work::{UNKNOWN_AUTHOR, UNTITLED, Work, WorkBuilder};
