use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

use crate::work::Work;

/// Bounds a work must fall within to be submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Minimum number of characters in the trimmed content.
    pub min_content_chars: usize,
    /// Maximum content size in bytes.
    pub max_content_bytes: usize,
}

impl Limits {
    /// Limits used by the full bulk-protection tool.
    pub const STANDARD: Self = Self {
        min_content_chars: 100,
        max_content_bytes: 10 * 1024 * 1024,
    };
    /// Limits used by the lightweight protector (shorter pieces allowed).
    pub const LIGHTWEIGHT: Self = Self {
        min_content_chars: 50,
        max_content_bytes: 10 * 1024 * 1024,
    };

    pub fn with_min_content_chars(self, min_content_chars: usize) -> Self {
        Self { min_content_chars, ..self }
    }

    /// Checks `work` against these limits, returning the first reason it is
    /// unacceptable.
    pub fn check(&self, work: &Work) -> Result<(), Rejection> {
        if work.title().is_empty() {
            return Err(Rejection::EmptyTitle);
        }
        if work.content().is_empty() {
            return Err(Rejection::EmptyContent);
        }
        let chars = work.content().trim().chars().count();
        if chars < self.min_content_chars {
            return Err(Rejection::TooShort {
                chars,
                min: self.min_content_chars,
            });
        }
        let bytes = work.content().len();
        if bytes > self.max_content_bytes {
            return Err(Rejection::TooLarge {
                bytes,
                max: self.max_content_bytes,
            });
        }
        Ok(())
    }

    pub fn is_valid(&self, work: &Work) -> bool {
        self.check(work).is_ok()
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Why a work was dropped before submission.
///
/// Rejections are not errors: rejected works are counted as skipped and never
/// reach the batch stage.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[display("title is empty")]
    EmptyTitle,
    #[display("content is empty")]
    EmptyContent,
    #[display("content too short ({chars} < {min} characters)")]
    TooShort { chars: usize, min: usize },
    #[display("content too large ({bytes} > {max} bytes)")]
    TooLarge { bytes: usize, max: usize },
}

/// Checks `work` against [`Limits::STANDARD`].
pub fn is_valid(work: &Work) -> bool {
    Limits::STANDARD.is_valid(work)
}
