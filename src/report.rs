//! Console output of a run: header, preview, progress and summary.
//!
//! Everything goes through a [`Reporter`] wrapping any [`Write`], so the exact
//! text can be checked against an in-memory buffer.

use daon_batch::{BatchEvent, BatchResult};
use daon_client::{License, Mode};
use daon_import::{Imported, SourceKind};
use daon_work::Work;
use std::io::{self, BufRead, Write};
use std::path::Path;

const RULE_WIDTH: usize = 60;
/// Works shown before asking for confirmation.
pub const PREVIEW_COUNT: usize = 3;
const PREVIEW_FANDOMS: usize = 3;
const PROGRESS_TITLE_CHARS: usize = 50;
const HASH_PREFIX_CHARS: usize = 16;

pub struct Reporter<W> {
    out: W,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn rule(&mut self, ch: char) -> io::Result<()> {
        writeln!(self.out, "{}", ch.to_string().repeat(RULE_WIDTH))
    }

    pub fn source_not_found(&mut self, source: &Path) -> io::Result<()> {
        writeln!(self.out, "❌ Source not found: {}", source.display())
    }

    pub fn header(&mut self, source: &Path, kind: SourceKind, license: License, mode: Mode) -> io::Result<()> {
        writeln!(self.out, "🛡️ DAON Bulk Protection Tool")?;
        writeln!(self.out, "Source: {} ({kind})", source.display())?;
        writeln!(self.out, "License: {license}")?;
        writeln!(self.out, "Mode: {}", if mode.is_dry_run() { "DRY RUN" } else { "LIVE PROTECTION" })?;
        self.rule('-')
    }

    pub fn found(&mut self, imported: &Imported) -> io::Result<()> {
        writeln!(self.out, "📚 Found {} works to protect", imported.works.len())?;
        if imported.rejected > 0 {
            writeln!(self.out, "⚠️ {} works skipped (empty, too short or too large)", imported.rejected)?;
        }
        if imported.failed > 0 {
            writeln!(self.out, "⚠️ {} records could not be read", imported.failed)?;
        }
        Ok(())
    }

    pub fn nothing_to_do(&mut self) -> io::Result<()> {
        writeln!(self.out, "No works found. Exiting.")
    }

    /// The first [`PREVIEW_COUNT`] works, and how many more follow.
    pub fn preview(&mut self, works: &[Work]) -> io::Result<()> {
        writeln!(self.out, "\n📋 Preview of works to be protected:")?;
        self.rule('-')?;
        for (index, work) in works.iter().take(PREVIEW_COUNT).enumerate() {
            writeln!(self.out, "{}. {}", index + 1, work.title())?;
            writeln!(self.out, "   Author: {}", work.author_or_unknown())?;
            writeln!(self.out, "   Words: {}", group_thousands(work.word_count()))?;
            writeln!(self.out, "   Source: {}", work.platform())?;
            if !work.fandoms().is_empty() {
                let fandoms: Vec<&str> = work.fandoms().iter().take(PREVIEW_FANDOMS).map(String::as_str).collect();
                writeln!(self.out, "   Fandoms: {}", fandoms.join(", "))?;
            }
            writeln!(self.out)?;
        }
        if works.len() > PREVIEW_COUNT {
            writeln!(self.out, "... and {} more works", works.len() - PREVIEW_COUNT)?;
        }
        Ok(())
    }

    /// Asks before a live run. Only `y` or `Y` approves; end of input declines.
    pub fn confirm(&mut self, input: &mut (impl BufRead + ?Sized), count: usize, license: License) -> io::Result<bool> {
        write!(self.out, "\n🔒 Protect {count} works with {license} license? (y/N): ")?;
        self.out.flush()?;
        let mut answer = String::new();
        input.read_line(&mut answer)?;
        let approved = answer.trim().eq_ignore_ascii_case("y");
        if !approved {
            writeln!(self.out, "Protection cancelled.")?;
        }
        Ok(approved)
    }

    pub fn event(&mut self, event: &BatchEvent) -> io::Result<()> {
        match event {
            BatchEvent::Started(total) => {
                writeln!(self.out, "\n🔒 Processing {total} works...")?;
                self.rule('-')
            },
            BatchEvent::Submitting { position, total, title } => {
                let short: String = title.chars().take(PROGRESS_TITLE_CHARS).collect();
                writeln!(self.out, "[{position}/{total}] {short}...")
            },
            BatchEvent::Submitted(entry) => match entry.outcome.receipt() {
                Some(receipt) => {
                    let verb = if receipt.simulated { "Simulated" } else { "Protected" };
                    writeln!(self.out, "  ✅ {verb}: {}...", receipt.content_hash.short(HASH_PREFIX_CHARS))
                },
                None => writeln!(self.out, "  ❌ Failed: {}", entry.outcome.error().unwrap_or("Unknown error")),
            },
            BatchEvent::Cancelled { processed } => {
                writeln!(self.out, "\n⏹️ Interrupted after {processed} works, summarizing what was done.")
            },
            BatchEvent::Complete => Ok(()),
        }
    }

    /// Final tally. `skipped` is the number of records dropped during import.
    pub fn summary(&mut self, result: &BatchResult, skipped: usize, mode: Mode) -> io::Result<()> {
        writeln!(self.out)?;
        self.rule('=')?;
        writeln!(self.out, "🛡️ DAON BULK PROTECTION SUMMARY")?;
        self.rule('=')?;
        writeln!(self.out, "✅ Successfully protected: {}", result.protected_count)?;
        writeln!(self.out, "❌ Failed to protect: {}", result.error_count)?;
        writeln!(self.out, "📊 Total processed: {}", result.processed())?;
        if skipped > 0 {
            writeln!(self.out, "⚠️ Skipped during import: {skipped}")?;
        }

        if result.error_count > 0 {
            writeln!(self.out, "\n❌ ERRORS:")?;
            for (work, error) in result.failures() {
                writeln!(self.out, "  - {}: {error}", work.title())?;
            }
        }

        if mode.is_dry_run() {
            writeln!(self.out, "\n🧪 This was a DRY RUN - no actual protection occurred")?;
            writeln!(self.out, "Remove --dry-run flag to actually protect these works")?;
        } else if result.cancelled {
            writeln!(self.out, "\n⏹️ Run interrupted; works after the last processed one were not submitted.")?;
        } else {
            writeln!(self.out, "\n🎉 Protection complete! Your works are now secured by DAON.")?;
            writeln!(self.out, "You can verify protection at: https://verify.daon.network")?;
        }
        Ok(())
    }

    pub fn results_saved(&mut self, path: &Path) -> io::Result<()> {
        writeln!(self.out, "📄 Results saved to: {}", path.display())
    }

    pub fn results_failed(&mut self, error: &dyn std::fmt::Display) -> io::Result<()> {
        writeln!(self.out, "⚠️ Could not save results: {error}")
    }
}

/// `12345` -> `12,345`
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
