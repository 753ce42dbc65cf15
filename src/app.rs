use daon_batch::{BatchResult, CancellationToken, Options, Phase, Submit};
use daon_import::Imported;
use exn::ResultExt;
use std::io::{BufRead, Write};
use tracing::warn;

use crate::error::{ErrorKind, Result};
use crate::report::Reporter;

/// How a live run gets approved.
pub enum Approval<'a> {
    /// `--yes`: no question asked.
    Granted,
    Ask(&'a mut dyn BufRead),
}

/// Preview, confirmation and submission of imported works. Returns `None`
/// when nothing was submitted: no works, or the user declined.
pub async fn protect<W: Write>(
    imported: &Imported,
    submitter: &dyn Submit,
    options: &Options,
    approval: Approval<'_>,
    reporter: &mut Reporter<W>,
    cancel: &CancellationToken,
    phase: &mut Phase,
) -> Result<Option<BatchResult>> {
    let works = &imported.works;
    reporter.found(imported).or_raise(|| ErrorKind::Terminal)?;
    if works.is_empty() {
        reporter.nothing_to_do().or_raise(|| ErrorKind::Terminal)?;
        phase.advance(Phase::Done);
        return Ok(None);
    }

    phase.advance(Phase::Previewing);
    reporter.preview(works).or_raise(|| ErrorKind::Terminal)?;

    if !options.mode.is_dry_run()
        && let Approval::Ask(input) = approval
    {
        phase.advance(Phase::Confirming);
        let approved = reporter.confirm(input, works.len(), options.license).or_raise(|| ErrorKind::Terminal)?;
        if !approved {
            phase.advance(Phase::Done);
            return Ok(None);
        }
    }

    phase.advance(Phase::Processing);
    let mut output_failed = false;
    let result = daon_batch::run(submitter, works, options, cancel, |event| {
        if let Err(e) = reporter.event(event)
            && !output_failed
        {
            warn!(error = %e, "Could not write progress");
            output_failed = true;
        }
    })
    .await;

    phase.advance(Phase::Summarizing);
    reporter
        .summary(&result, imported.rejected + imported.failed, options.mode)
        .or_raise(|| ErrorKind::Terminal)?;
    Ok(Some(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use daon_client::{Client, ClientConfig, License, MockTransport, Mode};
    use daon_work::Work;
    use serde_json::json;
    use std::io::Cursor;
    use std::sync::Arc;
    use std::time::Duration;

    fn imported(count: usize) -> Imported {
        Imported {
            works: (1..=count)
                .map(|i| Work::builder(format!("Story {i}"), format!("content of story number {i}")).build())
                .collect(),
            rejected: 1,
            failed: 0,
        }
    }

    fn options(mode: Mode) -> Options {
        Options {
            license: License::CcByNc,
            mode,
            delay: Duration::ZERO,
            simulated_latency: Duration::ZERO,
        }
    }

    fn client(transport: &Arc<MockTransport>) -> Client {
        Client::new(ClientConfig::default(), transport.clone())
    }

    fn accepted() -> Arc<MockTransport> {
        Arc::new(MockTransport::always(200, json!({"success": true, "tx_hash": "0xabc"})))
    }

    #[tokio::test]
    async fn test_dry_run_skips_confirmation_and_network() {
        let transport = accepted();
        let mut reporter = Reporter::new(Vec::new());
        let mut phase = Phase::default();
        let mut empty = Cursor::new("");

        let result = protect(
            &imported(2),
            &client(&transport),
            &options(Mode::DryRun),
            Approval::Ask(&mut empty),
            &mut reporter,
            &CancellationToken::new(),
            &mut phase,
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(result.protected_count, 2);
        assert_eq!(transport.request_count(), 0);
        assert_eq!(phase, Phase::Summarizing);
        let text = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(!text.contains("(y/N)"));
        assert!(text.contains("[2/2] Story 2..."));
        assert!(text.contains("⚠️ Skipped during import: 1"));
    }

    #[tokio::test]
    async fn test_declined_live_run_submits_nothing() {
        let transport = accepted();
        let mut reporter = Reporter::new(Vec::new());
        let mut phase = Phase::default();
        let mut answer = Cursor::new("n\n");

        let result = protect(
            &imported(3),
            &client(&transport),
            &options(Mode::Live),
            Approval::Ask(&mut answer),
            &mut reporter,
            &CancellationToken::new(),
            &mut phase,
        )
        .await
        .unwrap();

        assert!(result.is_none());
        assert_eq!(transport.request_count(), 0);
        assert_eq!(phase, Phase::Done);
        let text = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(text.contains("Protect 3 works with cc_by_nc license? (y/N): "));
        assert!(text.contains("Protection cancelled."));
    }

    #[tokio::test]
    async fn test_approved_live_run_submits_every_work() {
        let transport = accepted();
        let mut reporter = Reporter::new(Vec::new());
        let mut phase = Phase::default();
        let mut answer = Cursor::new("y\n");

        let result = protect(
            &imported(3),
            &client(&transport),
            &options(Mode::Live),
            Approval::Ask(&mut answer),
            &mut reporter,
            &CancellationToken::new(),
            &mut phase,
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(result.protected_count, 3);
        assert_eq!(transport.request_count(), 3);
        let text = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(text.contains("🎉 Protection complete!"));
    }

    #[tokio::test]
    async fn test_granted_approval_does_not_prompt() {
        let transport = accepted();
        let mut reporter = Reporter::new(Vec::new());
        let mut phase = Phase::default();

        protect(
            &imported(1),
            &client(&transport),
            &options(Mode::Live),
            Approval::Granted,
            &mut reporter,
            &CancellationToken::new(),
            &mut phase,
        )
        .await
        .unwrap();

        assert_eq!(transport.request_count(), 1);
        assert!(!String::from_utf8(reporter.into_inner()).unwrap().contains("(y/N)"));
    }

    #[tokio::test]
    async fn test_no_works_ends_early() {
        let transport = accepted();
        let mut reporter = Reporter::new(Vec::new());
        let mut phase = Phase::default();

        let result = protect(
            &Imported::default(),
            &client(&transport),
            &options(Mode::Live),
            Approval::Granted,
            &mut reporter,
            &CancellationToken::new(),
            &mut phase,
        )
        .await
        .unwrap();

        assert!(result.is_none());
        assert_eq!(phase, Phase::Done);
        assert!(String::from_utf8(reporter.into_inner()).unwrap().contains("No works found. Exiting."));
    }

    #[tokio::test]
    async fn test_cancelled_run_still_summarizes() {
        let transport = accepted();
        let mut reporter = Reporter::new(Vec::new());
        let mut phase = Phase::default();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = protect(
            &imported(2),
            &client(&transport),
            &options(Mode::Live),
            Approval::Granted,
            &mut reporter,
            &cancel,
            &mut phase,
        )
        .await
        .unwrap()
        .unwrap();

        assert!(result.cancelled);
        assert_eq!(result.processed(), 0);
        assert_eq!(transport.request_count(), 0);
        assert!(String::from_utf8(reporter.into_inner()).unwrap().contains("📊 Total processed: 0"));
    }
}
