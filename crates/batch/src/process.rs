use async_stream::stream;
use daon_client::{License, Mode, SubmissionOutcome};
use daon_work::Work;
use futures::{FutureExt, Stream, StreamExt};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::submit::Submit;

/// Pause after each submission, so the registry sees at most two requests a
/// second.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);
/// Pretend network round-trip of a dry-run submission.
pub const DEFAULT_SIMULATED_LATENCY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub license: License,
    pub mode: Mode,
    pub delay: Duration,
    pub simulated_latency: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            license: License::default(),
            mode: Mode::default(),
            delay: DEFAULT_DELAY,
            simulated_latency: DEFAULT_SIMULATED_LATENCY,
        }
    }
}

/// One processed work and what became of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// 1-based position in the batch.
    pub position: usize,
    pub work: Work,
    pub outcome: SubmissionOutcome,
}

/// Progress events emitted by [`process`].
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started) - exactly once, with the number of works.
/// 2. [`Submitting`](Self::Submitting) then [`Submitted`](Self::Submitted) -
///    once per processed work, in input order.
/// 3. [`Cancelled`](Self::Cancelled) - only if the run was interrupted.
/// 4. [`Complete`](Self::Complete) - exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    Started(usize),
    Submitting {
        position: usize,
        total: usize,
        title: String,
    },
    Submitted(Box<Entry>),
    Cancelled {
        processed: usize,
    },
    Complete,
}

/// Everything a run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    /// Processed works, in input order.
    pub entries: Vec<Entry>,
    pub protected_count: usize,
    pub error_count: usize,
    pub cancelled: bool,
}

impl BatchResult {
    fn record(&mut self, entry: Entry) {
        if entry.outcome.is_protected() {
            self.protected_count += 1;
        } else {
            self.error_count += 1;
        }
        self.entries.push(entry);
    }

    pub fn processed(&self) -> usize {
        self.entries.len()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Work, &str)> {
        self.entries
            .iter()
            .filter_map(|entry| entry.outcome.error().map(|error| (&entry.work, error)))
    }
}

/// Submits `works` one at a time, in order, streaming progress.
///
/// A failing or panicking submission becomes a failed outcome for that work
/// only. `options.delay` is slept after every work but the last; cancelling
/// `cancel` cuts that sleep short and stops the run before the next work. An
/// in-flight submission is always allowed to finish.
pub fn process<'a, S>(
    submitter: &'a S,
    works: &'a [Work],
    options: &'a Options,
    cancel: &'a CancellationToken,
) -> impl Stream<Item = BatchEvent> + 'a
where
    S: Submit + ?Sized,
{
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        let total = works.len();
        yield BatchEvent::Started(total);

        for (index, work) in works.iter().enumerate() {
            if cancel.is_cancelled() {
                info!(processed = index, total, "Batch cancelled");
                yield BatchEvent::Cancelled { processed: index };
                break;
            }
            let position = index + 1;
            yield BatchEvent::Submitting {
                position,
                total,
                title: work.title().to_string(),
            };
            let outcome = submit_one(submitter, work, options).await;
            yield BatchEvent::Submitted(Box::new(Entry {
                position,
                work: work.clone(),
                outcome,
            }));
            if position < total && !options.delay.is_zero() {
                tokio::select! {
                    () = cancel.cancelled() => {},
                    () = tokio::time::sleep(options.delay) => {},
                }
            }
        }

        yield BatchEvent::Complete;
    })
}

async fn submit_one<S>(submitter: &S, work: &Work, options: &Options) -> SubmissionOutcome
where
    S: Submit + ?Sized,
{
    let attempt = async {
        match options.mode {
            Mode::Live => submitter.protect(work, options.license).await,
            Mode::DryRun => {
                if !options.simulated_latency.is_zero() {
                    tokio::time::sleep(options.simulated_latency).await;
                }
                Ok(submitter.simulate(work, options.license))
            },
        }
    };
    match AssertUnwindSafe(attempt).catch_unwind().await {
        Ok(Ok(receipt)) => SubmissionOutcome::Protected(receipt),
        Ok(Err(e)) => {
            warn!(title = work.title(), error = ?e, "Submission failed");
            SubmissionOutcome::failed((*e).to_string())
        },
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            error!(title = work.title(), message, "Submission panicked");
            SubmissionOutcome::failed(format!("unexpected failure: {message}"))
        },
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

/// Drives [`process`] to the end, handing every event to `observe` before
/// folding it into the [`BatchResult`].
pub async fn run<S, F>(
    submitter: &S,
    works: &[Work],
    options: &Options,
    cancel: &CancellationToken,
    mut observe: F,
) -> BatchResult
where
    S: Submit + ?Sized,
    F: FnMut(&BatchEvent),
{
    let mut result = BatchResult::default();
    let mut events = std::pin::pin!(process(submitter, works, options, cancel));
    while let Some(event) = events.next().await {
        observe(&event);
        match event {
            BatchEvent::Submitted(entry) => result.record(*entry),
            BatchEvent::Cancelled { .. } => result.cancelled = true,
            BatchEvent::Started(_) | BatchEvent::Submitting { .. } | BatchEvent::Complete => {},
        }
    }
    info!(
        protected = result.protected_count,
        failed = result.error_count,
        cancelled = result.cancelled,
        "Batch finished"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use daon_client::error::{ErrorKind, Result};
    use daon_client::{Client, ClientConfig, MockTransport, Receipt};
    use daon_work::ContentHash;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn works(count: usize) -> Vec<Work> {
        (1..=count)
            .map(|i| Work::builder(format!("Work {i}"), format!("Content of work number {i}.")).build())
            .collect()
    }

    fn fast(mode: Mode) -> Options {
        Options {
            mode,
            delay: Duration::ZERO,
            simulated_latency: Duration::ZERO,
            ..Options::default()
        }
    }

    /// Succeeds, except for one position which fails in the configured way.
    struct Scripted {
        calls: AtomicUsize,
        bad_position: usize,
        panics: bool,
        /// Cancelled once this many calls have been made.
        cancel_after: Option<(usize, CancellationToken)>,
    }

    impl Scripted {
        fn new(bad_position: usize, panics: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                bad_position,
                panics,
                cancel_after: None,
            }
        }
    }

    #[async_trait]
    impl Submit for Scripted {
        async fn protect(&self, work: &Work, _license: License) -> Result<Receipt> {
            let position = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some((after, token)) = &self.cancel_after
                && position == *after
            {
                token.cancel();
            }
            if position == self.bad_position {
                if self.panics {
                    panic!("registry client exploded");
                }
                exn::bail!(ErrorKind::Transport("connection reset".to_string()));
            }
            Ok(self.simulate(work, License::CcBy))
        }

        fn simulate(&self, work: &Work, _license: License) -> Receipt {
            Receipt {
                content_hash: ContentHash::of(work.content()),
                tx_hash: None,
                verification_url: None,
                simulated: false,
            }
        }
    }

    fn positions(result: &BatchResult) -> Vec<usize> {
        result.entries.iter().map(|entry| entry.position).collect()
    }

    #[rstest::rstest]
    #[case(false, "transport error: connection reset")]
    #[case(true, "unexpected failure: registry client exploded")]
    #[tokio::test]
    async fn test_fault_at_k_is_isolated(#[case] panics: bool, #[case] expected_error: &str) {
        let works = works(5);
        let submitter = Scripted::new(3, panics);
        let result = run(&submitter, &works, &fast(Mode::Live), &CancellationToken::new(), |_| {}).await;

        assert_eq!(result.processed(), 5);
        assert_eq!(positions(&result), [1, 2, 3, 4, 5]);
        assert_eq!(result.protected_count, 4);
        assert_eq!(result.error_count, 1);
        assert_eq!(result.entries[2].outcome.error(), Some(expected_error));
        let failures: Vec<_> = result.failures().map(|(work, _)| work.title()).collect();
        assert_eq!(failures, ["Work 3"]);
        assert!(!result.cancelled);
    }

    #[tokio::test]
    async fn test_cancel_after_m() {
        let works = works(6);
        let token = CancellationToken::new();
        let mut submitter = Scripted::new(0, false);
        submitter.cancel_after = Some((2, token.clone()));

        let result = run(&submitter, &works, &fast(Mode::Live), &token, |_| {}).await;
        assert!(result.cancelled);
        assert_eq!(result.processed(), 2);
        assert_eq!(result.protected_count + result.error_count, 2);
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_event_order() {
        let works = works(2);
        let token = CancellationToken::new();
        let options = fast(Mode::DryRun);
        let events: Vec<_> = process(&Scripted::new(0, false), &works, &options, &token).collect().await;

        assert_eq!(events.len(), 6);
        assert_eq!(events[0], BatchEvent::Started(2));
        assert!(matches!(&events[1], BatchEvent::Submitting { position: 1, total: 2, title } if title == "Work 1"));
        assert!(matches!(&events[2], BatchEvent::Submitted(entry) if entry.position == 1));
        assert!(matches!(&events[3], BatchEvent::Submitting { position: 2, .. }));
        assert!(matches!(&events[4], BatchEvent::Submitted(entry) if entry.position == 2));
        assert_eq!(events[5], BatchEvent::Complete);
    }

    #[tokio::test]
    async fn test_already_cancelled() {
        let works = works(3);
        let token = CancellationToken::new();
        token.cancel();
        let mut seen = Vec::new();
        let result = run(&Scripted::new(0, false), &works, &fast(Mode::Live), &token, |event| {
            seen.push(event.clone());
        })
        .await;
        assert_eq!(result.processed(), 0);
        assert!(result.cancelled);
        assert_eq!(
            seen,
            [BatchEvent::Started(3), BatchEvent::Cancelled { processed: 0 }, BatchEvent::Complete]
        );
    }

    #[tokio::test]
    async fn test_dry_run_never_touches_the_network() {
        let transport = Arc::new(MockTransport::new());
        let client = Client::new(ClientConfig::default(), transport.clone());
        let works = works(4);
        let result = run(&client, &works, &fast(Mode::DryRun), &CancellationToken::new(), |_| {}).await;

        assert_eq!(transport.request_count(), 0);
        assert_eq!(result.protected_count, 4);
        for entry in &result.entries {
            let receipt = entry.outcome.receipt().unwrap();
            assert!(receipt.simulated);
            assert!(ContentHash::parse(receipt.content_hash.as_str()).is_ok());
        }
    }

    #[tokio::test]
    async fn test_live_run_with_client() {
        let transport = Arc::new(
            MockTransport::always(200, json!({"success": true, "tx_hash": "TX"}))
                .respond_raw(500, "boom"),
        );
        let client = Client::new(ClientConfig::default(), transport.clone());
        let works = works(3);
        let result = run(&client, &works, &fast(Mode::Live), &CancellationToken::new(), |_| {}).await;

        assert_eq!(transport.request_count(), 3);
        assert_eq!(result.error_count, 1);
        assert_eq!(result.protected_count, 2);
        assert!(result.entries[0].outcome.error().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_between_items() {
        let works = works(3);
        let options = Options {
            mode: Mode::DryRun,
            ..Options::default()
        };
        let started = tokio::time::Instant::now();
        let result = run(&Scripted::new(0, false), &works, &options, &CancellationToken::new(), |_| {}).await;
        assert_eq!(result.processed(), 3);
        // Three simulated round-trips and two pauses.
        assert_eq!(started.elapsed(), DEFAULT_SIMULATED_LATENCY * 3 + DEFAULT_DELAY * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_applies_after_failures() {
        let works = works(3);
        let delay = Duration::from_secs(1);
        let options = Options {
            mode: Mode::Live,
            delay,
            simulated_latency: Duration::ZERO,
            ..Options::default()
        };
        let started = tokio::time::Instant::now();
        let mut submitting_at = Vec::new();
        let result = run(&Scripted::new(2, false), &works, &options, &CancellationToken::new(), |event| {
            if let BatchEvent::Submitting { position, .. } = event {
                submitting_at.push((*position, started.elapsed()));
            }
        })
        .await;

        assert_eq!(result.error_count, 1);
        assert_eq!(result.entries[1].outcome.error(), Some("transport error: connection reset"));
        assert_eq!(submitting_at, [(1, Duration::ZERO), (2, delay), (3, delay * 2)]);
        assert_eq!(started.elapsed(), delay * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_delay() {
        let works = works(2);
        let options = Options {
            mode: Mode::Live,
            delay: Duration::from_secs(3600),
            simulated_latency: Duration::ZERO,
            ..Options::default()
        };
        let token = CancellationToken::new();
        let mut submitter = Scripted::new(0, false);
        submitter.cancel_after = Some((1, token.clone()));
        let started = tokio::time::Instant::now();
        let result = run(&submitter, &works, &options, &token, |_| {}).await;
        assert_eq!(result.processed(), 1);
        assert!(result.cancelled);
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
