//! Venue-specific polling adapters.
//!
//! Prefer a tagged variant over inheritance: each worker module exposes a
//! struct implementing [`Worker`] (`connect`, `fetch_batch`, `stop`); the
//! shared poll loop, normalisation, and publish call live once in
//! [`run_worker`], parameterised over the trait object. This mirrors the
//! upstream system's `BaseIngestionWorker` base class, translated from
//! inheritance into composition over a shared free function.

pub mod category_map;
pub mod coinbase;
pub mod gemini;
pub mod kalshi;
pub mod limitless;
pub mod polymarket;
pub mod predictit;
pub mod robinhood;
pub mod sportsbook_aggregator;

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::core::domain::RawQuote;
use crate::core::normalise::normalise_batch;
use crate::core::publish::Publisher;
use crate::error::Result;

/// The capability set every venue adapter implements. `fetch_batch` returns
/// the raw quotes extracted from one poll tick — empty when the venue has
/// nothing new or the worker is mid-backoff.
#[async_trait]
pub trait Worker: Send {
    /// The venue slug this worker publishes quotes under. For most workers
    /// this is the worker's own venue; the sportsbook aggregator is the
    /// exception — it polls one upstream API but emits quotes tagged with
    /// each underlying bookmaker's slug (see `sportsbook_aggregator`).
    fn venue_slug(&self) -> &str;

    fn poll_interval(&self) -> Duration;

    /// Establish any long-lived resources (HTTP client, auth token). Called
    /// once before the poll loop starts.
    async fn connect(&mut self) -> Result<()>;

    /// Fetch and parse one batch of raw quotes. Errors are the caller's
    /// responsibility to catch, log, and swallow — `run_worker` never lets
    /// one bad tick kill the task.
    async fn fetch_batch(&mut self) -> Result<Vec<RawQuote>>;

    /// Release resources ahead of task cancellation.
    async fn stop(&mut self);
}

/// Drive one worker's generic poll loop until `shutdown` signals true:
///
/// ```text
/// connect()
/// while running:
///     batch = fetch_batch()
///     if batch: publisher.publish(normalise(batch))
///     sleep(poll_interval)
/// ```
///
/// Every failure mode (connect failure, fetch failure, publish failure) is
/// logged and swallowed per the error-handling design — nothing here
/// propagates to the caller. The loop exits promptly on a shutdown signal
/// rather than waiting out a long poll interval, honouring the bounded
/// drain-period contract.
pub async fn run_worker(
    mut worker: Box<dyn Worker>,
    publisher: std::sync::Arc<Publisher>,
    mut shutdown: watch::Receiver<bool>,
) {
    let venue_slug = worker.venue_slug().to_string();

    if let Err(err) = worker.connect().await {
        tracing::error!(venue = %venue_slug, error = %err, "worker failed to connect, exiting");
        return;
    }
    tracing::info!(
        venue = %venue_slug,
        poll_interval_secs = worker.poll_interval().as_secs(),
        "worker started"
    );

    loop {
        if *shutdown.borrow() {
            break;
        }

        match worker.fetch_batch().await {
            Ok(batch) if !batch.is_empty() => {
                let normalised = normalise_batch(&batch);
                if let Err(err) = publisher.publish(&normalised).await {
                    tracing::error!(venue = %venue_slug, error = %err, "publish failed, dropping batch");
                }
            }
            Ok(_) => tracing::debug!(venue = %venue_slug, "no quotes this tick"),
            Err(err) => tracing::warn!(venue = %venue_slug, error = %err, "fetch_batch failed"),
        }

        tokio::select! {
            () = tokio::time::sleep(worker.poll_interval()) => {}
            result = shutdown.changed() => {
                if result.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    worker.stop().await;
    tracing::info!(venue = %venue_slug, "worker stopped");
}
