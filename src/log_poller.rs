//! Bounded log polling after an execution.
//!
//! A polling window fetches logs at a fixed interval until its fixed
//! duration elapses or it is cancelled. Snapshots are published on a bounded
//! channel; when the consumer falls behind, new snapshots are dropped rather
//! than holding the window open. Dropping the [PollingWindow] cancels the task, so a view that
//! goes away never leaves a recurring fetch behind.

use crate::service::PlaybookService;
use crate::types::{LogScope, LogSnapshot};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Snapshots buffered before the poller waits for the consumer.
const SNAPSHOT_BUFFER: usize = 16;

/// Handle to a running polling task.
#[derive(Debug)]
pub struct PollingWindow {
  scope: LogScope,
  cancel: CancellationToken,
  handle: Option<JoinHandle<u32>>,
  snapshots: Option<mpsc::Receiver<LogSnapshot>>,
}

impl PollingWindow {
  /// Starts polling `scope` every `interval` for at most `window`.
  ///
  /// The first fetch happens immediately. Must be called inside a tokio
  /// runtime.
  pub fn open<S>(service: Arc<S>, scope: LogScope, interval: Duration, window: Duration) -> Self
  where
    S: PlaybookService + ?Sized + 'static,
  {
    let cancel = CancellationToken::new();
    let (tx, rx) = mpsc::channel(SNAPSHOT_BUFFER);
    info!(?scope, ?interval, ?window, "opening log polling window");
    let handle = tokio::spawn(poll_logs(
      service,
      scope.clone(),
      interval,
      window,
      cancel.clone(),
      tx,
    ));
    Self {
      scope,
      cancel,
      handle: Some(handle),
      snapshots: Some(rx),
    }
  }

  pub fn scope(&self) -> &LogScope {
    &self.scope
  }

  /// Stops polling. Idempotent.
  pub fn cancel(&self) {
    self.cancel.cancel();
  }

  pub fn is_cancelled(&self) -> bool {
    self.cancel.is_cancelled()
  }

  /// True once the task has stopped (expired, cancelled, or consumer gone).
  pub fn is_finished(&self) -> bool {
    self.handle.as_ref().is_none_or(JoinHandle::is_finished)
  }

  /// Next snapshot, or `None` once the window has closed and the buffer is
  /// drained (or the stream was taken).
  pub async fn next_snapshot(&mut self) -> Option<LogSnapshot> {
    self.snapshots.as_mut()?.recv().await
  }

  /// Takes the snapshot stream. The window keeps control of the task.
  pub fn take_stream(&mut self) -> Option<ReceiverStream<LogSnapshot>> {
    self.snapshots.take().map(ReceiverStream::new)
  }

  /// Waits for the task to stop and returns how many ticks it fetched.
  pub async fn finished(&mut self) -> u32 {
    match self.handle.take() {
      Some(handle) => handle.await.unwrap_or_else(|e| {
        warn!(error = %e, "log polling task failed");
        0
      }),
      None => 0,
    }
  }
}

impl Drop for PollingWindow {
  fn drop(&mut self) {
    self.cancel.cancel();
  }
}

/// Polling loop. Returns the number of completed ticks.
async fn poll_logs<S>(
  service: Arc<S>,
  scope: LogScope,
  interval: Duration,
  window: Duration,
  cancel: CancellationToken,
  tx: mpsc::Sender<LogSnapshot>,
) -> u32
where
  S: PlaybookService + ?Sized,
{
  // tokio's interval rejects a zero period.
  let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
  ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
  let expiry = tokio::time::sleep_until(Instant::now() + window);
  tokio::pin!(expiry);

  let mut tick = 0u32;
  loop {
    tokio::select! {
      biased;
      _ = cancel.cancelled() => {
        debug!(tick, "log polling cancelled");
        break;
      }
      _ = &mut expiry => {
        debug!(tick, "log polling window expired");
        break;
      }
      _ = ticker.tick() => {
        let snapshot = tokio::select! {
          biased;
          _ = cancel.cancelled() => break,
          _ = &mut expiry => {
            debug!(tick, "log polling window expired during fetch");
            break;
          }
          s = fetch_snapshot(service.as_ref(), &scope, tick + 1) => s,
        };
        tick += 1;
        match tx.try_send(snapshot) {
          Ok(()) => {}
          Err(mpsc::error::TrySendError::Full(_)) => {
            debug!(tick, "log consumer lagging, snapshot dropped");
          }
          Err(mpsc::error::TrySendError::Closed(_)) => {
            debug!(tick, "log consumer gone, stopping");
            break;
          }
        }
      }
    }
  }
  tick
}

/// One tick: docker logs (playbook scope only) and context logs.
///
/// A failed fetch is logged and yields an empty list; the window keeps going.
pub(crate) async fn fetch_snapshot<S>(service: &S, scope: &LogScope, tick: u32) -> LogSnapshot
where
  S: PlaybookService + ?Sized,
{
  let docker = match scope {
    LogScope::Playbook(id) => service.fetch_docker_logs(id).await.unwrap_or_else(|e| {
      warn!(error = %e, playbook = %id, "error fetching docker logs");
      Vec::new()
    }),
    LogScope::Global => Vec::new(),
  };
  let context = service.fetch_context_logs(scope).await.unwrap_or_else(|e| {
    warn!(error = %e, ?scope, "error fetching context logs");
    Vec::new()
  });
  LogSnapshot {
    tick,
    fetched_at: Utc::now(),
    docker,
    context,
  }
}
