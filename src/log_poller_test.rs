//! Tests for bounded log polling. Time is paused so windows run instantly.

use crate::log_poller::{PollingWindow, fetch_snapshot};
use crate::test_support::{Call, FakeService, sample_playbooks};
use crate::types::LogScope;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::StreamExt;

fn service() -> Arc<FakeService> {
  Arc::new(FakeService::with_playbooks(&sample_playbooks()))
}

fn context_fetches(service: &FakeService) -> usize {
  service.count(|c| matches!(c, Call::ContextLogs(_)))
}

#[tokio::test(start_paused = true)]
async fn window_stops_after_its_duration() {
  let service = service();
  let mut window = PollingWindow::open(
    Arc::clone(&service),
    LogScope::Global,
    Duration::from_secs(2),
    Duration::from_secs(9),
  );
  let mut ticks = Vec::new();
  while let Some(snapshot) = window.next_snapshot().await {
    ticks.push(snapshot.tick);
  }
  assert_eq!(ticks, vec![1, 2, 3, 4, 5]);
  assert_eq!(window.finished().await, 5);
  assert!(window.is_finished());
  assert_eq!(context_fetches(&service), 5);

  tokio::time::sleep(Duration::from_secs(30)).await;
  assert_eq!(context_fetches(&service), 5);
}

#[tokio::test(start_paused = true)]
async fn cancel_stops_fetching() {
  let service = service();
  let mut window = PollingWindow::open(
    Arc::clone(&service),
    LogScope::Playbook("pb1".to_string()),
    Duration::from_secs(2),
    Duration::from_secs(60),
  );
  let first = window.next_snapshot().await.expect("first snapshot");
  assert_eq!(first.tick, 1);
  window.cancel();
  assert!(window.is_cancelled());
  while window.next_snapshot().await.is_some() {}
  let ticks = window.finished().await;
  assert!(ticks < 30, "cancelled window ran {ticks} ticks");

  let fetched = context_fetches(&service);
  tokio::time::sleep(Duration::from_secs(60)).await;
  assert_eq!(context_fetches(&service), fetched);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_window_cancels_polling() {
  let service = service();
  let mut window = PollingWindow::open(
    Arc::clone(&service),
    LogScope::Global,
    Duration::from_secs(2),
    Duration::from_secs(60),
  );
  let mut stream = window.take_stream().expect("stream");
  assert!(window.take_stream().is_none());
  let first = stream.next().await.expect("first snapshot");
  assert_eq!(first.tick, 1);
  drop(window);

  while stream.next().await.is_some() {}
  let fetched = context_fetches(&service);
  tokio::time::sleep(Duration::from_secs(60)).await;
  assert_eq!(context_fetches(&service), fetched);
  assert!(fetched < 30);
}

#[tokio::test(start_paused = true)]
async fn slow_consumer_does_not_extend_the_window() {
  let service = service();
  let mut window = PollingWindow::open(
    Arc::clone(&service),
    LogScope::Global,
    Duration::from_secs(1),
    Duration::from_millis(39_500),
  );
  let ticks = window.finished().await;
  assert_eq!(ticks, 40);
  let mut received = 0;
  while window.next_snapshot().await.is_some() {
    received += 1;
  }
  assert!(received <= 16, "buffered {received} snapshots");
}

#[tokio::test(start_paused = true)]
async fn slow_fetch_does_not_outlive_the_window() {
  let mut fake = FakeService::with_playbooks(&sample_playbooks());
  fake.log_delay = Duration::from_secs(30);
  let service = Arc::new(fake);
  let started = tokio::time::Instant::now();
  let mut window = PollingWindow::open(
    Arc::clone(&service),
    LogScope::Global,
    Duration::from_secs(1),
    Duration::from_secs(5),
  );
  assert_eq!(window.finished().await, 0);
  assert!(started.elapsed() < Duration::from_secs(6));
  assert!(window.next_snapshot().await.is_none());
}

#[tokio::test]
async fn playbook_scope_fetches_docker_and_context_logs() {
  let service = service();
  let snapshot = fetch_snapshot(service.as_ref(), &LogScope::Playbook("pb1".to_string()), 3).await;
  assert_eq!(snapshot.tick, 3);
  assert_eq!(snapshot.docker, service.docker_logs);
  assert_eq!(snapshot.context, service.context_logs);
  assert_eq!(
    service.calls(),
    vec![
      Call::DockerLogs("pb1".to_string()),
      Call::ContextLogs(LogScope::Playbook("pb1".to_string())),
    ]
  );
}

#[tokio::test]
async fn global_scope_fetches_context_logs_only() {
  let service = service();
  let snapshot = fetch_snapshot(service.as_ref(), &LogScope::Global, 1).await;
  assert!(snapshot.docker.is_empty());
  assert_eq!(snapshot.context.len(), 1);
  assert_eq!(service.calls(), vec![Call::ContextLogs(LogScope::Global)]);
}

#[tokio::test]
async fn failed_fetches_yield_empty_snapshot() {
  let service = service();
  service.fail("docker_logs");
  service.fail("context_logs");
  let snapshot = fetch_snapshot(service.as_ref(), &LogScope::Playbook("pb1".to_string()), 1).await;
  assert!(snapshot.docker.is_empty());
  assert!(snapshot.context.is_empty());
}
