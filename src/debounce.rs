//! Trailing-edge debouncer for editor content analysis.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Delay before weak-word highlights are recomputed.
pub const HIGHLIGHT_DELAY: Duration = Duration::from_millis(1000);
/// Delay before improvement suggestions are recomputed.
pub const SUGGESTION_DELAY: Duration = Duration::from_millis(1500);

/// Runs the most recently scheduled job once the input has been quiet for
/// `delay`. Scheduling again aborts the pending job and restarts the timer.
pub struct Debouncer {
  delay: Duration,
  pending: Option<JoinHandle<()>>,
}

impl Debouncer {
  pub fn new(delay: Duration) -> Self {
    Self { delay, pending: None }
  }

  pub fn schedule<F>(&mut self, job: F)
  where
    F: Future<Output = ()> + Send + 'static,
  {
    self.cancel();
    let delay = self.delay;
    self.pending = Some(tokio::spawn(async move {
      tokio::time::sleep(delay).await;
      job.await;
    }));
  }

  pub fn cancel(&mut self) {
    if let Some(handle) = self.pending.take() {
      handle.abort();
    }
  }

  pub fn is_pending(&self) -> bool {
    self.pending.as_ref().is_some_and(|h| !h.is_finished())
  }
}

impl Drop for Debouncer {
  fn drop(&mut self) {
    self.cancel();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Arc;

  fn counting_job(counter: &Arc<AtomicUsize>, value: usize, last: &Arc<AtomicUsize>) -> impl Future<Output = ()> + Send + 'static {
    let counter = counter.clone();
    let last = last.clone();
    async move {
      counter.fetch_add(1, Ordering::SeqCst);
      last.store(value, Ordering::SeqCst);
    }
  }

  #[tokio::test(start_paused = true)]
  async fn rapid_edits_fire_once_with_latest_job() {
    let fired = Arc::new(AtomicUsize::new(0));
    let last = Arc::new(AtomicUsize::new(0));
    let mut d = Debouncer::new(HIGHLIGHT_DELAY);

    for i in 1..=5 {
      d.schedule(counting_job(&fired, i, &last));
      tokio::time::sleep(Duration::from_millis(200)).await;
    }
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    assert!(d.is_pending());

    tokio::time::sleep(Duration::from_millis(900)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert_eq!(last.load(Ordering::SeqCst), 5);
    assert!(!d.is_pending());
  }

  #[tokio::test(start_paused = true)]
  async fn separate_quiet_windows_fire_separately() {
    let fired = Arc::new(AtomicUsize::new(0));
    let last = Arc::new(AtomicUsize::new(0));
    let mut d = Debouncer::new(HIGHLIGHT_DELAY);

    d.schedule(counting_job(&fired, 1, &last));
    tokio::time::sleep(Duration::from_millis(1100)).await;
    d.schedule(counting_job(&fired, 2, &last));
    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 2);
  }

  #[tokio::test(start_paused = true)]
  async fn cancel_and_drop_abort_pending_job() {
    let fired = Arc::new(AtomicUsize::new(0));
    let last = Arc::new(AtomicUsize::new(0));

    let mut d = Debouncer::new(SUGGESTION_DELAY);
    d.schedule(counting_job(&fired, 1, &last));
    d.cancel();
    assert!(!d.is_pending());

    let mut dropped = Debouncer::new(SUGGESTION_DELAY);
    dropped.schedule(counting_job(&fired, 2, &last));
    drop(dropped);

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
  }
}
