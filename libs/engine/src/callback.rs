//! Callback-style invocation of operations.
//!
//! Operations are plain futures resolving to a `Result`. Callers that prefer a completion callback
//! wrap them here, the callback sees the same outcome the future resolves to.

use std::future::Future;

use tokio::task::JoinHandle;

/// Awaits `operation`, hands its outcome to `callback`, then returns that same outcome.
///
/// The callback runs exactly once, and the returned future settles whether the operation
/// succeeded or not.
pub async fn with_callback<T, E, F, C>(operation: F, callback: C) -> Result<T, E>
where
  F: Future<Output = Result<T, E>>,
  C: FnOnce(&Result<T, E>),
{
  let outcome = operation.await;
  callback(&outcome);

  outcome
}

/// Runs `operation` on the tokio runtime and moves its outcome into `callback`.
///
/// The returned handle completes once the callback has run.
pub fn spawn_with_callback<T, E, F, C>(operation: F, callback: C) -> JoinHandle<()>
where
  T: Send + 'static,
  E: Send + 'static,
  F: Future<Output = Result<T, E>> + Send + 'static,
  C: FnOnce(Result<T, E>) + Send + 'static,
{
  tokio::spawn(async move {
    let outcome = operation.await;
    callback(outcome);
  })
}

#[cfg(test)]
mod tests {
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
  };

  use super::*;
  use crate::error::PipelineError;

  #[tokio::test]
  async fn callback_sees_the_success() {
    let seen = Arc::new(Mutex::new(None));
    let seen_by_callback = seen.clone();

    let outcome = with_callback(
      async { Ok::<_, PipelineError>(7) },
      move |outcome| {
        *seen_by_callback.lock().unwrap() = outcome.as_ref().ok().copied();
      },
    )
    .await;

    assert_eq!(outcome.unwrap(), 7);
    assert_eq!(*seen.lock().unwrap(), Some(7));
  }

  #[tokio::test]
  async fn failures_settle_and_reach_the_callback_once() {
    let calls = AtomicUsize::new(0);

    let outcome = with_callback(
      async { Err::<(), _>(PipelineError::validation("Story ID or URL is required.")) },
      |outcome| {
        calls.fetch_add(1, Ordering::SeqCst);
        assert!(outcome.is_err());
      },
    )
    .await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(
      outcome.unwrap_err().to_string(),
      "Story ID or URL is required."
    );
  }

  #[tokio::test]
  async fn spawned_operation_hands_over_its_outcome() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_by_callback = seen.clone();

    spawn_with_callback(
      async { Err::<String, _>(PipelineError::validation("A message or reaction is required.")) },
      move |outcome| {
        seen_by_callback
          .lock()
          .unwrap()
          .push(outcome.map_err(|e| e.to_string()));
      },
    )
    .await
    .unwrap();

    assert_eq!(
      *seen.lock().unwrap(),
      vec![Err("A message or reaction is required.".to_string())]
    );
  }
}
