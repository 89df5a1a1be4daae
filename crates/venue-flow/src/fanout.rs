//! Bounded concurrent fan-out with a fan-in barrier.
//!
//! One task per item, at most `max_concurrent` running at once, each with
//! an optional time limit. The call returns only after every task has
//! finished, failed, timed out or panicked. Outcomes come back in input
//! order; nothing shared is mutated by the tasks.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

/// Limits for one fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanOutConfig {
    pub max_concurrent: usize,
    /// Measured from when the item acquires its slot.
    pub item_timeout: Option<Duration>,
}

impl Default for FanOutConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            item_timeout: None,
        }
    }
}

/// Why one item produced no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemFailure {
    Error(String),
    TimedOut(Duration),
    Panicked(String),
}

impl Display for ItemFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemFailure::Error(e) => write!(f, "{e}"),
            ItemFailure::TimedOut(limit) => write!(f, "timed out after {limit:?}"),
            ItemFailure::Panicked(e) => write!(f, "task panicked: {e}"),
        }
    }
}

pub type ItemOutcome<T> = std::result::Result<T, ItemFailure>;

/// Run `work` over `items` and gather every outcome.
pub async fn gather_bounded<I, T, E, F, Fut>(
    items: Vec<I>,
    config: FanOutConfig,
    work: F,
) -> Vec<ItemOutcome<T>>
where
    I: Send + 'static,
    T: Send + 'static,
    E: Display + Send + 'static,
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<T, E>> + Send + 'static,
{
    let work = Arc::new(work);
    let sem = Arc::new(Semaphore::new(config.max_concurrent.max(1)));

    let mut tasks = Vec::with_capacity(items.len());
    for item in items {
        let work = Arc::clone(&work);
        let sem = Arc::clone(&sem);

        tasks.push(tokio::spawn(async move {
            let _permit = sem.acquire_owned().await.ok();
            let fut = work(item);
            match config.item_timeout {
                Some(limit) => match tokio::time::timeout(limit, fut).await {
                    Ok(result) => result.map_err(|e| ItemFailure::Error(e.to_string())),
                    Err(_) => Err(ItemFailure::TimedOut(limit)),
                },
                None => fut.await.map_err(|e| ItemFailure::Error(e.to_string())),
            }
        }));
    }

    futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|joined| match joined {
            Ok(outcome) => outcome,
            Err(e) => Err(ItemFailure::Panicked(e.to_string())),
        })
        .collect()
}
