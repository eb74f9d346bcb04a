use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::error::{RetryPolicy, RetryState};

/// A single logical request: a URL plus any method-specific payload is left
/// to the caller via the `exec` closure passed to [`fetch`]; this struct only
/// tracks per-key retry accounting.
#[derive(Debug, Clone)]
pub struct FetchRequest<K> {
    pub key: K,
    pub attempts: u32,
}

impl<K> FetchRequest<K> {
    pub fn new(key: K) -> Self {
        Self { key, attempts: 0 }
    }
}

/// Runs `keys` through `exec` with bounded concurrency and additive backoff,
/// returning a map from key to the first successful response (or `None` if
/// the key exhausted `policy.max_attempts`).
///
/// `exec` is called once per attempt and returns `Ok(response)` on success or
/// `Err(())` on any transient failure (non-2xx, transport error) — the queue
/// itself doesn't interpret the failure, it only counts and requeues it,
/// matching `multi_http_request`'s `return_exceptions=True` + truthiness check.
pub async fn fetch<K, R, F, Fut>(
    keys: Vec<K>,
    concurrency: usize,
    policy: &RetryPolicy,
    exec: F,
) -> HashMap<K, Option<R>>
where
    K: Eq + Hash + Clone + Send + 'static,
    R: Send + 'static,
    F: Fn(K) -> Fut + Clone + Send + 'static,
    Fut: Future<Output = Result<R, ()>> + Send,
{
    let mut results: HashMap<K, Option<R>> = HashMap::new();
    let mut pending: VecDeque<FetchRequest<K>> =
        keys.into_iter().map(FetchRequest::new).collect();
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut retry_state = RetryState::new();

    while !pending.is_empty() {
        if retry_state.wait_time_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(retry_state.wait_time_ms)).await;
        }

        let round: Vec<FetchRequest<K>> = pending.drain(..).collect();
        let mut join_set: JoinSet<(K, u32, Result<R, ()>)> = JoinSet::new();

        for req in round {
            let sem = semaphore.clone();
            let exec = exec.clone();
            join_set.spawn(async move {
                let _permit = sem.acquire_owned().await.expect("semaphore not closed");
                let outcome = exec(req.key.clone()).await;
                (req.key, req.attempts, outcome)
            });
        }

        let mut failures_this_round = 0u32;
        while let Some(joined) = join_set.join_next().await {
            let (key, attempts, outcome) = match joined {
                Ok(v) => v,
                Err(_) => continue, // task panicked; treat as dropped, not retried
            };
            match outcome {
                Ok(response) => {
                    results.insert(key, Some(response));
                }
                Err(()) => {
                    failures_this_round += 1;
                    let next_attempts = attempts + 1;
                    if policy.should_retry(next_attempts) {
                        pending.push_back(FetchRequest {
                            key,
                            attempts: next_attempts,
                        });
                    } else {
                        results.insert(key, None);
                    }
                }
            }
        }

        retry_state.record_round(policy, failures_this_round);
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn all_keys_eventually_resolved() {
        let policy = RetryPolicy {
            wait_unit_ms: 1,
            max_attempts: 5,
        };
        let results = fetch(
            vec![1, 2, 3],
            2,
            &policy,
            |k: i32| async move { Ok::<i32, ()>(k * 10) },
        )
        .await;
        assert_eq!(results.len(), 3);
        assert_eq!(results[&1], Some(10));
        assert_eq!(results[&2], Some(20));
        assert_eq!(results[&3], Some(30));
    }

    #[tokio::test]
    async fn key_exhausting_retries_resolves_to_none() {
        let policy = RetryPolicy {
            wait_unit_ms: 1,
            max_attempts: 2,
        };
        let results = fetch(
            vec![1],
            1,
            &policy,
            |_k: i32| async move { Err::<i32, ()>(()) },
        )
        .await;
        assert_eq!(results[&1], None);
    }

    #[tokio::test]
    async fn transient_failure_is_retried_then_succeeds() {
        let policy = RetryPolicy {
            wait_unit_ms: 1,
            max_attempts: 5,
        };
        let call_count = Arc::new(AtomicU32::new(0));
        let counter = call_count.clone();
        let results = fetch(vec![7], 1, &policy, move |k: i32| {
            let counter = counter.clone();
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(())
                } else {
                    Ok(k)
                }
            }
        })
        .await;
        assert_eq!(results[&7], Some(7));
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn respects_concurrency_bound() {
        let policy = RetryPolicy::default();
        let in_flight = Arc::new(AtomicU32::new(0));
        let max_observed = Arc::new(AtomicU32::new(0));
        let keys: Vec<i32> = (0..20).collect();
        let inf = in_flight.clone();
        let maxo = max_observed.clone();
        fetch(keys, 3, &policy, move |k: i32| {
            let inf = inf.clone();
            let maxo = maxo.clone();
            async move {
                let cur = inf.fetch_add(1, Ordering::SeqCst) + 1;
                maxo.fetch_max(cur, Ordering::SeqCst);
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                inf.fetch_sub(1, Ordering::SeqCst);
                Ok::<i32, ()>(k)
            }
        })
        .await;
        assert!(max_observed.load(Ordering::SeqCst) <= 3);
    }
}
