use std::future::Future;
use std::time::Duration;

use rand::Rng;

pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff_factor: f64,
    pub jitter_fraction: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            backoff_factor: 2.0,
            jitter_fraction: 0.0,
        }
    }
}

impl RetryConfig {
    pub fn with_max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n.max(1);
        self
    }

    fn jittered(&self, delay: Duration) -> Duration {
        if self.jitter_fraction <= 0.0 {
            return delay;
        }
        let spread = delay.as_secs_f64() * self.jitter_fraction.clamp(0.0, 1.0);
        let offset = rand::thread_rng().gen_range(0.0..=spread);
        Duration::from_secs_f64(delay.as_secs_f64() + offset)
    }
}

/// Run `f` until it succeeds, retrying only errors `is_retryable` accepts.
/// Returns the last error once `max_attempts` is exhausted.
pub async fn retry_async<F, Fut, T, E, P>(
    config: &RetryConfig,
    what: &str,
    is_retryable: P,
    mut f: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let mut delay = config.initial_delay;
    let mut attempt = 1;

    loop {
        match f().await {
            Ok(v) => return Ok(v),
            Err(e) if attempt < config.max_attempts && is_retryable(&e) => {
                let wait = config.jittered(delay);
                tracing::warn!(
                    attempt,
                    max_attempts = config.max_attempts,
                    error = %e,
                    wait_ms = wait.as_millis() as u64,
                    "{what} failed, retrying"
                );
                tokio::time::sleep(wait).await;
                delay = Duration::from_secs_f64(delay.as_secs_f64() * config.backoff_factor);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            initial_delay: Duration::from_millis(1),
            backoff_factor: 1.0,
            jitter_fraction: 0.0,
        }
    }

    #[tokio::test]
    async fn succeeds_on_first_try() {
        let result = retry_async(&RetryConfig::default(), "op", |_: &&str| true, || async {
            Ok::<_, &str>(42)
        })
        .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn succeeds_after_retries() {
        let counter = AtomicU32::new(0);
        let result: Result<u32, &str> = retry_async(&fast(3), "op", |_| true, || {
            let attempt = counter.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if attempt < 3 {
                    Err("not yet")
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 3);
    }

    #[tokio::test]
    async fn fails_after_max_attempts() {
        let counter = AtomicU32::new(0);
        let result: Result<(), &str> = retry_async(&fast(2), "op", |_| true, || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err("always fails") }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let counter = AtomicU32::new(0);
        let result: Result<(), &str> = retry_async(&fast(5), "op", |e| *e != "fatal", || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err("fatal") }
        })
        .await;
        assert_eq!(result.unwrap_err(), "fatal");
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn jitter_never_shortens_delay() {
        let config = RetryConfig {
            jitter_fraction: 0.5,
            ..Default::default()
        };
        for _ in 0..50 {
            let d = config.jittered(Duration::from_millis(100));
            assert!(d >= Duration::from_millis(100));
            assert!(d <= Duration::from_millis(151));
        }
    }
}
