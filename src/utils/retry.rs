use std::time::Duration;
use tracing::debug;

const DEFAULT_MAX_ATTEMPTS: usize = 3;
const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(3);

/// Bounded retry policy with an exponential component: after the failed attempt `i`
/// (starting at 0) the next one waits `base_delay + 2^i` seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(self, max_attempts: usize) -> Self {
        Self {
            max_attempts,
            ..self
        }
    }

    pub fn with_base_delay(self, base_delay: Duration) -> Self {
        Self { base_delay, ..self }
    }

    /// Wait time after the failed attempt number `attempt` (0-based).
    pub fn delay_after(&self, attempt: usize) -> Duration {
        let exponent = u32::try_from(attempt).unwrap_or(u32::MAX);
        let exponential = 2u64.checked_pow(exponent).unwrap_or(u64::MAX);
        self.base_delay.saturating_add(Duration::from_secs(exponential))
    }
}

/// Abstracts the wait between attempts so it can be replaced in tests.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

impl<S: Sleeper + ?Sized> Sleeper for &S {
    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration)
    }
}

/// Executes `f` until it succeeds or `policy.max_attempts` is reached, waiting between attempts
/// according to the policy. No wait happens after the last attempt.
/// Returns the first successful result or the error of the last attempt. A `max_attempts` of 0
/// still executes `f` once.
pub fn retry<F, T, E, S>(policy: &RetryPolicy, sleeper: &S, mut f: F) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
    E: std::fmt::Display,
    S: Sleeper + ?Sized,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        match f() {
            Ok(result) => return Ok(result),
            Err(err) if attempt + 1 >= max_attempts => return Err(err),
            Err(err) => {
                let delay = policy.delay_after(attempt);
                debug!(
                    "Attempt {} of {max_attempts} failed: {err}. Retrying in {}s",
                    attempt + 1,
                    delay.as_secs()
                );
                sleeper.sleep(delay);
                attempt += 1;
            }
        }
    }
}
