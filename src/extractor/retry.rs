use std::time::Duration;

use backoff::backoff::Backoff;

/// A backoff policy that allows exactly `max_attempts` tries with the same
/// delay between each of them.
#[derive(Debug, Clone)]
pub struct FixedAttempts {
    max_attempts: usize,
    delay: Duration,
    retries_left: usize,
}

impl FixedAttempts {
    /// Allows `max_attempts` tries, waiting `delay` before each retry.
    pub fn new(max_attempts: usize, delay: Duration) -> Self {
        Self { max_attempts, delay, retries_left: max_attempts.saturating_sub(1) }
    }
}

impl Backoff for FixedAttempts {
    fn reset(&mut self) {
        self.retries_left = self.max_attempts.saturating_sub(1);
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        if self.retries_left == 0 {
            return None;
        }
        self.retries_left -= 1;
        Some(self.delay)
    }
}
