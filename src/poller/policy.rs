//! Polling configuration.

use std::collections::HashSet;
use std::time::Duration;

/// Configuration for one tracked long-running operation.
///
/// Which status codes are immediately terminal varies by the HTTP verb that
/// triggered the operation, so the per-verb constructors encode the usual
/// sets and the fields stay public for callers with unusual contracts.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use cloud_client_core::PollPolicy;
///
/// let policy = PollPolicy::delete()
///     .with_initial_retry_after(Duration::from_secs(2))
///     .with_overall_timeout(Duration::from_secs(120));
///
/// // Idempotent delete treats 404 as already-gone.
/// assert!(policy.terminal_success_codes.contains(&404));
/// ```
#[derive(Clone, Debug)]
pub struct PollPolicy {
    /// Wait between poll ticks when the server sends no `Retry-After`.
    pub initial_retry_after: Duration,
    /// Upper bound on any single wait, including server-supplied ones.
    pub max_retry_interval: Duration,
    /// Overall budget for the whole wait+poll loop.
    pub overall_timeout: Duration,
    /// Status codes on the trigger response that mean immediate success.
    pub terminal_success_codes: HashSet<u16>,
    /// Status codes that mean the operation failed outright.
    pub terminal_failure_codes: HashSet<u16>,
    /// Fetch the final payload from the origin resource URL after success
    /// instead of using the last poll body.
    pub result_from_origin: bool,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_retry_after: Duration::from_secs(5),
            max_retry_interval: Duration::from_secs(60),
            overall_timeout: Duration::from_secs(300),
            terminal_success_codes: [200, 201, 204].into(),
            terminal_failure_codes: HashSet::new(),
            result_from_origin: false,
        }
    }
}

impl PollPolicy {
    /// Policy for GET-triggered operations (existence checks, reads).
    #[must_use]
    pub fn get() -> Self {
        Self {
            terminal_success_codes: [200].into(),
            ..Self::default()
        }
    }

    /// Policy for PUT-triggered create-or-update operations.
    #[must_use]
    pub fn put() -> Self {
        Self {
            terminal_success_codes: [200, 201].into(),
            result_from_origin: true,
            ..Self::default()
        }
    }

    /// Policy for POST-triggered actions.
    #[must_use]
    pub fn post() -> Self {
        Self {
            terminal_success_codes: [200, 201, 204].into(),
            ..Self::default()
        }
    }

    /// Policy for DELETE-triggered operations.
    ///
    /// 404 counts as success: the resource is already gone, which is the
    /// outcome an idempotent delete asked for.
    #[must_use]
    pub fn delete() -> Self {
        Self {
            terminal_success_codes: [200, 204, 404].into(),
            ..Self::default()
        }
    }

    /// Sets the wait used when the server sends no `Retry-After`.
    #[must_use]
    pub const fn with_initial_retry_after(mut self, interval: Duration) -> Self {
        self.initial_retry_after = interval;
        self
    }

    /// Sets the cap applied to every wait interval.
    #[must_use]
    pub const fn with_max_retry_interval(mut self, interval: Duration) -> Self {
        self.max_retry_interval = interval;
        self
    }

    /// Sets the overall budget for the poll loop.
    #[must_use]
    pub const fn with_overall_timeout(mut self, timeout: Duration) -> Self {
        self.overall_timeout = timeout;
        self
    }

    /// Replaces the terminal failure code set.
    #[must_use]
    pub fn with_terminal_failure_codes(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.terminal_failure_codes = codes.into_iter().collect();
        self
    }

    /// Clamps a wait interval to the configured maximum.
    #[must_use]
    pub fn clamp_interval(&self, interval: Duration) -> Duration {
        interval.min(self.max_retry_interval)
    }
}
