use std::time::Duration;

use backon::{BackoffBuilder, ConstantBackoff, ConstantBuilder};
use serde::{Deserialize, Serialize};

/// Default delay between two attempts.
pub const DEFAULT_BACKOFF_DELAY: Duration = Duration::from_millis(100);

/// How the retry engine drives an operation.
///
/// The default policy retries forever, waiting [`DEFAULT_BACKOFF_DELAY`] between attempts, with
/// no overall timeout.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Pause between the end of one attempt and the start of the next.
    pub backoff_delay: Duration,
    /// Upper bound for the whole retry sequence, attempts and pauses included.
    pub timeout: Option<Duration>,
    /// Upper bound for the number of invocations. `None` means unlimited.
    pub max_attempts: Option<u32>,
    /// When `false` the operation runs exactly once and its result is returned unchanged.
    pub enabled: bool,
    /// Add a random extra delay of up to `backoff_delay` to every pause.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            backoff_delay: DEFAULT_BACKOFF_DELAY,
            timeout: None,
            max_attempts: None,
            enabled: true,
            jitter: false,
        }
    }
}

impl RetryPolicy {
    /// Retry until the stop condition holds, waiting `backoff_delay` between attempts.
    #[must_use]
    pub fn unlimited(backoff_delay: Duration) -> Self {
        Self { backoff_delay, ..Self::default() }
    }

    /// A policy that runs the operation a single time.
    #[must_use]
    pub fn disabled() -> Self {
        Self { enabled: false, ..Self::default() }
    }

    #[must_use]
    pub fn with_backoff_delay(mut self, backoff_delay: Duration) -> Self {
        self.backoff_delay = backoff_delay;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Delay schedule between attempts. The attempt budget is enforced by the engine, so the
    /// schedule itself never runs dry.
    pub(crate) fn backoff(&self) -> ConstantBackoff {
        let builder =
            ConstantBuilder::default().with_delay(self.backoff_delay).with_max_times(usize::MAX);
        if self.jitter { builder.with_jitter().build() } else { builder.build() }
    }
}
