use std::time::Duration;

use alloy::primitives::BlockNumber;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;

use crate::{
    Error,
    finality::StabilityObservation,
    retry::{RetryPolicy, retry, retry_until},
    rpc::FinalizedBlockSource,
};

/// Default pause between two readings of the finalized block.
pub const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_secs(2);
/// Default number of identical consecutive readings before a value is trusted.
pub const DEFAULT_CONSISTENT_OBSERVATIONS: u32 = 3;

/// Serializable settings of a [`FinalityPoller`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinalityPollerConfig {
    /// Identical readings in a row, the first reading included, required to trust a value.
    pub consistent_observations: u32,
    /// Upper bound for the number of readings after the first one. `None` polls until stable.
    pub max_attempts: Option<u32>,
    pub polling_interval: Duration,
    /// Applied to the first reading only; later readings are retried by the polling loop.
    pub request_retry: RetryPolicy,
}

impl Default for FinalityPollerConfig {
    fn default() -> Self {
        Self {
            consistent_observations: DEFAULT_CONSISTENT_OBSERVATIONS,
            max_attempts: None,
            polling_interval: DEFAULT_POLLING_INTERVAL,
            request_retry: RetryPolicy::default(),
        }
    }
}

/// Waits for the finalized block reported by a [`FinalizedBlockSource`] to settle.
///
/// This is a heuristic, not a finality guarantee: a value that was reported the same way
/// `consistent_observations` times in a row can still change afterwards.
#[derive(Clone, Debug)]
pub struct FinalityPoller<S> {
    source: S,
    config: FinalityPollerConfig,
}

impl<S: FinalizedBlockSource> FinalityPoller<S> {
    #[must_use]
    pub fn new(source: S) -> Self {
        Self { source, config: FinalityPollerConfig::default() }
    }

    /// Replace all settings at once.
    #[must_use]
    pub fn config(mut self, config: FinalityPollerConfig) -> Self {
        self.config = config;
        self
    }

    /// Default is [`DEFAULT_CONSISTENT_OBSERVATIONS`].
    #[must_use]
    pub fn consistent_observations(mut self, consistent_observations: u32) -> Self {
        self.config.consistent_observations = consistent_observations;
        self
    }

    /// Limit the number of readings after the first one.
    #[must_use]
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.config.max_attempts = Some(max_attempts);
        self
    }

    /// Default is [`DEFAULT_POLLING_INTERVAL`].
    #[must_use]
    pub fn polling_interval(mut self, polling_interval: Duration) -> Self {
        self.config.polling_interval = polling_interval;
        self
    }

    /// Set the retry policy of the first reading.
    #[must_use]
    pub fn request_retry(mut self, policy: RetryPolicy) -> Self {
        self.config.request_retry = policy;
        self
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    #[must_use]
    pub fn settings(&self) -> &FinalityPollerConfig {
        &self.config
    }

    /// Poll the source until the same block number was read `consistent_observations` times in
    /// a row, and return it.
    ///
    /// Readings are `polling_interval` apart. A failed reading is retried on the next tick and
    /// leaves the current streak intact. With unlimited attempts this only returns once the
    /// value settles; drop the future to give up.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidArgument`] if `consistent_observations` is zero.
    /// * [`Error::RetryExhausted`] if `max_attempts` readings did not settle the value.
    /// * Any error of the first reading that outlived its request retry policy.
    /// * Any non-retryable error of a later reading.
    pub async fn get_last_finalized_block(&self) -> Result<BlockNumber, Error> {
        let FinalityPollerConfig {
            consistent_observations: required,
            max_attempts,
            polling_interval,
            request_retry,
        } = self.config;
        if required == 0 {
            return Err(Error::invalid_argument("consistent_observations must be at least 1"));
        }

        let source = &self.source;
        let seed = retry(&request_retry, move || source.current_finalized_block_number()).await?;
        debug!(block_number = seed, required = required, "Seeded finalized block observation");
        if required == 1 {
            return Ok(seed);
        }

        let mut observation = StabilityObservation::new(seed);
        let policy = RetryPolicy {
            backoff_delay: polling_interval,
            max_attempts,
            ..RetryPolicy::default()
        };

        sleep(polling_interval).await;
        let block_number = retry_until(
            &policy,
            move || source.current_finalized_block_number(),
            |outcome| match outcome {
                Ok(value) => observation.observe(*value, required),
                Err(error) => !error.is_retryable(),
            },
        )
        .await?;

        info!(block_number = block_number, observations = required, "Finalized block settled");
        Ok(block_number)
    }
}
