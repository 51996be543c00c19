use std::time::Duration;

use alloy::{network::Network, providers::RootProvider};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    logs_searcher::{EmptyChunkPolicy, LogsSearcher},
    retry::RetryPolicy,
    rpc::{IntoRootProvider, LogsProvider},
};

/// Default pause between two steps of a range search.
pub const DEFAULT_SEARCH_BACKOFF_DELAY: Duration = Duration::from_millis(100);

/// Serializable settings of a [`LogsSearcher`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogsSearcherConfig {
    pub search_backoff_delay: Duration,
    /// Applied to every single `eth_getLogs` and block lookup.
    pub request_retry: RetryPolicy,
    pub empty_chunk_policy: EmptyChunkPolicy,
}

impl Default for LogsSearcherConfig {
    fn default() -> Self {
        Self {
            search_backoff_delay: DEFAULT_SEARCH_BACKOFF_DELAY,
            request_retry: RetryPolicy::default(),
            empty_chunk_policy: EmptyChunkPolicy::default(),
        }
    }
}

/// Builder for a [`LogsSearcher`].
#[derive(Clone, Debug)]
pub struct LogsSearcherBuilder<P> {
    provider: P,
    config: LogsSearcherConfig,
}

impl<P: LogsProvider> LogsSearcherBuilder<P> {
    #[must_use]
    pub fn new(provider: P) -> Self {
        Self { provider, config: LogsSearcherConfig::default() }
    }

    /// Replace all settings at once.
    #[must_use]
    pub fn config(mut self, config: LogsSearcherConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the pause between two steps of a range search.
    ///
    /// Default is [`DEFAULT_SEARCH_BACKOFF_DELAY`].
    #[must_use]
    pub fn search_backoff_delay(mut self, delay: Duration) -> Self {
        self.config.search_backoff_delay = delay;
        self
    }

    /// Set the retry policy of single requests.
    ///
    /// Pass [`RetryPolicy::disabled`] to send every request once and surface its error as is.
    #[must_use]
    pub fn request_retry(mut self, policy: RetryPolicy) -> Self {
        self.config.request_retry = policy;
        self
    }

    /// Set what a range search does with a chunk without logs.
    #[must_use]
    pub fn empty_chunk_policy(mut self, policy: EmptyChunkPolicy) -> Self {
        self.config.empty_chunk_policy = policy;
        self
    }

    #[must_use]
    pub fn build(self) -> LogsSearcher<P> {
        let LogsSearcherConfig { search_backoff_delay, request_retry, empty_chunk_policy } =
            self.config;
        debug!(
            search_backoff_ms = search_backoff_delay.as_millis(),
            request_retry_enabled = request_retry.enabled,
            request_max_attempts = ?request_retry.max_attempts,
            empty_chunk_policy = ?empty_chunk_policy,
            "Building LogsSearcher"
        );
        LogsSearcher {
            provider: self.provider,
            search_backoff_delay,
            request_retry,
            empty_chunk_policy,
        }
    }
}

impl<N: Network> LogsSearcherBuilder<RootProvider<N>> {
    /// Start building a searcher for anything convertible into a [`RootProvider`].
    ///
    /// # Errors
    ///
    /// Returns an error if `provider` is a connection string that cannot be connected.
    pub async fn connect(provider: impl IntoRootProvider<N>) -> Result<Self, Error> {
        Ok(Self::new(provider.into_root_provider().await?))
    }
}
