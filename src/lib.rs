//! Ledger-Scout finds event logs and finalized blocks on EVM chains over plain JSON-RPC.
//!
//! It has three parts:
//!
//! - [`LogsSearcher::find_log`] locates one log in a block range too large for a single
//!   `eth_getLogs` request. The range is split into chunks and a caller supplied predicate steers a
//!   binary search over them. [`LogsSearcher::get_logs`] is the plain retried fetch.
//! - [`FinalityPoller`] reads a finalized block number until it has been reported the same way a
//!   configured number of times in a row. This is a heuristic, not a finality proof.
//! - The [`retry`] module drives both: a generic async retry loop with a stop condition, a fixed
//!   backoff delay, an attempt budget and an overall timeout.
//!
//! # Errors
//!
//! Everything returns [`Error`]. Transport and node errors are retried internally; callers only
//! see them wrapped in [`Error::RetryExhausted`], or as is when retrying is disabled.
//!
//! # Node access
//!
//! Requests go through the [`rpc::LogsProvider`] and [`rpc::FinalizedBlockSource`] traits,
//! implemented for Alloy's [`RootProvider`](alloy::providers::RootProvider). Block parameters are
//! passed with every request, so one provider can serve any number of concurrent searches.

#[macro_use]
mod logging;

pub mod finality;
pub mod logs_searcher;
pub mod retry;
pub mod rpc;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

mod error;
mod types;

pub use error::{Error, LastOutcome};
pub use types::{LogEntry, LogFilter, MAX_TOPICS, SearchDirection, SearchOutcome};

pub use finality::{FinalityPoller, FinalityPollerConfig, StabilityObservation};
pub use logs_searcher::{
    DEFAULT_SEARCH_BACKOFF_DELAY, EmptyChunkPolicy, LogsSearcher, LogsSearcherBuilder,
    LogsSearcherConfig,
};
pub use retry::RetryPolicy;
