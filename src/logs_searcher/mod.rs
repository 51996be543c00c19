//! Fetching and locating event logs.
//!
//! [`LogsSearcher::get_logs`] is a retried `eth_getLogs`. [`LogsSearcher::find_log`] locates a
//! single log in a block range too large for one request: the range is split into chunks and a
//! caller supplied predicate steers a binary search over them, so only a logarithmic number of
//! chunks is ever fetched.
//!
//! ```rust,no_run
//! use alloy::{eips::BlockNumberOrTag, primitives::address, providers::RootProvider};
//! use ledger_scout::{LogsSearcherBuilder, SearchDirection};
//!
//! # async fn example() -> Result<(), ledger_scout::Error> {
//! let searcher =
//!     LogsSearcherBuilder::<RootProvider>::connect("http://localhost:8545").await?.build();
//! let message_number = 42;
//!
//! let log = searcher
//!     .find_log(
//!         BlockNumberOrTag::Earliest,
//!         BlockNumberOrTag::Latest,
//!         5_000,
//!         address!("0x5FbDB2315678afecb367f032d93F642f64180aa3"),
//!         &[],
//!         |log| {
//!             let number = log.topics.get(1).map_or(0, |topic| u64::from(topic[31]));
//!             match number.cmp(&message_number) {
//!                 std::cmp::Ordering::Less => Some(SearchDirection::Forward),
//!                 std::cmp::Ordering::Equal => None,
//!                 std::cmp::Ordering::Greater => Some(SearchDirection::Backward),
//!             }
//!         },
//!     )
//!     .await?;
//! # let _ = log;
//! # Ok(()) }
//! ```

mod builder;
mod chunks;
mod searcher;

pub use builder::{DEFAULT_SEARCH_BACKOFF_DELAY, LogsSearcherBuilder, LogsSearcherConfig};
pub use chunks::{ChunkPartition, Chunks};
pub use searcher::{EmptyChunkPolicy, LogsSearcher};
