//! Generic retry engine.
//!
//! [`retry_until`] drives an async operation until a caller supplied stop condition accepts one
//! of its outcomes, the attempt budget of the [`RetryPolicy`] runs out, or the policy timeout
//! elapses. It knows nothing about logs or blocks: the logs searcher uses it both for single
//! RPC requests and as the loop of its binary search, and the finality poller uses it as its
//! polling loop.
//!
//! ```rust
//! use std::time::Duration;
//!
//! use ledger_scout::retry::{RetryPolicy, retry_until};
//!
//! # async fn example() -> Result<(), ledger_scout::Error> {
//! let policy = RetryPolicy::unlimited(Duration::from_millis(10)).with_max_attempts(5);
//! let mut polls = 0;
//! let value = retry_until(
//!     &policy,
//!     || {
//!         polls += 1;
//!         std::future::ready(Ok(polls))
//!     },
//!     |outcome| matches!(outcome, Ok(value) if *value >= 3),
//! )
//! .await?;
//! assert_eq!(value, 3);
//! # Ok(()) }
//! ```

mod engine;
mod policy;

pub use engine::{retry, retry_until};
pub use policy::{DEFAULT_BACKOFF_DELAY, RetryPolicy};
