//! Waiting for a finalized block number to settle.
//!
//! Sources such as a rollup contract's `currentL2BlockNumber()` can report a value and then
//! revise it. [`FinalityPoller`] reads the source repeatedly and only returns a block number once
//! it has been reported the same way a configured number of times in a row.

mod observation;
mod poller;

pub use observation::StabilityObservation;
pub use poller::{
    DEFAULT_CONSISTENT_OBSERVATIONS, DEFAULT_POLLING_INTERVAL, FinalityPoller,
    FinalityPollerConfig,
};
