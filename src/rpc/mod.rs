//! Boundary to the node.
//!
//! [`LogsProvider`] and [`FinalizedBlockSource`] describe the single-call accessors the searcher
//! and the poller are built on. Both are implemented for Alloy's [`RootProvider`]
//! (`eth_getLogs`, `eth_getBlockByNumber`) and for the rollup contract / `finalized` tag
//! sources, so any Alloy provider can be plugged in through [`IntoRootProvider`].
//!
//! None of the implementations retry; see [`crate::retry`].
//!
//! [`RootProvider`]: alloy::providers::RootProvider

mod conversion;
mod finalized;
mod provider;

pub use conversion::IntoRootProvider;
pub use finalized::{
    FinalizedBlockSource, FinalizedTagSource, RollupContractSource, currentL2BlockNumberCall,
};
pub use provider::LogsProvider;
