#![allow(dead_code)]

use std::cmp::Ordering;

use alloy::primitives::{Address, B256, BlockNumber, address, b256};
use ledger_scout::{
    LogEntry, SearchDirection,
    test_utils::{MockChain, topic, topic_value},
};

pub const CONTRACT: Address = address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");
pub const OTHER_CONTRACT: Address = address!("0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512");

/// Stand-in signature topic of `MessageSent(uint256 indexed number)`.
pub const MESSAGE_SENT: B256 =
    b256!("0x8b3d1a3f5c3fb7c7a6a4e1f4d0fc7d0e5c0e1b0ad8c5a7c1d7a6b2e4f5c3d2e1");
/// Stand-in signature topic of `Heartbeat()`.
pub const HEARTBEAT: B256 =
    b256!("0x2f7a1c4be8d6f3a90c5e7b1d4a6f8c2e0b3d5f7a9c1e3b5d7f9a1c3e5b7d9f1a");

/// One `MessageSent` per block in `blocks`, numbered by the block it was mined in.
pub fn message_chain(
    latest_block: BlockNumber,
    blocks: impl IntoIterator<Item = u64>,
) -> MockChain {
    let chain = MockChain::new(latest_block);
    for block_number in blocks {
        chain.push_log(block_number, CONTRACT, vec![MESSAGE_SENT, topic(block_number)]);
    }
    chain
}

pub fn message_number(log: &LogEntry) -> u64 {
    log.topics.get(1).map_or(0, topic_value)
}

/// Steers a search towards the message numbered `target`.
pub fn towards(target: u64) -> impl Fn(&LogEntry) -> Option<SearchDirection> {
    move |log| match message_number(log).cmp(&target) {
        Ordering::Less => Some(SearchDirection::Forward),
        Ordering::Equal => None,
        Ordering::Greater => Some(SearchDirection::Backward),
    }
}
