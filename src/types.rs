use alloy::{
    eips::BlockNumberOrTag,
    primitives::{Address, B256, BlockNumber, Bytes},
    rpc::types::{Filter, Log},
};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Maximum number of indexed topic positions an EVM log can carry.
pub const MAX_TOPICS: usize = 4;

/// Which half of the remaining search space a search should continue into.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchDirection {
    /// Continue towards higher block numbers.
    Forward,
    /// Continue towards lower block numbers.
    Backward,
}

/// Result of evaluating one chunk of a range search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(LogEntry),
    Continue(SearchDirection),
}

/// A mined event log.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LogEntry {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    pub block_number: BlockNumber,
    pub block_hash: Option<B256>,
    pub transaction_hash: B256,
    pub log_index: u64,
    /// Set when the log was dropped by a chain reorganization.
    pub removed: bool,
}

impl TryFrom<Log> for LogEntry {
    type Error = Error;

    fn try_from(log: Log) -> Result<Self, Self::Error> {
        let missing = |field: &str| {
            let message = format!("log is missing {field}, pending logs are not supported");
            Error::InvalidResponse(message)
        };

        Ok(LogEntry {
            block_number: log.block_number.ok_or_else(|| missing("blockNumber"))?,
            transaction_hash: log.transaction_hash.ok_or_else(|| missing("transactionHash"))?,
            log_index: log.log_index.ok_or_else(|| missing("logIndex"))?,
            block_hash: log.block_hash,
            removed: log.removed,
            address: log.inner.address,
            topics: log.inner.data.topics().to_vec(),
            data: log.inner.data.data,
        })
    }
}

/// An `eth_getLogs` filter over a single contract address.
///
/// Every topic position is either a concrete hash or `None`, which matches any value. Positions
/// are ANDed together.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogFilter {
    pub from_block: BlockNumberOrTag,
    pub to_block: BlockNumberOrTag,
    pub address: Address,
    pub topics: Vec<Option<B256>>,
}

impl LogFilter {
    /// Build a filter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if more than [`MAX_TOPICS`] topic positions are given,
    /// or if both bounds are block numbers and `from_block` is above `to_block`.
    pub fn new(
        from_block: BlockNumberOrTag,
        to_block: BlockNumberOrTag,
        address: Address,
        topics: impl IntoIterator<Item = Option<B256>>,
    ) -> Result<Self, Error> {
        if let (BlockNumberOrTag::Number(from), BlockNumberOrTag::Number(to)) =
            (from_block, to_block)
            && from > to
        {
            return Err(Error::invalid_argument(format!(
                "from_block={from} is greater than to_block={to}"
            )));
        }
        let topics: Vec<_> = topics.into_iter().collect();
        if topics.len() > MAX_TOPICS {
            return Err(Error::invalid_argument(format!(
                "{} topic positions given, at most {MAX_TOPICS} are supported",
                topics.len()
            )));
        }
        Ok(Self { from_block, to_block, address, topics })
    }

    /// Whether `log` passes the address and topic constraints. Block bounds are not checked.
    #[must_use]
    pub fn matches(&self, log: &Log) -> bool {
        if log.inner.address != self.address {
            return false;
        }
        let log_topics = log.inner.data.topics();
        self.topics.iter().enumerate().all(|(position, expected)| match expected {
            None => true,
            Some(topic) => log_topics.get(position) == Some(topic),
        })
    }
}

impl From<&LogFilter> for Filter {
    fn from(value: &LogFilter) -> Self {
        let mut filter = Filter::new()
            .from_block(value.from_block)
            .to_block(value.to_block)
            .address(value.address);
        for (position, topic) in value.topics.iter().enumerate() {
            if let Some(topic) = topic {
                filter.topics[position] = (*topic).into();
            }
        }
        filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{LogData, address, b256};

    const CONTRACT: Address = address!("0x5fbdb2315678afecb367f032d93f642f64180aa3");
    const TRANSFER: B256 =
        b256!("0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef");
    const SENDER: B256 =
        b256!("0x000000000000000000000000f39fd6e51aad88f6f4ce6ab8827279cfffb92266");

    fn rpc_log(topics: Vec<B256>) -> Log {
        Log {
            inner: alloy::primitives::Log {
                address: CONTRACT,
                data: LogData::new_unchecked(topics, Bytes::from_static(b"\x01")),
            },
            block_number: Some(42),
            transaction_hash: Some(B256::repeat_byte(7)),
            log_index: Some(3),
            ..Default::default()
        }
    }

    #[test]
    fn converts_mined_log() -> anyhow::Result<()> {
        let entry = LogEntry::try_from(rpc_log(vec![TRANSFER, SENDER]))?;

        assert_eq!(entry.address, CONTRACT);
        assert_eq!(entry.topics, vec![TRANSFER, SENDER]);
        assert_eq!(entry.block_number, 42);
        assert_eq!(entry.log_index, 3);
        assert_eq!(entry.data, Bytes::from_static(b"\x01"));
        assert!(!entry.removed);
        Ok(())
    }

    #[test]
    fn rejects_pending_log() {
        let mut log = rpc_log(vec![TRANSFER]);
        log.block_number = None;

        let err = LogEntry::try_from(log).unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(_)));
    }

    #[test]
    fn wildcard_topics_match_any_value() -> anyhow::Result<()> {
        let log = rpc_log(vec![TRANSFER, SENDER]);
        let latest = BlockNumberOrTag::Latest;

        let filter = LogFilter::new(latest, latest, CONTRACT, [None, Some(SENDER)])?;
        assert!(filter.matches(&log));

        let filter = LogFilter::new(latest, latest, CONTRACT, [Some(SENDER)])?;
        assert!(!filter.matches(&log));

        let topics = [Some(TRANSFER), None, Some(SENDER)];
        let filter = LogFilter::new(latest, latest, CONTRACT, topics)?;
        assert!(!filter.matches(&log), "log has no third topic");

        let filter = LogFilter::new(latest, latest, Address::ZERO, [])?;
        assert!(!filter.matches(&log));
        Ok(())
    }

    #[test]
    fn too_many_topics_rejected() {
        let latest = BlockNumberOrTag::Latest;
        let err = LogFilter::new(latest, latest, CONTRACT, [None; 5]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn inverted_numeric_range_rejected() -> anyhow::Result<()> {
        let (from, to) = (BlockNumberOrTag::Number(20), BlockNumberOrTag::Number(10));
        let err = LogFilter::new(from, to, CONTRACT, []).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        // tags are only resolved by the node
        LogFilter::new(BlockNumberOrTag::Latest, BlockNumberOrTag::Number(10), CONTRACT, [])?;
        LogFilter::new(BlockNumberOrTag::Number(10), BlockNumberOrTag::Number(10), CONTRACT, [])?;
        Ok(())
    }

    #[test]
    fn converts_to_rpc_filter() -> anyhow::Result<()> {
        let filter = LogFilter::new(
            BlockNumberOrTag::Number(10),
            BlockNumberOrTag::Number(20),
            CONTRACT,
            [None, Some(SENDER)],
        )?;

        let filter = Filter::from(&filter);

        assert_eq!(filter.get_from_block(), Some(10));
        assert_eq!(filter.get_to_block(), Some(20));
        assert!(filter.topics[0].is_empty());
        assert!(filter.topics[1].matches(&SENDER));
        assert!(!filter.topics[1].matches(&TRANSFER));
        Ok(())
    }
}
