use std::{
    collections::VecDeque,
    ops::RangeInclusive,
    sync::{Mutex, MutexGuard, PoisonError},
};

use alloy::{
    eips::BlockNumberOrTag,
    primitives::{Address, B256, BlockNumber, Bytes, LogData, keccak256},
    rpc::types::Log,
};

use crate::{
    Error,
    rpc::{FinalizedBlockSource, LogsProvider},
    types::LogFilter,
};

/// Scripted in-memory chain answering log, block and finalized-block requests.
///
/// Every request is recorded, including the ones that fail, so tests can assert exactly what
/// a search sent. Failures are injected per request kind and consumed in order.
#[derive(Debug)]
pub struct MockChain {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    latest_block: BlockNumber,
    logs: Vec<Log>,
    finalized: VecDeque<BlockNumber>,
    log_failures: VecDeque<Error>,
    block_failures: VecDeque<Error>,
    finalized_failures: VecDeque<Error>,
    log_requests: Vec<RangeInclusive<BlockNumber>>,
    block_requests: Vec<BlockNumberOrTag>,
    finalized_requests: usize,
}

impl State {
    fn resolve(&self, block: BlockNumberOrTag) -> BlockNumber {
        match block {
            BlockNumberOrTag::Number(number) => number,
            BlockNumberOrTag::Earliest => 0,
            _ => self.latest_block,
        }
    }
}

impl MockChain {
    /// An empty chain whose `latest`, `safe`, `finalized` and `pending` tags all point at
    /// `latest_block`.
    #[must_use]
    pub fn new(latest_block: BlockNumber) -> Self {
        Self { state: Mutex::new(State { latest_block, ..State::default() }) }
    }

    /// Add a log at `block_number`, after the logs already in that block.
    #[must_use]
    pub fn with_log(self, block_number: BlockNumber, address: Address, topics: Vec<B256>) -> Self {
        self.push_log(block_number, address, topics);
        self
    }

    /// Add one log per block in `blocks`, all with the same address and topics.
    #[must_use]
    pub fn with_logs_in(
        self,
        blocks: impl IntoIterator<Item = BlockNumber>,
        address: Address,
        topics: &[B256],
    ) -> Self {
        for block_number in blocks {
            self.push_log(block_number, address, topics.to_vec());
        }
        self
    }

    /// Script the values returned by successive finalized-block reads. The last value repeats.
    #[must_use]
    pub fn with_finalized_sequence(self, values: impl IntoIterator<Item = BlockNumber>) -> Self {
        self.state().finalized = values.into_iter().collect();
        self
    }

    pub fn push_log(&self, block_number: BlockNumber, address: Address, topics: Vec<B256>) {
        let mut state = self.state();
        let log_index = state
            .logs
            .iter()
            .filter(|log| log.block_number == Some(block_number))
            .count() as u64;
        state.logs.push(mock_log(block_number, log_index, address, topics));
        state.logs.sort_by_key(|log| (log.block_number, log.log_index));
    }

    pub fn set_latest_block(&self, latest_block: BlockNumber) {
        self.state().latest_block = latest_block;
    }

    /// Fail the next `count` log requests with `error`.
    pub fn fail_next_log_requests(&self, count: usize, error: &Error) {
        self.state().log_failures.extend(std::iter::repeat_n(error.clone(), count));
    }

    /// Fail the next `count` block lookups with `error`.
    pub fn fail_next_block_requests(&self, count: usize, error: &Error) {
        self.state().block_failures.extend(std::iter::repeat_n(error.clone(), count));
    }

    /// Fail the next `count` finalized-block reads with `error`.
    pub fn fail_next_finalized_requests(&self, count: usize, error: &Error) {
        self.state().finalized_failures.extend(std::iter::repeat_n(error.clone(), count));
    }

    /// Block ranges of all log requests so far, tags resolved.
    #[must_use]
    pub fn log_requests(&self) -> Vec<RangeInclusive<BlockNumber>> {
        self.state().log_requests.clone()
    }

    #[must_use]
    pub fn block_requests(&self) -> Vec<BlockNumberOrTag> {
        self.state().block_requests.clone()
    }

    #[must_use]
    pub fn finalized_requests(&self) -> usize {
        self.state().finalized_requests
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LogsProvider for MockChain {
    async fn fetch_logs(&self, filter: &LogFilter) -> Result<Vec<Log>, Error> {
        let mut state = self.state();
        let range = state.resolve(filter.from_block)..=state.resolve(filter.to_block);
        state.log_requests.push(range.clone());
        if let Some(error) = state.log_failures.pop_front() {
            return Err(error);
        }

        Ok(state
            .logs
            .iter()
            .filter(|log| log.block_number.is_some_and(|number| range.contains(&number)))
            .filter(|log| filter.matches(log))
            .cloned()
            .collect())
    }

    async fn fetch_block_number(
        &self,
        block: BlockNumberOrTag,
    ) -> Result<Option<BlockNumber>, Error> {
        let mut state = self.state();
        state.block_requests.push(block);
        if let Some(error) = state.block_failures.pop_front() {
            return Err(error);
        }

        let number = state.resolve(block);
        Ok((number <= state.latest_block).then_some(number))
    }
}

impl FinalizedBlockSource for MockChain {
    async fn current_finalized_block_number(&self) -> Result<BlockNumber, Error> {
        let mut state = self.state();
        state.finalized_requests += 1;
        if let Some(error) = state.finalized_failures.pop_front() {
            return Err(error);
        }

        let value = if state.finalized.len() > 1 {
            state.finalized.pop_front()
        } else {
            state.finalized.front().copied()
        };
        value.ok_or_else(|| Error::invalid_argument("no finalized block scripted"))
    }
}

fn mock_log(block_number: BlockNumber, log_index: u64, address: Address, topics: Vec<B256>) -> Log {
    Log {
        inner: alloy::primitives::Log {
            address,
            data: LogData::new_unchecked(topics, Bytes::new()),
        },
        block_hash: Some(keccak256(format!("block:{block_number}"))),
        block_number: Some(block_number),
        transaction_hash: Some(keccak256(format!("{block_number}:{log_index}"))),
        transaction_index: Some(log_index),
        log_index: Some(log_index),
        ..Log::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const CONTRACT: Address = address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");

    #[tokio::test]
    async fn logs_are_ordered_and_indexed_per_block() -> anyhow::Result<()> {
        let chain = MockChain::new(20)
            .with_log(12, CONTRACT, vec![])
            .with_log(10, CONTRACT, vec![])
            .with_log(12, CONTRACT, vec![]);
        let filter = LogFilter::new(
            BlockNumberOrTag::Earliest,
            BlockNumberOrTag::Latest,
            CONTRACT,
            [],
        )?;

        let logs = chain.fetch_logs(&filter).await?;

        let positions: Vec<_> = logs.iter().map(|log| (log.block_number, log.log_index)).collect();
        assert_eq!(positions, vec![(Some(10), Some(0)), (Some(12), Some(0)), (Some(12), Some(1))]);
        assert_eq!(chain.log_requests(), vec![0..=20]);
        Ok(())
    }

    #[tokio::test]
    async fn finalized_sequence_repeats_last_value() -> anyhow::Result<()> {
        let chain = MockChain::new(0).with_finalized_sequence([4, 6]);

        assert_eq!(chain.current_finalized_block_number().await?, 4);
        assert_eq!(chain.current_finalized_block_number().await?, 6);
        assert_eq!(chain.current_finalized_block_number().await?, 6);
        assert_eq!(chain.finalized_requests(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn injected_failures_are_consumed_in_order() {
        let chain = MockChain::new(5);
        chain.fail_next_block_requests(1, &crate::test_utils::backend_gone());

        let first = chain.fetch_block_number(BlockNumberOrTag::Latest).await;
        let second = chain.fetch_block_number(BlockNumberOrTag::Latest).await;

        assert!(matches!(first, Err(Error::Transport(_))));
        assert!(matches!(second, Ok(Some(5))));
        assert_eq!(chain.block_requests().len(), 2);
    }
}
