use std::{
    ops::RangeInclusive,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use alloy::{
    eips::BlockNumberOrTag,
    primitives::{Address, B256, BlockNumber},
};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    logs_searcher::{ChunkPartition, LogsSearcherBuilder},
    retry::{RetryPolicy, retry, retry_until},
    rpc::LogsProvider,
    types::{LogEntry, LogFilter, MAX_TOPICS, SearchDirection, SearchOutcome},
};

/// What a range search does with a chunk that contains no logs at all.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmptyChunkPolicy {
    /// Fail the search with [`Error::EmptyChunk`].
    #[default]
    Fail,
    /// Continue the search in the given direction.
    Continue(SearchDirection),
}

/// Finds logs on a node, either with a plain filtered fetch or with a directional range search.
///
/// Built with [`LogsSearcherBuilder`]. Requests go through the configured request
/// [`RetryPolicy`]; the provider is only ever read, so one searcher can serve concurrent
/// searches.
#[derive(Clone, Debug)]
pub struct LogsSearcher<P> {
    pub(crate) provider: P,
    pub(crate) search_backoff_delay: Duration,
    pub(crate) request_retry: RetryPolicy,
    pub(crate) empty_chunk_policy: EmptyChunkPolicy,
}

impl<P: LogsProvider> LogsSearcher<P> {
    /// Start building a searcher on top of `provider`.
    #[must_use]
    pub fn builder(provider: P) -> LogsSearcherBuilder<P> {
        LogsSearcherBuilder::new(provider)
    }

    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Fetch all logs of `address` matching `topics` between `from` and `to`, inclusive.
    ///
    /// Block tags are passed to the node as is. A `None` topic matches any value at its
    /// position. With the request policy enabled the fetch is retried; otherwise it is sent
    /// once.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidArgument`] for more than four topic positions, or for numeric bounds
    ///   with `from` above `to`. Nothing is sent in that case.
    /// * [`Error::RetryExhausted`] or [`Error::RetryTimeout`] when retries run out.
    /// * The request error itself when retrying is disabled.
    pub async fn get_logs(
        &self,
        from: BlockNumberOrTag,
        to: BlockNumberOrTag,
        address: Address,
        topics: &[Option<B256>],
    ) -> Result<Vec<LogEntry>, Error> {
        let filter = LogFilter::new(from, to, address, topics.iter().copied())?;
        let provider = &self.provider;
        let filter = &filter;

        let result = retry(&self.request_retry, move || async move {
            provider
                .fetch_logs(filter)
                .await?
                .into_iter()
                .map(LogEntry::try_from)
                .collect::<Result<Vec<_>, _>>()
        })
        .await;

        if let Err(e) = &result {
            error!(error = %e, "eth_getLogs failed");
        }
        result
    }

    /// Locate the log `predicate` identifies as the target, by binary search over chunks.
    ///
    /// `from..=to` is split into chunks of `chunk_size` blocks. Starting from the middle chunk,
    /// the logs of a chunk are handed to `predicate` in the order the node returned them.
    /// `predicate` returns `None` for the log being searched for, which ends the search.
    /// Otherwise the direction it gives for the chunk's first log tells the search which half
    /// of the remaining chunks to continue with.
    ///
    /// The predicate must be monotonic along the block axis: all logs before the target point
    /// `Forward`, all logs after it point `Backward`. Other predicates still terminate, but the
    /// result is unspecified. At most `log2(chunks) + 1` chunks are fetched.
    ///
    /// Returns `Ok(None)` when the search space is exhausted without a match.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidArgument`] for a zero `chunk_size`, more than four topics or a `from`
    ///   that resolves above `to`.
    /// * [`Error::EmptyChunk`] for a chunk without logs under [`EmptyChunkPolicy::Fail`].
    /// * [`Error::RetryExhausted`] or [`Error::RetryTimeout`] when resolving a block tag or
    ///   fetching a chunk runs out of retries. No chunk is ever skipped silently.
    pub async fn find_log<F>(
        &self,
        from: BlockNumberOrTag,
        to: BlockNumberOrTag,
        chunk_size: u64,
        address: Address,
        topics: &[Option<B256>],
        predicate: F,
    ) -> Result<Option<LogEntry>, Error>
    where
        F: Fn(&LogEntry) -> Option<SearchDirection>,
    {
        if chunk_size == 0 {
            return Err(Error::invalid_argument("chunk_size=0 must be greater than 0"));
        }
        if topics.len() > MAX_TOPICS {
            return Err(Error::invalid_argument(format!(
                "{} topic positions given, at most {MAX_TOPICS} are supported",
                topics.len()
            )));
        }

        let range = self.resolve_range(from, to).await?;
        let chunks = ChunkPartition::new(*range.start(), *range.end(), chunk_size)?;
        debug!(
            from_block = *range.start(),
            to_block = *range.end(),
            chunk_count = chunks.len(),
            "Searching log in chunks"
        );

        let window = SearchWindow::new(chunks.len());
        let window = &window;
        let predicate = &predicate;
        let policy = RetryPolicy::unlimited(self.search_backoff_delay);

        let outcome = retry_until(
            &policy,
            move || async move {
                let (mid, chunk) = window
                    .midpoint()
                    .and_then(|mid| chunks.get(mid).map(|chunk| (mid, chunk)))
                    .ok_or_else(|| Error::invalid_argument("search window is empty"))?;
                debug!(
                    chunk_start = *chunk.start(),
                    chunk_end = *chunk.end(),
                    left = window.left(),
                    right = window.right(),
                    "Searching chunk"
                );

                let outcome = self.search_chunk(chunk, address, topics, predicate).await?;
                if let SearchOutcome::Continue(direction) = &outcome {
                    window.narrow(mid, *direction);
                }
                Ok(outcome)
            },
            |outcome| match outcome {
                Ok(SearchOutcome::Found(_)) | Err(_) => true,
                Ok(SearchOutcome::Continue(_)) => window.is_empty(),
            },
        )
        .await?;

        match outcome {
            SearchOutcome::Found(log) => {
                info!(
                    block_number = log.block_number,
                    log_index = log.log_index,
                    transaction_hash = %log.transaction_hash,
                    "Found log"
                );
                Ok(Some(log))
            }
            SearchOutcome::Continue(_) => {
                debug!(from_block = *range.start(), to_block = *range.end(), "No matching log");
                Ok(None)
            }
        }
    }

    async fn search_chunk<F>(
        &self,
        chunk: RangeInclusive<BlockNumber>,
        address: Address,
        topics: &[Option<B256>],
        predicate: &F,
    ) -> Result<SearchOutcome, Error>
    where
        F: Fn(&LogEntry) -> Option<SearchDirection>,
    {
        let logs = self
            .get_logs(
                BlockNumberOrTag::Number(*chunk.start()),
                BlockNumberOrTag::Number(*chunk.end()),
                address,
                topics,
            )
            .await?;
        evaluate_chunk(&chunk, logs, predicate, self.empty_chunk_policy)
    }

    async fn resolve_range(
        &self,
        from: BlockNumberOrTag,
        to: BlockNumberOrTag,
    ) -> Result<RangeInclusive<BlockNumber>, Error> {
        let start = self.resolve_block(from).await?;
        let end = self.resolve_block(to).await?;
        if start > end {
            return Err(Error::invalid_argument(format!(
                "from_block={from} resolved to {start}, above to_block={to} resolved to {end}"
            )));
        }
        Ok(start..=end)
    }

    async fn resolve_block(&self, block: BlockNumberOrTag) -> Result<BlockNumber, Error> {
        if let BlockNumberOrTag::Number(number) = block {
            return Ok(number);
        }
        let provider = &self.provider;
        let number = retry(&self.request_retry, move || async move {
            provider.fetch_block_number(block).await?.ok_or(Error::BlockNotFound(block))
        })
        .await?;
        trace!(block = %block, number = number, "Resolved block tag");
        Ok(number)
    }
}

/// Turn the logs of one chunk into a search outcome.
fn evaluate_chunk<F>(
    chunk: &RangeInclusive<BlockNumber>,
    logs: Vec<LogEntry>,
    predicate: &F,
    empty_chunk_policy: EmptyChunkPolicy,
) -> Result<SearchOutcome, Error>
where
    F: Fn(&LogEntry) -> Option<SearchDirection>,
{
    let mut first_direction = None;
    for log in logs {
        match predicate(&log) {
            None => return Ok(SearchOutcome::Found(log)),
            Some(direction) => {
                first_direction.get_or_insert(direction);
            }
        }
    }

    match (first_direction, empty_chunk_policy) {
        (Some(direction), _) | (None, EmptyChunkPolicy::Continue(direction)) => {
            Ok(SearchOutcome::Continue(direction))
        }
        (None, EmptyChunkPolicy::Fail) => {
            warn!(chunk_start = *chunk.start(), chunk_end = *chunk.end(), "Chunk has no logs");
            Err(Error::EmptyChunk { from: *chunk.start(), to: *chunk.end() })
        }
    }
}

/// Half-open window `[left, right)` of chunk indices still to be searched.
///
/// Shared by the retry loop's operation, which narrows it, and its stop condition.
#[derive(Debug)]
struct SearchWindow {
    left: AtomicUsize,
    right: AtomicUsize,
}

impl SearchWindow {
    fn new(len: usize) -> Self {
        Self { left: AtomicUsize::new(0), right: AtomicUsize::new(len) }
    }

    fn left(&self) -> usize {
        self.left.load(Ordering::Relaxed)
    }

    fn right(&self) -> usize {
        self.right.load(Ordering::Relaxed)
    }

    fn is_empty(&self) -> bool {
        self.left() >= self.right()
    }

    fn midpoint(&self) -> Option<usize> {
        let (left, right) = (self.left(), self.right());
        (left < right).then(|| left + (right - left) / 2)
    }

    fn narrow(&self, mid: usize, direction: SearchDirection) {
        match direction {
            SearchDirection::Forward => self.left.store(mid + 1, Ordering::Relaxed),
            SearchDirection::Backward => self.right.store(mid, Ordering::Relaxed),
        }
    }
}
