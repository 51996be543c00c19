use alloy::{
    consensus::BlockHeader,
    eips::BlockNumberOrTag,
    network::{BlockResponse, Network},
    primitives::BlockNumber,
    providers::{Provider, RootProvider},
    rpc::types::{Filter, Log},
};

use crate::{Error, types::LogFilter};

/// Single request/response access to a node's logs and block numbers.
///
/// Implementations perform exactly one remote call per method invocation and never retry;
/// retrying is the caller's business. Every block reference is passed explicitly, so one
/// implementation can be shared by any number of concurrent searches.
pub trait LogsProvider: Send + Sync {
    /// `eth_getLogs` for `filter`, in the order the node returns them.
    fn fetch_logs(
        &self,
        filter: &LogFilter,
    ) -> impl Future<Output = Result<Vec<Log>, Error>> + Send;

    /// Number of the block `block` refers to, or `None` if the node does not know it.
    fn fetch_block_number(
        &self,
        block: BlockNumberOrTag,
    ) -> impl Future<Output = Result<Option<BlockNumber>, Error>> + Send;
}

impl<N: Network> LogsProvider for RootProvider<N> {
    async fn fetch_logs(&self, filter: &LogFilter) -> Result<Vec<Log>, Error> {
        trace!(
            from_block = %filter.from_block,
            to_block = %filter.to_block,
            address = %filter.address,
            "eth_getLogs"
        );
        let filter = Filter::from(filter);
        Ok(Provider::get_logs(self, &filter).await?)
    }

    async fn fetch_block_number(
        &self,
        block: BlockNumberOrTag,
    ) -> Result<Option<BlockNumber>, Error> {
        trace!(block = %block, "eth_getBlockByNumber");
        let response = Provider::get_block_by_number(self, block).await?;
        Ok(response.map(|block| block.header().number()))
    }
}

impl<P: LogsProvider> LogsProvider for &P {
    fn fetch_logs(
        &self,
        filter: &LogFilter,
    ) -> impl Future<Output = Result<Vec<Log>, Error>> + Send {
        (**self).fetch_logs(filter)
    }

    fn fetch_block_number(
        &self,
        block: BlockNumberOrTag,
    ) -> impl Future<Output = Result<Option<BlockNumber>, Error>> + Send {
        (**self).fetch_block_number(block)
    }
}
