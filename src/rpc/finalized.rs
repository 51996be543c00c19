use alloy::{
    consensus::BlockHeader,
    eips::{BlockId, BlockNumberOrTag},
    network::{BlockResponse, Ethereum, Network, TransactionBuilder},
    primitives::{Address, BlockNumber},
    providers::{Provider, RootProvider},
    sol,
    sol_types::SolCall,
};

use crate::{Error, rpc::IntoRootProvider};

sol! {
    /// Last L2 block whose state a rollup contract considers finalized.
    function currentL2BlockNumber() external view returns (uint256);
}

/// A single-call accessor for "the current finalized block".
///
/// The value may move backwards or forwards between calls; the finality poller only trusts it
/// once it stops changing.
pub trait FinalizedBlockSource: Send + Sync {
    fn current_finalized_block_number(
        &self,
    ) -> impl Future<Output = Result<BlockNumber, Error>> + Send;
}

impl<S: FinalizedBlockSource> FinalizedBlockSource for &S {
    fn current_finalized_block_number(
        &self,
    ) -> impl Future<Output = Result<BlockNumber, Error>> + Send {
        (**self).current_finalized_block_number()
    }
}

/// Reads `currentL2BlockNumber()` from a rollup contract.
///
/// The block the call executes against is part of every request, so instances can be cloned
/// and shared freely.
#[derive(Clone, Debug)]
pub struct RollupContractSource<N: Network = Ethereum> {
    provider: RootProvider<N>,
    contract: Address,
    block: BlockId,
}

impl<N: Network> RollupContractSource<N> {
    /// Read the contract at `contract`, executing the call against the latest block.
    #[must_use]
    pub fn new(provider: RootProvider<N>, contract: Address) -> Self {
        Self { provider, contract, block: BlockId::latest() }
    }

    /// Connect to `endpoint` and read the contract at `contract`.
    ///
    /// # Errors
    ///
    /// Returns an error if `endpoint` cannot be connected.
    pub async fn connect(
        endpoint: impl IntoRootProvider<N>,
        contract: Address,
    ) -> Result<Self, Error> {
        Ok(Self::new(endpoint.into_root_provider().await?, contract))
    }

    /// Execute the call against `block` instead of the latest block.
    #[must_use]
    pub fn at_block(mut self, block: BlockId) -> Self {
        self.block = block;
        self
    }

    #[must_use]
    pub fn contract(&self) -> Address {
        self.contract
    }
}

impl<N: Network> FinalizedBlockSource for RollupContractSource<N> {
    async fn current_finalized_block_number(&self) -> Result<BlockNumber, Error> {
        let request = N::TransactionRequest::default()
            .with_to(self.contract)
            .with_input(currentL2BlockNumberCall {}.abi_encode());
        let output = self.provider.call(request).block(self.block).await?;
        let number = currentL2BlockNumberCall::abi_decode_returns(&output).map_err(|err| {
            Error::InvalidResponse(format!("currentL2BlockNumber() returned bad data: {err}"))
        })?;
        u64::try_from(number).map_err(|_| {
            Error::InvalidResponse(format!("finalized block {number} does not fit into u64"))
        })
    }
}

/// Number of the block the node itself tags as `finalized`.
#[derive(Clone, Debug)]
pub struct FinalizedTagSource<N: Network = Ethereum> {
    provider: RootProvider<N>,
}

impl<N: Network> FinalizedTagSource<N> {
    #[must_use]
    pub fn new(provider: RootProvider<N>) -> Self {
        Self { provider }
    }

    /// # Errors
    ///
    /// Returns an error if `endpoint` cannot be connected.
    pub async fn connect(endpoint: impl IntoRootProvider<N>) -> Result<Self, Error> {
        Ok(Self::new(endpoint.into_root_provider().await?))
    }
}

impl<N: Network> FinalizedBlockSource for FinalizedTagSource<N> {
    async fn current_finalized_block_number(&self) -> Result<BlockNumber, Error> {
        let tag = BlockNumberOrTag::Finalized;
        self.provider
            .get_block_by_number(tag)
            .await?
            .map(|block| block.header().number())
            .ok_or(Error::BlockNotFound(tag))
    }
}
