use alloy::{
    network::{Ethereum, Network},
    providers::{
        Provider, RootProvider,
        fillers::{FillProvider, TxFiller},
    },
    transports::http::reqwest::Url,
};

use crate::Error;

/// Endpoints the searcher and the finalized-block sources can be connected to.
///
/// All access here is read-only, so a layered provider is reduced to its root transport.
/// HTTP(S) URLs are wrapped without any network round trip; websocket and IPC endpoints are
/// connected eagerly.
pub trait IntoRootProvider<N: Network = Ethereum> {
    /// Resolve the endpoint into a [`RootProvider`].
    ///
    /// # Errors
    ///
    /// Returns an error if a websocket or IPC endpoint cannot be connected.
    fn into_root_provider(self) -> impl Future<Output = Result<RootProvider<N>, Error>> + Send;
}

impl<N: Network> IntoRootProvider<N> for RootProvider<N> {
    async fn into_root_provider(self) -> Result<RootProvider<N>, Error> {
        Ok(self)
    }
}

impl<N: Network> IntoRootProvider<N> for Url {
    async fn into_root_provider(self) -> Result<RootProvider<N>, Error> {
        if matches!(self.scheme(), "http" | "https") {
            return Ok(RootProvider::new_http(self));
        }
        debug!(endpoint = %self, "Connecting node endpoint");
        Ok(RootProvider::connect(self.as_str()).await?)
    }
}

/// URLs go through the [`Url`] conversion; anything else is handed to alloy as an IPC path.
impl<N: Network> IntoRootProvider<N> for &str {
    async fn into_root_provider(self) -> Result<RootProvider<N>, Error> {
        match self.parse::<Url>() {
            Ok(url) => url.into_root_provider().await,
            Err(_) => Ok(RootProvider::connect(self).await?),
        }
    }
}

/// Output of `ProviderBuilder`; its fillers only matter for sending transactions.
impl<F, P, N> IntoRootProvider<N> for FillProvider<F, P, N>
where
    F: TxFiller<N>,
    P: Provider<N>,
    N: Network,
{
    async fn into_root_provider(self) -> Result<RootProvider<N>, Error> {
        Ok(self.root().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::providers::ProviderBuilder;

    #[tokio::test]
    async fn test_http_endpoint_needs_no_connection() -> anyhow::Result<()> {
        let from_str: RootProvider = "http://localhost:8545".into_root_provider().await?;
        let from_url: RootProvider =
            "https://localhost:8545".parse::<Url>()?.into_root_provider().await?;

        drop((from_str, from_url));
        Ok(())
    }

    #[tokio::test]
    async fn test_layered_provider_reduces_to_root() -> anyhow::Result<()> {
        let layered = ProviderBuilder::new().connect_http("http://localhost:8545".parse()?);
        let _root: RootProvider = layered.into_root_provider().await?;
        Ok(())
    }
}
