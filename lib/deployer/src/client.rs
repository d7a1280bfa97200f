use std::sync::{PoisonError, RwLock};

use alloy::{
    network::EthereumWallet,
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::client::RpcClient,
    transports::http::reqwest::Url,
};
use once_cell::sync::Lazy;

use crate::{keys::PrivateKey, Error, Result};

/// Handle to a JSON-RPC endpoint.
///
/// Cheap to clone, clones share the underlying HTTP client.
#[derive(Clone)]
pub struct Client {
    url: Url,
    rpc: RpcClient,
    provider: DynProvider,
}

impl Client {
    /// Create a client bound to `url`. No request is sent until the client
    /// is used.
    ///
    /// # Errors
    ///
    /// * [`Error::Network`] - If `url` cannot be parsed.
    pub fn new(url: &str) -> Result<Self> {
        let url: Url = url.parse().map_err(|e| {
            Error::Network(format!("invalid RPC url `{url}`: {e}"))
        })?;
        let rpc = RpcClient::new_http(url.clone());
        let provider =
            ProviderBuilder::new().connect_client(rpc.clone()).erased();

        Ok(Self { url, rpc, provider })
    }

    /// The endpoint this client talks to.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Read-only provider, without a wallet attached.
    #[must_use]
    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }

    /// Provider that signs transactions with `key` and fills nonce, gas and
    /// chain id.
    pub(crate) fn wallet(&self, key: &PrivateKey) -> DynProvider {
        ProviderBuilder::new()
            .wallet(EthereumWallet::from(key.signer().clone()))
            .connect_client(self.rpc.clone())
            .erased()
    }

    /// Gas price suggested by the node, in wei.
    ///
    /// # Errors
    ///
    /// * [`Error::Network`] - If the request fails.
    pub async fn gas_price(&self) -> Result<u128> {
        self.provider
            .get_gas_price()
            .await
            .map_err(|e| Error::Network(e.to_string()))
    }

    /// Chain id reported by the node.
    ///
    /// # Errors
    ///
    /// * [`Error::Network`] - If the request fails.
    pub async fn chain_id(&self) -> Result<u64> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| Error::Network(e.to_string()))
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").field("url", &self.url.as_str()).finish()
    }
}

/// Process-wide [`Client`] slot.
///
/// Set it once with [`ClientStore::set_with_url`] and release it with
/// [`ClientStore::delete`] when done, so no connection outlives its user.
/// Code that needs several endpoints should pass [`Client`]s around instead.
pub struct ClientStore;

impl ClientStore {
    fn slot() -> &'static RwLock<Option<Client>> {
        /// The single shared client, if any.
        static CLIENT: Lazy<RwLock<Option<Client>>> =
            Lazy::new(|| RwLock::new(None));

        &CLIENT
    }

    /// Create a client for `url` and store it, replacing any previous one.
    ///
    /// # Errors
    ///
    /// * [`Error::Network`] - If `url` cannot be parsed. The previous client
    ///   is kept in that case.
    pub fn set_with_url(url: &str) -> Result<()> {
        let client = Client::new(url)?;
        Self::set(client);
        Ok(())
    }

    /// Store `client`, replacing any previous one.
    pub fn set(client: Client) {
        tracing::debug!(url = %client.url(), "client set");
        *Self::slot().write().unwrap_or_else(PoisonError::into_inner) =
            Some(client);
    }

    /// The current client.
    ///
    /// # Errors
    ///
    /// * [`Error::IllegalState`] - If no client is set.
    pub fn get() -> Result<Client> {
        Self::slot()
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(Error::IllegalState)
    }

    /// Drop the current client. Later calls to [`ClientStore::get`] fail
    /// until a new client is set.
    pub fn delete() {
        let previous =
            Self::slot().write().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(client) = previous {
            tracing::debug!(url = %client.url(), "client deleted");
        }
    }
}
