use std::sync::Arc;

use chain_tbc::contract::{ContractLib, StandardContractLib};
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ExplorerConfig;
use crate::error::ClientError;
use crate::transport::{ReqwestTransport, Transport};

/// Client for the TBC explorer REST API.
///
/// Stateless apart from its configuration: every call re-queries the
/// explorer, and clones share the same transport and contract library.
#[derive(Clone)]
pub struct ExplorerClient {
    config: ExplorerConfig,
    transport: Arc<dyn Transport>,
    lib: Arc<dyn ContractLib>,
}

impl ExplorerClient {
    /// Client over HTTP with the standard contract library.
    pub fn new(config: ExplorerConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let transport = ReqwestTransport::new(config.timeout())?;
        Ok(Self::with_parts(
            config,
            Arc::new(transport),
            Arc::new(StandardContractLib::new()),
        ))
    }

    /// Client over an arbitrary transport and contract library.
    pub fn with_parts(
        config: ExplorerConfig,
        transport: Arc<dyn Transport>,
        lib: Arc<dyn ContractLib>,
    ) -> Self {
        Self {
            config,
            transport,
            lib,
        }
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    pub fn lib(&self) -> &dyn ContractLib {
        self.lib.as_ref()
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.config.endpoint(path);
        debug!("GET {url}");
        let value = self.transport.get(&url).await?;
        serde_json::from_value(value)
            .map_err(|e| ClientError::Decode(format!("GET {url}: {e}")))
    }

    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.config.endpoint(path);
        let body = serde_json::to_value(body)?;
        debug!("POST {url}");
        let value = self.transport.post(&url, &body).await?;
        serde_json::from_value(value)
            .map_err(|e| ClientError::Decode(format!("POST {url}: {e}")))
    }
}

impl std::fmt::Debug for ExplorerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplorerClient")
            .field("network", &self.config.network)
            .field("base_url", &self.config.base_url())
            .finish_non_exhaustive()
    }
}
