use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde_json::Value;

use crate::error::ClientError;

/// JSON-over-HTTP transport used by the explorer client.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<Value, ClientError>;

    async fn post(&self, url: &str, body: &Value) -> Result<Value, ClientError>;
}

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { http })
    }

    async fn read_json(method: &str, url: &str, response: reqwest::Response) -> Result<Value, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Network(format!(
                "{method} {url} returned {status}: {body}"
            )));
        }

        let text = response.text().await?;
        debug!("{method} {url} <- {} bytes", text.len());
        serde_json::from_str(&text)
            .map_err(|e| ClientError::Decode(format!("{method} {url}: invalid JSON: {e}")))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<Value, ClientError> {
        let response = self.http.get(url).send().await?;
        Self::read_json("GET", url, response).await
    }

    async fn post(&self, url: &str, body: &Value) -> Result<Value, ClientError> {
        let response = self.http.post(url).json(body).send().await?;
        Self::read_json("POST", url, response).await
    }
}
