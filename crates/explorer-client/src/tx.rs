//! Raw transaction fetch and broadcast.

use bitcoin::Transaction;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::ExplorerClient;
use crate::error::ClientError;

#[derive(Debug, Deserialize)]
struct TxHexResponse {
    #[serde(alias = "txHex", alias = "rawtx")]
    result: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RawTxBody<'a> {
    tx_hex: &'a str,
}

#[derive(Debug, Deserialize)]
struct BroadcastResponse<T> {
    result: Option<T>,
    #[serde(default)]
    error: Option<Value>,
}

fn has_error(error: Option<&Value>) -> bool {
    match error {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

impl ExplorerClient {
    /// Fetch a transaction by id as hex, undecoded.
    pub async fn fetch_tx_hex(&self, txid: &str) -> Result<String, ClientError> {
        let response: TxHexResponse = self.get_json(&format!("tx/hex/{txid}")).await?;
        Ok(response.result)
    }

    /// Fetch a transaction by id and decode it.
    pub async fn fetch_tx_raw(&self, txid: &str) -> Result<Transaction, ClientError> {
        let raw_hex = self.fetch_tx_hex(txid).await?;
        let raw = hex::decode(raw_hex.trim())
            .map_err(|e| ClientError::Decode(format!("tx {txid} is not hex: {e}")))?;
        Ok(self.lib().decode_transaction(&raw)?)
    }

    /// Submit a signed hex-encoded transaction and return its txid.
    ///
    /// An `error` field next to a `result` is logged, not raised.
    pub async fn broadcast_tx_raw(&self, tx_hex: &str) -> Result<String, ClientError> {
        let response: BroadcastResponse<String> = self
            .post_json("broadcast/tx/raw", &RawTxBody { tx_hex })
            .await?;

        if has_error(response.error.as_ref()) {
            warn!("broadcast reported error: {}", response.error.unwrap_or_default());
        }

        let txid = response
            .result
            .ok_or_else(|| ClientError::Network("broadcast returned no txid".into()))?;
        info!("broadcast {txid}");
        Ok(txid)
    }

    /// Submit several signed transactions in one call.
    pub async fn broadcast_tx_batch(&self, tx_hexes: &[String]) -> Result<Vec<String>, ClientError> {
        let body: Vec<RawTxBody<'_>> = tx_hexes
            .iter()
            .map(|tx_hex| RawTxBody { tx_hex })
            .collect();
        let response: BroadcastResponse<Vec<String>> =
            self.post_json("broadcast/txs/raw", &body).await?;

        if has_error(response.error.as_ref()) {
            warn!("batch broadcast reported error: {}", response.error.unwrap_or_default());
        }

        let txids = response
            .result
            .ok_or_else(|| ClientError::Network("batch broadcast returned no txids".into()))?;
        info!("broadcast {} transactions", txids.len());
        Ok(txids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_tx_body_shape() {
        let body = serde_json::to_value(RawTxBody { tx_hex: "0a00" }).unwrap();
        assert_eq!(body, json!({"txHex": "0a00"}));
    }

    #[test]
    fn tx_hex_response_aliases() {
        let a: TxHexResponse = serde_json::from_value(json!({"result": "ab"})).unwrap();
        let b: TxHexResponse = serde_json::from_value(json!({"txHex": "cd"})).unwrap();
        assert_eq!(a.result, "ab");
        assert_eq!(b.result, "cd");
    }

    #[test]
    fn error_field_detection() {
        assert!(!has_error(None));
        assert!(!has_error(Some(&Value::Null)));
        assert!(!has_error(Some(&json!(""))));
        assert!(has_error(Some(&json!("mempool conflict"))));
        assert!(has_error(Some(&json!({"code": -26}))));
    }
}
