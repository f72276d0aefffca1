//! In-memory transport and signer shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bitcoin::script::ScriptBuf;
use bitcoin::Transaction;
use chain_tbc::contract::{StandardContractLib, TransactionSigner};
use chain_tbc::error::TbcError;
use chain_tbc::utxo::UnspentOutput;
use explorer_client::{ClientError, ExplorerClient, ExplorerConfig, Transport};
use serde_json::Value;

pub const BASE_URL: &str = "http://explorer.test/v1/";

/// Genesis coinbase address and its HASH160.
pub const ADDRESS: &str = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa";
pub const ADDRESS_HASH: &str = "62e907b15cbf27d5425399ebf6f0fb50ebb88f18";

pub enum Reply {
    Json(Value),
    Fail(String),
}

/// Routes keyed by full URL. Each route replays its queued replies in
/// order and repeats the last one once the queue is down to one.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<(String, Option<Value>)>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on(&self, path: &str, response: Value) {
        self.push(path, Reply::Json(response));
    }

    pub fn fail(&self, path: &str, message: &str) {
        self.push(path, Reply::Fail(message.to_string()));
    }

    fn push(&self, path: &str, reply: Reply) {
        self.routes
            .lock()
            .unwrap()
            .entry(format!("{BASE_URL}{path}"))
            .or_default()
            .push_back(reply);
    }

    /// Number of requests made to `path`.
    pub fn hits(&self, path: &str) -> usize {
        let url = format!("{BASE_URL}{path}");
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(u, _)| *u == url)
            .count()
    }

    pub fn total_requests(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Bodies posted to `path`, in order.
    pub fn posted(&self, path: &str) -> Vec<Value> {
        let url = format!("{BASE_URL}{path}");
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(u, _)| *u == url)
            .filter_map(|(_, body)| body.clone())
            .collect()
    }

    fn reply(&self, url: &str, body: Option<Value>) -> Result<Value, ClientError> {
        self.requests.lock().unwrap().push((url.to_string(), body));

        let mut routes = self.routes.lock().unwrap();
        let queue = routes
            .get_mut(url)
            .ok_or_else(|| ClientError::Network(format!("{url} returned 404 Not Found")))?;

        let reply = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().map(|r| match r {
                Reply::Json(v) => Reply::Json(v.clone()),
                Reply::Fail(m) => Reply::Fail(m.clone()),
            })
        };

        match reply {
            Some(Reply::Json(value)) => Ok(value),
            Some(Reply::Fail(message)) => Err(ClientError::Network(message)),
            None => Err(ClientError::Network(format!("{url} has no reply"))),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &str) -> Result<Value, ClientError> {
        self.reply(url, None)
    }

    async fn post(&self, url: &str, body: &Value) -> Result<Value, ClientError> {
        self.reply(url, Some(body.clone()))
    }
}

/// Signer that stamps a placeholder unlocking script on every input.
pub struct MockSigner {
    address: String,
    pub calls: AtomicUsize,
}

impl MockSigner {
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TransactionSigner for MockSigner {
    fn address(&self) -> &str {
        &self.address
    }

    fn sign(&self, mut tx: Transaction, prevouts: &[UnspentOutput]) -> Result<Transaction, TbcError> {
        if tx.input.len() != prevouts.len() {
            return Err(TbcError::SigningError("prevout count mismatch".into()));
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        for input in &mut tx.input {
            input.script_sig = ScriptBuf::from_bytes(vec![0x51]);
        }
        Ok(tx)
    }
}

pub fn test_config() -> ExplorerConfig {
    let mut config = ExplorerConfig::default().with_base_url(BASE_URL);
    config.retry.merge_delay_ms = 0;
    config
}

pub fn client_with(transport: Arc<MockTransport>, config: ExplorerConfig) -> ExplorerClient {
    ExplorerClient::with_parts(config, transport, Arc::new(StandardContractLib::new()))
}

pub fn client(transport: Arc<MockTransport>) -> ExplorerClient {
    client_with(transport, test_config())
}
