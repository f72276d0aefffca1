//! Async client for the TBC explorer REST API.
//!
//! Fetches plain and FT UTXOs, token and NFT metadata and raw transactions,
//! assembles FT pre-pre transaction data and broadcasts signed
//! transactions. Chain logic lives in `chain_tbc`; this crate adds the
//! HTTP plumbing, configuration and the merge-and-retry loop.

pub mod client;
pub mod config;
pub mod error;
pub mod ft;
pub mod nft;
pub mod transport;
pub mod tx;
pub mod utxo;

pub use client::ExplorerClient;
pub use config::{ExplorerConfig, RetryPolicy};
pub use error::ClientError;
pub use transport::{ReqwestTransport, Transport};
