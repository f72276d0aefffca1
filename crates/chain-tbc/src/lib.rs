//! TBC chain support for the explorer client.
//!
//! Provides network resolution, address/hash lookup keys, the unspent-output
//! model and coin selection, token metadata and amount scaling, merge
//! transaction assembly and the pre-pre transaction data used by FT
//! transfers. Nothing in this crate performs I/O.

pub mod address;
pub mod ancestry;
pub mod contract;
pub mod error;
pub mod network;
pub mod token;
pub mod transaction;
pub mod utxo;
