//! Capability boundary towards the contract/crypto library.
//!
//! Everything that needs script construction, transaction serialization or
//! signing goes through [`ContractLib`] and [`TransactionSigner`], so the
//! explorer client can run against a mock in tests.

use bitcoin::script::ScriptBuf;
use bitcoin::Transaction;

use crate::error::TbcError;
use crate::utxo::UnspentOutput;

/// Operations the explorer layer needs from the contract library.
pub trait ContractLib: Send + Sync {
    /// Whether `address` is a valid address.
    fn validate_address(&self, address: &str) -> bool;

    /// HASH160 of the public key behind `address`.
    fn address_to_pubkey_hash(&self, address: &str) -> Result<[u8; 20], TbcError>;

    /// Locking script paying to `address`.
    fn p2pkh_script(&self, address: &str) -> Result<ScriptBuf, TbcError>;

    /// Parse a serialized transaction.
    fn decode_transaction(&self, raw: &[u8]) -> Result<Transaction, TbcError>;

    /// Serialize a transaction.
    fn encode_transaction(&self, tx: &Transaction) -> Vec<u8>;

    /// Serialized reference data of output `vout` of `tx`, as consumed by
    /// the token contract when `tx` is a grandparent of the spending tx.
    fn ancestor_fragment(&self, tx: &Transaction, vout: u32) -> Result<Vec<u8>, TbcError>;

    /// Unsigned transaction consolidating `utxos` into a single output to
    /// `address`, paying `fee`.
    fn build_merge_transaction(
        &self,
        utxos: &[UnspentOutput],
        address: &str,
        fee: u64,
    ) -> Result<Transaction, TbcError>;
}

/// Holder of a signing key.
pub trait TransactionSigner: Send + Sync {
    /// Address controlled by this signer.
    fn address(&self) -> &str;

    /// Sign every input of `tx`; `prevouts` are the outputs being spent,
    /// in input order.
    fn sign(&self, tx: Transaction, prevouts: &[UnspentOutput]) -> Result<Transaction, TbcError>;
}

/// [`ContractLib`] backed by the `bitcoin` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardContractLib;

impl StandardContractLib {
    pub fn new() -> Self {
        Self
    }
}

impl ContractLib for StandardContractLib {
    fn validate_address(&self, address: &str) -> bool {
        crate::address::validate_address(address)
    }

    fn address_to_pubkey_hash(&self, address: &str) -> Result<[u8; 20], TbcError> {
        crate::address::address_to_pubkey_hash(address)
    }

    fn p2pkh_script(&self, address: &str) -> Result<ScriptBuf, TbcError> {
        crate::address::p2pkh_script_pubkey(address)
    }

    fn decode_transaction(&self, raw: &[u8]) -> Result<Transaction, TbcError> {
        crate::transaction::decode_transaction(raw)
    }

    fn encode_transaction(&self, tx: &Transaction) -> Vec<u8> {
        bitcoin::consensus::serialize(tx)
    }

    fn ancestor_fragment(&self, tx: &Transaction, vout: u32) -> Result<Vec<u8>, TbcError> {
        crate::ancestry::encode_ancestor_fragment(tx, vout)
    }

    fn build_merge_transaction(
        &self,
        utxos: &[UnspentOutput],
        address: &str,
        fee: u64,
    ) -> Result<Transaction, TbcError> {
        let script = self.p2pkh_script(address)?;
        crate::transaction::build_merge_transaction(utxos, script, fee)
    }
}
