use std::str::FromStr;

use bitcoin::absolute::LockTime;
use bitcoin::script::ScriptBuf;
use bitcoin::transaction::Version;
use bitcoin::{Amount, OutPoint, Sequence, Transaction, TxIn, TxOut, Txid, Witness};

use crate::error::TbcError;
use crate::utxo::{total_value, UnspentOutput};

/// Transaction version used on the TBC chain.
pub const TBC_TX_VERSION: i32 = 10;

/// Fixed fee paid by a merge (self-transfer) transaction, in base units.
pub const MERGE_FEE: u64 = 500;

/// Parse a serialized transaction.
pub fn decode_transaction(raw: &[u8]) -> Result<Transaction, TbcError> {
    bitcoin::consensus::deserialize(raw)
        .map_err(|e| TbcError::DecodeError(format!("invalid transaction: {e}")))
}

/// Parse a hex-encoded transaction.
pub fn decode_transaction_hex(raw_hex: &str) -> Result<Transaction, TbcError> {
    let raw = hex::decode(raw_hex.trim())
        .map_err(|e| TbcError::DecodeError(format!("invalid transaction hex: {e}")))?;
    decode_transaction(&raw)
}

/// Build an unsigned transaction spending all `utxos` into one output
/// locked by `script_pubkey`, paying `fee`.
pub fn build_merge_transaction(
    utxos: &[UnspentOutput],
    script_pubkey: ScriptBuf,
    fee: u64,
) -> Result<Transaction, TbcError> {
    if utxos.is_empty() {
        return Err(TbcError::TransactionBuildError("no UTXOs to merge".into()));
    }

    let total = total_value(utxos);
    if total <= fee {
        return Err(TbcError::InsufficientBalance(format!(
            "merge of {total} sat cannot pay fee {fee} sat"
        )));
    }

    let mut inputs = Vec::with_capacity(utxos.len());
    for utxo in utxos {
        let txid = Txid::from_str(&utxo.txid)
            .map_err(|e| TbcError::TransactionBuildError(format!("invalid txid {}: {e}", utxo.txid)))?;

        inputs.push(TxIn {
            previous_output: OutPoint::new(txid, utxo.vout),
            script_sig: ScriptBuf::new(),
            sequence: Sequence::MAX,
            witness: Witness::default(),
        });
    }

    Ok(Transaction {
        version: Version(TBC_TX_VERSION),
        lock_time: LockTime::ZERO,
        input: inputs,
        output: vec![TxOut {
            value: Amount::from_sat(total - fee),
            script_pubkey,
        }],
    })
}
