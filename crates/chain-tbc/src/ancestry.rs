//! Pre-pre transaction data for FT transfers.
//!
//! The tape output following an FT code output records, in its bytes
//! `[3, 51)`, one 8-byte amount slot per input of the transaction that
//! created it. Every non-zero slot `k` means input `k` carried tokens, and
//! the transfer script needs reference data of the transaction that input
//! spent (the "grandparent"). This module locates those inputs and lays out
//! the final payload; fetching the grandparents is left to the caller.

use bitcoin::consensus::encode::VarInt;
use bitcoin::hashes::Hash;
use bitcoin::{OutPoint, Transaction, TxOut};
use sha2::{Digest, Sha256};

use crate::error::TbcError;

/// Leading marker byte of the assembled payload.
pub const PRE_PRE_MARKER: u8 = 0x57;

/// First byte of the amount field inside the tape script.
pub const TAPE_FIELD_START: usize = 3;

/// One past the last byte of the amount field inside the tape script.
pub const TAPE_FIELD_END: usize = 51;

/// Width of one amount slot.
pub const SLOT_LEN: usize = 8;

/// Number of slots in the amount field.
pub const SLOT_COUNT: usize = (TAPE_FIELD_END - TAPE_FIELD_START) / SLOT_LEN;

/// Amount field of the tape output that follows output `vout` of `parent`.
pub fn tape_field(parent: &Transaction, vout: u32) -> Result<&[u8], TbcError> {
    let tape_index = vout as usize + 1;
    let tape = parent.output.get(tape_index).ok_or_else(|| {
        TbcError::InvalidInput(format!(
            "transaction {} has no tape output at index {tape_index}",
            parent.compute_txid()
        ))
    })?;

    let script = tape.script_pubkey.as_bytes();
    script.get(TAPE_FIELD_START..TAPE_FIELD_END).ok_or_else(|| {
        TbcError::InvalidInput(format!(
            "tape script is {} bytes, expected at least {TAPE_FIELD_END}",
            script.len()
        ))
    })
}

/// Indices of the non-zero slots of `field`, highest first.
pub fn nonzero_slots(field: &[u8]) -> Vec<usize> {
    let mut slots: Vec<usize> = field
        .chunks_exact(SLOT_LEN)
        .enumerate()
        .filter(|(_, slot)| slot.iter().any(|b| *b != 0))
        .map(|(index, _)| index)
        .collect();
    slots.reverse();
    slots
}

/// Outpoints of the grandparent outputs referenced by `parent`'s tape, in
/// scan order (highest slot first).
pub fn ancestor_outpoints(parent: &Transaction, vout: u32) -> Result<Vec<OutPoint>, TbcError> {
    let field = tape_field(parent, vout)?;

    nonzero_slots(field)
        .into_iter()
        .map(|slot| {
            parent
                .input
                .get(slot)
                .map(|input| input.previous_output)
                .ok_or_else(|| {
                    TbcError::InvalidInput(format!(
                        "tape slot {slot} has no matching input ({} inputs)",
                        parent.input.len()
                    ))
                })
        })
        .collect()
}

/// Prefix the marker byte to the concatenated fragments.
pub fn assemble_pre_pre_data<I>(fragments: I) -> Vec<u8>
where
    I: IntoIterator<Item = Vec<u8>>,
{
    let mut data = vec![PRE_PRE_MARKER];
    for fragment in fragments {
        data.extend_from_slice(&fragment);
    }
    data
}

/// Compact reference encoding of output `vout` of `tx`.
///
/// Layout: version, lock time, input count and output count (4 bytes LE
/// each); SHA-256 of all outpoints and sequences; SHA-256 of the per-input
/// script hashes; SHA-256 of the outputs before `vout`; the value and
/// length-prefixed script of `vout`; SHA-256 of the outputs after `vout`.
pub fn encode_ancestor_fragment(tx: &Transaction, vout: u32) -> Result<Vec<u8>, TbcError> {
    let index = vout as usize;
    let spent = tx.output.get(index).ok_or_else(|| {
        TbcError::InvalidInput(format!(
            "transaction {} has no output {vout}",
            tx.compute_txid()
        ))
    })?;

    let mut out = Vec::new();
    out.extend_from_slice(&tx.version.0.to_le_bytes());
    out.extend_from_slice(&tx.lock_time.to_consensus_u32().to_le_bytes());
    out.extend_from_slice(&(tx.input.len() as u32).to_le_bytes());
    out.extend_from_slice(&(tx.output.len() as u32).to_le_bytes());

    let mut outpoints = Sha256::new();
    let mut scripts = Sha256::new();
    for input in &tx.input {
        outpoints.update(input.previous_output.txid.to_byte_array());
        outpoints.update(input.previous_output.vout.to_le_bytes());
        outpoints.update(input.sequence.0.to_le_bytes());
        scripts.update(Sha256::digest(input.script_sig.as_bytes()));
    }
    out.extend_from_slice(&outpoints.finalize());
    out.extend_from_slice(&scripts.finalize());

    out.extend_from_slice(&outputs_digest(&tx.output[..index]));

    let script = spent.script_pubkey.as_bytes();
    out.extend_from_slice(&spent.value.to_sat().to_le_bytes());
    out.extend_from_slice(&bitcoin::consensus::serialize(&VarInt(script.len() as u64)));
    out.extend_from_slice(script);

    out.extend_from_slice(&outputs_digest(&tx.output[index + 1..]));

    Ok(out)
}

fn outputs_digest(outputs: &[TxOut]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for output in outputs {
        hasher.update(output.value.to_sat().to_le_bytes());
        hasher.update(Sha256::digest(output.script_pubkey.as_bytes()));
    }
    hasher.finalize().into()
}
