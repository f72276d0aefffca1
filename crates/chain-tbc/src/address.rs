use bitcoin::address::{Address, NetworkUnchecked};
use bitcoin::hashes::Hash;
use bitcoin::script::ScriptBuf;
use sha2::{Digest, Sha256};

use crate::contract::ContractLib;
use crate::error::TbcError;

/// Length of a hex-encoded HASH160 (20 bytes).
pub const HASH_HEX_LEN: usize = 40;

/// Suffix tag marking a lookup key derived from an address.
pub const ADDRESS_TAG: &str = "00";

/// Suffix tag marking a lookup key passed in as a raw hash.
pub const HASH_TAG: &str = "01";

/// Parse a TBC address and return its HASH160 public-key hash.
///
/// TBC uses legacy base58check P2PKH addresses; any other address type is
/// rejected. The network byte is not checked since mainnet and testnet
/// share the same address format.
pub fn address_to_pubkey_hash(address: &str) -> Result<[u8; 20], TbcError> {
    let parsed = address
        .parse::<Address<NetworkUnchecked>>()
        .map_err(|e| TbcError::InvalidAddress(format!("failed to parse address: {e}")))?
        .assume_checked();

    let hash = parsed
        .pubkey_hash()
        .ok_or_else(|| TbcError::InvalidAddress(format!("not a P2PKH address: {address}")))?;

    Ok(hash.to_byte_array())
}

/// Return `true` if `address` is a well-formed P2PKH address.
pub fn validate_address(address: &str) -> bool {
    address_to_pubkey_hash(address).is_ok()
}

/// Build the P2PKH locking script for an address.
pub fn p2pkh_script_pubkey(address: &str) -> Result<ScriptBuf, TbcError> {
    let hash = address_to_pubkey_hash(address)?;
    Ok(ScriptBuf::new_p2pkh(&bitcoin::PubkeyHash::from_byte_array(
        hash,
    )))
}

/// Encode an address or a raw 40-hex-char hash into the tagged lookup key
/// used by the balance and UTXO endpoints.
///
/// Addresses become `hex(pubkey_hash) + "00"`, raw hashes become
/// `hash + "01"`.
pub fn normalize_lookup_key(input: &str, lib: &dyn ContractLib) -> Result<String, TbcError> {
    if lib.validate_address(input) {
        let hash = lib.address_to_pubkey_hash(input)?;
        return Ok(format!("{}{ADDRESS_TAG}", hex::encode(hash)));
    }

    if input.len() == HASH_HEX_LEN && input.chars().all(|c| c.is_ascii_hexdigit()) {
        return Ok(format!("{input}{HASH_TAG}"));
    }

    Err(TbcError::InvalidInput(format!(
        "expected an address or a {HASH_HEX_LEN}-char hash, got {input:?}"
    )))
}

/// Electrum-style script hash: SHA-256 of the script, byte-reversed, in hex.
pub fn script_hash_hex(script: &[u8]) -> String {
    let mut digest = Sha256::digest(script).to_vec();
    digest.reverse();
    hex::encode(digest)
}
