//! Plain (non-token) UTXO fetching, selection and merging.

use chain_tbc::address::script_hash_hex;
use chain_tbc::contract::TransactionSigner;
use chain_tbc::error::TbcError;
use chain_tbc::token::{to_base_units, TBC_DECIMALS};
use chain_tbc::transaction::MERGE_FEE;
use chain_tbc::utxo::{find_spendable, select_utxos, UnspentOutput};
use log::{debug, info};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::client::ExplorerClient;
use crate::error::ClientError;

/// Electrum-style unspent entry.
#[derive(Debug, Deserialize)]
struct UnspentEntry {
    tx_hash: String,
    tx_pos: u32,
    value: u64,
}

#[derive(Debug, Deserialize)]
struct BalanceResponse {
    data: BalanceData,
}

#[derive(Debug, Deserialize)]
struct BalanceData {
    balance: u64,
}

fn into_outputs(entries: Vec<UnspentEntry>, script: &[u8]) -> Vec<UnspentOutput> {
    entries
        .into_iter()
        .map(|entry| UnspentOutput {
            txid: entry.tx_hash,
            vout: entry.tx_pos,
            script_pubkey: script.to_vec(),
            satoshis: entry.value,
            ft_balance: None,
        })
        .collect()
}

impl ExplorerClient {
    /// All unspent outputs at `address`, with its P2PKH script attached.
    pub async fn fetch_utxos(&self, address: &str) -> Result<Vec<UnspentOutput>, ClientError> {
        let script = self.lib().p2pkh_script(address)?;
        let entries: Vec<UnspentEntry> = self
            .get_json(&format!("address/{address}/unspent/"))
            .await?;
        debug!("{} utxos at {address}", entries.len());
        Ok(into_outputs(entries, script.as_bytes()))
    }

    /// All unspent outputs locked by `script` (e.g. a multisig script).
    pub async fn fetch_script_utxos(&self, script: &[u8]) -> Result<Vec<UnspentOutput>, ClientError> {
        let script_hash = script_hash_hex(script);
        let entries: Vec<UnspentEntry> = self
            .get_json(&format!("script/hash/{script_hash}/unspent"))
            .await?;
        debug!("{} utxos at script hash {script_hash}", entries.len());
        Ok(into_outputs(entries, script))
    }

    /// Total confirmed and unconfirmed balance at `address`, in base units.
    pub async fn fetch_tbc_balance(&self, address: &str) -> Result<u64, ClientError> {
        if !self.lib().validate_address(address) {
            return Err(TbcError::InvalidAddress(address.to_string()).into());
        }
        let response: BalanceResponse = self
            .get_json(&format!("address/{address}/get/balance/"))
            .await?;
        Ok(response.data.balance)
    }

    /// Select outputs at `address` covering `amount_tbc` plus the
    /// configured reserves.
    pub async fn get_utxos(
        &self,
        address: &str,
        amount_tbc: Decimal,
    ) -> Result<Vec<UnspentOutput>, ClientError> {
        let target = to_base_units(amount_tbc, TBC_DECIMALS)?;
        let utxos = self.fetch_utxos(address).await?;
        let selection = select_utxos(&utxos, target, &self.config().selection)?;
        debug!(
            "selected {} utxos worth {} sat for {target} sat",
            selection.selected.len(),
            selection.total_sat
        );
        Ok(selection.selected)
    }

    /// A single output at the signer's address larger than `amount_tbc`.
    ///
    /// When the balance is sufficient but spread over outputs that are each
    /// too small, the outputs are merged into one and the fetch is retried,
    /// up to `retry.max_attempts` fetches in total.
    pub async fn fetch_utxo(
        &self,
        signer: &dyn TransactionSigner,
        amount_tbc: Decimal,
    ) -> Result<UnspentOutput, ClientError> {
        let amount = to_base_units(amount_tbc, TBC_DECIMALS)?;
        let address = signer.address();
        let retry = self.config().retry;
        let attempts = retry.max_attempts.max(1);

        for attempt in 1..=attempts {
            let utxos = self.fetch_utxos(address).await?;
            if let Some(utxo) = find_spendable(&utxos, amount)? {
                return Ok(utxo);
            }

            // The merged output carries the balance minus the merge fee.
            let balance = self.fetch_tbc_balance(address).await?;
            let required = amount.saturating_add(MERGE_FEE);
            if balance <= required {
                return Err(TbcError::InsufficientBalance(format!(
                    "balance {balance} sat at {address}, need more than {required} sat \
                     ({amount} sat plus {MERGE_FEE} sat merge fee)"
                ))
                .into());
            }
            if attempt == attempts {
                break;
            }

            info!("merging {} utxos at {address} (attempt {attempt}/{attempts})", utxos.len());
            self.merge_utxos(signer).await?;
            tokio::time::sleep(retry.merge_delay()).await;
        }

        Err(ClientError::RetriesExhausted { attempts })
    }

    /// Consolidate every output at the signer's address into one.
    ///
    /// Returns the merge txid, or `None` when there is a single output and
    /// nothing to merge.
    pub async fn merge_utxos(
        &self,
        signer: &dyn TransactionSigner,
    ) -> Result<Option<String>, ClientError> {
        let address = signer.address();
        let utxos = self.fetch_utxos(address).await?;

        match utxos.len() {
            0 => Err(TbcError::NotFound(format!("no UTXOs at {address}")).into()),
            1 => Ok(None),
            _ => {
                let unsigned = self.lib().build_merge_transaction(&utxos, address, MERGE_FEE)?;
                let signed = signer.sign(unsigned, &utxos)?;
                let raw = hex::encode(self.lib().encode_transaction(&signed));
                let txid = self.broadcast_tx_raw(&raw).await?;
                info!("merged {} utxos at {address} into {txid}", utxos.len());
                Ok(Some(txid))
            }
        }
    }
}
