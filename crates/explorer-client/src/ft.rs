//! Fungible token balances, UTXOs, metadata and pre-pre transaction data.

use bitcoin::Transaction;
use chain_tbc::address::normalize_lookup_key;
use chain_tbc::ancestry::{ancestor_outpoints, assemble_pre_pre_data};
use chain_tbc::error::TbcError;
use chain_tbc::token::FungibleTokenInfo;
use chain_tbc::utxo::{first_ft_covering, select_ft_utxos, validate_ft_count, UnspentOutput};
use log::debug;
use serde::Deserialize;

use crate::client::ExplorerClient;
use crate::error::ClientError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FtBalanceResponse {
    ft_balance: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FtUtxoListResponse {
    #[serde(default)]
    ft_utxo_list: Vec<FtUtxoEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FtUtxoEntry {
    utxo_id: String,
    utxo_vout: u32,
    utxo_balance: u64,
    ft_balance: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FtInfoResponse {
    ft_code_script: String,
    ft_tape_script: String,
    ft_supply: u64,
    ft_decimal: u8,
    ft_name: String,
    ft_symbol: String,
}

impl FtUtxoEntry {
    fn into_output(self, code_script: &[u8]) -> UnspentOutput {
        UnspentOutput {
            txid: self.utxo_id,
            vout: self.utxo_vout,
            script_pubkey: code_script.to_vec(),
            satoshis: self.utxo_balance,
            ft_balance: Some(self.ft_balance),
        }
    }
}

impl FtInfoResponse {
    fn into_info(self, contract_txid: &str) -> FungibleTokenInfo {
        FungibleTokenInfo {
            contract_txid: Some(contract_txid.to_string()),
            code_script: self.ft_code_script,
            tape_script: self.ft_tape_script,
            total_supply: self.ft_supply,
            decimal: self.ft_decimal,
            name: self.ft_name,
            symbol: self.ft_symbol,
        }
    }
}

impl ExplorerClient {
    /// Token balance of `contract_txid` held by an address or hash.
    pub async fn fetch_ft_balance(
        &self,
        contract_txid: &str,
        address_or_hash: &str,
    ) -> Result<u64, ClientError> {
        let key = normalize_lookup_key(address_or_hash, self.lib())?;
        let response: FtBalanceResponse = self
            .get_json(&format!("ft/balance/combine/script/{key}/contract/{contract_txid}"))
            .await?;
        Ok(response.ft_balance)
    }

    /// Every FT output of `contract_txid` held by an address or hash, in
    /// the order the explorer returns them.
    pub async fn fetch_ft_utxo_all(
        &self,
        contract_txid: &str,
        address_or_hash: &str,
        code_script: &[u8],
    ) -> Result<Vec<UnspentOutput>, ClientError> {
        let key = normalize_lookup_key(address_or_hash, self.lib())?;
        let response: FtUtxoListResponse = self
            .get_json(&format!("ft/utxo/combine/script/{key}/contract/{contract_txid}"))
            .await?;
        debug!(
            "{} ft utxos of {contract_txid} at {address_or_hash}",
            response.ft_utxo_list.len()
        );
        Ok(response
            .ft_utxo_list
            .into_iter()
            .map(|entry| entry.into_output(code_script))
            .collect())
    }

    /// The first FT output holding at least `amount` tokens.
    ///
    /// Fails with `NeedsMerge` when the total balance would cover `amount`
    /// but no single output does.
    pub async fn fetch_ft_utxo(
        &self,
        contract_txid: &str,
        address_or_hash: &str,
        code_script: &[u8],
        amount: u64,
    ) -> Result<UnspentOutput, ClientError> {
        let utxos = self
            .fetch_ft_utxo_all(contract_txid, address_or_hash, code_script)
            .await?;
        if utxos.is_empty() {
            return Err(TbcError::InsufficientBalance(format!(
                "FT balance of {contract_txid} at {address_or_hash} is zero"
            ))
            .into());
        }
        if let Some(utxo) = first_ft_covering(&utxos, amount) {
            return Ok(utxo.clone());
        }

        let total = self.fetch_ft_balance(contract_txid, address_or_hash).await?;
        if total >= amount {
            Err(TbcError::NeedsMerge(format!(
                "FT balance {total} covers {amount} but no single UTXO does"
            ))
            .into())
        } else {
            Err(TbcError::InsufficientBalance(format!(
                "FT balance {total} is below {amount}"
            ))
            .into())
        }
    }

    /// Up to `count` FT outputs, without amount filtering. `count` must be
    /// between 1 and 5.
    pub async fn fetch_ft_utxo_list(
        &self,
        contract_txid: &str,
        address_or_hash: &str,
        code_script: &[u8],
        count: usize,
    ) -> Result<Vec<UnspentOutput>, ClientError> {
        validate_ft_count(count)?;
        let mut utxos = self
            .fetch_ft_utxo_all(contract_txid, address_or_hash, code_script)
            .await?;
        utxos.truncate(count);
        Ok(utxos)
    }

    /// At most five FT outputs, largest first, covering `amount` tokens.
    pub async fn fetch_ft_utxos_for_amount(
        &self,
        contract_txid: &str,
        address_or_hash: &str,
        code_script: &[u8],
        amount: u64,
    ) -> Result<Vec<UnspentOutput>, ClientError> {
        let utxos = self
            .fetch_ft_utxo_all(contract_txid, address_or_hash, code_script)
            .await?;
        Ok(select_ft_utxos(&utxos, amount)?)
    }

    /// The FT output created by transaction `txid`.
    pub async fn fetch_ft_utxo_by_txid(
        &self,
        contract_txid: &str,
        address_or_hash: &str,
        code_script: &[u8],
        txid: &str,
    ) -> Result<UnspentOutput, ClientError> {
        self.fetch_ft_utxo_all(contract_txid, address_or_hash, code_script)
            .await?
            .into_iter()
            .find(|utxo| utxo.txid == txid)
            .ok_or_else(|| TbcError::NotFound(format!("no FT UTXO from tx {txid}")).into())
    }

    /// Metadata of the token contract `contract_txid`.
    pub async fn fetch_ft_info(&self, contract_txid: &str) -> Result<FungibleTokenInfo, ClientError> {
        let response: FtInfoResponse = self
            .get_json(&format!("ft/info/contract/id/{contract_txid}"))
            .await?;
        Ok(response.into_info(contract_txid))
    }

    /// Pre-pre transaction data for spending output `vout` of `parent`.
    ///
    /// Grandparent transactions are fetched one at a time, highest tape
    /// slot first. Returns the hex payload, `"57"` when no slot is set.
    pub async fn fetch_ft_pre_pre_tx_data(
        &self,
        parent: &Transaction,
        vout: u32,
    ) -> Result<String, ClientError> {
        let outpoints = ancestor_outpoints(parent, vout)?;
        let mut fragments = Vec::with_capacity(outpoints.len());

        for outpoint in outpoints {
            let grandparent = self.fetch_tx_raw(&outpoint.txid.to_string()).await?;
            fragments.push(self.lib().ancestor_fragment(&grandparent, outpoint.vout)?);
        }

        Ok(hex::encode(assemble_pre_pre_data(fragments)))
    }

    /// Like [`fetch_ft_pre_pre_tx_data`](Self::fetch_ft_pre_pre_tx_data),
    /// fetching the parent transaction by id first.
    pub async fn fetch_ft_pre_pre_tx_data_by_txid(
        &self,
        parent_txid: &str,
        vout: u32,
    ) -> Result<String, ClientError> {
        let parent = self.fetch_tx_raw(parent_txid).await?;
        self.fetch_ft_pre_pre_tx_data(&parent, vout).await
    }
}
