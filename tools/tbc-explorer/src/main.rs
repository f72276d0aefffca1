//! Command-line front end for the TBC explorer client.
//!
//! Every command prints JSON on stdout; logs go to stderr.

use std::path::PathBuf;

use anyhow::{bail, Context};
use chain_tbc::address::normalize_lookup_key;
use chain_tbc::contract::StandardContractLib;
use chain_tbc::network::TbcNetwork;
use clap::{Parser, Subcommand};
use explorer_client::{ExplorerClient, ExplorerConfig};
use log::LevelFilter;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, name = "tbc-explorer", about = "Query the TBC explorer API")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Network whose default endpoint is used (mainnet or testnet).
    #[arg(short, long, global = true)]
    network: Option<TbcNetwork>,

    /// Override the explorer base URL.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// JSON configuration file. Flags take precedence over its values.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List unspent outputs at an address
    Utxos { address: String },

    /// Confirmed plus unconfirmed balance at an address, in base units
    Balance { address: String },

    /// Select outputs covering an amount of TBC plus fee reserve
    Select { address: String, amount: Decimal },

    /// FT balance of an address or 40-hex public key hash
    FtBalance { contract: String, holder: String },

    /// First FT output holding at least `amount` base units
    FtUtxo {
        contract: String,
        holder: String,
        /// FT code script, hex
        code_script: String,
        amount: u64,
    },

    /// Several FT outputs, either the first `count` or enough for `amount`
    FtUtxos {
        contract: String,
        holder: String,
        /// FT code script, hex
        code_script: String,
        #[arg(long, default_value_t = 5, conflicts_with = "amount")]
        count: usize,
        #[arg(long)]
        amount: Option<u64>,
    },

    /// FT contract metadata
    FtInfo { contract: String },

    /// NFT metadata
    NftInfo { contract: String },

    /// Fetch a transaction
    Tx {
        txid: String,
        /// Print a decoded summary instead of hex
        #[arg(long)]
        decode: bool,
    },

    /// Pre-pre transaction data for spending an FT output
    PrePre { txid: String, vout: u32 },

    /// Broadcast one or more signed transactions
    Broadcast {
        #[arg(required = true)]
        tx_hex: Vec<String>,
    },

    /// Show the FT lookup key for an address or hash (offline)
    LookupKey { input: String },

    /// List unspent outputs locked by a script
    ScriptUtxos {
        /// Locking script, hex
        script: String,
    },
}

impl Args {
    fn explorer_config(&self) -> anyhow::Result<ExplorerConfig> {
        let mut config = match &self.config {
            Some(path) => ExplorerConfig::from_json_file(path)?,
            None => ExplorerConfig::default(),
        };
        if let Some(network) = self.network {
            config.network = network;
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = Some(base_url.clone());
        }
        Ok(config)
    }

    async fn exec(self) -> anyhow::Result<()> {
        let config = self.explorer_config()?;
        log::info!("using {}", config.base_url());
        let client = ExplorerClient::new(config)?;

        match self.command {
            Command::Utxos { address } => print(&client.fetch_utxos(&address).await?),
            Command::Balance { address } => {
                let balance = client.fetch_tbc_balance(&address).await?;
                print(&json!({ "address": address, "balance": balance }))
            }
            Command::Select { address, amount } => {
                print(&client.get_utxos(&address, amount).await?)
            }
            Command::FtBalance { contract, holder } => {
                let balance = client.fetch_ft_balance(&contract, &holder).await?;
                print(&json!({ "contract": contract, "holder": holder, "balance": balance }))
            }
            Command::FtUtxo {
                contract,
                holder,
                code_script,
                amount,
            } => {
                let script = decode_hex("code script", &code_script)?;
                print(&client.fetch_ft_utxo(&contract, &holder, &script, amount).await?)
            }
            Command::FtUtxos {
                contract,
                holder,
                code_script,
                count,
                amount,
            } => {
                let script = decode_hex("code script", &code_script)?;
                let utxos = match amount {
                    Some(amount) => {
                        client
                            .fetch_ft_utxos_for_amount(&contract, &holder, &script, amount)
                            .await?
                    }
                    None => {
                        client
                            .fetch_ft_utxo_list(&contract, &holder, &script, count)
                            .await?
                    }
                };
                print(&utxos)
            }
            Command::FtInfo { contract } => print(&client.fetch_ft_info(&contract).await?),
            Command::NftInfo { contract } => print(&client.fetch_nft_info(&contract).await?),
            Command::Tx { txid, decode } => {
                if !decode {
                    let raw = client.fetch_tx_hex(&txid).await?;
                    return print(&json!({ "txid": txid, "hex": raw }));
                }
                let tx = client.fetch_tx_raw(&txid).await?;
                let inputs: Vec<_> = tx
                    .input
                    .iter()
                    .map(|i| {
                        json!({
                            "txid": i.previous_output.txid.to_string(),
                            "vout": i.previous_output.vout,
                            "sequence": i.sequence.0,
                        })
                    })
                    .collect();
                let outputs: Vec<_> = tx
                    .output
                    .iter()
                    .map(|o| {
                        json!({
                            "value": o.value.to_sat(),
                            "script": hex::encode(o.script_pubkey.as_bytes()),
                        })
                    })
                    .collect();
                print(&json!({
                    "txid": tx.compute_txid().to_string(),
                    "version": tx.version.0,
                    "lock_time": tx.lock_time.to_consensus_u32(),
                    "inputs": inputs,
                    "outputs": outputs,
                }))
            }
            Command::PrePre { txid, vout } => {
                let data = client.fetch_ft_pre_pre_tx_data_by_txid(&txid, vout).await?;
                print(&json!({ "txid": txid, "vout": vout, "data": data }))
            }
            Command::Broadcast { tx_hex } => {
                if let [single] = tx_hex.as_slice() {
                    let txid = client.broadcast_tx_raw(single).await?;
                    print(&json!({ "txid": txid }))
                } else {
                    let txids = client.broadcast_tx_batch(&tx_hex).await?;
                    print(&json!({ "txids": txids }))
                }
            }
            Command::ScriptUtxos { script } => {
                let script = decode_hex("script", &script)?;
                print(&client.fetch_script_utxos(&script).await?)
            }
            Command::LookupKey { input } => {
                let key = normalize_lookup_key(&input, &StandardContractLib::new())?;
                print(&json!({ "input": input, "key": key }))
            }
        }
    }
}

fn decode_hex(what: &str, value: &str) -> anyhow::Result<Vec<u8>> {
    let bytes = hex::decode(value).with_context(|| format!("{what} is not valid hex"))?;
    if bytes.is_empty() {
        bail!("{what} is empty");
    }
    Ok(bytes)
}

fn print<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    args.exec().await
}
