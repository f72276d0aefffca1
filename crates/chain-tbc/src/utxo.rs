use serde::{Deserialize, Serialize};

use crate::error::TbcError;

/// Reserve a single output must cover on top of the target.
pub const SINGLE_OUTPUT_RESERVE: u64 = 50_000;

/// Reserve an accumulated set of outputs must cover on top of the target.
pub const ACCUMULATED_RESERVE: u64 = 2_000;

/// A single unspent transaction output, plain or token-carrying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnspentOutput {
    /// Transaction ID as a hex string (display order).
    pub txid: String,
    /// Output index within the transaction.
    pub vout: u32,
    /// The locking script attached by the caller; the explorer does not
    /// return it.
    #[serde(with = "hex::serde")]
    pub script_pubkey: Vec<u8>,
    /// Value in base units.
    pub satoshis: u64,
    /// Token balance carried by the output, for FT outputs only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ft_balance: Option<u64>,
}

/// Reserves applied on top of the target amount during selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionPolicy {
    pub single_reserve: u64,
    pub accumulate_reserve: u64,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            single_reserve: SINGLE_OUTPUT_RESERVE,
            accumulate_reserve: ACCUMULATED_RESERVE,
        }
    }
}

/// Result of UTXO selection: the chosen outputs and their aggregate value.
#[derive(Debug, Clone)]
pub struct UtxoSelection {
    pub selected: Vec<UnspentOutput>,
    pub total_sat: u64,
}

/// Select outputs to cover `target_sat`.
///
/// Outputs are sorted ascending by value. The smallest single output
/// covering `target + single_reserve` wins outright; otherwise outputs are
/// accumulated smallest-first until `target + accumulate_reserve` is
/// reached.
pub fn select_utxos(
    utxos: &[UnspentOutput],
    target_sat: u64,
    policy: &SelectionPolicy,
) -> Result<UtxoSelection, TbcError> {
    if utxos.is_empty() {
        return Err(TbcError::InsufficientBalance("no UTXOs available".into()));
    }

    let mut sorted: Vec<&UnspentOutput> = utxos.iter().collect();
    sorted.sort_by_key(|u| u.satoshis);

    let single_threshold = target_sat.saturating_add(policy.single_reserve);
    if let Some(utxo) = sorted.iter().find(|u| u.satoshis >= single_threshold) {
        return Ok(UtxoSelection {
            selected: vec![(*utxo).clone()],
            total_sat: utxo.satoshis,
        });
    }

    let threshold = target_sat.saturating_add(policy.accumulate_reserve);
    let mut selected = Vec::new();
    let mut total_sat: u64 = 0;

    for utxo in sorted {
        selected.push(utxo.clone());
        total_sat = total_sat.saturating_add(utxo.satoshis);
        if total_sat >= threshold {
            return Ok(UtxoSelection { selected, total_sat });
        }
    }

    Err(TbcError::InsufficientBalance(format!(
        "have {total_sat} sat, need {threshold} sat (target {target_sat} + reserve {})",
        policy.accumulate_reserve,
    )))
}

/// Sum of the values of `utxos`.
pub fn total_value(utxos: &[UnspentOutput]) -> u64 {
    utxos.iter().fold(0u64, |acc, u| acc.saturating_add(u.satoshis))
}

/// Sum of the token balances of `utxos`.
pub fn total_ft_balance(utxos: &[UnspentOutput]) -> u64 {
    utxos
        .iter()
        .fold(0u64, |acc, u| acc.saturating_add(u.ft_balance.unwrap_or(0)))
}

/// Find a single plain output strictly larger than `amount_sat`.
///
/// A lone output that is too small is `InsufficientBalance`. With several
/// outputs and none large enough, `Ok(None)` signals the outputs are
/// fragmented and the caller should check the total and merge.
pub fn find_spendable(
    utxos: &[UnspentOutput],
    amount_sat: u64,
) -> Result<Option<UnspentOutput>, TbcError> {
    match utxos {
        [] => Err(TbcError::InsufficientBalance("no UTXOs available".into())),
        [only] if only.satoshis > amount_sat => Ok(Some(only.clone())),
        [only] => Err(TbcError::InsufficientBalance(format!(
            "single UTXO holds {} sat, need more than {amount_sat} sat",
            only.satoshis
        ))),
        many => Ok(many.iter().find(|u| u.satoshis > amount_sat).cloned()),
    }
}

/// Maximum number of FT outputs a single transfer can spend.
pub const MAX_FT_INPUTS: usize = 5;

/// Check a requested FT output count against [`MAX_FT_INPUTS`].
pub fn validate_ft_count(count: usize) -> Result<(), TbcError> {
    if count == 0 || count > MAX_FT_INPUTS {
        return Err(TbcError::InvalidArgument(format!(
            "number of FT UTXOs must be between 1 and {MAX_FT_INPUTS}, got {count}"
        )));
    }
    Ok(())
}

/// First FT output, in list order, whose token balance covers `amount`.
pub fn first_ft_covering(utxos: &[UnspentOutput], amount: u64) -> Option<&UnspentOutput> {
    utxos
        .iter()
        .find(|u| u.ft_balance.unwrap_or(0) >= amount)
}

/// Select up to [`MAX_FT_INPUTS`] FT outputs, largest balance first, whose
/// token balances sum to at least `amount`.
///
/// If all outputs together cover `amount` but the largest five do not,
/// the result is `NeedsMerge`.
pub fn select_ft_utxos(utxos: &[UnspentOutput], amount: u64) -> Result<Vec<UnspentOutput>, TbcError> {
    if amount == 0 {
        return Err(TbcError::InvalidArgument("FT amount must be positive".into()));
    }

    let total = total_ft_balance(utxos);
    if total < amount {
        return Err(TbcError::InsufficientBalance(format!(
            "FT balance {total} is below {amount}"
        )));
    }

    let mut sorted: Vec<&UnspentOutput> = utxos.iter().collect();
    sorted.sort_by(|a, b| b.ft_balance.cmp(&a.ft_balance));

    let mut selected = Vec::new();
    let mut sum: u64 = 0;
    for utxo in sorted.into_iter().take(MAX_FT_INPUTS) {
        selected.push(utxo.clone());
        sum = sum.saturating_add(utxo.ft_balance.unwrap_or(0));
        if sum >= amount {
            return Ok(selected);
        }
    }

    Err(TbcError::NeedsMerge(format!(
        "{MAX_FT_INPUTS} largest FT UTXOs hold {sum}, need {amount}"
    )))
}
