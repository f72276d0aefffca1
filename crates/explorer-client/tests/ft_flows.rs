//! FT balance, UTXO and metadata fetches against a mock explorer.

mod common;

use chain_tbc::error::TbcError;
use common::*;
use explorer_client::ClientError;
use serde_json::{json, Value};

const CONTRACT: &str = "c0ffee00c0ffee00c0ffee00c0ffee00c0ffee00c0ffee00c0ffee00c0ffee00";
const CODE_SCRIPT: &[u8] = &[0xc0, 0xde];

fn balance_path(key: &str) -> String {
    format!("ft/balance/combine/script/{key}/contract/{CONTRACT}")
}

fn utxo_path(key: &str) -> String {
    format!("ft/utxo/combine/script/{key}/contract/{CONTRACT}")
}

fn ft_list(balances: &[u64]) -> Value {
    let list: Vec<Value> = balances
        .iter()
        .enumerate()
        .map(|(i, balance)| {
            json!({
                "utxoId": format!("{:064x}", i + 1),
                "utxoVout": 0,
                "utxoBalance": 500,
                "ftContractId": CONTRACT,
                "ftBalance": balance
            })
        })
        .collect();
    json!({ "ftUtxoList": list })
}

// ─── Lookup keys ────────────────────────────────────────────────────

#[tokio::test]
async fn address_lookup_key_is_tagged_00() {
    let transport = MockTransport::new();
    let key = format!("{ADDRESS_HASH}00");
    transport.on(&balance_path(&key), json!({"ftBalance": 1234}));

    let balance = client(transport.clone())
        .fetch_ft_balance(CONTRACT, ADDRESS)
        .await
        .unwrap();

    assert_eq!(balance, 1234);
    assert_eq!(transport.hits(&balance_path(&key)), 1);
}

#[tokio::test]
async fn hash_lookup_key_is_tagged_01() {
    let transport = MockTransport::new();
    let key = format!("{ADDRESS_HASH}01");
    transport.on(&balance_path(&key), json!({"ftBalance": 7}));

    let balance = client(transport.clone())
        .fetch_ft_balance(CONTRACT, ADDRESS_HASH)
        .await
        .unwrap();

    assert_eq!(balance, 7);
}

#[tokio::test]
async fn malformed_lookup_input_makes_no_request() {
    let transport = MockTransport::new();
    let err = client(transport.clone())
        .fetch_ft_balance(CONTRACT, "definitely-not-an-address")
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Chain(TbcError::InvalidInput(_))));
    assert_eq!(transport.total_requests(), 0);
}

// ─── Single FT UTXO by amount ───────────────────────────────────────

#[tokio::test]
async fn ft_utxo_first_covering_entry_wins() {
    let transport = MockTransport::new();
    let key = format!("{ADDRESS_HASH}00");
    transport.on(&utxo_path(&key), ft_list(&[10, 600, 900]));

    let utxo = client(transport.clone())
        .fetch_ft_utxo(CONTRACT, ADDRESS, CODE_SCRIPT, 500)
        .await
        .unwrap();

    assert_eq!(utxo.ft_balance, Some(600));
    assert_eq!(utxo.script_pubkey, CODE_SCRIPT);
    assert_eq!(utxo.satoshis, 500);
    // Balance is only consulted on failure.
    assert_eq!(transport.hits(&balance_path(&key)), 0);
}

#[tokio::test]
async fn ft_utxo_fragmented_balance_needs_merge() {
    let transport = MockTransport::new();
    let key = format!("{ADDRESS_HASH}00");
    transport.on(&utxo_path(&key), ft_list(&[300, 300, 300]));
    transport.on(&balance_path(&key), json!({"ftBalance": 900}));

    let err = client(transport)
        .fetch_ft_utxo(CONTRACT, ADDRESS, CODE_SCRIPT, 500)
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Chain(TbcError::NeedsMerge(_))));
}

#[tokio::test]
async fn ft_utxo_short_balance_is_insufficient() {
    let transport = MockTransport::new();
    let key = format!("{ADDRESS_HASH}00");
    transport.on(&utxo_path(&key), ft_list(&[100, 100]));
    transport.on(&balance_path(&key), json!({"ftBalance": 200}));

    let err = client(transport)
        .fetch_ft_utxo(CONTRACT, ADDRESS, CODE_SCRIPT, 500)
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Chain(TbcError::InsufficientBalance(_))));
}

#[tokio::test]
async fn ft_utxo_empty_list_is_insufficient() {
    let transport = MockTransport::new();
    transport.on(&utxo_path(&format!("{ADDRESS_HASH}00")), json!({"ftUtxoList": []}));

    let err = client(transport)
        .fetch_ft_utxo(CONTRACT, ADDRESS, CODE_SCRIPT, 1)
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Chain(TbcError::InsufficientBalance(_))));
}

// ─── Bounded list ───────────────────────────────────────────────────

#[tokio::test]
async fn ft_utxo_list_rejects_out_of_range_counts() {
    let transport = MockTransport::new();
    let client = client(transport.clone());

    for count in [0, 6, 7] {
        let err = client
            .fetch_ft_utxo_list(CONTRACT, ADDRESS, CODE_SCRIPT, count)
            .await
            .unwrap_err();
        assert!(
            matches!(err, ClientError::Chain(TbcError::InvalidArgument(_))),
            "count {count}"
        );
    }
    assert_eq!(transport.total_requests(), 0);
}

#[tokio::test]
async fn ft_utxo_list_returns_requested_count() {
    let transport = MockTransport::new();
    transport.on(
        &utxo_path(&format!("{ADDRESS_HASH}00")),
        ft_list(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]),
    );

    let utxos = client(transport)
        .fetch_ft_utxo_list(CONTRACT, ADDRESS, CODE_SCRIPT, 3)
        .await
        .unwrap();

    let balances: Vec<u64> = utxos.iter().filter_map(|u| u.ft_balance).collect();
    assert_eq!(balances, vec![1, 2, 3]);
}

#[tokio::test]
async fn ft_utxo_list_with_fewer_available() {
    let transport = MockTransport::new();
    transport.on(&utxo_path(&format!("{ADDRESS_HASH}00")), ft_list(&[4, 2]));

    let utxos = client(transport)
        .fetch_ft_utxo_list(CONTRACT, ADDRESS, CODE_SCRIPT, 5)
        .await
        .unwrap();

    assert_eq!(utxos.len(), 2);
}

// ─── Amount-driven selection and txid filter ────────────────────────

#[tokio::test]
async fn ft_utxos_for_amount_takes_largest_first() {
    let transport = MockTransport::new();
    transport.on(&utxo_path(&format!("{ADDRESS_HASH}00")), ft_list(&[50, 400, 300]));

    let utxos = client(transport)
        .fetch_ft_utxos_for_amount(CONTRACT, ADDRESS, CODE_SCRIPT, 600)
        .await
        .unwrap();

    let balances: Vec<u64> = utxos.iter().filter_map(|u| u.ft_balance).collect();
    assert_eq!(balances, vec![400, 300]);
}

#[tokio::test]
async fn ft_utxo_by_txid_finds_match_or_not_found() {
    let transport = MockTransport::new();
    transport.on(&utxo_path(&format!("{ADDRESS_HASH}00")), ft_list(&[1, 2, 3]));
    let client = client(transport);

    let wanted = format!("{:064x}", 2);
    let utxo = client
        .fetch_ft_utxo_by_txid(CONTRACT, ADDRESS, CODE_SCRIPT, &wanted)
        .await
        .unwrap();
    assert_eq!(utxo.ft_balance, Some(2));

    let err = client
        .fetch_ft_utxo_by_txid(CONTRACT, ADDRESS, CODE_SCRIPT, &"f".repeat(64))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Chain(TbcError::NotFound(_))));
}

// ─── Metadata ───────────────────────────────────────────────────────

#[tokio::test]
async fn ft_info_is_fetched_fresh_each_time() {
    let transport = MockTransport::new();
    let path = format!("ft/info/contract/id/{CONTRACT}");
    transport.on(
        &path,
        json!({
            "ftCodeScript": "c0de",
            "ftTapeScript": "7a9e",
            "ftSupply": 1000000,
            "ftDecimal": 6,
            "ftName": "Turing Test",
            "ftSymbol": "TT"
        }),
    );
    let client = client(transport.clone());

    let info = client.fetch_ft_info(CONTRACT).await.unwrap();
    client.fetch_ft_info(CONTRACT).await.unwrap();

    assert_eq!(info.contract_txid.as_deref(), Some(CONTRACT));
    assert_eq!(info.name, "Turing Test");
    assert_eq!(info.decimal, 6);
    assert_eq!(transport.hits(&path), 2);
}

#[tokio::test]
async fn nft_info_posts_contract_list() {
    let transport = MockTransport::new();
    transport.on(
        "nft/infos/contract_ids",
        json!({
            "nftInfoList": [{
                "collectionId": "col",
                "collectionIndex": 0,
                "collectionName": "Genesis",
                "nftCodeBalance": 200,
                "nftP2pkhBalance": 100,
                "nftName": "First",
                "nftSymbol": "GEN",
                "nft_attributes": "rare",
                "nftDescription": "first of its kind",
                "nftTransferTimeCount": 0,
                "nftIcon": ""
            }]
        }),
    );

    let info = client(transport.clone()).fetch_nft_info("nft01").await.unwrap();

    assert_eq!(info.name, "First");
    assert_eq!(info.attributes, "rare");
    assert_eq!(
        transport.posted("nft/infos/contract_ids"),
        vec![json!({"if_icon_needed": true, "nft_contract_list": ["nft01"]})]
    );
}

#[tokio::test]
async fn nft_info_empty_list_is_not_found() {
    let transport = MockTransport::new();
    transport.on("nft/infos/contract_ids", json!({"nftInfoList": []}));

    let err = client(transport).fetch_nft_info("missing").await.unwrap_err();
    assert!(matches!(err, ClientError::Chain(TbcError::NotFound(_))));
}
