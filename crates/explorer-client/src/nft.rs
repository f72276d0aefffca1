//! NFT metadata.

use chain_tbc::error::TbcError;
use chain_tbc::token::NonFungibleTokenInfo;
use serde::{Deserialize, Serialize};

use crate::client::ExplorerClient;
use crate::error::ClientError;

#[derive(Debug, Serialize)]
struct NftInfoRequest<'a> {
    if_icon_needed: bool,
    nft_contract_list: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NftInfoListResponse {
    #[serde(default)]
    nft_info_list: Vec<NftInfoEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NftInfoEntry {
    collection_id: String,
    collection_index: u64,
    collection_name: String,
    nft_code_balance: u64,
    nft_p2pkh_balance: u64,
    nft_name: String,
    nft_symbol: String,
    #[serde(rename = "nft_attributes", default)]
    attributes: String,
    #[serde(default)]
    nft_description: String,
    #[serde(default)]
    nft_transfer_time_count: u64,
    #[serde(default)]
    nft_icon: String,
}

impl From<NftInfoEntry> for NonFungibleTokenInfo {
    fn from(entry: NftInfoEntry) -> Self {
        NonFungibleTokenInfo {
            collection_id: entry.collection_id,
            collection_index: entry.collection_index,
            collection_name: entry.collection_name,
            code_balance: entry.nft_code_balance,
            p2pkh_balance: entry.nft_p2pkh_balance,
            name: entry.nft_name,
            symbol: entry.nft_symbol,
            attributes: entry.attributes,
            description: entry.nft_description,
            transfer_count: entry.nft_transfer_time_count,
            icon: entry.nft_icon,
        }
    }
}

impl ExplorerClient {
    /// Metadata of the NFT minted by `contract_id`, icon included.
    pub async fn fetch_nft_info(&self, contract_id: &str) -> Result<NonFungibleTokenInfo, ClientError> {
        let request = NftInfoRequest {
            if_icon_needed: true,
            nft_contract_list: [contract_id],
        };
        let response: NftInfoListResponse = self.post_json("nft/infos/contract_ids", &request).await?;

        response
            .nft_info_list
            .into_iter()
            .next()
            .map(NonFungibleTokenInfo::from)
            .ok_or_else(|| TbcError::NotFound(format!("no NFT with contract id {contract_id}")).into())
    }
}
