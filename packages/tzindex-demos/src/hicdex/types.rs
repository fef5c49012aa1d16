//! Parameter and storage shapes of the objkt.bid english auction contract
//! and the hic et nunc split contract.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CreateAuctionParameter {
    pub fa2: String,
    pub objkt_id: String,
    pub start_time: String,
    pub end_time: String,
    pub price_increment: String,
    pub extension_time: String,
    pub reserve: String,
}

/// Auction id.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BidParameter(pub String);

/// Auction id.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CancelAuctionParameter(pub String);

/// Auction id.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ConcludeAuctionParameter(pub String);

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ObjktbidEnglishStorage {
    pub admin: String,
    /// Id the next created auction receives.
    pub auction_id: String,
    /// Big map pointer.
    pub auctions: u64,
    pub fee: String,
    pub fee_recipient: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SplitContractAStorage {
    pub administrator: String,
    #[serde(rename = "coreParticipants")]
    pub core_participants: Vec<String>,
    #[serde(rename = "hicetnuncMinterAddress")]
    pub hicetnunc_minter_address: String,
    pub shares: BTreeMap<String, String>,
    #[serde(rename = "totalShares")]
    pub total_shares: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn split_storage() -> serde_json::Value {
        json!({
            "administrator": "tz1admin",
            "coreParticipants": ["tz1alice"],
            "hicetnuncMinterAddress": "KT1Hkg5qeNhfwpKW4fXvq7HGZB9z2EnmCCA9",
            "shares": {"tz1alice": "600", "tz1bob": "400"},
            "totalShares": "1000"
        })
    }

    #[test]
    fn test_split_storage_decodes() {
        let storage: SplitContractAStorage = serde_json::from_value(split_storage()).unwrap();
        assert_eq!(storage.core_participants, vec!["tz1alice".to_string()]);
        assert_eq!(storage.shares["tz1bob"], "400");
    }

    #[test]
    fn test_split_storage_is_strict() {
        let mut extra = split_storage();
        extra["paused"] = json!(false);
        assert!(serde_json::from_value::<SplitContractAStorage>(extra).is_err());

        let mut missing = split_storage();
        missing.as_object_mut().unwrap().remove("totalShares");
        assert!(serde_json::from_value::<SplitContractAStorage>(missing).is_err());

        let mut mistyped = split_storage();
        mistyped["coreParticipants"] = json!("tz1alice");
        assert!(serde_json::from_value::<SplitContractAStorage>(mistyped).is_err());
    }
}
