//! Parameter and storage shapes of the tzcolors auction contract.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CreateAuctionParameter {
    pub auction_id: String,
    pub bid_amount: String,
    pub end_timestamp: String,
    pub token_address: String,
    pub token_amount: String,
    pub token_id: String,
}

/// Auction id.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BidParameter(pub String);

/// Auction id.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct WithdrawParameter(pub String);

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AuctionItem {
    pub bid_amount: String,
    pub bidder: String,
    pub end_timestamp: String,
    pub seller: String,
    pub token_address: String,
    pub token_amount: String,
    pub token_id: String,
}

/// Live auctions keyed by id.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct TzcolorsAuctionStorage(pub BTreeMap<String, AuctionItem>);
