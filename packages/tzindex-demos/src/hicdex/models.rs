use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tzindex_database::{ColumnType, FieldDescriptor, Model, ModelDescriptor};

pub const APP: &str = "models";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(into = "u8", try_from = "u8")]
pub enum EnglishAuctionStatus {
    Active = 0,
    Concluded = 1,
    Cancelled = 2,
}

impl From<EnglishAuctionStatus> for u8 {
    fn from(status: EnglishAuctionStatus) -> u8 {
        status as u8
    }
}

impl TryFrom<u8> for EnglishAuctionStatus {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(EnglishAuctionStatus::Active),
            1 => Ok(EnglishAuctionStatus::Concluded),
            2 => Ok(EnglishAuctionStatus::Cancelled),
            other => Err(format!("unknown english auction status {other}")),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EnglishAuction {
    pub id: u64,
    pub fa2: String,
    pub status: EnglishAuctionStatus,
    pub objkt_id: u64,
    pub creator: String,
    pub highest_bidder: String,
    pub highest_bid: u64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub price_increment: u64,
    /// Seconds a late bid pushes `end_time` past the bid.
    pub extension_time: u64,
    pub reserve: u64,
}

impl Model for EnglishAuction {
    fn descriptor() -> ModelDescriptor {
        ModelDescriptor::new(APP, "EnglishAuction")
            .field(FieldDescriptor::primary_key("id", ColumnType::BigInt))
            .field(FieldDescriptor::column("fa2", ColumnType::Address))
            .field(FieldDescriptor::column("status", ColumnType::Integer))
            .field(FieldDescriptor::column("objkt_id", ColumnType::BigInt))
            .field(FieldDescriptor::column("creator", ColumnType::Address))
            .field(FieldDescriptor::column("highest_bidder", ColumnType::Address))
            .field(FieldDescriptor::column("highest_bid", ColumnType::BigInt))
            .field(FieldDescriptor::column("start_time", ColumnType::Timestamp))
            .field(FieldDescriptor::column("end_time", ColumnType::Timestamp))
            .field(FieldDescriptor::column("price_increment", ColumnType::BigInt))
            .field(FieldDescriptor::column("extension_time", ColumnType::BigInt))
            .field(FieldDescriptor::column("reserve", ColumnType::BigInt))
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EnglishBid {
    pub id: u64,
    pub auction_id: u64,
    pub bidder: String,
    pub amount: u64,
    pub timestamp: DateTime<Utc>,
    pub level: u64,
}

impl Model for EnglishBid {
    fn descriptor() -> ModelDescriptor {
        ModelDescriptor::new(APP, "EnglishBid")
            .field(FieldDescriptor::primary_key("id", ColumnType::BigInt))
            .field(FieldDescriptor::foreign_key(
                "auction",
                "models.EnglishAuction",
                Some("bids"),
                ColumnType::BigInt,
            ))
            .field(FieldDescriptor::column("bidder", ColumnType::Address))
            .field(FieldDescriptor::column("amount", ColumnType::BigInt))
            .field(FieldDescriptor::column("timestamp", ColumnType::Timestamp))
            .field(FieldDescriptor::column("level", ColumnType::BigInt))
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SplitContract {
    pub contract: String,
    pub administrator: String,
    pub total_shares: u64,
}

impl Model for SplitContract {
    fn descriptor() -> ModelDescriptor {
        ModelDescriptor::new(APP, "SplitContract")
            .field(FieldDescriptor::primary_key("contract", ColumnType::Address))
            .field(FieldDescriptor::column("administrator", ColumnType::Address))
            .field(FieldDescriptor::column("total_shares", ColumnType::BigInt))
    }
}

/// One holder's stake in a split contract, keyed `<contract>:<holder>`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Shareholder {
    pub id: String,
    pub contract_id: String,
    pub holder: String,
    pub shares: u64,
    pub is_core: bool,
}

impl Shareholder {
    pub fn key(contract: &str, holder: &str) -> String {
        format!("{contract}:{holder}")
    }
}

impl Model for Shareholder {
    fn descriptor() -> ModelDescriptor {
        ModelDescriptor::new(APP, "Shareholder")
            .field(FieldDescriptor::primary_key("id", ColumnType::Text))
            .field(FieldDescriptor::foreign_key(
                "contract",
                "models.SplitContract",
                Some("shareholders"),
                ColumnType::Address,
            ))
            .field(FieldDescriptor::column("holder", ColumnType::Address))
            .field(FieldDescriptor::column("shares", ColumnType::BigInt))
            .field(FieldDescriptor::column("is_core", ColumnType::Boolean))
    }
}
